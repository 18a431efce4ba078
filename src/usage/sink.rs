//! The sink contract: where usage edges go.
//!
//! A [`UsageSink`] receives edges through three fire-and-forget operations, one per symbol
//! kind. Symbols and locations arrive as their canonical strings, so a sink can forward them
//! anywhere (a database, a socket, a file) without depending on this crate's types.
//! [`UsageSink::add_edge`] delivers a typed [`UsageEdge`] through those operations; sinks that
//! want the typed value, like `Vec<UsageEdge>`, override it.

use crate::usage::{MemberRef, Symbol, UsageEdge, UsageLocation};

/// Receiver of usage edges.
pub trait UsageSink {
    /// `class` (an internal name) is used at `location`.
    fn add_class_usage(&mut self, class: &str, location: &str);

    /// The method `owner:name:descriptor` is used at `location`.
    fn add_method_usage(&mut self, method: &str, location: &str);

    /// The field `owner:name:descriptor` is used at `location`.
    fn add_field_usage(&mut self, field: &str, location: &str);

    /// Deliver a typed edge through the matching operation above.
    fn add_edge(&mut self, edge: &UsageEdge) {
        let location = edge.location.to_string();
        match &edge.symbol {
            Symbol::Class(name) => self.add_class_usage(name, &location),
            Symbol::Method(member) => self.add_method_usage(&member.to_string(), &location),
            Symbol::Field(member) => self.add_field_usage(&member.to_string(), &location),
        }
    }
}

impl<S: UsageSink + ?Sized> UsageSink for &mut S {
    fn add_class_usage(&mut self, class: &str, location: &str) {
        (**self).add_class_usage(class, location);
    }

    fn add_method_usage(&mut self, method: &str, location: &str) {
        (**self).add_method_usage(method, location);
    }

    fn add_field_usage(&mut self, field: &str, location: &str) {
        (**self).add_field_usage(field, location);
    }

    fn add_edge(&mut self, edge: &UsageEdge) {
        (**self).add_edge(edge);
    }
}

/// Collects edges in emission order.
impl UsageSink for Vec<UsageEdge> {
    fn add_class_usage(&mut self, class: &str, location: &str) {
        push_parsed(self, Ok(Symbol::Class(class.to_string())), location);
    }

    fn add_method_usage(&mut self, method: &str, location: &str) {
        push_parsed(self, method.parse::<MemberRef>().map(Symbol::Method), location);
    }

    fn add_field_usage(&mut self, field: &str, location: &str) {
        push_parsed(self, field.parse::<MemberRef>().map(Symbol::Field), location);
    }

    fn add_edge(&mut self, edge: &UsageEdge) {
        self.push(edge.clone());
    }
}

fn push_parsed(edges: &mut Vec<UsageEdge>, symbol: crate::Result<Symbol>, location: &str) {
    match (symbol, location.parse::<UsageLocation>()) {
        (Ok(symbol), Ok(location)) => edges.push(UsageEdge { symbol, location }),
        (Err(error), _) | (_, Err(error)) => log::warn!("Dropping usage: {}", error),
    }
}

/// A sink built from three closures.
///
/// # Examples
///
/// ```rust
/// use classref::{FnSink, UsageSink};
///
/// let mut calls = Vec::new();
/// let mut sink = FnSink::new(
///     |_class: &str, _location: &str| {},
///     |method: &str, location: &str| calls.push(format!("{} @ {}", method, location)),
///     |_field: &str, _location: &str| {},
/// );
/// sink.add_method_usage("B:n:()V", "m:A:m:()V");
/// drop(sink);
/// assert_eq!(calls, ["B:n:()V @ m:A:m:()V"]);
/// ```
pub struct FnSink<C, M, F> {
    class: C,
    method: M,
    field: F,
}

impl<C, M, F> FnSink<C, M, F>
where
    C: FnMut(&str, &str),
    M: FnMut(&str, &str),
    F: FnMut(&str, &str),
{
    /// Create a sink forwarding class, method and field usages to the given closures.
    pub fn new(class: C, method: M, field: F) -> Self {
        FnSink {
            class,
            method,
            field,
        }
    }
}

impl<C, M, F> UsageSink for FnSink<C, M, F>
where
    C: FnMut(&str, &str),
    M: FnMut(&str, &str),
    F: FnMut(&str, &str),
{
    fn add_class_usage(&mut self, class: &str, location: &str) {
        (self.class)(class, location);
    }

    fn add_method_usage(&mut self, method: &str, location: &str) {
        (self.method)(method, location);
    }

    fn add_field_usage(&mut self, field: &str, location: &str) {
        (self.field)(field, location);
    }
}
