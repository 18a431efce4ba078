use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use classref::IndexConfig;

/// classref - usage extraction for JVM class files
#[derive(Debug, Parser)]
#[command(name = "classref", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Which usage sources to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    /// Everything: declarations, annotations, signatures and method bodies.
    Full,
    /// Instructions, exception tables and bootstrap arguments only.
    Bytecode,
    /// Declarations, annotations and generic signatures only.
    Declarations,
}

impl Scope {
    pub fn config(self) -> IndexConfig {
        match self {
            Scope::Full => IndexConfig::full(),
            Scope::Bytecode => IndexConfig::bytecode_only(),
            Scope::Declarations => IndexConfig::declarations_only(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every usage edge as `symbol<TAB>location`.
    Usages {
        /// Class files, or directories searched recursively for `.class` files.
        #[arg(value_name = "FILE", required = true)]
        paths: Vec<PathBuf>,

        /// Usage sources to scan.
        #[arg(long, value_enum, default_value = "full")]
        scope: Scope,
    },

    /// Display the class header summary and member counts.
    Info {
        /// Class files, or directories searched recursively for `.class` files.
        #[arg(value_name = "FILE", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Index all files and list the usage locations of one symbol.
    Find {
        /// Canonical reference: `s:Class`, `m:Owner:name:descriptor` or `f:Owner:name:descriptor`.
        #[arg(value_name = "KEY")]
        key: String,

        /// Class files, or directories searched recursively for `.class` files.
        #[arg(value_name = "FILE", required = true)]
        paths: Vec<PathBuf>,

        /// Usage sources to scan.
        #[arg(long, value_enum, default_value = "full")]
        scope: Scope,

        /// Report each location once, however often the symbol is used there.
        #[arg(long)]
        dedup: bool,
    },
}
