use std::path::PathBuf;

use anyhow::Context;
use classref::{index_with_config, DedupPolicy, Symbol, UsageIndex};
use serde::Serialize;

use crate::{
    app::{GlobalOptions, Scope},
    commands::common::{collect_class_files, finish, load_class_file, process_files},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct FindResult {
    key: String,
    files_indexed: usize,
    usage_count: usize,
    locations: Vec<String>,
}

pub fn run(
    key: &str,
    paths: &[PathBuf],
    scope: Scope,
    dedup: bool,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    // Normalizes the key and rejects anything that is not a canonical reference.
    let key = key
        .parse::<Symbol>()
        .with_context(|| format!("invalid key: {key}"))?
        .reference();

    let files = collect_class_files(paths)?;
    let config = scope.config();
    let policy = if dedup {
        DedupPolicy::PerLocation
    } else {
        DedupPolicy::Preserve
    };

    let usages = UsageIndex::with_policy(policy);
    let (indexed, failed) = process_files(&files, |path| {
        let file = load_class_file(path)?;
        index_with_config(file.data(), &mut &usages, &config)?;
        Ok(())
    });
    log::debug!(
        "Indexed {} usages of {} symbols",
        usages.len(),
        usages.key_count()
    );

    let result = FindResult {
        files_indexed: indexed.len(),
        usage_count: usages.count(&key),
        locations: usages.get(&key),
        key,
    };

    print_output(&result, opts, |result| {
        let mut tw = TabWriter::new(&[("Location", Align::Left), ("Count", Align::Right)]);
        let mut locations = result.locations.iter().peekable();
        while let Some(location) = locations.next() {
            let mut count = 1;
            while locations.next_if_eq(&location).is_some() {
                count += 1;
            }
            tw.row(vec![location.clone(), count.to_string()]);
        }
        tw.print();
        println!();
        println!(
            "{} usages of {} in {} files",
            result.usage_count, result.key, result.files_indexed
        );
    })?;

    finish(failed, files.len())
}
