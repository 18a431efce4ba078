use std::path::PathBuf;

use classref::{index_with_config, Symbol, UsageEdge};
use serde::Serialize;

use crate::{
    app::{GlobalOptions, Scope},
    commands::common::{collect_class_files, finish, load_class_file, process_files},
    output::print_output,
};

#[derive(Debug, Serialize)]
struct EdgeInfo {
    kind: &'static str,
    symbol: String,
    location: String,
}

#[derive(Debug, Serialize)]
struct FileUsages {
    file: String,
    edges: Vec<EdgeInfo>,
}

pub fn run(paths: &[PathBuf], scope: Scope, opts: &GlobalOptions) -> anyhow::Result<()> {
    let files = collect_class_files(paths)?;
    let config = scope.config();

    let (results, failed) = process_files(&files, |path| {
        let file = load_class_file(path)?;
        let mut edges: Vec<UsageEdge> = Vec::new();
        index_with_config(file.data(), &mut edges, &config)?;

        Ok(FileUsages {
            file: path.display().to_string(),
            edges: edges
                .iter()
                .map(|edge| EdgeInfo {
                    kind: match edge.symbol {
                        Symbol::Class(_) => "class",
                        Symbol::Field(_) => "field",
                        Symbol::Method(_) => "method",
                    },
                    symbol: edge.symbol.to_string(),
                    location: edge.location.to_string(),
                })
                .collect(),
        })
    });

    print_output(&results, opts, |results| {
        for file in results {
            for edge in &file.edges {
                println!("{}\t{}", edge.symbol, edge.location);
            }
        }
    })?;

    finish(failed, files.len())
}
