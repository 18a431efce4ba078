use std::path::{Path, PathBuf};

use anyhow::Context;
use classref::File;

/// Expand the command line paths: files are taken as given, directories are searched
/// recursively for `.class` files.
pub fn collect_class_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            collect_recursive(path, &mut found)?;
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if is_class_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Returns true if the path has a `.class` extension.
pub fn is_class_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("class")
}

/// Map a class file into memory.
pub fn load_class_file(path: &Path) -> anyhow::Result<File> {
    File::from_file(path).with_context(|| format!("failed to load class file: {}", path.display()))
}

/// Run `process` for every file, reporting failures on stderr and continuing with the next.
///
/// Returns the successful results and the number of failed files.
pub fn process_files<T>(
    files: &[PathBuf],
    mut process: impl FnMut(&Path) -> anyhow::Result<T>,
) -> (Vec<T>, usize) {
    let mut results = Vec::with_capacity(files.len());
    let mut failed = 0;
    for path in files {
        match process(path) {
            Ok(result) => results.push(result),
            Err(error) => {
                eprintln!("{}: {:#}", path.display(), error);
                failed += 1;
            }
        }
    }
    (results, failed)
}

/// Turn a failure count into the command's exit status.
pub fn finish(failed: usize, total: usize) -> anyhow::Result<()> {
    if failed > 0 {
        anyhow::bail!("{failed} of {total} files could not be processed");
    }
    Ok(())
}
