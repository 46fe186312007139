use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::error::PluginError;
use crate::extractor::{Event, Extractor, SourceFile};
use crate::fs::{FileSystem, RealFileSystem};

/// Outcome of one `extract` run
#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub files_processed: usize,
    pub catalogs_written: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, PluginError)>,
}

pub fn run(config: &Config, output: Option<String>) -> Result<()> {
    println!("=== gettext-extract extract ===\n");

    let output_dir = output.as_ref().unwrap_or(&config.output);

    println!("Configuration:");
    println!("  Input patterns: {:?}", config.input);
    println!("  Output: {}", output_dir);
    println!("  Delimiters: {} {}", config.start_delim, config.end_delim);
    println!();

    let extractor = Extractor::new(config).context("Invalid configuration")?;
    let inputs = collect_inputs(&config.input)?;

    if inputs.is_empty() {
        println!("No input files matched.");
        return Ok(());
    }

    let summary = extract_files(&RealFileSystem, &extractor, &inputs, Path::new(output_dir))?;

    for path in &summary.catalogs_written {
        println!("  wrote {}", path.display());
    }

    println!("\nExtraction Summary:");
    println!("  Files processed: {}", summary.files_processed);
    println!("  Catalogs written: {}", summary.catalogs_written.len());

    if !summary.errors.is_empty() {
        for (path, error) in &summary.errors {
            tracing::error!("{}: {}", path.display(), error);
        }
        bail!("{} error(s) encountered", summary.errors.len());
    }

    println!("\nDone!");
    Ok(())
}

/// Expand glob patterns into a sorted, de-duplicated list of files.
pub fn collect_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = BTreeSet::new();
    for pattern in patterns {
        let paths = glob::glob(pattern)
            .with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    inputs.insert(path);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping unreadable path: {}", e),
            }
        }
    }
    Ok(inputs.into_iter().collect())
}

/// Where the catalog for `input` is written under `output_dir`.
///
/// Only normal components of `input` are kept, so absolute or `..` paths
/// cannot escape the output directory.
pub fn catalog_path(output_dir: &Path, input: &Path) -> PathBuf {
    let relative: PathBuf = input
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    let mut name = OsString::from(relative.as_os_str());
    name.push(".pot");
    output_dir.join(name)
}

/// Transform every input in parallel and write the resulting catalogs.
///
/// Files that produced an error event are not written.
pub fn extract_files<F: FileSystem>(
    fs: &F,
    extractor: &Extractor,
    inputs: &[PathBuf],
    output_dir: &Path,
) -> Result<ExtractSummary> {
    let results: Vec<(PathBuf, Vec<Event>)> = inputs
        .par_iter()
        .map(|path| {
            let contents = fs.read(path)?;
            let events = extractor.transform(SourceFile::new(path.clone(), contents));
            Ok((path.clone(), events))
        })
        .collect::<Result<_>>()?;

    let mut summary = ExtractSummary {
        files_processed: results.len(),
        ..Default::default()
    };

    for (input, events) in results {
        let mut catalog = None;
        let mut failed = false;
        for event in events {
            match event {
                Event::File(file) => catalog = file.text(),
                Event::Error(error) => {
                    failed = true;
                    summary.errors.push((input.clone(), error));
                }
            }
        }

        let Some(catalog) = catalog.filter(|_| !failed) else {
            continue;
        };

        let target = catalog_path(output_dir, &input);
        if let Some(parent) = target.parent() {
            fs.create_dir_all(parent)?;
        }
        fs.write(&target, catalog.as_bytes())?;
        summary.catalogs_written.push(target);
    }

    Ok(summary)
}
