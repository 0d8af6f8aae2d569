//! Snapshot ingestion.
//!
//! Walks the generator's output folder and folds every metrics document into
//! one point. Files are read one at a time in discovery order, which keeps the
//! statistics arrays index-aligned with `files`.

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::point::{FileMetrics, FileRecord, Point, Statistics};

pub fn ingest<Tz>(generator: &GeneratorConfig, now: &DateTime<Tz>) -> Result<Point>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let output_root = absolute(&generator.output)?;
    let source_root = absolute(&generator.source)?;

    let files = discover(&output_root)?;
    if files.is_empty() {
        return Err(Error::validation(format!(
            "the output folder {} did not contain any files",
            output_root.display()
        )));
    }

    let matching: Vec<PathBuf> = files
        .into_iter()
        .filter(|path| has_extension(path, &generator.extension))
        .collect();

    let Some(sample) = matching.first() else {
        return Err(Error::validation(format!(
            "the output folder {} did not contain any matching files (files need a '{}' extension)",
            output_root.display(),
            generator.extension
        )));
    };

    let sample_dir = sample.parent().unwrap_or(sample);
    if !has_segment(sample_dir, &generator.project_dir) {
        return Err(Error::validation(format!(
            "the output folder {} is not inside a '{}' directory",
            output_root.display(),
            generator.project_dir
        )));
    }

    let (records, statistics) = matching.iter().try_fold(
        (Vec::with_capacity(matching.len()), Statistics::default()),
        |(mut records, mut statistics), path| -> Result<(Vec<FileRecord>, Statistics)> {
            let metrics = read_metrics(path)?;
            debug!(file = %path.display(), size = metrics.size, "ingested metrics");

            records.push(describe(path, &output_root, &source_root, generator));
            statistics.push(metrics);
            Ok((records, statistics))
        },
    )?;

    Ok(Point::new(now, records, statistics))
}

/// Every file below `root`, sorted by name within each directory.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 && is_not_found(&e) => {
                return Err(Error::validation(format!(
                    "the output folder {} does not exist",
                    root.display()
                )));
            }
            Err(e) => {
                return Err(Error::io(
                    format!("failed to walk {}", root.display()),
                    io::Error::from(e),
                ));
            }
        };

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_not_found(e: &walkdir::Error) -> bool {
    e.io_error()
        .map_or(false, |io| io.kind() == io::ErrorKind::NotFound)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

fn segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn has_segment(path: &Path, segment: &str) -> bool {
    segments(path).iter().any(|s| s == segment)
}

/// Segments after the last `project_dir` segment, all of them if it is absent.
fn location(dir: &Path, project_dir: &str) -> Vec<String> {
    let names = segments(dir);
    let start = names
        .iter()
        .rposition(|name| name == project_dir)
        .map_or(0, |i| i + 1);
    names[start..].to_vec()
}

fn describe(
    path: &Path,
    output_root: &Path,
    source_root: &Path,
    generator: &GeneratorConfig,
) -> FileRecord {
    let relative = path.strip_prefix(output_root).unwrap_or(path);
    let mut source = source_root.join(relative);
    source.set_extension(&generator.source_extension);

    let location = source
        .parent()
        .map(|dir| location(dir, &generator.project_dir))
        .unwrap_or_default();

    FileRecord {
        output: path.to_path_buf(),
        source,
        location,
    }
}

fn read_metrics(path: &Path) -> Result<FileMetrics> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::validation(format!(
                "the file {} disappeared before it could be read",
                path.display()
            )));
        }
        Err(e) => return Err(Error::io(format!("failed to read {}", path.display()), e)),
    };

    serde_json::from_str(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir()
        .map_err(|e| Error::io("failed to resolve the working directory", e))?;
    Ok(cwd.join(path))
}
