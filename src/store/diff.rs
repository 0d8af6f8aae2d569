//! Point comparison.
//!
//! Compares two points file by file:
//! - Matches files by their source path (output paths move with the build dir)
//! - Reports grew, shrank, new and gone files with size deltas
//! - Net size change summary

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::point::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum DiffType {
    Grew,
    Shrank,
    New,
    Gone,
}

#[derive(Debug, Clone)]
pub struct DiffEntry {
    pub source: PathBuf,
    pub old_size: u64,
    pub new_size: u64,
    pub delta: i64,
    pub old_selectors: u64,
    pub new_selectors: u64,
    pub diff_type: DiffType,
}

pub struct DiffResult {
    pub entries: Vec<DiffEntry>,
    pub net_change: i64,
    pub from_timestamp: i64,
    pub to_timestamp: i64,
}

struct FileSummary<'a> {
    source: &'a Path,
    size: u64,
    selectors: u64,
}

/// Per-file view of a point. Missing statistics count as zero.
fn summarize(point: &Point) -> HashMap<&Path, FileSummary<'_>> {
    point
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let summary = FileSummary {
                source: file.source.as_path(),
                size: point.statistics.size.get(i).copied().unwrap_or(0),
                selectors: point.statistics.selectors.get(i).map_or(0, |s| s.total),
            };
            (file.source.as_path(), summary)
        })
        .collect()
}

fn signed(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

pub fn compare_points(from: &Point, to: &Point) -> DiffResult {
    let from_map = summarize(from);
    let to_map = summarize(to);

    let mut entries = Vec::new();
    let mut net_change: i64 = 0;

    for (key, to_file) in &to_map {
        let (old_size, old_selectors, diff_type) = match from_map.get(key) {
            Some(from_file) if from_file.size == to_file.size => continue,
            Some(from_file) if from_file.size < to_file.size => {
                (from_file.size, from_file.selectors, DiffType::Grew)
            }
            Some(from_file) => (from_file.size, from_file.selectors, DiffType::Shrank),
            None => (0, 0, DiffType::New),
        };

        let delta = signed(to_file.size).saturating_sub(signed(old_size));
        entries.push(DiffEntry {
            source: to_file.source.to_path_buf(),
            old_size,
            new_size: to_file.size,
            delta,
            old_selectors,
            new_selectors: to_file.selectors,
            diff_type,
        });
        net_change = net_change.saturating_add(delta);
    }

    for (key, from_file) in &from_map {
        if to_map.contains_key(key) {
            continue;
        }

        let delta = -signed(from_file.size);
        entries.push(DiffEntry {
            source: from_file.source.to_path_buf(),
            old_size: from_file.size,
            new_size: 0,
            delta,
            old_selectors: from_file.selectors,
            new_selectors: 0,
            diff_type: DiffType::Gone,
        });
        net_change = net_change.saturating_add(delta);
    }

    // stable output regardless of hash order
    entries.sort_by(|a, b| a.source.cmp(&b.source));

    DiffResult {
        entries,
        net_change,
        from_timestamp: from.timestamp,
        to_timestamp: to.timestamp,
    }
}

/// The two newest points of an ascending history, oldest first.
pub fn latest_pair(history: &[Point]) -> Option<(&Point, &Point)> {
    match history {
        [.., from, to] => Some((from, to)),
        _ => None,
    }
}
