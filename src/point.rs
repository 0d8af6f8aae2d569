//! Statistics snapshot ("point") data model.
//!
//! A point is created once per run by the ingestor and never mutated after
//! that. Retention only keeps or drops whole points.

use std::fmt::Display;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub readable_date: String,
    pub files: Vec<FileRecord>,
    pub statistics: Statistics,
}

impl Point {
    pub fn new<Tz>(now: &DateTime<Tz>, files: Vec<FileRecord>, statistics: Statistics) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Point {
            timestamp: now.timestamp_millis(),
            readable_date: now.to_rfc3339_opts(SecondsFormat::Secs, false),
            files,
            statistics,
        }
    }

    pub fn total_size(&self) -> u64 {
        self.statistics.size.iter().fold(0u64, |total, size| total.saturating_add(*size))
    }
}

/// One output artifact and the source file it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub output: PathBuf,
    pub source: PathBuf,
    /// Source directory segments below the project directory.
    pub location: Vec<String>,
}

/// Parallel arrays, index `i` of each belongs to `files[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub size: Vec<u64>,
    pub selectors: Vec<SelectorStats>,
    pub declarations: Vec<DeclarationStats>,
}

impl Statistics {
    pub fn len(&self) -> usize {
        self.size.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn push(&mut self, metrics: FileMetrics) {
        self.size.push(metrics.size);
        self.selectors.push(metrics.selectors);
        self.declarations.push(metrics.declarations);
    }
}

/// Metrics document written by the generator for a single output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    pub size: u64,
    pub selectors: SelectorStats,
    pub declarations: DeclarationStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorStats {
    pub total: u64,
    #[serde(default)]
    pub class: u64,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub pseudo_class: u64,
    #[serde(default)]
    pub pseudo_element: u64,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub specificity: Specificity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specificity {
    pub max: f64,
    pub average: f64,
    #[serde(default)]
    pub graph: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationStats {
    #[serde(default)]
    pub important: Vec<ImportantDeclaration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
