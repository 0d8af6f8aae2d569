//! JSON document storage.
//!
//! Two documents, each named `data.json` inside its configured folder:
//! - overview: the point captured by the latest run, serialized directly
//! - history: `{ "history": [...] }`, points ascending by timestamp
//!
//! Writes go to a sibling temp file first and are renamed over the document.
//! There is no locking; one writer at a time.

pub mod diff;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point::Point;

pub const DOCUMENT_NAME: &str = "data.json";

#[derive(Serialize)]
struct HistoryDocumentRef<'a> {
    history: &'a [Point],
}

#[derive(Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    history: Vec<Point>,
}

pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(folder: impl AsRef<Path>) -> Self {
        HistoryStore {
            path: folder.as_ref().join(DOCUMENT_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored history, or an empty one if no document exists yet.
    pub fn load(&self) -> Result<Vec<Point>> {
        let document: Option<HistoryDocument> = read_json(&self.path)?;
        Ok(document.map(|d| d.history).unwrap_or_default())
    }

    pub fn save(&self, history: &[Point]) -> Result<()> {
        write_json(&self.path, &HistoryDocumentRef { history })
    }
}

pub struct OverviewStore {
    path: PathBuf,
}

impl OverviewStore {
    pub fn new(folder: impl AsRef<Path>) -> Self {
        OverviewStore {
            path: folder.as_ref().join(DOCUMENT_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Point>> {
        read_json(&self.path)
    }

    pub fn save(&self, point: &Point) -> Result<()> {
        write_json(&self.path, point)
    }
}

/// `Ok(None)` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(format!("failed to read {}", path.display()), e)),
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| Error::io(format!("failed to create {}", parent.display()), e))?;
    }

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json)
        .map_err(|e| Error::io(format!("failed to write {}", staging.display()), e))?;
    fs::rename(&staging, path)
        .map_err(|e| Error::io(format!("failed to replace {}", path.display()), e))?;

    Ok(())
}
