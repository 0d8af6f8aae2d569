//! The `stats.store` task.
//!
//! ingest -> overview -> load history -> append -> retain -> save history.
//! Every step short-circuits on error. Nothing is rolled back, so a failure
//! after the overview write leaves the history one run behind.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use tracing::{info, info_span};

use crate::config::Config;
use crate::error::Result;
use crate::ingest;
use crate::point::Point;
use crate::retention;
use crate::store::{HistoryStore, OverviewStore};

pub const TASK: &str = "stats.store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub total_size: u64,
    pub removed: usize,
    pub retained: usize,
}

pub fn run<Tz>(config: &Config, now: &DateTime<Tz>) -> Result<RunSummary>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let _span = info_span!("pipeline", task = TASK).entered();

    let point = ingest::ingest(&config.generator, now)?;
    let files = point.files.len();
    let total_size = point.total_size();

    OverviewStore::new(&config.storage.overview).save(&point)?;

    let store = HistoryStore::new(&config.storage.history);
    let mut history = store.load()?;
    retention::append(&mut history, point);

    let (history, removed) = apply_retention(history, config, now);
    store.save(&history)?;

    info!(files, "succeeded with an output of {files} files");

    Ok(RunSummary {
        files,
        total_size,
        removed,
        retained: history.len(),
    })
}

/// Re-apply retention to the stored history without ingesting a new point.
pub fn prune<Tz: TimeZone>(config: &Config, now: &DateTime<Tz>, dry_run: bool) -> Result<RunSummary> {
    let _span = info_span!("pipeline", task = TASK).entered();

    let store = HistoryStore::new(&config.storage.history);
    let history = store.load()?;
    let (history, removed) = apply_retention(history, config, now);

    if !dry_run && removed > 0 {
        store.save(&history)?;
    }

    Ok(RunSummary {
        files: 0,
        total_size: 0,
        removed,
        retained: history.len(),
    })
}

fn apply_retention<Tz: TimeZone>(
    history: Vec<Point>,
    config: &Config,
    now: &DateTime<Tz>,
) -> (Vec<Point>, usize) {
    let before = history.len();
    let history = retention::retain(history, &config.storage.limits, now);
    let removed = before - history.len();

    if removed > 0 {
        info!(removed, "history rhythm applied: removed {removed} history points");
    }

    (history, removed)
}
