//! JSON output for the stored history.
//!
//! One summary object per point, for scripting and piping.

use serde::Serialize;

use crate::point::Point;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PointSummary<'a> {
    timestamp: i64,
    readable_date: &'a str,
    files: usize,
    total_size: u64,
    selectors: u64,
}

pub fn render(history: &[Point]) -> String {
    let summaries: Vec<PointSummary<'_>> = history
        .iter()
        .map(|point| PointSummary {
            timestamp: point.timestamp,
            readable_date: &point.readable_date,
            files: point.files.len(),
            total_size: point.total_size(),
            selectors: point.statistics.selectors.iter().map(|s| s.total).sum(),
        })
        .collect();

    serde_json::to_string_pretty(&summaries).unwrap_or_else(|_| String::from("[]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Statistics;
    use chrono::{TimeZone, Utc};

    #[test]
    fn renders_one_summary_per_point() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let statistics = Statistics {
            size: vec![10, 20],
            ..Statistics::default()
        };
        let history = vec![Point::new(&at, Vec::new(), statistics)];

        let value: serde_json::Value = serde_json::from_str(&render(&history)).unwrap();
        assert_eq!(value[0]["totalSize"], 30);
        assert_eq!(value[0]["readableDate"], "2026-10-19T12:00:00+00:00");
    }
}
