//! Terminal table rendering for the history and for point diffs.

use chrono::DateTime;

use crate::point::Point;
use crate::store::diff::{DiffResult, DiffType};
use crate::util::{format_age, format_bytes};

fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn render_history(history: &[Point], now_ms: i64) -> String {
    if history.is_empty() {
        return String::from("No history stored yet. Run 'rhythm run' to capture a point.\n");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<20} {:<18} {:>6} {:>12}\n",
        "Date (UTC)", "Age", "Files", "Total"
    ));
    output.push_str(&"-".repeat(59));
    output.push('\n');

    // newest first
    for point in history.iter().rev() {
        output.push_str(&format!(
            "{:<20} {:<18} {:>6} {:>12}\n",
            format_timestamp(point.timestamp),
            truncate(&format_age(point.timestamp, now_ms), 18),
            point.files.len(),
            format_bytes(point.total_size())
        ));
    }

    output.push_str(&format!("\n{} points\n", history.len()));
    output
}

pub fn render_diff(result: &DiffResult) -> String {
    let mut output = String::new();

    output.push_str("\nComparing points:\n");
    output.push_str(&format!("  From: {}\n", format_timestamp(result.from_timestamp)));
    output.push_str(&format!("  To:   {}\n\n", format_timestamp(result.to_timestamp)));

    if result.entries.is_empty() {
        output.push_str("No changes detected.\n");
        return output;
    }

    for entry in &result.entries {
        let name = entry.source.display();
        let line = match entry.diff_type {
            DiffType::Grew => format!(
                "  [+] {name} grew {} -> {} (+{})\n",
                format_bytes(entry.old_size),
                format_bytes(entry.new_size),
                format_bytes(entry.delta.unsigned_abs())
            ),
            DiffType::Shrank => format!(
                "  [-] {name} shrank {} -> {} (-{})\n",
                format_bytes(entry.old_size),
                format_bytes(entry.new_size),
                format_bytes(entry.delta.unsigned_abs())
            ),
            DiffType::New => format!("  [new] {name} appeared ({})\n", format_bytes(entry.new_size)),
            DiffType::Gone => format!("  [gone] {name} removed (was {})\n", format_bytes(entry.old_size)),
        };
        output.push_str(&line);
    }

    if result.net_change >= 0 {
        output.push_str(&format!(
            "\nNet change: +{}\n",
            format_bytes(result.net_change.unsigned_abs())
        ));
    } else {
        output.push_str(&format!(
            "\nNet change: -{}\n",
            format_bytes(result.net_change.unsigned_abs())
        ));
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Statistics;
    use crate::store::diff::DiffEntry;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    #[test]
    fn empty_history_has_hint() {
        assert!(render_history(&[], 0).contains("rhythm run"));
    }

    #[test]
    fn history_lists_newest_first() {
        let old = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let new = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let history = vec![
            Point::new(&old, Vec::new(), Statistics::default()),
            Point::new(&new, Vec::new(), Statistics::default()),
        ];

        let output = render_history(&history, new.timestamp_millis());
        let newer = output.find("2026-10-19 09:00:00").unwrap();
        let older = output.find("2026-10-18 09:00:00").unwrap();
        assert!(newer < older);
        assert!(output.contains("1day ago"));
        assert!(output.contains("2 points"));
    }

    #[test]
    fn diff_lists_changes_and_net() {
        let result = DiffResult {
            entries: vec![DiffEntry {
                source: PathBuf::from("src/main.css"),
                old_size: 1024,
                new_size: 2048,
                delta: 1024,
                old_selectors: 1,
                new_selectors: 2,
                diff_type: DiffType::Grew,
            }],
            net_change: 1024,
            from_timestamp: 0,
            to_timestamp: 0,
        };

        let output = render_diff(&result);
        assert!(output.contains("[+] src/main.css grew 1.0 KB -> 2.0 KB (+1.0 KB)"));
        assert!(output.contains("Net change: +1.0 KB"));
    }

    #[test]
    fn truncates_long_values() {
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("abc", 6), "abc");
    }
}
