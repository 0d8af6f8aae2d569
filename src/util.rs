use std::time::Duration;

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.1} {}", UNITS[unit])
}

/// Age of a point relative to `now_ms`, rounded down to whole minutes.
/// Points from the future read as "just now".
pub fn format_age(timestamp_ms: i64, now_ms: i64) -> String {
    let minutes = now_ms.saturating_sub(timestamp_ms) / 60_000;
    if minutes <= 0 {
        return String::from("just now");
    }

    let elapsed = Duration::from_secs(minutes.unsigned_abs() * 60);
    format!("{} ago", humantime::format_duration(elapsed))
}
