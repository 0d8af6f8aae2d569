pub mod json;
pub mod table;

use crate::point::Point;

/// Render the stored history for `rhythm history`.
pub fn render_history(history: &[Point], now_ms: i64, as_json: bool) -> String {
    if as_json {
        json::render(history)
    } else {
        table::render_history(history, now_ms)
    }
}
