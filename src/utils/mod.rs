//! Common utilities and helpers

pub mod logging;
pub mod path;
pub mod time;

/// Format a millisecond duration for display, e.g. `1:02.500` or `1:00:05.000`
pub fn format_duration_ms(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = ms % 1000;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    } else {
        format!("{}:{:02}.{:03}", minutes, seconds, millis)
    }
}
