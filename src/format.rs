// Shared formatting helpers for CLI output.

use chrono::{Local, TimeZone};

/// Format a millisecond timestamp as local "YYYY-MM-DD HH:MM:SS"
pub fn local_date_from_timestamp(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// "1 record", "2 records"
pub fn format_record_count(count: usize) -> String {
    if count == 1 {
        "1 record".to_string()
    } else {
        format!("{} records", count)
    }
}
