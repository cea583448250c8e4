//! Human-readable timestamps for the device list

use chrono::{DateTime, Utc};

/// Format a past timestamp as a coarse "time ago" string.
///
/// Anything under a minute reads "just now"; future timestamps (clock skew)
/// are treated the same way.
pub fn ago(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - when).num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{days}d ago")
    } else if hours > 0 {
        format!("{hours}h ago")
    } else if mins > 0 {
        format!("{mins}m ago")
    } else {
        "just now".to_string()
    }
}
