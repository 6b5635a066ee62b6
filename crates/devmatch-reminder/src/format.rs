// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable dates and durations for reminder emails.

use chrono::{DateTime, TimeDelta, Utc};

/// `March 4, 2026`
pub fn trial_end_date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

/// `1 day and 12 hours`, `5 hours`, `less than an hour`.
pub fn time_left(remaining: TimeDelta) -> String {
    let hours = remaining.num_hours().max(0);
    let (days, hours) = (hours / 24, hours % 24);

    match (days, hours) {
        (0, 0) => "less than an hour".to_string(),
        (0, h) => plural(h, "hour"),
        (d, 0) => plural(d, "day"),
        (d, h) => format!("{} and {}", plural(d, "day"), plural(h, "hour")),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
