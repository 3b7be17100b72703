//! Port for the append-only click log written on logout.
//!
//! Each logout appends one [`ClickLogEntry`] rendered as
//! `<timestamp>: <counter>\n`. The log is telemetry: a failed write is reported
//! as a warning and never blocks the logout.

use std::path::PathBuf;

use thiserror::Error;

use crate::{ClickCount, Timestamp};

/// One logout record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickLogEntry {
    /// When the logout happened.
    pub timestamp: Timestamp,
    /// Accepted "Generate Article" submissions during the login.
    pub counter: ClickCount,
}

impl ClickLogEntry {
    /// Renders the entry as a single log line, newline included.
    pub fn to_line(&self) -> String {
        format!("{}: {}\n", self.timestamp, self.counter)
    }
}

/// A click log write failed.
#[derive(Debug, Error)]
#[error("could not append to click log '{}': {source}", .path.display())]
pub struct ClickLogError {
    /// File being written.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

/// Append-only sink for [`ClickLogEntry`] records.
///
/// Implementations must never rewrite or truncate existing entries, and each
/// entry must land as one atomic append so concurrent writers do not
/// interleave lines.
pub trait ClickLog: Send + Sync {
    /// Appends one entry.
    fn append(&self, entry: &ClickLogEntry) -> Result<(), ClickLogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn entry_renders_as_timestamp_colon_counter() {
        let entry = ClickLogEntry {
            timestamp: Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            counter: ClickCount::new(3),
        };
        assert_eq!(entry.to_line(), "2024-05-01T12:00:00+00:00: 3\n");
    }
}
