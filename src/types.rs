//! Core types for the reminder server.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Task identifier. Assigned monotonically, never reused within a process run.
pub type TaskId = u64;

/// A reminder task as persisted in the task file.
///
/// Field names match the on-disk JSON format; `date` and `time` keep the
/// client-supplied strings and are re-parsed whenever the due instant is
/// needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    /// Due date, `YYYY-MM-DD`.
    pub date: String,
    /// Due time of day, 24-hour `HH:MM`.
    pub time: String,
    /// Delivery target. Opaque to the server.
    pub phone: String,
    pub sent: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
    /// Last delivery failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// Parse the due instant from the stored date and time strings.
    pub fn due(&self) -> Result<NaiveDateTime, chrono::ParseError> {
        parse_due(&self.date, &self.time)
    }

    /// Whether `other` carries the same user-editable fields as this record.
    /// Used to detect an intervening EDIT between a scheduler snapshot and
    /// its outcome write.
    pub fn same_revision(&self, other: &Task) -> bool {
        self.description == other.description
            && self.date == other.date
            && self.time == other.time
            && self.phone == other.phone
    }
}

/// Parse a `YYYY-MM-DD` date plus 24-hour `HH:MM` time into a naive local
/// datetime. No timezone handling beyond local wall-clock.
pub fn parse_due(date: &str, time: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")?;
    Ok(date.and_time(time))
}

/// Current local wall-clock time as an ISO-8601 string. Informational
/// timestamps only (`created_at`, `updated_at`, `sent_at`).
pub fn now_iso() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_due_accepts_valid_date_time() {
        let due = parse_due("2025-01-01", "09:00").unwrap();
        assert_eq!(due.format("%Y-%m-%d %H:%M").to_string(), "2025-01-01 09:00");
    }

    #[test]
    fn parse_due_trims_whitespace() {
        assert!(parse_due(" 2025-01-01 ", " 09:00 ").is_ok());
    }

    #[test]
    fn parse_due_rejects_bad_calendar_dates() {
        assert!(parse_due("2025-02-30", "09:00").is_err());
        assert!(parse_due("2025-01-01", "25:00").is_err());
        assert!(parse_due("01/01/2025", "09:00").is_err());
    }
}
