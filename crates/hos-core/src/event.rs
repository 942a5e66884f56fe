//! Canonical duty events and certification records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::status::DutyStatus;

/// A single canonical duty-status transition.
///
/// Timestamps are wall-clock local time as recorded in the source log; the
/// engine performs no timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyEvent {
    /// When the transition occurred.
    pub timestamp: NaiveDateTime,
    /// The duty status entered at this timestamp.
    pub status: DutyStatus,
    /// Free-text location, when the source row carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A driver's timestamped affirmation that a log day is accurate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationRecord {
    /// The log day being certified.
    pub log_date: NaiveDate,
    /// When the certification was signed.
    pub certified_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn duty_event_serde_roundtrip() {
        let event = DutyEvent {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 12)
                .unwrap()
                .and_hms_opt(6, 10, 0)
                .unwrap(),
            status: DutyStatus::Driving,
            location: Some("Fontana, CA".to_string()),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: DutyEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn missing_location_is_omitted() {
        let event = DutyEvent {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 12)
                .unwrap()
                .and_hms_opt(6, 10, 0)
                .unwrap(),
            status: DutyStatus::Off,
            location: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("location"));
        let parsed: DutyEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.location, None);
    }
}
