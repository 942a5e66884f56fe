//! Duty statuses and free-text descriptor matching.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical duty statuses from driver logs.
///
/// The derived ordering is only used as a deterministic tie-break when two
/// events share a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DutyStatus {
    /// On duty, not driving.
    OnDuty,
    /// Behind the wheel.
    Driving,
    /// Off duty.
    Off,
    /// Sleeper berth.
    Sleeper,
}

impl DutyStatus {
    /// String representation used in serialized output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnDuty => "on_duty",
            Self::Driving => "driving",
            Self::Off => "off",
            Self::Sleeper => "sleeper",
        }
    }

    /// True for the rest-bearing statuses (off duty and sleeper berth).
    #[must_use]
    pub const fn is_rest(self) -> bool {
        matches!(self, Self::Off | Self::Sleeper)
    }

    /// True for the duty-bearing statuses (on duty and driving).
    #[must_use]
    pub const fn is_duty(self) -> bool {
        !self.is_rest()
    }

    /// Matches a free-text event descriptor against the known status
    /// keywords, case-insensitively.
    ///
    /// Returns `None` when no keyword matches; such rows are dropped by the
    /// normalizer rather than treated as errors.
    #[must_use]
    pub fn from_descriptor(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        if text.contains("sleeper") {
            return Some(Self::Sleeper);
        }
        // The duty phrases go first so "On Duty Not Driving" lands on duty.
        if text.contains("off duty") || text.contains("off-duty") {
            return Some(Self::Off);
        }
        if text.contains("on duty") || text.contains("on-duty") {
            return Some(Self::OnDuty);
        }
        if text.contains("driving") {
            return Some(Self::Driving);
        }
        // "Duty Status - OFF" style rows put the polarity after the label.
        if let Some((_, rest)) = text.split_once("duty status") {
            if rest.contains("off") {
                return Some(Self::Off);
            }
            if rest.contains("on") {
                return Some(Self::OnDuty);
            }
        }
        // A bare "off" is unambiguous; a bare "on" matches too many words.
        if text.contains("off") {
            return Some(Self::Off);
        }
        None
    }
}

impl fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DutyStatus {
    type Err = UnknownDutyStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_duty" => Ok(Self::OnDuty),
            "driving" => Ok(Self::Driving),
            "off" => Ok(Self::Off),
            "sleeper" => Ok(Self::Sleeper),
            other => Err(UnknownDutyStatus(other.to_string())),
        }
    }
}

impl Serialize for DutyStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DutyStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned when parsing an unknown duty status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDutyStatus(String);

impl fmt::Display for UnknownDutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown duty status: {}", self.0)
    }
}

impl std::error::Error for UnknownDutyStatus {}
