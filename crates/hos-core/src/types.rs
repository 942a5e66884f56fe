//! Core identifier and validation types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for structurally invalid input.
///
/// Everything else (unparseable rows, empty timelines, drivers with no
/// qualifying rest) degrades to dropped rows or diagnostic notes instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A record batch could not be decoded at all.
    #[error("malformed record batch at line {line}: {message}")]
    MalformedBatch { line: usize, message: String },
}

/// A validated driver identifier.
///
/// Driver IDs must be non-empty strings. They arrive already canonicalized;
/// no identity resolution happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DriverId(String);

impl DriverId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "driver ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DriverId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DriverId> for String {
    fn from(id: DriverId) -> Self {
        id.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DriverId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_id_rejects_empty() {
        assert!(DriverId::new("").is_err());
        assert!(DriverId::new("D-102").is_ok());
    }

    #[test]
    fn driver_id_serde_roundtrip() {
        let id = DriverId::new("D-102").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"D-102\"");
        let parsed: DriverId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn driver_id_serde_rejects_empty() {
        let result: Result<DriverId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn driver_id_as_ref() {
        let id = DriverId::new("D-7").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "D-7");
    }

    #[test]
    fn malformed_batch_message_names_line() {
        let err = ValidationError::MalformedBatch {
            line: 3,
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed record batch at line 3: expected value"
        );
    }
}
