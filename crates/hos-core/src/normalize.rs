//! Raw record normalization.
//!
//! Source rows arrive as loosely structured JSONL extracted from log
//! documents. Rows that cannot be normalized (no usable timestamp, no
//! recognizable status keyword, no driver) are dropped and counted, never
//! raised as errors. Only a batch that cannot be decoded at all is a hard
//! failure.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::event::{CertificationRecord, DutyEvent};
use crate::status::DutyStatus;
use crate::types::{DriverId, ValidationError};

/// One raw duty row as extracted from a source document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDutyRecord {
    /// Canonical driver identifier.
    pub driver: Option<String>,
    /// Free-text event descriptor, for example "Duty Status - Driving".
    #[serde(alias = "event_description")]
    pub event: Option<String>,
    /// Event date, "YYYY-MM-DD" or "MM/DD/YYYY".
    #[serde(alias = "start_date")]
    pub date: Option<String>,
    /// Event time, 24-hour "HH:MM[:SS]" or "H:MM AM/PM".
    #[serde(alias = "start_time")]
    pub time: Option<String>,
    /// Free-text location.
    pub location: Option<String>,
}

/// One raw certification row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCertRecord {
    pub driver: Option<String>,
    /// Free-text descriptor; when present, rows not mentioning
    /// certification are dropped.
    #[serde(alias = "event_description")]
    pub event: Option<String>,
    /// The log day being certified.
    pub log_date: Option<String>,
    /// When the certification was signed.
    pub certified_at: Option<String>,
}

/// Normalized duty events grouped per driver.
#[derive(Debug, Clone, Default)]
pub struct DutyBatch {
    pub events: BTreeMap<DriverId, Vec<DutyEvent>>,
    /// Rows excluded during normalization.
    pub dropped: usize,
}

impl DutyBatch {
    /// Folds another batch into this one. Cross-batch duplicates are kept
    /// here; timeline construction collapses them.
    pub fn merge(&mut self, other: Self) {
        for (driver, mut events) in other.events {
            self.events.entry(driver).or_default().append(&mut events);
        }
        self.dropped += other.dropped;
    }
}

/// Normalized certification records grouped per driver.
#[derive(Debug, Clone, Default)]
pub struct CertBatch {
    pub certifications: BTreeMap<DriverId, Vec<CertificationRecord>>,
    /// Rows excluded during normalization.
    pub dropped: usize,
}

impl CertBatch {
    pub fn merge(&mut self, other: Self) {
        for (driver, mut records) in other.certifications {
            self.certifications
                .entry(driver)
                .or_default()
                .append(&mut records);
        }
        self.dropped += other.dropped;
    }
}

/// Decodes a JSONL duty batch. Blank lines are skipped; a line that is not
/// valid JSON fails the whole batch.
pub fn decode_duty_batch(input: &str) -> Result<Vec<RawDutyRecord>, ValidationError> {
    decode_lines(input)
}

/// Decodes a JSONL certification batch.
pub fn decode_certification_batch(input: &str) -> Result<Vec<RawCertRecord>, ValidationError> {
    decode_lines(input)
}

fn decode_lines<T: for<'de> Deserialize<'de>>(input: &str) -> Result<Vec<T>, ValidationError> {
    let mut records = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record =
            serde_json::from_str(line).map_err(|err| ValidationError::MalformedBatch {
                line: index + 1,
                message: err.to_string(),
            })?;
        records.push(record);
    }
    Ok(records)
}

/// Converts one raw duty row, or `None` when it cannot be normalized.
#[must_use]
pub fn normalize_duty(record: &RawDutyRecord) -> Option<(DriverId, DutyEvent)> {
    let driver = DriverId::new(record.driver.as_deref()?.trim()).ok()?;
    let status = DutyStatus::from_descriptor(record.event.as_deref()?)?;
    let date = parse_date(record.date.as_deref()?)?;
    let time = parse_time(record.time.as_deref()?)?;
    let location = record
        .location
        .as_deref()
        .map(str::trim)
        .filter(|location| !location.is_empty())
        .map(str::to_string);
    Some((
        driver,
        DutyEvent {
            timestamp: NaiveDateTime::new(date, time),
            status,
            location,
        },
    ))
}

/// Converts one raw certification row, or `None` when it cannot be
/// normalized.
#[must_use]
pub fn normalize_certification(record: &RawCertRecord) -> Option<(DriverId, CertificationRecord)> {
    let driver = DriverId::new(record.driver.as_deref()?.trim()).ok()?;
    if let Some(descriptor) = record.event.as_deref() {
        if !descriptor.to_lowercase().contains("certif") {
            return None;
        }
    }
    let log_date = parse_date(record.log_date.as_deref()?)?;
    let certified_at = parse_datetime(record.certified_at.as_deref()?)?;
    Some((
        driver,
        CertificationRecord {
            log_date,
            certified_at,
        },
    ))
}

/// Normalizes a decoded duty batch, grouping events per driver.
#[must_use]
pub fn normalize_duty_batch(records: &[RawDutyRecord]) -> DutyBatch {
    let mut batch = DutyBatch::default();
    for record in records {
        match normalize_duty(record) {
            Some((driver, event)) => batch.events.entry(driver).or_default().push(event),
            None => {
                tracing::debug!(?record, "dropping duty row");
                batch.dropped += 1;
            }
        }
    }
    if batch.dropped > 0 {
        tracing::warn!(
            dropped = batch.dropped,
            "excluded duty rows without a usable driver, timestamp, or status"
        );
    }
    batch
}

/// Normalizes a decoded certification batch, grouping records per driver.
#[must_use]
pub fn normalize_certification_batch(records: &[RawCertRecord]) -> CertBatch {
    let mut batch = CertBatch::default();
    for record in records {
        match normalize_certification(record) {
            Some((driver, cert)) => {
                batch.certifications.entry(driver).or_default().push(cert);
            }
            None => {
                tracing::debug!(?record, "dropping certification row");
                batch.dropped += 1;
            }
        }
    }
    if batch.dropped > 0 {
        tracing::warn!(
            dropped = batch.dropped,
            "excluded certification rows without usable fields"
        );
    }
    batch
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    ["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%m/%d/%Y %I:%M %p",
        "%Y-%m-%d %I:%M %p",
    ]
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}
