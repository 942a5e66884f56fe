//! Certification-gap evaluation.
//!
//! A driver may not start a new shift while any prior duty day remains
//! uncertified. Each detected shift start becomes an anchor; the check runs
//! against a cutoff inside the shift rather than the anchor itself, because
//! certification for the previous day routinely happens between clocking on
//! and first departure.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::event::CertificationRecord;
use crate::segment::ShiftBounds;
use crate::status::DutyStatus;
use crate::timeline::Timeline;

/// Configuration for certification cutoffs.
#[derive(Debug, Clone)]
pub struct CertificationConfig {
    /// Grace period after the shift start, used as the cutoff when the shift
    /// contains no driving.
    /// Default: 3600000 (60 minutes).
    pub cert_window_ms: i64,
}

impl Default for CertificationConfig {
    fn default() -> Self {
        Self {
            cert_window_ms: 3_600_000, // 60 minutes
        }
    }
}

/// Certification verdict for one shift start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificationStatus {
    Qualified,
    Disqualified,
}

/// One verdict row: a shift-start anchor with its certification check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificationVerdict {
    pub shift_start: NaiveDateTime,
    pub verdict: CertificationStatus,
    pub note: String,
}

/// Checks every detected shift start for uncertified prior duty days.
///
/// A prior day needs certification only if it saw ON/DRIVING activity, and
/// a certification counts only when it was signed at or before the cutoff.
#[must_use]
pub fn evaluate_certifications(
    timeline: &Timeline,
    bounds: &[ShiftBounds],
    certifications: &[CertificationRecord],
    config: &CertificationConfig,
) -> Vec<CertificationVerdict> {
    // Days with any duty-bearing activity, measured on the effective-status
    // stream: an ON/DRIVING spell that crosses midnight marks every day it
    // touches, not only the day of its opening event.
    let mut duty_days: BTreeSet<NaiveDate> = BTreeSet::new();
    for segment in timeline.segments() {
        if !segment.status.is_duty() {
            continue;
        }
        let mut day = segment.start.date();
        while day.and_time(NaiveTime::MIN) < segment.end {
            duty_days.insert(day);
            let Some(next) = day.succ_opt() else { break };
            day = next;
        }
    }
    // The final event carries no segment but still stands for activity at
    // that instant.
    let last = timeline.last_event();
    if last.status.is_duty() {
        duty_days.insert(last.timestamp.date());
    }

    // Earliest signature per log day; later re-certifications are harmless.
    let mut earliest_cert: BTreeMap<NaiveDate, NaiveDateTime> = BTreeMap::new();
    for record in certifications {
        earliest_cert
            .entry(record.log_date)
            .and_modify(|at| *at = (*at).min(record.certified_at))
            .or_insert(record.certified_at);
    }

    let mut verdicts = Vec::new();
    let mut seen = BTreeSet::new();
    for (index, shift) in bounds.iter().enumerate() {
        // One row per distinct anchor.
        if !seen.insert(shift.start) {
            continue;
        }

        let cutoff = first_driving_at(timeline, shift).unwrap_or_else(|| {
            shift.start + Duration::milliseconds(config.cert_window_ms)
        });
        let next_start = bounds[index + 1..]
            .iter()
            .map(|next| next.start)
            .find(|start| *start > shift.start);

        let mut missing: Vec<NaiveDate> = duty_days
            .iter()
            .copied()
            .filter(|day| *day < cutoff.date())
            .filter(|day| {
                earliest_cert
                    .get(day)
                    .is_none_or(|certified_at| *certified_at > cutoff)
            })
            .collect();

        // The anchor's own calendar day cannot be certified yet while the
        // cutoff still falls inside the same shift.
        let anchor_day = shift.start.date();
        let exempted = next_start.is_none_or(|next| cutoff < next) && missing.contains(&anchor_day);
        if exempted {
            missing.retain(|day| *day != anchor_day);
        }

        let (verdict, note) = if missing.is_empty() {
            let note = if exempted {
                format!("all prior duty days certified; {anchor_day} exempt mid-shift")
            } else {
                "all prior duty days certified".to_string()
            };
            (CertificationStatus::Qualified, note)
        } else {
            let unit = if missing.len() == 1 { "day" } else { "days" };
            (
                CertificationStatus::Disqualified,
                format!(
                    "missing timely certification for {} {unit}, earliest {}",
                    missing.len(),
                    missing[0]
                ),
            )
        };

        verdicts.push(CertificationVerdict {
            shift_start: shift.start,
            verdict,
            note,
        });
    }

    verdicts
}

/// The first driving event inside the shift, boundaries inclusive.
fn first_driving_at(timeline: &Timeline, shift: &ShiftBounds) -> Option<NaiveDateTime> {
    timeline
        .events()
        .iter()
        .filter(|event| event.timestamp >= shift.start && event.timestamp <= shift.end)
        .find(|event| event.status == DutyStatus::Driving)
        .map(|event| event.timestamp)
}
