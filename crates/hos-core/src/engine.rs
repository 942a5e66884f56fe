//! Per-driver report engine.
//!
//! Drivers never share state, so the engine fans out across drivers with
//! rayon and collects results back in driver order. The engine is a pure
//! function of its inputs: same events in, same reports out.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;

use crate::certification::{CertificationConfig, CertificationVerdict, evaluate_certifications};
use crate::event::{CertificationRecord, DutyEvent};
use crate::hours::{HoursBreakdown, HoursConfig, NearHome, aggregate_hours};
use crate::meal::{MealConfig, MealOutcome, evaluate_meal_breaks};
use crate::segment::{SegmenterConfig, detect_shift_bounds};
use crate::timeline::Timeline;
use crate::types::DriverId;

/// Thresholds for every pipeline stage.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub segmenter: SegmenterConfig,
    pub hours: HoursConfig,
    pub meal: MealConfig,
    pub certification: CertificationConfig,
}

/// One finalized shift in the hours/compliance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shift {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub payable_minutes: i64,
    pub sleeper_minutes: i64,
    pub layover_minutes: i64,
    pub meal: MealOutcome,
    /// Boundary notes followed by hours diagnostics.
    pub notes: Vec<String>,
    /// Route label, filled by the caller when a route index is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

/// Hours/compliance report for one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverReport {
    pub driver: DriverId,
    pub shifts: Vec<Shift>,
}

/// Certification-gap report for one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverCertification {
    pub driver: DriverId,
    pub verdicts: Vec<CertificationVerdict>,
}

/// Builds the hours/compliance report for every driver with at least one
/// usable event. Drivers with none are skipped.
#[must_use]
pub fn compute_hours_reports(
    events: BTreeMap<DriverId, Vec<DutyEvent>>,
    config: &EngineConfig,
    near_home: Option<&(dyn NearHome + Sync)>,
) -> Vec<DriverReport> {
    let drivers: Vec<_> = events.into_iter().collect();
    drivers
        .into_par_iter()
        .filter_map(|(driver, events)| {
            let timeline = Timeline::from_events(events)?;
            let bounds = detect_shift_bounds(&timeline, &config.segmenter);
            tracing::debug!(driver = %driver, shifts = bounds.len(), "segmented timeline");
            let shifts = bounds
                .iter()
                .map(|bound| {
                    let near_home = near_home.map(|predicate| predicate as &dyn NearHome);
                    let HoursBreakdown {
                        payable_ms,
                        sleeper_ms,
                        layover_ms,
                        notes: hour_notes,
                    } = aggregate_hours(&timeline, bound, &config.hours, near_home);
                    let meal = evaluate_meal_breaks(&timeline, bound, payable_ms, &config.meal);
                    let mut notes = bound.notes.clone();
                    notes.extend(hour_notes);
                    Shift {
                        start: bound.start,
                        end: bound.end,
                        payable_minutes: payable_ms / 60_000,
                        sleeper_minutes: sleeper_ms / 60_000,
                        layover_minutes: layover_ms / 60_000,
                        meal,
                        notes,
                        route: None,
                    }
                })
                .collect();
            Some(DriverReport { driver, shifts })
        })
        .collect()
}

/// Builds the certification-gap report for every driver with at least one
/// usable event.
#[must_use]
pub fn compute_certification_reports(
    events: BTreeMap<DriverId, Vec<DutyEvent>>,
    certifications: &BTreeMap<DriverId, Vec<CertificationRecord>>,
    config: &EngineConfig,
) -> Vec<DriverCertification> {
    let drivers: Vec<_> = events.into_iter().collect();
    drivers
        .into_par_iter()
        .filter_map(|(driver, events)| {
            let timeline = Timeline::from_events(events)?;
            let bounds = detect_shift_bounds(&timeline, &config.segmenter);
            let records = certifications.get(&driver).map_or(&[][..], Vec::as_slice);
            let verdicts =
                evaluate_certifications(&timeline, &bounds, records, &config.certification);
            Some(DriverCertification { driver, verdicts })
        })
        .collect()
}
