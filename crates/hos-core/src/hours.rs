//! Hours aggregation: payable, sleeper, and layover buckets per shift.

use crate::segment::ShiftBounds;
use crate::status::DutyStatus;
use crate::timeline::{self, Timeline};

/// Configuration for hours aggregation and its diagnostics.
#[derive(Debug, Clone)]
pub struct HoursConfig {
    /// Minimum away-from-home OFF duration that counts as layover.
    /// Default: 7200000 (2 hours).
    pub min_layover_ms: i64,

    /// Shifts longer than this wall-clock span draw a "long shift" note.
    /// Default: 64800000 (18 hours).
    pub max_shift_ms: i64,

    /// Unbroken ON/DRIVING runs longer than this draw a note.
    /// Default: 50400000 (14 hours).
    pub max_continuous_on_ms: i64,
}

impl Default for HoursConfig {
    fn default() -> Self {
        Self {
            min_layover_ms: 7_200_000,        // 2 hours
            max_shift_ms: 64_800_000,         // 18 hours
            max_continuous_on_ms: 50_400_000, // 14 hours
        }
    }
}

/// Location predicate separating home-terminal rest from layover.
///
/// When no predicate is supplied, or a rest period has no location, the rest
/// is treated as away from home and counts toward layover.
pub trait NearHome {
    fn is_near_home(&self, location: &str) -> bool;
}

impl<F: Fn(&str) -> bool> NearHome for F {
    fn is_near_home(&self, location: &str) -> bool {
        self(location)
    }
}

/// Aggregated time buckets for one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursBreakdown {
    /// ON and DRIVING time inside the shift.
    pub payable_ms: i64,
    /// Sleeper-berth time inside the shift.
    pub sleeper_ms: i64,
    /// Away-from-home OFF time inside the shift, per qualifying run.
    pub layover_ms: i64,
    /// Diagnostic notes (long shift, continuous duty streak).
    pub notes: Vec<String>,
}

/// Sums the time buckets for the segments inside one shift.
///
/// Payable time is the sum of ON/DRIVING segment durations, never the
/// wall-clock span between the boundaries.
#[must_use]
pub fn aggregate_hours(
    timeline: &Timeline,
    bounds: &ShiftBounds,
    config: &HoursConfig,
    near_home: Option<&dyn NearHome>,
) -> HoursBreakdown {
    let segments = timeline::clip_segments(timeline, bounds.start, bounds.end);

    let mut payable_ms = 0;
    let mut sleeper_ms = 0;
    for segment in &segments {
        match segment.status {
            DutyStatus::OnDuty | DutyStatus::Driving => payable_ms += segment.duration_ms(),
            DutyStatus::Sleeper => sleeper_ms += segment.duration_ms(),
            DutyStatus::Off => {}
        }
    }

    let mut layover_ms = 0;
    for run in timeline::off_runs(&segments) {
        if run.duration_ms() < config.min_layover_ms {
            continue;
        }
        let near = run.location.as_deref().is_some_and(|location| {
            near_home.is_some_and(|predicate| predicate.is_near_home(location))
        });
        if !near {
            layover_ms += run.duration_ms();
        }
    }

    let mut notes = Vec::new();
    let span_ms = (bounds.end - bounds.start).num_milliseconds();
    if span_ms > config.max_shift_ms {
        notes.push(format!("long shift: {}", format_duration(span_ms)));
    }
    if bounds.longest_duty_run_ms > config.max_continuous_on_ms {
        notes.push(format!(
            "continuous on/driving: {}",
            format_duration(bounds.longest_duty_run_ms)
        ));
    }

    HoursBreakdown {
        payable_ms,
        sleeper_ms,
        layover_ms,
        notes,
    }
}

/// Formats milliseconds as a duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m.
#[must_use]
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
