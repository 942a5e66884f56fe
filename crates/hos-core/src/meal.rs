//! Meal-break compliance evaluation.
//!
//! Break deadlines are measured in accumulated ON/DRIVING time inside the
//! shift, not wall-clock time from the shift start; early rest pushes the
//! deadline instant later into the day.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::hours::format_duration;
use crate::segment::ShiftBounds;
use crate::timeline::{self, OffRun, StatusSegment, Timeline};

/// Configuration for meal-break requirements and deadlines.
#[derive(Debug, Clone)]
pub struct MealConfig {
    /// Payable time at which a first break becomes required.
    /// Default: 21600000 (6 hours).
    pub required_after_payable_ms: i64,

    /// Payable time beyond which a second break is required.
    /// Default: 43200000 (12 hours).
    pub second_after_payable_ms: i64,

    /// Accumulated on-duty mark for the first break deadline.
    /// Default: 18000000 (5 hours).
    pub first_deadline_on_duty_ms: i64,

    /// Accumulated on-duty mark for the second break deadline.
    /// Default: 36000000 (10 hours).
    pub second_deadline_on_duty_ms: i64,

    /// Minimum OFF duration that counts as a meal break.
    /// Default: 1800000 (30 minutes).
    pub min_break_ms: i64,
}

impl Default for MealConfig {
    fn default() -> Self {
        Self {
            required_after_payable_ms: 21_600_000, // 6 hours
            second_after_payable_ms: 43_200_000,   // 12 hours
            first_deadline_on_duty_ms: 18_000_000, // 5 hours
            second_deadline_on_duty_ms: 36_000_000, // 10 hours
            min_break_ms: 1_800_000,               // 30 minutes
        }
    }
}

/// Meal-break verdict for one shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealVerdict {
    Compliant,
    Violation,
}

/// Meal-break outcome with its human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealOutcome {
    pub verdict: MealVerdict,
    pub note: String,
}

impl MealOutcome {
    fn compliant(note: impl Into<String>) -> Self {
        Self {
            verdict: MealVerdict::Compliant,
            note: note.into(),
        }
    }

    fn violation(note: impl Into<String>) -> Self {
        Self {
            verdict: MealVerdict::Violation,
            note: note.into(),
        }
    }
}

/// Evaluates meal-break compliance for one shift.
///
/// `payable_ms` is the shift's payable total as computed by the hours
/// aggregator. The first reportable failure wins; a shift missing both
/// breaks reports only the first.
#[must_use]
pub fn evaluate_meal_breaks(
    timeline: &Timeline,
    bounds: &ShiftBounds,
    payable_ms: i64,
    config: &MealConfig,
) -> MealOutcome {
    if payable_ms < config.required_after_payable_ms {
        return MealOutcome::compliant("no break required");
    }

    let segments = timeline::clip_segments(timeline, bounds.start, bounds.end);
    let breaks: Vec<OffRun> = timeline::off_runs(&segments)
        .into_iter()
        .filter(|run| run.duration_ms() >= config.min_break_ms)
        .collect();

    let Some(first_deadline) = on_duty_deadline(&segments, config.first_deadline_on_duty_ms)
    else {
        // Payable time at or past the requirement always crosses the mark.
        return MealOutcome::compliant("no break required");
    };
    let second_deadline = if payable_ms > config.second_after_payable_ms {
        on_duty_deadline(&segments, config.second_deadline_on_duty_ms)
    } else {
        None
    };

    let Some(first_break) = breaks.iter().find(|run| run.start <= first_deadline) else {
        let note = breaks.first().map_or_else(
            || "no qualifying break at all".to_string(),
            |run| {
                format!(
                    "late break at {}, exceeds deadline {}",
                    format_timestamp(run.start),
                    format_timestamp(first_deadline)
                )
            },
        );
        return MealOutcome::violation(note);
    };

    let mut note = format!(
        "1st break at {}, {}",
        format_timestamp(first_break.start),
        format_duration(first_break.duration_ms())
    );

    if let Some(second_deadline) = second_deadline {
        let later: Vec<&OffRun> = breaks
            .iter()
            .filter(|run| run.start > first_break.start)
            .collect();
        let Some(second_break) = later.iter().find(|run| run.start <= second_deadline) else {
            let note = later.first().map_or_else(
                || "no second qualifying break at all".to_string(),
                |run| {
                    format!(
                        "late second break at {}, exceeds deadline {}",
                        format_timestamp(run.start),
                        format_timestamp(second_deadline)
                    )
                },
            );
            return MealOutcome::violation(note);
        };
        note.push_str(&format!(
            "; 2nd break at {}, {}",
            format_timestamp(second_break.start),
            format_duration(second_break.duration_ms())
        ));
    }

    MealOutcome::compliant(note)
}

/// The instant at which accumulated ON/DRIVING time first reaches
/// `target_ms`, or `None` when the shift never gets there.
fn on_duty_deadline(segments: &[StatusSegment], target_ms: i64) -> Option<NaiveDateTime> {
    let mut accumulated = 0;
    for segment in segments {
        if !segment.status.is_duty() {
            continue;
        }
        let duration = segment.duration_ms();
        if accumulated + duration >= target_ms {
            return Some(segment.start + Duration::milliseconds(target_ms - accumulated));
        }
        accumulated += duration;
    }
    None
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::event::DutyEvent;
    use crate::segment::ShiftClosure;
    use crate::status::DutyStatus;

    use super::*;

    fn ts(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn event(hour: u32, minute: u32, status: DutyStatus) -> DutyEvent {
        DutyEvent {
            timestamp: ts(hour, minute),
            status,
            location: None,
        }
    }

    fn shift(start: NaiveDateTime, end: NaiveDateTime) -> ShiftBounds {
        ShiftBounds {
            start,
            end,
            closure: ShiftClosure::Rest,
            longest_duty_run_ms: 0,
            notes: Vec::new(),
        }
    }

    fn payable_ms(timeline: &Timeline, bounds: &ShiftBounds) -> i64 {
        crate::hours::aggregate_hours(timeline, bounds, &crate::hours::HoursConfig::default(), None)
            .payable_ms
    }

    fn evaluate(events: Vec<DutyEvent>, start: NaiveDateTime, end: NaiveDateTime) -> MealOutcome {
        let timeline = Timeline::from_events(events).unwrap();
        let bounds = shift(start, end);
        let payable = payable_ms(&timeline, &bounds);
        evaluate_meal_breaks(&timeline, &bounds, payable, &MealConfig::default())
    }

    #[test]
    fn short_shift_requires_no_break() {
        let outcome = evaluate(
            vec![
                event(8, 0, DutyStatus::OnDuty),
                event(13, 0, DutyStatus::Off),
            ],
            ts(8, 0),
            ts(13, 0),
        );
        assert_eq!(outcome.verdict, MealVerdict::Compliant);
        assert_eq!(outcome.note, "no break required");
    }

    #[test]
    fn break_before_the_on_duty_deadline_is_compliant() {
        // 35m OFF after 4h of duty: well before the 5h mark.
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(10, 0, DutyStatus::Off),
                event(10, 35, DutyStatus::OnDuty),
                event(13, 35, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(13, 35),
        );
        assert_eq!(outcome.verdict, MealVerdict::Compliant);
        assert_eq!(outcome.note, "1st break at 2024-03-01 10:00, 35m");
    }

    #[test]
    fn break_after_the_on_duty_deadline_is_a_violation() {
        // The same 35m break taken after 6h of duty misses the 5h mark.
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(12, 0, DutyStatus::Off),
                event(12, 35, DutyStatus::OnDuty),
                event(13, 35, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(13, 35),
        );
        assert_eq!(outcome.verdict, MealVerdict::Violation);
        assert_eq!(
            outcome.note,
            "late break at 2024-03-01 12:00, exceeds deadline 2024-03-01 11:00"
        );
    }

    #[test]
    fn no_qualifying_break_at_all() {
        // Seven hours straight through, with one OFF gap too short to count.
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(9, 0, DutyStatus::Off),
                event(9, 20, DutyStatus::OnDuty),
                event(13, 20, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(13, 20),
        );
        assert_eq!(outcome.verdict, MealVerdict::Violation);
        assert_eq!(outcome.note, "no qualifying break at all");
    }

    #[test]
    fn deadline_is_measured_in_on_duty_time_not_wall_clock() {
        // 2h45m of duty before the break; wall clock says the 5h mark is
        // 11:00, but the short 08:00 rest pushes it to 12:00.
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(8, 0, DutyStatus::Off),
                event(8, 25, DutyStatus::OnDuty),
                event(11, 10, DutyStatus::Off),
                event(11, 45, DutyStatus::OnDuty),
                event(18, 0, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(18, 0),
        );
        assert_eq!(outcome.verdict, MealVerdict::Compliant);
        assert!(outcome.note.starts_with("1st break at 2024-03-01 11:10"));
    }

    #[test]
    fn break_starting_exactly_at_the_deadline_qualifies() {
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(11, 0, DutyStatus::Off),
                event(11, 40, DutyStatus::OnDuty),
                event(13, 0, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(13, 0),
        );
        assert_eq!(outcome.verdict, MealVerdict::Compliant);
        assert_eq!(outcome.note, "1st break at 2024-03-01 11:00, 40m");
    }

    #[test]
    fn second_break_required_past_twelve_payable_hours() {
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(10, 0, DutyStatus::Off),
                event(10, 40, DutyStatus::OnDuty),
                event(16, 40, DutyStatus::Off),
                event(17, 20, DutyStatus::OnDuty),
                event(20, 20, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(20, 20),
        );
        // 13h payable; the second break starts exactly at the 10h on-duty
        // mark and still qualifies.
        assert_eq!(outcome.verdict, MealVerdict::Compliant);
        assert_eq!(
            outcome.note,
            "1st break at 2024-03-01 10:00, 40m; 2nd break at 2024-03-01 16:40, 40m"
        );
    }

    #[test]
    fn late_second_break_is_a_violation() {
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(10, 0, DutyStatus::Off),
                event(10, 40, DutyStatus::OnDuty),
                event(17, 0, DutyStatus::Off),
                event(17, 40, DutyStatus::OnDuty),
                event(20, 0, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(20, 0),
        );
        // 12h40m payable; the 10h on-duty mark lands at 16:40 but the second
        // break only starts at 17:00.
        assert_eq!(outcome.verdict, MealVerdict::Violation);
        assert_eq!(
            outcome.note,
            "late second break at 2024-03-01 17:00, exceeds deadline 2024-03-01 16:40"
        );
    }

    #[test]
    fn missing_second_break_entirely() {
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(10, 0, DutyStatus::Off),
                event(10, 40, DutyStatus::OnDuty),
                event(23, 40, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(23, 40),
        );
        // 17h payable with only the first break taken.
        assert_eq!(outcome.verdict, MealVerdict::Violation);
        assert_eq!(outcome.note, "no second qualifying break at all");
    }

    #[test]
    fn exactly_twelve_payable_hours_needs_only_one_break() {
        let outcome = evaluate(
            vec![
                event(6, 0, DutyStatus::OnDuty),
                event(10, 0, DutyStatus::Off),
                event(10, 40, DutyStatus::OnDuty),
                event(18, 40, DutyStatus::Off),
            ],
            ts(6, 0),
            ts(18, 40),
        );
        // 12h payable is not "more than" 12h, so no second break is due.
        assert_eq!(outcome.verdict, MealVerdict::Compliant);
        assert_eq!(outcome.note, "1st break at 2024-03-01 10:00, 40m");
    }
}
