//! Per-driver timeline construction.
//!
//! A timeline is the sorted, de-duplicated event stream for one driver. Every
//! downstream stage reads it through pairwise status segments: each event's
//! status holds from its own timestamp until the next event (pure forward
//! fill, no midnight splitting).

use chrono::NaiveDateTime;

use crate::event::DutyEvent;
use crate::status::DutyStatus;

/// A driver's chronologically ordered duty events.
///
/// Timestamps are strictly increasing after construction: exact-timestamp
/// duplicates are collapsed, keeping the first event in a fixed content
/// order so the result is independent of ingestion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    events: Vec<DutyEvent>,
}

impl Timeline {
    /// Builds a timeline from unordered events, or `None` when there are
    /// none.
    #[must_use]
    pub fn from_events(mut events: Vec<DutyEvent>) -> Option<Self> {
        if events.is_empty() {
            return None;
        }
        events.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.status.cmp(&b.status))
                .then_with(|| a.location.cmp(&b.location))
        });
        events.dedup_by_key(|event| event.timestamp);
        Some(Self { events })
    }

    /// The ordered events.
    #[must_use]
    pub fn events(&self) -> &[DutyEvent] {
        &self.events
    }

    /// The final event.
    #[must_use]
    pub fn last_event(&self) -> &DutyEvent {
        self.events.last().expect("timeline is never empty")
    }

    /// Pairwise status segments. The final event contributes no segment; the
    /// shift detector handles it as a zero-length tail instead.
    pub(crate) fn segments(&self) -> Vec<StatusSegment> {
        self.events
            .windows(2)
            .map(|pair| StatusSegment {
                start: pair[0].timestamp,
                end: pair[1].timestamp,
                status: pair[0].status,
                location: pair[0].location.clone(),
            })
            .collect()
    }
}

/// A half-open interval `[start, end)` during which one status was in force.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatusSegment {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: DutyStatus,
    /// Location of the event that opened the segment.
    pub location: Option<String>,
}

impl StatusSegment {
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}

/// Segments clipped to `[start, end)`. Segments that fall entirely outside
/// the window are dropped, so every returned segment has positive length.
pub(crate) fn clip_segments(
    timeline: &Timeline,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<StatusSegment> {
    timeline
        .segments()
        .into_iter()
        .filter_map(|segment| {
            let clipped_start = segment.start.max(start);
            let clipped_end = segment.end.min(end);
            if clipped_start < clipped_end {
                Some(StatusSegment {
                    start: clipped_start,
                    end: clipped_end,
                    ..segment
                })
            } else {
                None
            }
        })
        .collect()
}

/// A maximal run of contiguous OFF segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OffRun {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Location of the first located segment in the run.
    pub location: Option<String>,
}

impl OffRun {
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}

/// Merges contiguous OFF segments into maximal runs.
///
/// Sleeper segments do not extend an OFF run; sleeper time is bucketed
/// separately by the hours aggregator.
pub(crate) fn off_runs(segments: &[StatusSegment]) -> Vec<OffRun> {
    let mut runs: Vec<OffRun> = Vec::new();
    for segment in segments {
        if segment.status != DutyStatus::Off {
            continue;
        }
        match runs.last_mut() {
            Some(run) if run.end == segment.start => {
                run.end = segment.end;
                if run.location.is_none() {
                    run.location = segment.location.clone();
                }
            }
            _ => runs.push(OffRun {
                start: segment.start,
                end: segment.end,
                location: segment.location.clone(),
            }),
        }
    }
    runs
}
