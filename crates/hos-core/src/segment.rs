//! Shift boundary detection.
//!
//! A shift runs from the first duty-bearing timestamp after a qualifying
//! rest block to the start of the next qualifying rest block. Both the
//! hours report and the certification evaluator consume this single pass,
//! so blip tolerance and near-reset handling behave identically in both.

use chrono::NaiveDateTime;

use crate::timeline::Timeline;

/// Configuration for shift boundary detection.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// A rest block of at least this long fully restores on-duty
    /// eligibility.
    /// Default: 36000000 (10 hours).
    pub reset_ms: i64,

    /// Rest blocks this close to a full reset still end the shift, with a
    /// near-reset note on the closed shift.
    /// Default: 1800000 (30 minutes).
    pub near_reset_grace_ms: i64,

    /// Duty excursions up to this long inside a rest block are absorbed
    /// into the block instead of splitting it.
    /// Default: 600000 (10 minutes).
    pub blip_max_ms: i64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            reset_ms: 36_000_000,           // 10 hours
            near_reset_grace_ms: 1_800_000, // 30 minutes
            blip_max_ms: 600_000,           // 10 minutes
        }
    }
}

impl SegmenterConfig {
    /// The qualifying-rest threshold: a block at least this long ends a
    /// shift, even when it falls short of a full reset.
    #[must_use]
    pub const fn start_break_ms(&self) -> i64 {
        self.reset_ms - self.near_reset_grace_ms
    }
}

/// How a shift was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftClosure {
    /// A qualifying rest block began.
    Rest,
    /// Data ended while the driver was mid-rest.
    EndOfDataOff,
    /// Data ended while the driver was still duty-bearing.
    EndOfDataOnDuty,
}

/// One detected shift: the boundary pair plus segmentation diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftBounds {
    /// First duty-bearing timestamp after a qualifying rest.
    pub start: NaiveDateTime,
    /// Start of the closing rest block, or the last event at end of data.
    pub end: NaiveDateTime,
    /// How the shift was closed.
    pub closure: ShiftClosure,
    /// Longest unbroken ON/DRIVING run inside the shift, in milliseconds.
    pub longest_duty_run_ms: i64,
    /// Boundary notes: near-reset closures and end-of-data conditions.
    pub notes: Vec<String>,
}

/// Running state for the shift currently being accumulated.
///
/// Threaded explicitly through the scan so every transition that touches the
/// open shift is visible at the call site.
#[derive(Debug)]
struct ShiftAccumulator {
    start: NaiveDateTime,
    longest_duty_run_ms: i64,
    current_run: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl ShiftAccumulator {
    fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            longest_duty_run_ms: 0,
            current_run: None,
        }
    }

    /// Extends the running ON/DRIVING streak with a contiguous segment.
    fn duty_segment(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        let run = match self.current_run {
            Some((run_start, run_end)) if run_end == start => (run_start, end),
            _ => (start, end),
        };
        self.longest_duty_run_ms = self.longest_duty_run_ms.max(ms_between(run.0, run.1));
        self.current_run = Some(run);
    }

    /// A rest segment breaks the streak.
    fn rest_segment(&mut self) {
        self.current_run = None;
    }

    /// Records a completed duty run and breaks the streak: the run either
    /// ended at a rest event or ran into the end of data.
    fn note_duty_run(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        self.note_run_ms(ms_between(start, end));
        self.current_run = None;
    }

    /// Credits a finished run by length alone. Blips land here once their
    /// rest block fails to qualify and collapses into the shift.
    fn note_run_ms(&mut self, run_ms: i64) {
        self.longest_duty_run_ms = self.longest_duty_run_ms.max(run_ms);
    }

    fn finalize(self, end: NaiveDateTime, closure: ShiftClosure, notes: Vec<String>) -> ShiftBounds {
        ShiftBounds {
            start: self.start,
            end,
            closure,
            longest_duty_run_ms: self.longest_duty_run_ms,
            notes,
        }
    }
}

/// A candidate rest block: OFF and SLEEPER time that may close a shift.
///
/// `pending_duty` holds the start of an ON/DRIVING excursion that has not yet
/// been classified as a blip (absorbed) or a genuine break (block ends at the
/// excursion start). Classification happens at the next rest event, or as
/// soon as the excursion outgrows the blip ceiling.
#[derive(Debug, Clone, Copy)]
struct RestBlock {
    start: NaiveDateTime,
    rest_end: NaiveDateTime,
    pending_duty: Option<NaiveDateTime>,
    /// Longest absorbed blip. It counts as a duty run of the open shift only
    /// when the block fails to qualify and its time folds into that shift.
    longest_blip_ms: i64,
}

impl RestBlock {
    const fn starting(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            rest_end: end,
            pending_duty: None,
            longest_blip_ms: 0,
        }
    }

    fn duration_ms(&self) -> i64 {
        ms_between(self.start, self.rest_end)
    }
}

#[derive(Debug)]
enum ScanState {
    /// Duty-bearing with no shift open, before the first qualifying rest.
    NotInOff,
    /// Inside a candidate rest block; a shift may still be open behind it.
    InOffBlock {
        block: RestBlock,
        shift: Option<ShiftAccumulator>,
    },
    /// A shift is open and the driver is duty-bearing.
    ShiftActive(ShiftAccumulator),
}

/// Detects shift boundaries for one driver's timeline.
///
/// Duty time before the first qualifying rest belongs to no shift. The final
/// shift, if any, is closed at the last event with an end-of-data note.
#[must_use]
pub fn detect_shift_bounds(timeline: &Timeline, config: &SegmenterConfig) -> Vec<ShiftBounds> {
    let events = timeline.events();
    let mut shifts = Vec::new();
    let mut state = ScanState::NotInOff;

    for (index, event) in events.iter().enumerate() {
        // The final event has no successor; it still drives transitions as a
        // zero-length segment so shifts can open or close on it.
        let start = event.timestamp;
        let end = events
            .get(index + 1)
            .map_or(start, |next| next.timestamp);

        state = if event.status.is_rest() {
            match state {
                ScanState::NotInOff => ScanState::InOffBlock {
                    block: RestBlock::starting(start, end),
                    shift: None,
                },
                ScanState::ShiftActive(mut shift) => {
                    shift.rest_segment();
                    ScanState::InOffBlock {
                        block: RestBlock::starting(start, end),
                        shift: Some(shift),
                    }
                }
                ScanState::InOffBlock { mut block, shift } => match block.pending_duty.take() {
                    None => {
                        block.rest_end = end;
                        ScanState::InOffBlock { block, shift }
                    }
                    Some(duty_start) => {
                        if ms_between(duty_start, start) <= config.blip_max_ms {
                            // Blip absorbed: the block keeps running and holds
                            // the blip until the block itself is classified.
                            block.longest_blip_ms =
                                block.longest_blip_ms.max(ms_between(duty_start, start));
                            block.rest_end = end;
                            ScanState::InOffBlock { block, shift }
                        } else {
                            // The excursion ended the block at its own start.
                            let mut shift =
                                resolve_block(&block, shift, duty_start, config, &mut shifts);
                            if let Some(shift) = shift.as_mut() {
                                shift.note_duty_run(duty_start, start);
                            }
                            ScanState::InOffBlock {
                                block: RestBlock::starting(start, end),
                                shift,
                            }
                        }
                    }
                },
            }
        } else {
            match state {
                ScanState::NotInOff => ScanState::NotInOff,
                ScanState::ShiftActive(mut shift) => {
                    shift.duty_segment(start, end);
                    ScanState::ShiftActive(shift)
                }
                ScanState::InOffBlock { mut block, shift } => match block.pending_duty {
                    None => {
                        block.pending_duty = Some(start);
                        ScanState::InOffBlock { block, shift }
                    }
                    // Past the blip ceiling the excursion can no longer be
                    // absorbed, so the block is classified without waiting
                    // for the next rest event.
                    Some(duty_start) if ms_between(duty_start, start) > config.blip_max_ms => {
                        match resolve_block(&block, shift, duty_start, config, &mut shifts) {
                            Some(mut shift) => {
                                shift.duty_segment(duty_start, end);
                                ScanState::ShiftActive(shift)
                            }
                            None => ScanState::NotInOff,
                        }
                    }
                    Some(_) => ScanState::InOffBlock { block, shift },
                },
            }
        };
    }

    let last = timeline.last_event().timestamp;
    match state {
        ScanState::NotInOff => {}
        ScanState::ShiftActive(shift) => {
            shifts.push(shift.finalize(
                last,
                ShiftClosure::EndOfDataOnDuty,
                vec![STILL_ON_DUTY.to_string()],
            ));
        }
        ScanState::InOffBlock { block, shift } => match block.pending_duty {
            // A duty excursion ran into the end of data. It is not bracketed
            // by rest, so the block ended where the excursion began.
            Some(duty_start) => {
                let shift = resolve_block(&block, shift, duty_start, config, &mut shifts);
                if let Some(mut shift) = shift {
                    shift.note_duty_run(duty_start, last);
                    shifts.push(shift.finalize(
                        last,
                        ShiftClosure::EndOfDataOnDuty,
                        vec![STILL_ON_DUTY.to_string()],
                    ));
                }
            }
            None => {
                if let Some(shift) = shift {
                    let mut notes = vec!["off duty at end of data".to_string()];
                    if let Some(note) = near_reset_note(block.duration_ms(), config) {
                        notes.push(note);
                    }
                    shifts.push(shift.finalize(block.start, ShiftClosure::EndOfDataOff, notes));
                }
            }
        },
    }

    shifts
}

const STILL_ON_DUTY: &str = "still on duty at end of data";

/// Classifies a finished rest block and returns the accumulator that is open
/// once duty resumes at `duty_resume`.
///
/// A qualifying block closes the open shift (if any) at the block start and
/// opens a fresh shift; its absorbed blips fall inside the rest, between the
/// two shifts, and are dropped. A short block keeps the open shift running,
/// and its absorbed blips count as duty runs of that shift.
fn resolve_block(
    block: &RestBlock,
    shift: Option<ShiftAccumulator>,
    duty_resume: NaiveDateTime,
    config: &SegmenterConfig,
    shifts: &mut Vec<ShiftBounds>,
) -> Option<ShiftAccumulator> {
    let rest_ms = block.duration_ms();
    if rest_ms >= config.start_break_ms() {
        if let Some(shift) = shift {
            let notes = near_reset_note(rest_ms, config).into_iter().collect();
            shifts.push(shift.finalize(block.start, ShiftClosure::Rest, notes));
        }
        Some(ShiftAccumulator::new(duty_resume))
    } else {
        let mut shift = shift;
        if let Some(shift) = shift.as_mut() {
            shift.note_run_ms(block.longest_blip_ms);
        }
        shift
    }
}

fn near_reset_note(rest_ms: i64, config: &SegmenterConfig) -> Option<String> {
    if rest_ms >= config.start_break_ms() && rest_ms < config.reset_ms {
        Some(format!(
            "near reset, short by {}m",
            (config.reset_ms - rest_ms) / 60_000
        ))
    } else {
        None
    }
}

fn ms_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_milliseconds()
}
