//! Hours-of-service compliance engine.
//!
//! Reconstructs per-driver duty-status timelines from raw log rows, segments
//! them into shifts separated by qualifying rest blocks, and evaluates
//! payable/sleeper/layover hours, meal-break compliance, and certification
//! gaps. Evaluation is a pure function of the supplied events: no clock
//! access, no persistence, no timezone conversion.

pub mod certification;
pub mod engine;
pub mod event;
pub mod hours;
pub mod meal;
pub mod normalize;
pub mod segment;
pub mod status;
pub mod timeline;
mod types;

pub use certification::{
    CertificationConfig, CertificationStatus, CertificationVerdict, evaluate_certifications,
};
pub use engine::{
    DriverCertification, DriverReport, EngineConfig, Shift, compute_certification_reports,
    compute_hours_reports,
};
pub use event::{CertificationRecord, DutyEvent};
pub use hours::{HoursBreakdown, HoursConfig, NearHome, aggregate_hours, format_duration};
pub use meal::{MealConfig, MealOutcome, MealVerdict, evaluate_meal_breaks};
pub use normalize::{
    CertBatch, DutyBatch, RawCertRecord, RawDutyRecord, decode_certification_batch,
    decode_duty_batch, normalize_certification, normalize_certification_batch, normalize_duty,
    normalize_duty_batch,
};
pub use segment::{SegmenterConfig, ShiftBounds, ShiftClosure, detect_shift_bounds};
pub use status::{DutyStatus, UnknownDutyStatus};
pub use timeline::Timeline;
pub use types::{DriverId, ValidationError};
