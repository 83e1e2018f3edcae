#![deny(unsafe_code)]

//! Value transforms and record handoff.
//!
//! - [`executors`]: the transform op catalog
//! - [`detect`]: which columns carry incident date and time
//! - [`transformer`]: applying confirmed mappings to records

pub mod checks;
pub mod datetime;
pub mod detect;
pub mod executors;
pub mod transformer;

pub use checks::{looks_like, validate_with_samples};
pub use detect::{
    Candidate, CombinedFieldStrategy, DateTimeDetector, DateTimePatternKind,
    DateTimePatternResult, DetectionStrategy, SimpleFieldStrategy, detect_datetime_pattern,
};
pub use executors::{TransformError, apply_op, apply_ops};
pub use transformer::{
    DateTimeMerge, DateTimePlan, DateTimeTargets, FieldError, RecordError, RecordTransformer,
    TransformMetadata, TransformOutput, plan_datetime_mappings, transform_records,
};
