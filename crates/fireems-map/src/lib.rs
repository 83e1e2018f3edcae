#![deny(unsafe_code)]

//! Column-to-field mapping for fire/EMS tool handoff.
//!
//! Source column names are normalized, scored against each target field's id
//! and display name, and the best candidate above a confidence floor is
//! suggested. Confirmed mappings are validated against the schema and can be
//! saved as templates.

pub mod engine;
pub mod error;
pub mod normalize;
pub mod repository;
pub mod score;
pub mod set;
pub mod state;
pub mod validate;

pub use engine::{
    ConfidenceLevel, ConfidenceThresholds, DEFAULT_MIN_CONFIDENCE, MappingEngine, MappingResult,
    suggest_mappings,
};
pub use error::MappingError;
pub use normalize::{normalize_name, normalize_optional};
pub use repository::{
    FileTemplateStore, InMemoryTemplateStore, TemplateStore, deserialize_mappings,
    serialize_mappings,
};
pub use score::{ScoreCache, score, score_normalized};
pub use set::MappingSet;
pub use state::{MappingSession, MappingSummary};
pub use validate::{LOW_CONFIDENCE_THRESHOLD, validate_mapping};
