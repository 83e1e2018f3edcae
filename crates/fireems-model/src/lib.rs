#![deny(unsafe_code)]

//! Shared types for the field mapping engine.
//!
//! Everything here is plain data: target tool schemas ([`TargetField`]),
//! confirmed mappings ([`FieldMapping`]), engine outputs ([`MappingSuggestion`],
//! [`SimilarityResult`], [`ValidationResult`]) and the record representation
//! ([`Record`], [`Value`]) that flows through the transformer.

pub mod error;
pub mod field;
pub mod mapping;
pub mod template;
pub mod value;

pub use error::{ModelError, Result};
pub use field::{FieldType, TargetField};
pub use mapping::{
    FieldMapping, MappingSuggestion, SimilarityResult, TransformOp, ValidationResult,
};
pub use template::MappingTemplate;
pub use value::{Record, Value};
