use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("field id must not be empty")]
    EmptyFieldId,
    #[error("unknown field type: {0}")]
    UnknownFieldType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
