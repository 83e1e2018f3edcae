#![deny(unsafe_code)]

//! Field schemas of the downstream fire/EMS tools.

pub mod error;
pub mod registry;
pub mod schema;

pub use error::{Result, SchemaError};
pub use registry::{SCHEMAS_ENV_VAR, SchemaRegistry};
pub use schema::{ToolInfo, ToolSchema};
