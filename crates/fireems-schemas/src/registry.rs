//! Tool schema registry.
//!
//! Built-in schemas are embedded at compile time. A schema directory (from the
//! `FIREEMS_SCHEMAS_DIR` environment variable or configuration) can add tools or
//! replace built-in ones by id.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, SchemaError};
use crate::schema::ToolSchema;

/// Environment variable naming an extra schema directory.
pub const SCHEMAS_ENV_VAR: &str = "FIREEMS_SCHEMAS_DIR";

const BUILTIN: &[(&str, &str)] = &[
    ("fire-map-pro.toml", include_str!("../schemas/fire-map-pro.toml")),
    (
        "response-time-analyzer.toml",
        include_str!("../schemas/response-time-analyzer.toml"),
    ),
    (
        "call-density-heatmap.toml",
        include_str!("../schemas/call-density-heatmap.toml"),
    ),
];

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tools: BTreeMap<String, ToolSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the embedded tool schemas.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for (name, text) in BUILTIN {
            registry.insert(ToolSchema::from_toml_str(text, name)?);
        }
        Ok(registry)
    }

    /// Registry with only the `*.toml` schemas of a directory.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::new();
        registry.extend_from_dir(dir)?;
        Ok(registry)
    }

    /// Adds every `*.toml` schema of a directory, replacing tools with the same id.
    pub fn extend_from_dir(&mut self, dir: &Path) -> Result<usize> {
        let entries = fs::read_dir(dir).map_err(|source| SchemaError::io(dir, source))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|source| SchemaError::io(dir, source))?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let text = fs::read_to_string(path).map_err(|source| SchemaError::io(path, source))?;
            let schema = ToolSchema::from_toml_str(&text, &path.display().to_string())?;
            debug!(tool = schema.id(), path = %path.display(), "loaded tool schema");
            self.insert(schema);
        }
        info!(dir = %dir.display(), count = paths.len(), "loaded schema directory");
        Ok(paths.len())
    }

    /// Built-in schemas plus an optional directory, e.g. from [`SCHEMAS_ENV_VAR`].
    pub fn with_overrides(dir: Option<&Path>) -> Result<Self> {
        let mut registry = Self::builtin()?;
        if let Some(dir) = dir {
            registry.extend_from_dir(dir)?;
        }
        Ok(registry)
    }

    /// Registers a schema, returning the one it replaced.
    pub fn insert(&mut self, schema: ToolSchema) -> Option<ToolSchema> {
        self.tools.insert(schema.tool.id.clone(), schema)
    }

    pub fn get(&self, id: &str) -> Option<&ToolSchema> {
        self.tools.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolSchema> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
