use std::collections::BTreeSet;

use fireems_model::TargetField;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The fields one downstream tool expects, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub tool: ToolInfo,
    pub fields: Vec<TargetField>,
}

impl ToolSchema {
    /// Parses and checks a schema; `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let schema: ToolSchema = toml::from_str(text).map_err(|source| SchemaError::Toml {
            origin: origin.to_string(),
            source,
        })?;
        schema.check(origin)?;
        Ok(schema)
    }

    fn check(&self, origin: &str) -> Result<()> {
        if self.tool.id.trim().is_empty() {
            return Err(SchemaError::invalid(origin, "tool id is empty"));
        }
        if self.fields.is_empty() {
            return Err(SchemaError::invalid(origin, "schema has no fields"));
        }
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.id.trim().is_empty() {
                return Err(SchemaError::invalid(origin, "field id is empty"));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(SchemaError::invalid(
                    origin,
                    format!("duplicate field id '{}'", field.id),
                ));
            }
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.tool.id
    }

    pub fn field(&self, id: &str) -> Option<&TargetField> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &TargetField> {
        self.fields.iter().filter(|field| field.required)
    }
}
