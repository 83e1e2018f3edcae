use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mapping::FieldMapping;

/// A named, reusable mapping set for one target tool.
///
/// Templates are the only mapping state that outlives a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingTemplate {
    pub id: String,
    pub name: String,
    pub target_tool_id: String,
    pub mappings: Vec<FieldMapping>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MappingTemplate {
    /// Creates a template with a fresh random id.
    pub fn new(
        name: impl Into<String>,
        target_tool_id: impl Into<String>,
        mappings: Vec<FieldMapping>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            target_tool_id: target_tool_id.into(),
            mappings,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the mappings and bumps `updated_at`.
    pub fn set_mappings(&mut self, mappings: Vec<FieldMapping>) {
        self.mappings = mappings;
        self.updated_at = Utc::now();
    }
}
