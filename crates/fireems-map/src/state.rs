//! Mapping state for one upload and one target tool.
//!
//! A session holds the engine's suggestions and the mappings the user has
//! confirmed so far. Edits go through explicit methods; [`MappingSession::reset`]
//! throws them away.

use fireems_model::{FieldMapping, MappingSuggestion, MappingTemplate, TargetField, ValidationResult};
use tracing::debug;

use crate::engine::MappingEngine;
use crate::error::MappingError;
use crate::set::MappingSet;
use crate::validate::validate_mapping;

/// Counts describing how far a session has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappingSummary {
    pub total_fields: usize,
    pub mapped_fields: usize,
    pub required_fields: usize,
    pub required_mapped: usize,
    pub unmapped_columns: usize,
}

impl MappingSummary {
    pub fn required_complete(&self) -> bool {
        self.required_mapped == self.required_fields
    }
}

#[derive(Debug, Clone)]
pub struct MappingSession {
    tool_id: String,
    target_fields: Vec<TargetField>,
    source_columns: Vec<String>,
    suggestions: Vec<MappingSuggestion>,
    unmapped_columns: Vec<String>,
    mappings: MappingSet,
}

impl MappingSession {
    /// Starts a session by running the suggester over the source columns.
    pub fn new(
        tool_id: impl Into<String>,
        target_fields: Vec<TargetField>,
        source_columns: Vec<String>,
        min_confidence: u8,
    ) -> Self {
        let engine = MappingEngine::new(target_fields.clone(), min_confidence);
        let result = engine.suggest(&source_columns);
        Self {
            tool_id: tool_id.into(),
            target_fields,
            source_columns,
            suggestions: result.suggestions,
            unmapped_columns: result.unmapped_columns,
            mappings: MappingSet::new(),
        }
    }

    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    pub fn target_fields(&self) -> &[TargetField] {
        &self.target_fields
    }

    pub fn source_columns(&self) -> &[String] {
        &self.source_columns
    }

    pub fn suggestions(&self) -> &[MappingSuggestion] {
        &self.suggestions
    }

    pub fn unmapped_columns(&self) -> &[String] {
        &self.unmapped_columns
    }

    pub fn mappings(&self) -> &MappingSet {
        &self.mappings
    }

    /// Confirms the suggestion made for a source column.
    pub fn accept_suggestion(&mut self, source_column: &str) -> Result<FieldMapping, MappingError> {
        let suggestion = self
            .suggestions
            .iter()
            .find(|s| s.source_field == source_column)
            .ok_or_else(|| MappingError::ColumnNotFound(source_column.to_string()))?;
        let mapping = suggestion
            .to_mapping()
            .ok_or_else(|| MappingError::NoSuggestion(source_column.to_string()))?;
        self.mappings.insert(mapping.clone());
        Ok(mapping)
    }

    /// Confirms every suggestion that has a target; returns how many were applied.
    pub fn accept_all(&mut self) -> usize {
        let accepted: Vec<FieldMapping> = self
            .suggestions
            .iter()
            .filter_map(MappingSuggestion::to_mapping)
            .collect();
        let count = accepted.len();
        for mapping in accepted {
            self.mappings.insert(mapping);
        }
        debug!(count, "accepted all suggestions");
        count
    }

    /// Records a mapping chosen by hand, replacing any mapping for the same target.
    pub fn map_manual(&mut self, mapping: FieldMapping) -> Result<Option<FieldMapping>, MappingError> {
        if !self.source_columns.contains(&mapping.source_field) {
            return Err(MappingError::ColumnNotFound(mapping.source_field));
        }
        if !self.target_fields.iter().any(|f| f.id == mapping.target_field) {
            return Err(MappingError::FieldNotFound(mapping.target_field));
        }
        Ok(self.mappings.insert(mapping))
    }

    /// Removes the mapping for a target field.
    pub fn clear(&mut self, target_field: &str) -> Option<FieldMapping> {
        self.mappings.remove(target_field)
    }

    /// Discards every confirmed mapping.
    pub fn reset(&mut self) {
        self.mappings.clear();
    }

    /// Applies a saved template, skipping entries whose source column is absent
    /// from this upload or whose target field is unknown.
    pub fn apply_template(&mut self, template: &MappingTemplate) -> Result<usize, MappingError> {
        if template.target_tool_id != self.tool_id {
            return Err(MappingError::ToolMismatch {
                expected: self.tool_id.clone(),
                found: template.target_tool_id.clone(),
            });
        }
        let mut applied = 0;
        for mapping in &template.mappings {
            match self.map_manual(mapping.clone()) {
                Ok(_) => applied += 1,
                Err(error) => debug!(%error, "skipped template entry"),
            }
        }
        Ok(applied)
    }

    pub fn validate(&self) -> ValidationResult {
        validate_mapping(self.mappings.as_slice(), &self.target_fields)
    }

    pub fn summary(&self) -> MappingSummary {
        let required: Vec<&TargetField> = self.target_fields.iter().filter(|f| f.required).collect();
        MappingSummary {
            total_fields: self.target_fields.len(),
            mapped_fields: self
                .target_fields
                .iter()
                .filter(|f| self.mappings.contains_target(&f.id))
                .count(),
            required_fields: required.len(),
            required_mapped: required
                .iter()
                .filter(|f| self.mappings.contains_target(&f.id))
                .count(),
            unmapped_columns: self
                .source_columns
                .iter()
                .filter(|c| self.mappings.by_source(c).next().is_none())
                .count(),
        }
    }

    /// Snapshots the confirmed mappings as a named template.
    pub fn to_template(&self, name: impl Into<String>) -> MappingTemplate {
        MappingTemplate::new(name, self.tool_id.clone(), self.mappings.as_slice().to_vec())
    }
}
