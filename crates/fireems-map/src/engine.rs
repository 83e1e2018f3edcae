//! Mapping engine implementation.

use std::collections::BTreeMap;

use fireems_model::{MappingSuggestion, TargetField};
use tracing::{debug, info};

use crate::score::ScoreCache;

/// Confidence floor used when the caller does not pick one.
pub const DEFAULT_MIN_CONFIDENCE: u8 = 30;

pub const EXACT_MATCH_REASON: &str = "Exact match found";
pub const REQUIRED_FIELD_REASON: &str = "Required field prioritized";
pub const NO_MATCH_REASON: &str = "No suitable match found";

/// Required fields only get the prioritized reason above this score.
const REQUIRED_REASON_MIN_SCORE: u8 = 50;

/// Confidence level categories for mapping quality assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    /// Weak match requiring manual confirmation.
    Low,
    /// Reasonable match that should be reviewed.
    Medium,
    /// Near-certain match.
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

/// Boundaries between confidence levels on the 0-100 scale.
///
/// - Below `low`: not a suggestion at all
/// - `low` to `medium`: [`ConfidenceLevel::Low`]
/// - `medium` to `high`: [`ConfidenceLevel::Medium`]
/// - At or above `high`: [`ConfidenceLevel::High`]
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThresholds {
    pub high: u8,
    pub medium: u8,
    pub low: u8,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 90,
            medium: 70,
            low: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl ConfidenceThresholds {
    /// Categorizes a score; `None` below the low threshold.
    #[must_use]
    pub fn categorize(&self, confidence: u8) -> Option<ConfidenceLevel> {
        if confidence >= self.high {
            Some(ConfidenceLevel::High)
        } else if confidence >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if confidence >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}

/// Suggestions for every source column plus the columns left without a target.
#[derive(Debug, Clone, Default)]
pub struct MappingResult {
    /// One entry per source column, in input order.
    pub suggestions: Vec<MappingSuggestion>,
    /// Columns whose best candidate fell below the confidence floor.
    pub unmapped_columns: Vec<String>,
}

impl MappingResult {
    /// Suggestions that carry a target field.
    pub fn matched(&self) -> impl Iterator<Item = &MappingSuggestion> {
        self.suggestions
            .iter()
            .filter(|suggestion| suggestion.target_field.is_some())
    }

    /// Number of matched suggestions at each confidence level.
    #[must_use]
    pub fn count_by_level(&self, thresholds: &ConfidenceThresholds) -> BTreeMap<ConfidenceLevel, usize> {
        let mut counts = BTreeMap::new();
        for suggestion in self.matched() {
            if let Some(level) = thresholds.categorize(suggestion.confidence) {
                *counts.entry(level).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Mean confidence over matched suggestions.
    #[must_use]
    pub fn mean_confidence(&self) -> Option<f64> {
        let scores: Vec<f64> = self
            .matched()
            .map(|suggestion| f64::from(suggestion.confidence))
            .collect();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Engine that proposes a target field for each source column.
///
/// Every column is compared against both the id and the display name of every
/// target field; the better of the two counts. The strictly highest scoring field
/// wins, so on a tie the field listed first in the schema is kept.
///
/// # Example
///
/// ```ignore
/// use fireems_map::MappingEngine;
///
/// let engine = MappingEngine::new(schema.fields.clone(), 30);
/// let result = engine.suggest(&["Incident Number".to_string(), "Lat".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct MappingEngine {
    target_fields: Vec<TargetField>,
    min_confidence: u8,
}

impl MappingEngine {
    pub fn new(target_fields: Vec<TargetField>, min_confidence: u8) -> Self {
        Self {
            target_fields,
            min_confidence,
        }
    }

    pub fn target_fields(&self) -> &[TargetField] {
        &self.target_fields
    }

    pub fn min_confidence(&self) -> u8 {
        self.min_confidence
    }

    /// Suggests a mapping for every column, preserving column order.
    pub fn suggest<S: AsRef<str>>(&self, columns: &[S]) -> MappingResult {
        let mut cache = ScoreCache::new();
        let mut result = MappingResult::default();
        for column in columns {
            let suggestion = self.suggest_column(column.as_ref(), &mut cache);
            if suggestion.target_field.is_none() {
                result.unmapped_columns.push(suggestion.source_field.clone());
            }
            result.suggestions.push(suggestion);
        }
        info!(
            columns = columns.len(),
            fields = self.target_fields.len(),
            unmapped = result.unmapped_columns.len(),
            "suggested field mappings"
        );
        result
    }

    fn suggest_column(&self, column: &str, cache: &mut ScoreCache) -> MappingSuggestion {
        let mut best_field: Option<&TargetField> = None;
        let mut best_score = 0u8;
        let mut reasons = Vec::new();

        for field in &self.target_fields {
            let by_id = cache.score(column, &field.id);
            let by_name = cache.score(column, &field.name);
            let (winner, side, label) = if by_id.score >= by_name.score {
                (by_id, "id", field.id.as_str())
            } else {
                (by_name, "name", field.name.as_str())
            };

            if winner.score <= best_score {
                continue;
            }
            best_score = winner.score;
            best_field = Some(field);

            reasons = vec![format!("Matched on field {side} '{label}'")];
            reasons.extend(winner.reasons);
            if winner.score == 100 {
                reasons.push(EXACT_MATCH_REASON.to_string());
            }
            if field.required && winner.score > REQUIRED_REASON_MIN_SCORE {
                reasons.push(REQUIRED_FIELD_REASON.to_string());
            }
        }

        match best_field {
            Some(field) if best_score >= self.min_confidence => {
                debug!(column, target = %field.id, confidence = best_score, "column matched");
                MappingSuggestion {
                    source_field: column.to_string(),
                    target_field: Some(field.clone()),
                    confidence: best_score,
                    reasons,
                }
            }
            _ => {
                debug!(column, best_score, "no field cleared the confidence floor");
                MappingSuggestion {
                    source_field: column.to_string(),
                    target_field: None,
                    confidence: best_score,
                    reasons: vec![NO_MATCH_REASON.to_string()],
                }
            }
        }
    }
}

/// Suggests one mapping per source column against a tool schema.
///
/// See [`MappingEngine`] for the matching rules.
pub fn suggest_mappings<S: AsRef<str>>(
    source_columns: &[S],
    target_fields: &[TargetField],
    min_confidence: u8,
) -> Vec<MappingSuggestion> {
    MappingEngine::new(target_fields.to_vec(), min_confidence)
        .suggest(source_columns)
        .suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use fireems_model::FieldType;

    fn field(id: &str, name: &str, required: bool) -> TargetField {
        let field = TargetField::new(id, name, FieldType::String).unwrap();
        if required { field.required() } else { field }
    }

    #[test]
    fn first_seen_wins_ties() {
        let fields = vec![
            field("unit_primary", "Primary Unit", false),
            field("unit_secondary", "Secondary Unit", false),
        ];
        // Both fields share exactly one of two words with "Unit Code".
        let suggestions = suggest_mappings(&["Unit Code"], &fields, DEFAULT_MIN_CONFIDENCE);
        assert_eq!(suggestions[0].confidence, 50);
        assert_eq!(
            suggestions[0].target_field.as_ref().map(|f| f.id.as_str()),
            Some("unit_primary")
        );
    }

    #[test]
    fn reasons_name_the_winning_side() {
        let fields = vec![field("lat", "Latitude", true)];
        let suggestions = suggest_mappings(&["Latitude"], &fields, DEFAULT_MIN_CONFIDENCE);
        assert_eq!(
            suggestions[0].reasons,
            vec![
                "Matched on field name 'Latitude'".to_string(),
                "Exact match".to_string(),
                EXACT_MATCH_REASON.to_string(),
                REQUIRED_FIELD_REASON.to_string(),
            ]
        );
    }

    #[test]
    fn required_reason_needs_more_than_half() {
        let fields = vec![field("unit_primary", "Primary Unit", true)];
        let suggestions = suggest_mappings(&["Unit Code"], &fields, DEFAULT_MIN_CONFIDENCE);
        assert_eq!(suggestions[0].confidence, 50);
        assert!(suggestions[0].target_field.is_some());
        assert!(
            !suggestions[0]
                .reasons
                .contains(&REQUIRED_FIELD_REASON.to_string())
        );
    }

    #[test]
    fn required_reason_above_half() {
        let fields = vec![field("unit_primary", "Primary Unit", true)];
        // Two of three words shared.
        let suggestions =
            suggest_mappings(&["Primary Unit Code"], &fields, DEFAULT_MIN_CONFIDENCE);
        assert_eq!(suggestions[0].confidence, 67);
        assert_eq!(
            suggestions[0].reasons.last().map(String::as_str),
            Some(REQUIRED_FIELD_REASON)
        );
    }

    #[test]
    fn below_floor_keeps_best_score() {
        let fields = vec![field("incident_id", "Incident ID", true)];
        let suggestions = suggest_mappings(&["Incident Notes Free Text"], &fields, 30);
        assert!(suggestions[0].target_field.is_none());
        assert_eq!(suggestions[0].confidence, 25);
        assert_eq!(suggestions[0].reasons, vec![NO_MATCH_REASON.to_string()]);
    }

    #[test]
    fn thresholds_categorize() {
        let thresholds = ConfidenceThresholds::default();
        assert_eq!(thresholds.categorize(100), Some(ConfidenceLevel::High));
        assert_eq!(thresholds.categorize(75), Some(ConfidenceLevel::Medium));
        assert_eq!(thresholds.categorize(30), Some(ConfidenceLevel::Low));
        assert_eq!(thresholds.categorize(29), None);
    }
}
