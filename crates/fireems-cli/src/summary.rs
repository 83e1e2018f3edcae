//! Table rendering for command output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fireems_map::{ConfidenceLevel, ConfidenceThresholds, MappingResult};
use fireems_model::{MappingTemplate, TargetField, ValidationResult};
use fireems_schemas::SchemaRegistry;
use fireems_transform::{DateTimePatternResult, TransformMetadata};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(headers.iter().map(|label| header_cell(label)));
    apply_table_style(&mut table);
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn level_color(level: ConfidenceLevel) -> Color {
    match level {
        ConfidenceLevel::High => Color::Green,
        ConfidenceLevel::Medium => Color::Yellow,
        ConfidenceLevel::Low => Color::Red,
    }
}

fn confidence_cell(confidence: u8, thresholds: &ConfidenceThresholds) -> Cell {
    match thresholds.categorize(confidence) {
        Some(level) => Cell::new(confidence).fg(level_color(level)),
        None => dim_cell(confidence),
    }
}

fn level_cell(level: Option<ConfidenceLevel>) -> Cell {
    match level {
        Some(level) => Cell::new(format!("{level:?}").to_lowercase()).fg(level_color(level)),
        None => dim_cell("-"),
    }
}

fn required_cell(required: bool) -> Cell {
    if required {
        Cell::new("yes").add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

/// One row per source column with its suggested target.
pub fn suggestions_table(result: &MappingResult, thresholds: &ConfidenceThresholds) -> Table {
    let mut table = styled_table(&["Column", "Field", "Confidence", "Level", "Reasons"]);
    align_column(&mut table, 2, CellAlignment::Right);
    for suggestion in &result.suggestions {
        let (field, level) = match &suggestion.target_field {
            Some(field) => (
                Cell::new(format!("{} ({})", field.name, field.id)),
                thresholds.categorize(suggestion.confidence),
            ),
            None => (dim_cell("-"), None),
        };
        table.add_row(vec![
            Cell::new(&suggestion.source_field),
            field,
            confidence_cell(suggestion.confidence, thresholds),
            level_cell(level),
            Cell::new(suggestion.reasons.join("; ")),
        ]);
    }
    table
}

pub fn tools_table(registry: &SchemaRegistry) -> Table {
    let mut table = styled_table(&["Tool", "Name", "Fields", "Required"]);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for schema in registry.iter() {
        table.add_row(vec![
            Cell::new(&schema.tool.id),
            Cell::new(&schema.tool.name),
            Cell::new(schema.fields.len()),
            Cell::new(schema.required_fields().count()),
        ]);
    }
    table
}

pub fn fields_table(fields: &[TargetField]) -> Table {
    let mut table = styled_table(&["Field", "Name", "Type", "Required"]);
    for field in fields {
        table.add_row(vec![
            Cell::new(&field.id),
            Cell::new(&field.name),
            Cell::new(field.field_type),
            required_cell(field.required),
        ]);
    }
    table
}

pub fn pattern_table(pattern: &DateTimePatternResult) -> Table {
    let mut table = styled_table(&["Layout", "Confidence", "Date", "Time", "Combined"]);
    let column = |value: &Option<String>| match value {
        Some(name) => Cell::new(name),
        None => dim_cell("-"),
    };
    table.add_row(vec![
        Cell::new(format!("{:?}", pattern.kind).to_lowercase()),
        Cell::new(format!("{:.1}", pattern.confidence)),
        column(&pattern.date_field),
        column(&pattern.time_field),
        column(&pattern.combined_field),
    ]);
    table
}

pub fn templates_table(templates: &[MappingTemplate]) -> Table {
    let mut table = styled_table(&["Id", "Name", "Tool", "Mappings", "Updated"]);
    align_column(&mut table, 3, CellAlignment::Right);
    for template in templates {
        table.add_row(vec![
            dim_cell(&template.id),
            Cell::new(&template.name),
            Cell::new(&template.target_tool_id),
            Cell::new(template.mappings.len()),
            Cell::new(template.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    table
}

/// Errors then warnings, one per line.
pub fn validation_lines(result: &ValidationResult) -> Vec<String> {
    let mut lines: Vec<String> = result
        .errors
        .iter()
        .map(|error| format!("error: {error}"))
        .collect();
    lines.extend(result.warnings.iter().map(|warning| format!("warning: {warning}")));
    let status = if result.is_valid { "valid" } else { "invalid" };
    lines.push(format!(
        "Mapping is {status} ({} errors, {} warnings)",
        result.error_count(),
        result.warning_count()
    ));
    lines
}

pub fn transform_line(metadata: &TransformMetadata) -> String {
    format!(
        "Transformed {} of {} records ({} skipped)",
        metadata.successful, metadata.total, metadata.skipped
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fireems_model::FieldType;

    #[test]
    fn renders_fields() {
        let fields = vec![
            TargetField::new("incident_id", "Incident ID", FieldType::String)
                .unwrap()
                .required(),
            TargetField::new("latitude", "Latitude", FieldType::Number).unwrap(),
        ];
        let mut table = fields_table(&fields);
        table.force_no_tty();

        insta::assert_snapshot!(table.to_string(), @r"
        ╭─────────────┬─────────────┬────────┬──────────╮
        │ Field       ┆ Name        ┆ Type   ┆ Required │
        ╞═════════════╪═════════════╪════════╪══════════╡
        │ incident_id ┆ Incident ID ┆ string ┆ yes      │
        │ latitude    ┆ Latitude    ┆ number ┆ -        │
        ╰─────────────┴─────────────┴────────┴──────────╯
        ");
    }

    #[test]
    fn validation_summary_lists_errors_first() {
        let result = ValidationResult::new(
            vec!["Required field 'Incident ID' is not mapped".to_string()],
            vec!["Low confidence mapping: Notes → Unit".to_string()],
        );
        assert_eq!(
            validation_lines(&result),
            vec![
                "error: Required field 'Incident ID' is not mapped",
                "warning: Low confidence mapping: Notes → Unit",
                "Mapping is invalid (1 errors, 1 warnings)",
            ]
        );
    }
}
