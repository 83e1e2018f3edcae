//! Record handoff between tools.
//!
//! A [`RecordTransformer`] applies confirmed mappings to every input record.
//! Failures are isolated per record: a value that cannot be transformed drops
//! that record, is reported with its index, and the batch carries on.

use fireems_model::{FieldMapping, FieldType, Record, TargetField, TransformOp, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::detect::{DateTimePatternKind, DateTimePatternResult};
use crate::executors::{TransformError, apply_op, apply_ops};

/// A transform failure tied to the mapping that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{source_field} → {target_field}: {error}")]
pub struct FieldError {
    pub source_field: String,
    pub target_field: String,
    #[source]
    pub error: TransformError,
}

/// A skipped record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    /// Position of the record in the input batch.
    pub index: usize,
    pub source_field: String,
    pub target_field: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformMetadata {
    pub total: usize,
    pub successful: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformOutput {
    pub records: Vec<Record>,
    pub errors: Vec<RecordError>,
    pub metadata: TransformMetadata,
}

/// Combines a date column and a time column into one datetime target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeMerge {
    pub date_field: String,
    pub time_field: String,
    pub target_field: String,
}

impl DateTimeMerge {
    fn apply(&self, record: &Record, output: &mut Record) -> Result<(), FieldError> {
        let present = |field: &str| record.get(field).filter(|value| !value.is_blank()).cloned();
        let (Some(date), Some(time)) = (present(&self.date_field), present(&self.time_field)) else {
            return Ok(());
        };
        let fail = |error| FieldError {
            source_field: format!("{} + {}", self.date_field, self.time_field),
            target_field: self.target_field.clone(),
            error,
        };
        let date = apply_op(&TransformOp::ParseDate, date).map_err(fail)?;
        let time = apply_op(&TransformOp::ParseTime, time).map_err(fail)?;
        if let (Value::Date(date), Value::Time(time)) = (date, time) {
            output.insert(self.target_field.clone(), Value::DateTime(date.and_time(time)));
        }
        Ok(())
    }
}

/// Applies mappings, then datetime merges, to each record.
#[derive(Debug, Clone, Default)]
pub struct RecordTransformer {
    mappings: Vec<FieldMapping>,
    merges: Vec<DateTimeMerge>,
}

impl RecordTransformer {
    pub fn new(mappings: Vec<FieldMapping>) -> Self {
        Self {
            mappings,
            merges: Vec::new(),
        }
    }

    pub fn with_merge(mut self, merge: DateTimeMerge) -> Self {
        self.merges.push(merge);
        self
    }

    /// Adds the mappings and merges of a datetime plan.
    pub fn with_plan(mut self, plan: DateTimePlan) -> Self {
        self.mappings.extend(plan.mappings);
        self.merges.extend(plan.merges);
        self
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn merges(&self) -> &[DateTimeMerge] {
        &self.merges
    }

    /// Transforms one record.
    ///
    /// Absent and null source values are skipped without writing the target.
    /// When several mappings share a target the last one wins.
    pub fn transform_record(&self, record: &Record) -> Result<Record, FieldError> {
        let mut output = Record::new();
        for mapping in &self.mappings {
            let Some(value) = record.get(&mapping.source_field).filter(|v| !v.is_null()) else {
                continue;
            };
            let transformed =
                apply_ops(&mapping.transformations, value.clone()).map_err(|error| FieldError {
                    source_field: mapping.source_field.clone(),
                    target_field: mapping.target_field.clone(),
                    error,
                })?;
            output.insert(mapping.target_field.clone(), transformed);
        }
        for merge in &self.merges {
            merge.apply(record, &mut output)?;
        }
        Ok(output)
    }

    /// Transforms a batch, isolating failures per record.
    pub fn transform(&self, records: &[Record]) -> TransformOutput {
        let mut output = TransformOutput {
            metadata: TransformMetadata {
                total: records.len(),
                ..TransformMetadata::default()
            },
            ..TransformOutput::default()
        };

        for (index, record) in records.iter().enumerate() {
            match self.transform_record(record) {
                Ok(transformed) => {
                    output.records.push(transformed);
                    output.metadata.successful += 1;
                }
                Err(error) => {
                    warn!(index, %error, "skipping record");
                    output.errors.push(RecordError {
                        index,
                        source_field: error.source_field.clone(),
                        target_field: error.target_field.clone(),
                        message: error.error.to_string(),
                    });
                    output.metadata.skipped += 1;
                }
            }
        }

        info!(
            total = output.metadata.total,
            successful = output.metadata.successful,
            skipped = output.metadata.skipped,
            "transformed records"
        );
        output
    }
}

/// Applies a mapping list to a batch of records.
pub fn transform_records(records: &[Record], mappings: &[FieldMapping]) -> TransformOutput {
    RecordTransformer::new(mappings.to_vec()).transform(records)
}

/// Target field ids that receive date and time values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeTargets {
    pub date_field: Option<String>,
    pub time_field: Option<String>,
    pub datetime_field: Option<String>,
}

impl DateTimeTargets {
    /// First date, time and datetime typed field of a schema.
    pub fn from_fields(fields: &[TargetField]) -> Self {
        let first = |field_type: FieldType| {
            fields
                .iter()
                .find(|field| field.field_type == field_type)
                .map(|field| field.id.clone())
        };
        Self {
            date_field: first(FieldType::Date),
            time_field: first(FieldType::Time),
            datetime_field: first(FieldType::DateTime),
        }
    }
}

/// Mappings and merges derived from a detected datetime layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateTimePlan {
    pub mappings: Vec<FieldMapping>,
    pub merges: Vec<DateTimeMerge>,
}

impl DateTimePlan {
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty() && self.merges.is_empty()
    }
}

/// Plans how detected date/time columns feed the tool's date/time fields.
///
/// - Combined column: split into date and time targets, parse into a datetime target
/// - Separate columns: parse each, and merge both into a datetime target
/// - Unknown layout: nothing
pub fn plan_datetime_mappings(
    pattern: &DateTimePatternResult,
    targets: &DateTimeTargets,
) -> DateTimePlan {
    let mut plan = DateTimePlan::default();
    match pattern.kind {
        DateTimePatternKind::Combined => {
            let Some(source) = pattern.combined_field.as_deref() else {
                return plan;
            };
            let split = [
                (&targets.date_field, TransformOp::ExtractDate),
                (&targets.time_field, TransformOp::ExtractTime),
                (&targets.datetime_field, TransformOp::ParseDateTime),
            ];
            for (target, op) in split {
                if let Some(target) = target {
                    plan.mappings.push(FieldMapping::new(source, target.as_str()).with_transform(op));
                }
            }
        }
        DateTimePatternKind::Simple => {
            let (Some(date), Some(time)) = (pattern.date_field.as_deref(), pattern.time_field.as_deref())
            else {
                return plan;
            };
            if let Some(target) = &targets.date_field {
                plan.mappings
                    .push(FieldMapping::new(date, target.as_str()).with_transform(TransformOp::ParseDate));
            }
            if let Some(target) = &targets.time_field {
                plan.mappings
                    .push(FieldMapping::new(time, target.as_str()).with_transform(TransformOp::ParseTime));
            }
            if let Some(target) = &targets.datetime_field {
                plan.merges.push(DateTimeMerge {
                    date_field: date.to_string(),
                    time_field: time.to_string(),
                    target_field: target.clone(),
                });
            }
        }
        DateTimePatternKind::Unknown => {}
    }
    plan
}
