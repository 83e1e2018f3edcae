use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use fireems_cli::config::{Overrides, Settings, load_config};
use fireems_cli::pipeline::{detect_layout, prepare_handoff};
use fireems_cli::summary::{
    fields_table, pattern_table, suggestions_table, templates_table, tools_table, transform_line,
    validation_lines,
};
use fireems_ingest::{CsvTable, read_csv_table};
use fireems_map::{
    ConfidenceThresholds, FileTemplateStore, MappingEngine, MappingError, MappingSession,
    TemplateStore, deserialize_mappings, serialize_mappings,
};
use fireems_model::{FieldMapping, MappingSuggestion};
use fireems_schemas::{SchemaRegistry, ToolSchema};
use fireems_transform::validate_with_samples;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{
    Cli, DetectArgs, MappingSourceArgs, SuggestArgs, TemplatesCommand, ToolsArgs, TransformArgs,
    ValidateArgs,
};

/// Settings and schemas shared by every command.
pub struct AppContext {
    pub settings: Settings,
    pub registry: SchemaRegistry,
}

impl AppContext {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        let overrides = Overrides {
            min_confidence: cli.min_confidence,
            templates_dir: cli.templates_dir.clone(),
            schemas_dir: cli.schemas_dir.clone(),
        };
        let settings = Settings::resolve(&config, &overrides, |key| std::env::var(key).ok())?;
        let registry = SchemaRegistry::with_overrides(settings.schemas_dir.as_deref())
            .context("load tool schemas")?;
        info!(
            tools = registry.len(),
            min_confidence = settings.min_confidence,
            "loaded settings"
        );
        Ok(Self { settings, registry })
    }

    fn schema(&self, tool_id: &str) -> Result<&ToolSchema> {
        self.registry.get(tool_id).with_context(|| {
            format!("unknown tool '{tool_id}' (run `fireems tools` to list tools)")
        })
    }

    fn template_store(&self) -> Result<FileTemplateStore> {
        let dir = self.settings.require_templates_dir()?;
        FileTemplateStore::new(dir)
    }

    fn thresholds(&self) -> ConfidenceThresholds {
        ConfidenceThresholds {
            low: self.settings.min_confidence,
            ..ConfidenceThresholds::default()
        }
    }
}

fn read_upload(path: &Path) -> Result<CsvTable> {
    let table = read_csv_table(path)?;
    if table.headers.is_empty() {
        bail!("no columns found in {}", path.display());
    }
    info!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read upload"
    );
    Ok(table)
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{contents}").context("write to stdout")
        }
    }
}

/// Loads a mapping and the tool it belongs to.
///
/// A template brings its own tool; a mapping file needs `--tool`.
fn load_mapping(
    ctx: &AppContext,
    source: &MappingSourceArgs,
    tool: Option<&str>,
) -> Result<(Vec<FieldMapping>, String)> {
    if let Some(id) = &source.template {
        let store = ctx.template_store()?;
        let template = store
            .load(id)?
            .with_context(|| format!("template '{id}' not found"))?;
        if let Some(tool) = tool
            && tool != template.target_tool_id
        {
            return Err(MappingError::ToolMismatch {
                expected: tool.to_string(),
                found: template.target_tool_id,
            }
            .into());
        }
        return Ok((template.mappings, template.target_tool_id));
    }

    let Some(path) = &source.mapping else {
        bail!("pass --mapping or --template");
    };
    let Some(tool) = tool else {
        bail!("--tool is required with --mapping");
    };
    let json =
        fs::read_to_string(path).with_context(|| format!("read mapping: {}", path.display()))?;
    let mappings =
        deserialize_mappings(&json).with_context(|| format!("parse mapping: {}", path.display()))?;
    Ok((mappings, tool.to_string()))
}

pub fn run_tools(ctx: &AppContext, args: &ToolsArgs) -> Result<()> {
    match &args.tool {
        Some(tool) => {
            let schema = ctx.schema(tool)?;
            println!("{} ({})", schema.tool.name, schema.tool.id);
            if !schema.tool.description.is_empty() {
                println!("{}", schema.tool.description);
            }
            println!("{}", fields_table(&schema.fields));
        }
        None => println!("{}", tools_table(&ctx.registry)),
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestReport<'a> {
    tool: &'a str,
    suggestions: &'a [MappingSuggestion],
    unmapped_columns: &'a [String],
}

pub fn run_suggest(ctx: &AppContext, args: &SuggestArgs) -> Result<()> {
    let schema = ctx.schema(&args.tool)?;
    let table = read_upload(&args.csv)?;
    let engine = MappingEngine::new(schema.fields.clone(), ctx.settings.min_confidence);
    let result = engine.suggest(&table.headers);

    if args.json {
        let report = SuggestReport {
            tool: schema.id(),
            suggestions: &result.suggestions,
            unmapped_columns: &result.unmapped_columns,
        };
        write_output(None, &serde_json::to_string_pretty(&report)?)?;
    } else {
        let thresholds = ctx.thresholds();
        println!("{}", suggestions_table(&result, &thresholds));
        let counts = result.count_by_level(&thresholds);
        for (level, count) in counts.iter().rev() {
            println!("{count} {}", level.description());
        }
        if let Some(mean) = result.mean_confidence() {
            println!("Mean confidence: {mean:.0}");
        }
        if !result.unmapped_columns.is_empty() {
            println!("Unmapped columns: {}", result.unmapped_columns.join(", "));
        }
    }

    if args.save_template.is_none() && args.write_mapping.is_none() {
        return Ok(());
    }

    let mut session = MappingSession::new(
        schema.id(),
        schema.fields.clone(),
        table.headers.clone(),
        ctx.settings.min_confidence,
    );
    let accepted = session.accept_all();
    let summary = session.summary();
    if !summary.required_complete() {
        warn!(
            required = summary.required_fields,
            mapped = summary.required_mapped,
            "accepted mapping leaves required fields open"
        );
    }

    if let Some(path) = &args.write_mapping {
        let json = serialize_mappings(session.mappings().as_slice())?;
        write_output(Some(path), &json)?;
        eprintln!("Wrote {accepted} mappings to {}", path.display());
    }
    if let Some(name) = &args.save_template {
        let store = ctx.template_store()?;
        let template = session.to_template(name.as_str());
        store.save(&template)?;
        eprintln!(
            "Saved template '{}' ({}) with {accepted} mappings",
            template.name, template.id
        );
    }
    Ok(())
}

/// Returns whether the mapping is valid.
pub fn run_validate(ctx: &AppContext, args: &ValidateArgs) -> Result<bool> {
    let (mappings, tool) = load_mapping(ctx, &args.source, args.tool.as_deref())?;
    let schema = ctx.schema(&tool)?;
    let samples = match &args.csv {
        Some(path) => read_upload(path)?.records(),
        None => Vec::new(),
    };
    let result = validate_with_samples(&mappings, &schema.fields, &samples);

    if args.json {
        write_output(None, &serde_json::to_string_pretty(&result)?)?;
    } else {
        for line in validation_lines(&result) {
            println!("{line}");
        }
    }
    Ok(result.is_valid)
}

pub fn run_detect(args: &DetectArgs) -> Result<()> {
    let table = read_upload(&args.csv)?;
    let pattern = detect_layout(&table);
    if args.json {
        write_output(None, &serde_json::to_string_pretty(&pattern)?)?;
    } else {
        println!("{}", pattern_table(&pattern));
        println!("{}", pattern.description);
    }
    Ok(())
}

/// Returns false when validation errors stopped the transform.
pub fn run_transform(ctx: &AppContext, args: &TransformArgs) -> Result<bool> {
    let (mappings, tool) = load_mapping(ctx, &args.source, args.tool.as_deref())?;
    let schema = ctx.schema(&tool)?;
    let table = read_upload(&args.csv)?;
    let handoff = prepare_handoff(mappings, &schema.fields, &table, !args.no_datetime_plan);

    if !handoff.planned_targets.is_empty() {
        eprintln!(
            "Filled from detected date/time columns: {}",
            handoff.planned_targets.join(", ")
        );
    }
    for line in validation_lines(&handoff.validation) {
        eprintln!("{line}");
    }
    if !handoff.validation.is_valid && !args.force {
        return Ok(false);
    }

    let output = handoff.transformer.transform(&table.records());
    for error in &output.errors {
        eprintln!(
            "record {}: {} -> {}: {}",
            error.index + 1,
            error.source_field,
            error.target_field,
            error.message
        );
    }
    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&output)?)?;
    eprintln!("{}", transform_line(&output.metadata));
    Ok(true)
}

/// Returns false when a template to delete does not exist.
pub fn run_templates(ctx: &AppContext, command: &TemplatesCommand) -> Result<bool> {
    let store = ctx.template_store()?;
    match command {
        TemplatesCommand::List { tool } => {
            let templates = match tool {
                Some(tool) => store.list_for_tool(tool)?,
                None => store.list()?,
            };
            if templates.is_empty() {
                println!("No templates in {}", store.base_dir().display());
            } else {
                println!("{}", templates_table(&templates));
            }
            Ok(true)
        }
        TemplatesCommand::Show { id } => {
            let template = store
                .load(id)?
                .with_context(|| format!("template '{id}' not found"))?;
            write_output(None, &serde_json::to_string_pretty(&template)?)?;
            Ok(true)
        }
        TemplatesCommand::Delete { id } => {
            let deleted = store.delete(id)?;
            if deleted {
                println!("Deleted template '{id}'");
            } else {
                eprintln!("Template '{id}' not found");
            }
            Ok(deleted)
        }
    }
}
