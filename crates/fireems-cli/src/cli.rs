//! Command line definitions for `fireems`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fireems",
    version,
    about = "Map CAD exports onto fire/EMS analysis tools",
    long_about = "Suggest, validate and apply column mappings from a CAD export \
                  to the field schema of a downstream fire/EMS tool.\n\n\
                  Settings are read from fireems.toml, then FIREEMS_* environment \
                  variables, then flags."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Config file (default: fireems.toml in the platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory of extra tool schema files.
    #[arg(long = "schemas-dir", value_name = "DIR", global = true)]
    pub schemas_dir: Option<PathBuf>,

    /// Directory where mapping templates are stored.
    #[arg(long = "templates-dir", value_name = "DIR", global = true)]
    pub templates_dir: Option<PathBuf>,

    /// Lowest score that still counts as a suggestion (0-100).
    #[arg(
        long = "min-confidence",
        value_name = "SCORE",
        value_parser = clap::value_parser!(u8).range(0..=100),
        global = true
    )]
    pub min_confidence: Option<u8>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List target tools, or the fields of one tool.
    Tools(ToolsArgs),

    /// Suggest a target field for every column of a CSV export.
    Suggest(SuggestArgs),

    /// Check a mapping against a tool schema.
    Validate(ValidateArgs),

    /// Detect which columns carry the incident date and time.
    Detect(DetectArgs),

    /// Apply a mapping to a CSV export and write tool records as JSON.
    Transform(TransformArgs),

    /// Manage saved mapping templates.
    #[command(subcommand)]
    Templates(TemplatesCommand),
}

#[derive(Args)]
pub struct ToolsArgs {
    /// Show the fields of this tool.
    #[arg(value_name = "TOOL")]
    pub tool: Option<String>,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Target tool id.
    #[arg(long = "tool", value_name = "TOOL")]
    pub tool: String,

    /// CSV export to map.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Accept every suggestion and save it as a template with this name.
    #[arg(long = "save-template", value_name = "NAME")]
    pub save_template: Option<String>,

    /// Write the mapping JSON for the accepted suggestions to this file.
    #[arg(long = "write-mapping", value_name = "PATH")]
    pub write_mapping: Option<PathBuf>,

    /// Print suggestions as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

/// Where a mapping comes from: a JSON file or a saved template.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct MappingSourceArgs {
    /// JSON array of field mappings.
    #[arg(long = "mapping", value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Id of a saved template.
    #[arg(long = "template", value_name = "ID")]
    pub template: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Target tool id (defaults to the template's tool).
    #[arg(long = "tool", value_name = "TOOL")]
    pub tool: Option<String>,

    #[command(flatten)]
    pub source: MappingSourceArgs,

    /// CSV export whose values are checked against the field types.
    #[arg(long = "csv", value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct DetectArgs {
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Print the result as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct TransformArgs {
    /// Target tool id (defaults to the template's tool).
    #[arg(long = "tool", value_name = "TOOL")]
    pub tool: Option<String>,

    #[command(flatten)]
    pub source: MappingSourceArgs,

    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Output file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Do not derive date/time mappings from the detected layout.
    #[arg(long = "no-datetime-plan")]
    pub no_datetime_plan: bool,

    /// Transform even when the mapping has validation errors.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum TemplatesCommand {
    /// List saved templates.
    List {
        /// Only templates for this tool.
        #[arg(long = "tool", value_name = "TOOL")]
        tool: Option<String>,
    },
    /// Print a template as JSON.
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Delete a template.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
