//! Schematic CLI library
//!
//! This module contains the core CLI logic for the Schematic diagram tool:
//! reading input files, picking formats from extensions, and writing
//! converted documents, validation reports and summaries.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, ConvertArgs, InspectArgs, ValidateArgs};

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::Path,
};

use log::{info, warn};
use serde::Serialize;

use schematic::{Engine, Format, Imported, Notation, SchematicError, ValidationResult};

use error_adapter::{DiagnosticAdapter, render};

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// `validate` found at least one error.
    Invalid,
}

/// Run the Schematic CLI application, writing reports to standard output.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `SchematicError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Unknown input or output formats
/// - Import and export errors
pub fn run(args: &Args) -> Result<Status, SchematicError> {
    let stdout = io::stdout();
    run_with(args, &mut stdout.lock())
}

/// Run the Schematic CLI application, writing reports to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with(args: &Args, out: &mut dyn Write) -> Result<Status, SchematicError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let engine = Engine::new(app_config);

    match &args.command {
        Command::Convert(convert_args) => convert(&engine, convert_args, out),
        Command::Validate(validate_args) => validate(&engine, validate_args, out),
        Command::Inspect(inspect_args) => inspect(&engine, inspect_args, out),
    }
}

fn convert(
    engine: &Engine,
    args: &ConvertArgs,
    out: &mut dyn Write,
) -> Result<Status, SchematicError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Converting diagram"
    );

    let from = resolve_format(&args.input, args.from)?;
    let to = match (args.to, &args.output) {
        (Some(to), _) => to,
        (None, Some(output)) => resolve_format(output, None)?,
        (None, None) => {
            return Err(SchematicError::Input(
                "`--to` is required when writing to standard output".to_string(),
            ));
        }
    };

    let imported = read_input(engine, &args.input, from, args.from_dialect)?;
    let dialect = args
        .dialect
        .unwrap_or_else(|| engine.config().export().sql().dialect());
    let output = engine.export_with(to, dialect, &imported.graph)?;

    match &args.output {
        Some(path) => {
            fs::write(path, output)?;
            info!(output_file = path.as_str(), format:% = to; "Diagram exported successfully");
        }
        None => out.write_all(output.as_bytes())?,
    }

    Ok(Status::Success)
}

fn validate(
    engine: &Engine,
    args: &ValidateArgs,
    out: &mut dyn Write,
) -> Result<Status, SchematicError> {
    info!(input_path = args.input; "Validating diagram");

    let format = resolve_format(&args.input, args.format)?;
    let imported = read_input(engine, &args.input, format, None)?;
    let notation = args.notation.or(imported.notation_guess);
    let result = engine.validate(&imported.graph, notation);

    if args.json {
        let report = serde_json::to_string_pretty(&result)
            .map_err(|err| SchematicError::Io(err.into()))?;
        writeln!(out, "{report}")?;
    } else {
        write_issues(out, notation, &result)?;
    }

    if result.is_valid() {
        Ok(Status::Success)
    } else {
        Ok(Status::Invalid)
    }
}

fn write_issues(
    out: &mut dyn Write,
    notation: Option<Notation>,
    result: &ValidationResult,
) -> io::Result<()> {
    for issue in result.issues() {
        writeln!(out, "{issue}")?;
    }
    let notation = notation.map_or_else(|| "no notation".to_string(), |n| n.to_string());
    writeln!(
        out,
        "{notation}: {} error(s), {} warning(s), {} info",
        result.errors().count(),
        result.warnings().count(),
        result.infos().count()
    )
}

/// Summary printed by `inspect`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    format: String,
    name: Option<&'a str>,
    notation: Option<Notation>,
    nodes: usize,
    edges: usize,
    node_kinds: BTreeMap<&'static str, usize>,
    edge_kinds: BTreeMap<&'static str, usize>,
    warnings: usize,
}

fn inspect(
    engine: &Engine,
    args: &InspectArgs,
    out: &mut dyn Write,
) -> Result<Status, SchematicError> {
    info!(input_path = args.input; "Inspecting diagram");

    let format = resolve_format(&args.input, args.format)?;
    let imported = read_input(engine, &args.input, format, None)?;
    let graph = &imported.graph;

    let mut node_kinds = BTreeMap::new();
    for node in graph.nodes() {
        *node_kinds.entry(node.kind().tag()).or_insert(0) += 1;
    }
    let mut edge_kinds = BTreeMap::new();
    for edge in graph.edges() {
        *edge_kinds.entry(edge.kind().tag()).or_insert(0) += 1;
    }

    let summary = Summary {
        format: format.to_string(),
        name: graph.name(),
        notation: imported.notation_guess,
        nodes: graph.nodes().len(),
        edges: graph.edges().len(),
        node_kinds,
        edge_kinds,
        warnings: imported.warnings.len(),
    };

    if args.json {
        let report = serde_json::to_string_pretty(&summary)
            .map_err(|err| SchematicError::Io(err.into()))?;
        writeln!(out, "{report}")?;
    } else {
        write_summary(out, &summary)?;
    }

    Ok(Status::Success)
}

fn write_summary(out: &mut dyn Write, summary: &Summary<'_>) -> io::Result<()> {
    writeln!(out, "format:   {}", summary.format)?;
    if let Some(name) = summary.name {
        writeln!(out, "name:     {name}")?;
    }
    match summary.notation {
        Some(notation) => writeln!(out, "notation: {notation}")?,
        None => writeln!(out, "notation: unknown")?,
    }
    writeln!(out, "nodes:    {}", summary.nodes)?;
    for (kind, count) in &summary.node_kinds {
        writeln!(out, "  {kind}: {count}")?;
    }
    writeln!(out, "edges:    {}", summary.edges)?;
    for (kind, count) in &summary.edge_kinds {
        writeln!(out, "  {kind}: {count}")?;
    }
    writeln!(out, "warnings: {}", summary.warnings)
}

/// Read and import `path`, rendering skipped constructs as warnings.
fn read_input(
    engine: &Engine,
    path: &str,
    format: Format,
    dialect: Option<schematic::Dialect>,
) -> Result<Imported, SchematicError> {
    let source = fs::read_to_string(path)?;
    let imported = match dialect {
        Some(dialect) => engine.import_with(format, dialect, &source)?,
        None => engine.import(format, &source)?,
    };

    for warning in &imported.warnings {
        warn!("{}", render(&DiagnosticAdapter::new(warning, &source)));
    }
    Ok(imported)
}

/// Pick the format of `path`: the explicit one if given, otherwise by file
/// extension.
fn resolve_format(path: &str, explicit: Option<Format>) -> Result<Format, SchematicError> {
    if let Some(format) = explicit {
        return Ok(format);
    }

    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("bpmn" | "xml") => Ok(Format::ProcessXml),
        Some("sql" | "ddl") => Ok(Format::SqlDdl),
        Some("json") => Ok(Format::JsonPackage),
        _ => Err(SchematicError::Input(format!(
            "cannot infer the format of `{path}`; pass it explicitly"
        ))),
    }
}
