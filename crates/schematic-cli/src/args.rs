//! Command-line argument definitions for the Schematic CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Each subcommand names an input file; formats are taken
//! from the file extension unless given explicitly.

use clap::{Args as ClapArgs, Parser, Subcommand};

use schematic::{Dialect, Format, Notation};

/// Command-line arguments for the Schematic diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a diagram from one format to another
    Convert(ConvertArgs),
    /// Check a diagram against the rules of its notation
    Validate(ValidateArgs),
    /// Summarize the contents of a diagram
    Inspect(InspectArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ConvertArgs {
    /// Path to the input file
    pub input: String,

    /// Path to the output file; standard output when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Input format (process-xml, sql-ddl, json-package)
    #[arg(long)]
    pub from: Option<Format>,

    /// Output format (process-xml, sql-ddl, json-package)
    #[arg(long)]
    pub to: Option<Format>,

    /// SQL dialect to write (postgresql, mysql, sqlite)
    #[arg(long)]
    pub dialect: Option<Dialect>,

    /// SQL dialect to read (postgresql, mysql, sqlite)
    #[arg(long)]
    pub from_dialect: Option<Dialect>,
}

#[derive(ClapArgs, Debug)]
pub struct ValidateArgs {
    /// Path to the input file
    pub input: String,

    /// Notation to check against (process, entity-relationship, data-flow)
    #[arg(long)]
    pub notation: Option<Notation>,

    /// Input format (process-xml, sql-ddl, json-package)
    #[arg(long)]
    pub format: Option<Format>,

    /// Print the issues as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct InspectArgs {
    /// Path to the input file
    pub input: String,

    /// Input format (process-xml, sql-ddl, json-package)
    #[arg(long)]
    pub format: Option<Format>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}
