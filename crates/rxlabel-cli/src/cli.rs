//! CLI argument definitions for rxlabel.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rxlabel",
    version,
    about = "Resolve drug names to their labelled indications and ICD-10 codes",
    long_about = "Resolve a drug name against a corpus of drug labels and code the\n\
                  selected label's indication text against ICD-10.\n\n\
                  Data locations come from rxlabel.toml (see --config)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: $RXLABEL_CONFIG, then ./rxlabel.toml).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve a drug name to one label and its ICD-10 codes.
    Resolve(ResolveArgs),

    /// Fuzzy search the label corpus by drug name.
    Search(SearchArgs),

    /// List every ingested label.
    List,

    /// Match free indication text against ICD-10.
    Match(MatchArgs),

    /// Report which data files would be loaded and what they contain.
    Doctor,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Drug name as typed by the user.
    #[arg(value_name = "DRUG")]
    pub drug: String,
}

#[derive(Args)]
pub struct SearchArgs {
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of candidates (default: search.default_top_n).
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,
}

#[derive(Args)]
pub struct MatchArgs {
    /// Indication text, e.g. "treatment of mild to moderate heart failure".
    #[arg(value_name = "TEXT")]
    pub text: String,
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
