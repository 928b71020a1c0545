use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Filter JSON documents with a MongoDB-style query language
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config with saved filters, operator aliases and output defaults
    #[arg(short, long, global = true, env = "JSON_FILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Print diagnostics to stderr (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress diagnostics
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the documents matching a filter
    Match {
        /// Query text, e.g. '{"user.level": {"$gt": 10}}'
        #[arg(required_unless_present = "name")]
        query: Option<String>,

        /// Use a filter saved in the config instead of QUERY
        #[arg(short, long, conflicts_with = "query")]
        name: Option<String>,

        /// Document files: a JSON array, a single JSON value, or one JSON value
        /// per line. Reads stdin when omitted.
        #[arg(short, long = "file", num_args = 1..)]
        files: Vec<PathBuf>,

        /// Print only the number of matches
        #[arg(long)]
        count: bool,

        /// Print documents that do not match
        #[arg(long)]
        invert: bool,

        /// Report match errors and keep going
        #[arg(long)]
        skip_errors: bool,
    },
    /// Compile a filter and print its tree
    Check {
        #[arg(required_unless_present = "name")]
        query: Option<String>,

        #[arg(short, long, conflicts_with = "query")]
        name: Option<String>,
    },
    /// List the available operators
    Operators,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
