pub mod cli;
pub mod config;
pub mod context;
pub mod documents;
pub mod error;
pub mod filter;
pub mod operator;
pub mod search;

use colored::Colorize;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use serde_json::json;
use std::sync::Arc;

pub use cli::{Cli, ColorMode, Commands, OutputFormat, cli_parse};
pub use config::{FilterConfig, load_config};
pub use context::{Selector, normalize_brackets, resolve, split_path};
pub use error::{DefinitionError, Error, EvalError, MatchError, ParseError};
pub use filter::{Filter, FilterNode, Operand, parse, parse_operand};
pub use operator::{
    EvalResult, OperandKind, Operator, OperatorRegistry, OperatorSpec, default_registry,
};

/// Query text from the command line, or the named filter from the config
fn query_text<'a>(
    query: Option<&'a str>,
    name: Option<&str>,
    config: &'a FilterConfig,
) -> Result<&'a str, Error> {
    match (query, name) {
        (Some(query), _) => Ok(query),
        (None, Some(name)) => config
            .saved_filter(name)
            .ok_or_else(|| Error::Usage(format!("No saved filter named '{name}' in config"))),
        (None, None) => Err(Error::Usage("A query or a saved filter name is required".into())),
    }
}

fn arity_label(operator: &Operator) -> String {
    if operator.kind() != OperandKind::Array {
        return "-".to_string();
    }
    match (operator.min_operands(), operator.max_operands()) {
        (min, Some(max)) if min == max => min.to_string(),
        (min, Some(max)) => format!("{min}..{max}"),
        (min, None) => format!("{min}.."),
    }
}

fn operators_table(registry: &OperatorRegistry) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Operator", "Operand", "Arity", "Right-handed"]);
    for operator in registry.operators() {
        table.add_row(vec![
            Cell::new(operator.name()),
            Cell::new(operator.kind()),
            Cell::new(arity_label(operator)),
            Cell::new(if operator.is_right_handed() { "yes" } else { "" }),
        ]);
    }
    table
}

fn to_json_text(value: &serde_json::Value, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_else(|_| "{\"error\":\"failed to serialize output\"}".into())
}

pub fn run() -> Result<(), Error> {
    let cli = cli_parse();
    let config = load_config(cli.config.as_deref())?;
    let format = cli.format;
    let color_mode = cli.color;
    let verbose = cli.verbose;
    let quiet = cli.quiet;
    let pretty = config.output.pretty;

    match color_mode {
        ColorMode::Always => unsafe {
            std::env::set_var("CLICOLOR_FORCE", "1");
        },
        ColorMode::Never => unsafe {
            std::env::set_var("NO_COLOR", "1");
        },
        ColorMode::Auto => {}
    }

    if verbose > 0 && !quiet {
        eprintln!("Verbosity level: {}", verbose);
        eprintln!("Color mode: {:?}", color_mode);
        if let Some(config_path) = &cli.config {
            eprintln!("Config file: {}", config_path.display());
        }
        if !config.aliases.is_empty() {
            eprintln!("Operator aliases: {}", config.aliases.len());
        }
    }

    let registry = config.registry()?;

    match &cli.command {
        Commands::Match {
            query,
            name,
            files,
            count,
            invert,
            skip_errors,
        } => {
            let text = query_text(query.as_deref(), name.as_deref(), &config)?;
            let filter = Filter::create_with(text, Arc::clone(&registry))?;
            if verbose > 0 && !quiet {
                eprintln!("Filter: {}", filter);
            }

            let documents = documents::read_documents(files.as_slice())?;
            let options = search::SearchOptions {
                invert: *invert,
                skip_errors: *skip_errors,
            };
            let outcome = search::collect_match_indices(&documents, &filter, options)?;

            if !quiet {
                for skipped in &outcome.skipped {
                    let document = &documents[skipped.idx];
                    eprintln!(
                        "{} {}#{}: {}",
                        "skipped".red().bold(),
                        document.source,
                        document.index,
                        skipped.error
                    );
                }
            }
            if verbose > 0 && !quiet {
                eprintln!(
                    "Matched {} of {} documents",
                    outcome.matches.len(),
                    documents.len()
                );
            }

            let output = match (format, *count) {
                (OutputFormat::Text, false) => search::format_search_text(&documents, &outcome),
                (OutputFormat::Text, true) => search::format_search_count_text(&outcome),
                (OutputFormat::Json, false) => {
                    let mut json = search::format_search_json(
                        &filter,
                        &documents,
                        &outcome,
                        config.output.show_documents,
                        pretty,
                    );
                    json.push('\n');
                    json
                }
                (OutputFormat::Json, true) => {
                    let mut json = search::format_search_count_json(&outcome, pretty);
                    json.push('\n');
                    json
                }
            };
            print!("{output}");
        }
        Commands::Check { query, name } => {
            let text = query_text(query.as_deref(), name.as_deref(), &config)?;
            let filter = Filter::create_with(text, Arc::clone(&registry))?;

            match format {
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!(
                            "{} {} node(s)",
                            "valid".green().bold(),
                            filter.root().size()
                        );
                    }
                    println!("{}", filter);
                }
                OutputFormat::Json => {
                    let report = json!({
                        "valid": true,
                        "nodes": filter.root().size(),
                        "filter": filter.to_string(),
                    });
                    println!("{}", to_json_text(&report, pretty));
                }
            }
        }
        Commands::Operators => match format {
            OutputFormat::Text => println!("{}", operators_table(&registry)),
            OutputFormat::Json => {
                let specs: Vec<OperatorSpec> =
                    registry.operators().iter().map(|op| op.spec()).collect();
                println!("{}", to_json_text(&json!(specs), pretty));
            }
        },
    }

    Ok(())
}
