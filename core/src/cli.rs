use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use crate::ast::{link::link_model, Model};
use crate::cells::{column_index_to_letters, column_letters_to_index};
use crate::config::Config;
use crate::diagnostics::Diagnostic;
use crate::expr::OperatorRegistry;
use crate::meta::MetaInformationRegistry;
use crate::validation::{has_errors, ValidationContext, Validator};

#[derive(Parser)]
#[command(name = "conduit")]
#[command(about = "Conduit - Semantic checks for data-pipeline models", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Link and validate a parsed model (JSON)
    Check {
        /// Path to the model file
        model: PathBuf,

        /// Runtime parameter value, repeatable (KEY=VALUE)
        #[arg(short = 'e', long = "env", value_parser = parse_parameter)]
        parameters: Vec<(String, String)>,

        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List built-in block types and constraint types
    Types,

    /// List the validation rules
    Rules,

    /// Convert between a 0-based column index and column letters
    Column {
        /// Index (e.g. 27) or letters (e.g. AB)
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_parameter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE but got \"{}\"", raw)),
    }
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments
pub fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

fn run_cli_with_args(cli: Cli) -> Result<()> {
    // Eagerly load and validate configuration before executing any command
    let config = Config::builder()
        .config_path(cli.config.map(PathBuf::from))
        .build()?;

    match cli.command {
        Commands::Check {
            model,
            parameters,
            format,
        } => {
            let diagnostics = check_model_file(&model, &config, parameters)?;
            print_diagnostics(&diagnostics, format)?;
            if has_errors(&diagnostics) {
                std::process::exit(1);
            }
        }

        Commands::Types => {
            let registry = MetaInformationRegistry::with_builtins();
            println!("Block types:");
            for info in registry.block_types() {
                println!("  {:<28} {} -> {}", info.name, info.input, info.output);
                if let Some(docs) = &info.docs {
                    println!("      {}", first_line(docs));
                }
            }
            println!("\nConstraint types:");
            for info in registry.constraint_types() {
                println!("  {:<28} on {}", info.name, info.applicable_type);
                if let Some(docs) = &info.docs {
                    println!("      {}", first_line(docs));
                }
            }
        }

        Commands::Rules => {
            for (id, description) in Validator::new().rules() {
                println!("{:<24} {}", id, description);
            }
        }

        Commands::Column { value } => println!("{}", convert_column(&value)?),
    }

    Ok(())
}

/// Load, link and validate one model file
pub fn check_model_file(
    path: &Path,
    config: &Config,
    parameters: Vec<(String, String)>,
) -> Result<Vec<Diagnostic>> {
    let mut model = Model::from_path(path)
        .with_context(|| format!("Failed to load model {}", path.display()))?;
    debug!(path = %path.display(), "model loaded");

    let registry = MetaInformationRegistry::with_builtins();
    let operators = OperatorRegistry::standard();
    let options = config.validation_options()?;
    let mut runtime_parameters = config.runtime_parameters();
    for (name, value) in parameters {
        runtime_parameters.set(name, value);
    }

    let mut diagnostics = link_model(&mut model, &registry);
    let context = ValidationContext::new(
        &model,
        &registry,
        &operators,
        &runtime_parameters,
        &options,
    );
    diagnostics.extend(Validator::new().validate(&context));
    info!(
        path = %path.display(),
        diagnostics = diagnostics.len(),
        "model checked"
    );
    Ok(diagnostics)
}

fn print_diagnostics(diagnostics: &[Diagnostic], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if diagnostics.is_empty() {
                println!("No problems found");
            }
            for diagnostic in diagnostics {
                println!("{}", diagnostic);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(diagnostics)?);
        }
    }
    Ok(())
}

fn convert_column(value: &str) -> Result<String> {
    if let Ok(index) = value.parse::<usize>() {
        return Ok(column_index_to_letters(index));
    }
    let index = column_letters_to_index(&value.to_ascii_uppercase())
        .with_context(|| format!("\"{}\" is neither a column index nor column letters", value))?;
    Ok(index.to_string())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
