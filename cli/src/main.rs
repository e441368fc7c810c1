//! Samyama constraint CLI: define, list and clear cardinality constraints
//!
//! Operates directly on the RocksDB property store the engine reads from.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use samyama_constraints::{parse_constraint, ConstraintConfig, ConstraintSet};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "samyama-constrain", version, about = "Samyama cardinality constraint CLI")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "SAMYAMA_CONSTRAINT_CONFIG")]
    config: Option<PathBuf>,

    /// RocksDB data directory (overrides the configuration)
    #[arg(long, global = true, env = "SAMYAMA_CONSTRAINT_DATA")]
    data_path: Option<PathBuf>,

    /// Property key holding the constraints (overrides the configuration)
    #[arg(long, global = true)]
    key: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a pattern and store it as a new constraint
    Define {
        /// Pattern, e.g. "(:Person)-[:WORKS_FOR]->(:Company) TO many:1"
        #[arg(required = true, num_args = 1..)]
        pattern: Vec<String>,
    },
    /// Parse a pattern without storing it
    Check {
        #[arg(required = true, num_args = 1..)]
        pattern: Vec<String>,
    },
    /// List stored constraints
    List,
    /// Remove all stored constraints
    Clear,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConstraintConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConstraintConfig::default(),
    };
    if let Some(path) = cli.data_path {
        config.data_path = path;
    }
    if let Some(key) = cli.key {
        config.storage_key = key;
    }

    // Parsing needs no storage
    if let Commands::Check { pattern } = &cli.command {
        let constraint = parse_constraint(&pattern.join(" "))?;
        println!("{}", constraint);
        return Ok(());
    }

    debug!(path = %config.data_path.display(), key = %config.storage_key, "Opening constraint store");
    let store = config
        .open_store()
        .with_context(|| format!("opening store at {}", config.data_path.display()))?;
    let persister = config.persister(store);

    match cli.command {
        Commands::Define { pattern } => {
            let constraint = persister.define(&pattern.join(" "))?;
            println!("Defined {}", constraint);
        }
        Commands::List => {
            let constraints = persister.restore()?;
            print_constraints(&constraints, &cli.format)?;
        }
        Commands::Clear => {
            persister.clear()?;
            println!("Cleared constraints under '{}'", config.storage_key);
        }
        Commands::Check { .. } => {}
    }

    Ok(())
}

fn print_constraints(constraints: &ConstraintSet, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = constraints
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "pattern": c.to_string(),
                        "from": c.from_name(),
                        "to": c.to_name(),
                        "type": c.type_name(),
                        "direction": c.direction().name(),
                        "from_cardinality": [c.min_from(), c.max_from()],
                        "to_cardinality": [c.min_to(), c.max_to()],
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            if constraints.is_empty() {
                println!("(no constraints)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["#", "From", "Type", "Direction", "To", "From count", "To count"]);

            for (i, c) in constraints.iter().enumerate() {
                table.add_row(vec![
                    i.to_string(),
                    c.from_name().to_string(),
                    c.type_name().to_string(),
                    c.direction().name().to_string(),
                    c.to_name().to_string(),
                    c.from_cardinality().to_string(),
                    c.to_cardinality().to_string(),
                ]);
            }

            println!("{}", table);
            println!("{} constraint(s)", constraints.len());
        }
    }
    Ok(())
}
