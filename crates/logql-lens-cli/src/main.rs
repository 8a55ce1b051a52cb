use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use logql_lens_config::{Config, OutputFormat};
use logql_lens_engine::SyntaxKind;

mod commands;

/// Inspect LogQL queries: syntax nodes, label matchers and drilldown filters.
#[derive(Parser, Debug)]
#[command(name = "logql-lens")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path (default: ~/.config/logql-lens/config.toml)
    #[arg(short, long, env = "LOGQL_LENS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format, overrides the config file
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the named syntax nodes of a query in document order
    Nodes {
        /// Query text, or `-` to read stdin
        query: String,
        /// Only print nodes of this kind (repeatable)
        #[arg(short, long = "kind")]
        kinds: Vec<SyntaxKind>,
    },
    /// Print the label matchers of a query
    Matchers { query: String },
    /// Print the first `json` or `logfmt` stage of a query
    Parser { query: String },
    /// Print the drilldown filters of a query
    Filters {
        query: String,
        /// TOML table of label name to type code (I, S or P)
        #[arg(long)]
        label_types: Option<PathBuf>,
    },
    /// Report validity, query kind and service name
    Check { query: String },
    /// Print the matchers of every saved query
    Batch,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => match Config::load_from_path(path)? {
            Some(config) => config,
            None => bail!("Config file not found: {}", path.display()),
        },
        None => Config::load()?.unwrap_or_default(),
    };
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("Config path: {}", Config::config_path().display());

    let config = load_config(cli.config.as_ref())?;
    let format = cli.format.unwrap_or(config.output);

    let output = match &cli.command {
        Command::Nodes { query, kinds } => {
            commands::nodes(&commands::read_query(query)?, kinds, format)?
        }
        Command::Matchers { query } => commands::matchers(&commands::read_query(query)?, format)?,
        Command::Parser { query } => commands::parser(&commands::read_query(query)?, format)?,
        Command::Filters { query, label_types } => {
            let label_types = label_types
                .as_deref()
                .map(commands::load_label_types)
                .transpose()?;
            commands::filters(&commands::read_query(query)?, label_types.as_ref(), format)?
        }
        Command::Check { query } => {
            commands::check(&commands::read_query(query)?, &config.service_label, format)?
        }
        Command::Batch => {
            let files = config.query_files()?;
            if files.is_empty() {
                log::warn!("No saved query files matched the configured patterns");
            }
            commands::batch(&files, format)?
        }
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
