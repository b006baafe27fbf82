//! flowlat - evaluate information-flow policies from the command line
//!
//! Lattices are loaded from the JSON files named in the config file (or
//! given with `--lattices`), policies from text files or stdin.
//!
//! # Examples
//!
//! ```bash
//! # Decide a set of annotations against a policy
//! flowlat eval --policy share.flow \
//!     --annotation "DataType IPAddress" \
//!     --annotation "DataType IPAddress DataType AccountID"
//!
//! # Validate a policy and print it back
//! flowlat check --policy share.flow
//!
//! # Query a lattice directly
//! flowlat --lattices lattices.json lattice DataType --meet UniqueID Location
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod eval;
mod lattice;

use config::Config;

/// flowlat - ALLOW/DENY/EXCEPT policies over classification lattices
#[derive(Parser)]
#[command(name = "flowlat")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FLOWLAT_CONFIG")]
    #[arg(default_value = "~/.config/flowlat/config.toml")]
    config: String,

    /// Lattice JSON files, replacing the configured ones
    #[arg(short, long, value_name = "FILE")]
    lattices: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a policy to one or more annotations
    Eval(eval::EvalArgs),

    /// Parse a policy and print it in normalized form
    Check(eval::CheckArgs),

    /// Show a lattice or compute meet, join or precede
    Lattice(lattice::LatticeArgs),

    /// Show current configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("flow_lattice=debug,flowlat=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Apply `--lattices` and pick the directory relative lattice paths start from.
fn resolve_lattices(mut config: Config, cli_files: Vec<String>, config_path: &str) -> (Config, PathBuf) {
    if !cli_files.is_empty() {
        config.lattices.files = cli_files;
        return (config, PathBuf::from("."));
    }
    let base_dir = Path::new(config_path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    (config, base_dir)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = shellexpand::tilde(&cli.config).to_string();
    debug!(config_path = %config_path, "starting flowlat");

    let config = Config::load(&config_path)?;
    let (config, base_dir) = resolve_lattices(config, cli.lattices, &config_path);

    match cli.command {
        Commands::Eval(args) => eval::execute(args, config.load_registry(&base_dir)?),
        Commands::Check(args) => eval::check(args, config.load_registry(&base_dir)?),
        Commands::Lattice(args) => lattice::execute(args, config.load_registry(&base_dir)?),
        Commands::Config => config::show(&config, &config_path),
    }
}
