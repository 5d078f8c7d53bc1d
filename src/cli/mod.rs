use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ConfigLoader, ConfigPaths};

pub mod commands;

use self::commands::{DistanceArgs, ExpiryArgs, FilterArgs, ListArgs};

#[derive(Parser, Debug)]
#[command(
    name = "foodrescue",
    version,
    about = "Expiry badges, table filtering and distances for Food Rescue donations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file location (takes precedence over FOODRESCUE_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show days left and the urgency badge for one or more dates
    Expiry(ExpiryArgs),
    /// Filter a tab-separated table (first line is the header)
    Filter(FilterArgs),
    /// Great-circle distance between two points in kilometres
    Distance(DistanceArgs),
    /// Render a donation board from a JSON file
    List(ListArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;

    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_paths(ConfigPaths::from_override(path.clone())),
        None => ConfigLoader::discover()?,
    };
    let config = loader.load_or_init()?;
    tracing::debug!(config = %loader.paths().config_file.display(), "configuration loaded");

    match cli.command {
        Commands::Expiry(args) => commands::expiry(&config, args),
        Commands::Filter(args) => commands::filter(&config, args),
        Commands::Distance(args) => commands::distance(args),
        Commands::List(args) => commands::list(&config, args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
