use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use gettext_extract::commands;
use gettext_extract::config::Config;
use gettext_extract::logging::{self, LogLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gettext-extract")]
#[command(author, version, about = "Extract translatable strings into gettext catalogs", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract strings from the configured input files, one catalog per file
    Extract {
        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = LogLevel::parse(&cli.log_level)
        .ok_or_else(|| anyhow!("Unknown log level: {}", cli.log_level))?;
    logging::init(level);

    // Load configuration
    let config = Config::load_or_default(cli.config.as_ref())?;

    match cli.command {
        Commands::Extract { output } => commands::extract::run(&config, output)?,
    }

    Ok(())
}
