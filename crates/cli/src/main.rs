//! Quiesce CLI - qs command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

/// Quiesce - debounced action scheduling
#[derive(Parser)]
#[command(name = "qs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the debounce demo (startup burst, category switch, counters)
    Run {
        /// Category to switch to after the startup burst
        #[arg(long, default_value = "essay")]
        category: String,

        /// Attempts per burst (default: 20)
        #[arg(long, default_value = "20")]
        burst: usize,

        /// Path to a TOML delay profile
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Override the resolved delay, in milliseconds
        #[arg(long)]
        delay_ms: Option<f64>,
    },
    /// Show the category -> delay table
    Profile {
        /// Path to a TOML delay profile
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            category,
            burst,
            profile,
            delay_ms,
        } => cmd::run::run(&category, burst, profile.as_deref(), delay_ms).await,
        Commands::Profile { profile } => cmd::profile::run(profile.as_deref()).await,
    }
}
