use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tickdown-cli", version, about = "Tickdown CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Run the countdown loop in the foreground
    Watch {
        /// Milliseconds between reconciliation sweeps (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Export past days' tasks to a text report
    Report {
        /// Directory to write the report into (overrides config)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export past days' tasks to a report, then delete them
    Purge {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Directory to write the report into (overrides config)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// User profile management
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Watch { interval_ms } => commands::watch::run(interval_ms),
        Commands::Report { out } => commands::report::run_report(out),
        Commands::Purge { yes, out } => commands::report::run_purge(yes, out),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
