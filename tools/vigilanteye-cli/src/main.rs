//! VigilantEye CLI — Command-line interface for live monitoring and
//! session history.
//!
//! Usage:
//!   vigilanteye monitor [OPTIONS]       Run a monitoring session
//!   vigilanteye history [OPTIONS]       List recent sessions
//!   vigilanteye clear-history --yes     Delete all session history
//!   vigilanteye settings                Show camera settings
//!   vigilanteye settings set [OPTIONS]  Update camera settings

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "vigilanteye",
    about = "Live camera monitoring with motion detection and session history",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a monitoring session against the synthetic camera
    Monitor {
        /// How long to monitor (seconds)
        #[arg(long, default_value = "10")]
        duration: u64,

        /// Enable motion detection
        #[arg(long)]
        motion: bool,

        /// Motion sensitivity [0.0, 1.0]
        #[arg(long, default_value = "0.3")]
        sensitivity: f64,

        /// Enable object detection
        #[arg(long)]
        objects: bool,

        /// Record the whole session to a WebM artifact
        #[arg(long)]
        record: bool,

        /// Take a screenshot halfway through
        #[arg(long)]
        screenshot: bool,

        /// Directory for recording/screenshot artifacts
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// List recent sessions from the persisted history
    History {
        /// Maximum number of sessions to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Emit the raw session records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the entire session history
    ClearHistory {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show or update camera settings
    Settings {
        #[command(subcommand)]
        action: Option<commands::settings::SettingsAction>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    vigilanteye_common::logging::init_logging(&vigilanteye_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Monitor {
            duration,
            motion,
            sensitivity,
            objects,
            record,
            screenshot,
            output,
        } => {
            commands::monitor::run(
                duration,
                motion,
                sensitivity,
                objects,
                record,
                screenshot,
                output,
            )
            .await
        }
        Commands::History { limit, json } => commands::history::run(limit, json),
        Commands::ClearHistory { yes } => commands::history::clear(yes),
        Commands::Settings { action } => commands::settings::run(action),
    }
}
