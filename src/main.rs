/// Main entry point for the Habit Momentum MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use habit_momentum_mcp::{HabitTrackerServer, TimelineOptions};

/// Directories tried for the default database, most preferred first
fn candidate_dirs() -> Vec<PathBuf> {
    [
        dirs::home_dir().map(|home| home.join(".habit_momentum")),
        dirs::data_dir().map(|data| data.join("habit_momentum")),
        dirs::config_dir().map(|config| config.join("habit_momentum")),
        std::env::current_dir().ok().map(|cwd| cwd.join(".habit_momentum")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Whether `dir` exists (or can be created) and accepts new files
fn is_writable(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".write_probe");
    let writable = std::fs::write(&probe, b"ok").is_ok();
    let _ = std::fs::remove_file(&probe);
    writable
}

/// Resolve `habits.db` in the first writable candidate directory,
/// falling back to the system temp directory
fn default_database_path() -> std::io::Result<PathBuf> {
    if let Some(dir) = candidate_dirs().into_iter().find(|dir| is_writable(dir)) {
        return Ok(dir.join("habits.db"));
    }

    let fallback = std::env::temp_dir().join("habit_momentum");
    std::fs::create_dir_all(&fallback)?;
    let path = fallback.join("habits.db");
    warn!("Using temporary directory for database: {}", path.display());
    Ok(path)
}

/// Command line arguments for the Habit Momentum MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, conflicts_with = "in_memory")]
    database: Option<PathBuf>,

    /// Keep all habits in memory only (nothing is written to disk)
    #[arg(long)]
    in_memory: bool,

    /// Days shown by the timeline when a request does not say (0 = whole history)
    #[arg(long, default_value_t = 90)]
    window_days: i64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_momentum_mcp={}", log_level))
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    info!("Starting Habit Momentum MCP server");

    let server = if args.in_memory {
        HabitTrackerServer::in_memory()?
    } else {
        let db_path = match args.database {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                path
            }
            None => default_database_path()?,
        };
        info!("Using database at: {}", db_path.display());
        HabitTrackerServer::new(db_path)?
    };

    let server = server.with_timeline_defaults(TimelineOptions {
        window_days: args.window_days,
        ..TimelineOptions::default()
    });

    server.run().await?;

    info!("Habit Momentum MCP server shutdown complete");
    Ok(())
}
