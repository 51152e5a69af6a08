/// Main entry point for the habit tracker server
///
/// This file loads `.env`, parses command line arguments, sets up logging
/// and starts the HTTP server with its daily reset job.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use habit_tracker::config::{self, DEFAULT_HOST, DEFAULT_PORT};
use habit_tracker::scheduler::DEFAULT_RESET_SCHEDULE;
use habit_tracker::{HabitTrackerServer, ServerConfig};

/// Command line arguments for the habit tracker server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "HABIT_TRACKER_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind to
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Cron expression for the daily reset job, in local time
    #[arg(long, env = "HABIT_TRACKER_RESET_CRON", default_value = DEFAULT_RESET_SCHEDULE)]
    reset_cron: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(args: &Args) {
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    // RUST_LOG wins over the flags when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("habit_tracker={},tower_http={}", log_level, log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(&args);

    info!("Starting habit tracker v{}", env!("CARGO_PKG_VERSION"));

    let database = match args.database {
        Some(path) => path,
        None => config::default_database_path()?,
    };
    info!("Using database at: {}", database.display());

    let server_config = ServerConfig {
        database,
        host: args.host,
        port: args.port,
        reset_schedule: args.reset_cron,
    };

    let server = HabitTrackerServer::new(server_config)?;
    server.run().await?;

    info!("Habit tracker shutdown complete");
    Ok(())
}
