//! warden - scheduling toolkit for the game-server control panel.
//!
//! Usage:
//!   warden explain "<cron>"              Explain a stored cron expression
//!   warden weekly --at 04:30 --days 1,3,5  Encode a weekly schedule
//!   warden interval --every 30 --unit m  Encode an interval schedule
//!   warden preview "<cron>"              Show upcoming run times
//!   warden validate <tasks.yaml>         Check a task file
//!   warden versions                      List published server versions

use clap::{Parser, Subcommand};
use tracing::{error, info};
use warden::{
    encode_interval, encode_weekly, explain, load_tasks_from_file, resolve_tasks, IntervalUnit,
    Schedule, TimeOfDay,
};

#[cfg(feature = "http")]
use warden::{HttpVersionFetcher, VersionCatalog};

/// Default upstream manifest for the `versions` command.
#[cfg(feature = "http")]
const MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// warden - scheduling toolkit for the game-server control panel
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain a cron expression in plain words
    Explain {
        /// Cron expression, five-field or @every form
        #[arg(value_name = "EXPRESSION")]
        expression: String,
    },

    /// Encode a weekly schedule
    Weekly {
        /// Time of day, HH:MM
        #[arg(long)]
        at: TimeOfDay,

        /// Weekday numbers 0-6 (0 = Sunday); omit for every day
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
    },

    /// Encode an interval schedule
    Interval {
        /// Interval magnitude
        #[arg(long)]
        every: u32,

        /// Interval unit: m or h
        #[arg(long)]
        unit: IntervalUnit,
    },

    /// Show upcoming run times for a cron expression
    Preview {
        /// Cron expression, five-field or @every form
        #[arg(value_name = "EXPRESSION")]
        expression: String,

        /// Number of occurrences to show
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// IANA timezone the schedule runs in
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },

    /// Validate a YAML task file
    Validate {
        /// Path to the task file
        #[arg(value_name = "TASKS_FILE")]
        tasks_file: std::path::PathBuf,
    },

    /// List published server versions from the upstream manifest
    #[cfg(feature = "http")]
    Versions {
        /// Manifest URL
        #[arg(long, default_value = MANIFEST_URL)]
        manifest: String,

        /// Include snapshots as well as releases
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Explain { expression } => {
            println!("{}", explain(&expression));
        }
        Commands::Weekly { at, days } => {
            println!("{}", encode_weekly(at, &days));
        }
        Commands::Interval { every, unit } => {
            println!("{}", encode_interval(every, unit));
        }
        Commands::Preview {
            expression,
            count,
            timezone,
        } => {
            preview(&expression, count, &timezone)?;
        }
        Commands::Validate { tasks_file } => {
            validate_tasks(&tasks_file)?;
        }
        #[cfg(feature = "http")]
        Commands::Versions { manifest, all } => {
            list_versions(&manifest, all).await?;
        }
    }

    Ok(())
}

/// Print the next `count` occurrences of an expression.
fn preview(expression: &str, count: usize, timezone: &str) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = Schedule::with_timezone(expression, timezone)?;

    println!("{}", explain(expression));
    for occurrence in schedule.next_n(count)? {
        println!("  {}", occurrence.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

/// Validate every task in a task file.
fn validate_tasks(tasks_file: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Validating tasks in: {}", tasks_file.display());

    let config = load_tasks_from_file(tasks_file)?;

    match resolve_tasks(&config) {
        Ok(tasks) => {
            info!("All {} task(s) are valid:", tasks.len());
            for task in &tasks {
                info!(
                    "  - {} ({} on {}): {}",
                    task.name,
                    task.cron_expression,
                    task.server_id,
                    task.describe()
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// List versions from the upstream manifest.
#[cfg(feature = "http")]
async fn list_versions(manifest: &str, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = VersionCatalog::new(HttpVersionFetcher::new(manifest));

    let versions = if all {
        catalog.versions().await?
    } else {
        catalog.releases().await?
    };

    for version in &versions {
        match version.release_time {
            Some(released) => {
                println!("{}  ({})", version.id, released.format("%Y-%m-%d"));
            }
            None => println!("{}", version.id),
        }
    }

    Ok(())
}
