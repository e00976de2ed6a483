//! # Simstore Main Entry Point
//!
//! Command-line entry point for operating the simulation store database:
//! apply migrations and seeds, preview the drift pass, or check health.

use clap::{Parser, Subcommand};
use simstore::bootstrap::bootstrap;
use simstore::config::ConfigLoader;
use simstore::db::{health_check, init_pool};
use simstore::drift::DriftMigrator;
use simstore::logging::init_subscriber;

#[derive(Parser)]
#[command(name = "simstore", about = "CARLA simulation store operations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply baseline migrations, the drift pass, and seeds
    Up,
    /// Show what the drift pass would change, without applying it
    Check,
    /// Verify database connectivity
    Health,
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;
    init_subscriber(&config);

    match cli.command {
        Command::Up => {
            let db = init_pool(&config).await?;
            let report = bootstrap(&db, &config).await?;
            for step in &report.steps {
                println!("{}: {:?}", step.name, step.outcome);
            }
        }
        Command::Check => {
            let db = init_pool(&config).await?;
            let report = DriftMigrator::new(&db)
                .with_app_role(&config.app_role)
                .plan()
                .await?;
            for step in &report.steps {
                println!("{}: {:?}", step.name, step.outcome);
            }
        }
        Command::Health => {
            let db = init_pool(&config).await?;
            health_check(&db).await?;
            println!("database is healthy");
        }
        Command::Config => {
            println!("Loaded configuration for profile: {}", config.profile);
            if let Ok(redacted_json) = config.redacted_json() {
                println!("Configuration: {redacted_json}");
            }
        }
    }

    Ok(())
}
