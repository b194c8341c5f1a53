//! HAPI Indexer - mirrors registry records into SQLite
//!
//! This binary provides:
//! - Database initialisation
//! - Status and record counts
//! - Seeding: bootstrapping the configured networks into a registry and
//!   mirroring them into the database

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hapi_indexer::config::{Config, LoggingConfig};
use hapi_indexer::{Indexer, Storage};
use hapi_registry::{MemoryLedger, MemoryRegistry, MemoryStore, SystemClock};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hapi-indexer")]
#[command(version, about = "HAPI registry indexer", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "indexer.toml", env = "HAPI_INDEXER_CONFIG")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    InitDb {
        /// Database URL; defaults to the configured one
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Show record counts per network
    Status,

    /// Create the configured networks and mirror them into the database
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::InitDb {
            database_url: Some(_),
        } => None,
        _ => Some(Config::from_file(&cli.config).context("Failed to load configuration")?),
    };

    let logging = config
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    init_logging(cli.debug, &logging)?;

    info!("HAPI Indexer starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    match (cli.command, config) {
        (Commands::InitDb { database_url }, config) => {
            let (url, max, min) = match (database_url, config) {
                (Some(url), _) => (url, None, None),
                (None, Some(config)) => (
                    config.database.url,
                    Some(config.database.max_connections),
                    Some(config.database.min_connections),
                ),
                (None, None) => anyhow::bail!("No database URL given"),
            };
            init_database(&url, max, min).await?
        }
        (Commands::Status, Some(config)) => show_status(&config).await?,
        (Commands::Seed, Some(config)) => seed(&config).await?,
        (_, None) => anyhow::bail!("Configuration is required for this command"),
    }

    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(debug: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = if debug {
        EnvFilter::new("hapi_indexer=debug,hapi_registry=debug,sqlx=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "hapi_indexer={level},hapi_registry={level}",
                level = logging.level
            ))
        })
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_line_number(true))
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}

async fn connect(config: &Config) -> Result<Storage> {
    let storage = Storage::new(
        &config.database.url,
        Some(config.database.max_connections),
        Some(config.database.min_connections),
    )
    .await
    .context("Failed to connect to database")?;

    storage
        .run_migrations()
        .await
        .context("Failed to run migrations")?;

    Ok(storage)
}

/// Initialize the database
async fn init_database(database_url: &str, max: Option<u32>, min: Option<u32>) -> Result<()> {
    info!("Initializing database: {}", database_url);

    let storage = Storage::new(database_url, max, min)
        .await
        .context("Failed to connect to database")?;

    storage
        .run_migrations()
        .await
        .context("Failed to run migrations")?;

    storage
        .health_check()
        .await
        .context("Database health check failed")?;

    let stats = storage.stats().await?;
    info!("Database initialized successfully!");
    info!("  Networks: {}", stats.network_count);
    info!("  Reporters: {}", stats.reporter_count);
    info!("  Cases: {}", stats.case_count);
    info!("  Addresses: {}", stats.address_count);
    info!("  Assets: {}", stats.asset_count);

    storage.close().await;

    Ok(())
}

/// Show record counts per network
async fn show_status(config: &Config) -> Result<()> {
    info!("Checking indexer status");

    let storage = connect(config).await?;
    let stats = storage.stats().await?;

    println!("\n=== HAPI Indexer Status ===\n");
    println!("Database: {}", config.database.url);
    println!("  Networks: {}", stats.network_count);
    println!("  Reporters: {}", stats.reporter_count);
    println!("  Cases: {}", stats.case_count);
    println!("  Addresses: {}", stats.address_count);
    println!("  Assets: {}", stats.asset_count);

    for network in storage.get_networks().await? {
        println!("\nNetwork {} ({}):", network.name, network.schema);
        println!("  Authority: {}", network.authority);
        println!(
            "  Reporters: {}",
            storage.get_reporter_count(&network.name).await?
        );
        println!("  Cases: {}", storage.get_case_count(&network.name).await?);
        println!(
            "  Addresses: {}",
            storage.get_address_count(&network.name).await?
        );
        println!("  Assets: {}", storage.get_asset_count(&network.name).await?);
    }

    println!();

    storage.close().await;

    Ok(())
}

/// Bootstrap the configured networks and mirror them into the database
async fn seed(config: &Config) -> Result<()> {
    if config.networks.is_empty() {
        warn!("No networks configured, nothing to seed");
        return Ok(());
    }

    let program_authority = config.registry.program_authority;
    let mut registry: MemoryRegistry = MemoryRegistry::new(
        program_authority,
        MemoryStore::new(),
        MemoryLedger::new(),
        SystemClock,
    );

    for network in &config.networks {
        let address = registry
            .create_network(&program_authority, network.to_input())
            .with_context(|| format!("Failed to create network {}", network.name))?;
        info!(network = %network.name, %address, "Network seeded");
    }

    let storage = connect(config).await?;
    let indexer = Indexer::new(storage);
    let report = indexer.sync(registry.store()).await?;

    info!("Seed completed: {} records mirrored", report.total());

    indexer.storage().close().await;

    Ok(())
}
