//! melilab - Pollen composition analytics CLI
//!
//! Command-line front end for the analytics engine: fetches laboratory
//! records over the record-source REST API and prints the derived reports
//! as JSON for downstream rendering or inspection.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use melilab_common::config::{self, EngineConfig};
use melilab_engine::client::LabClient;
use melilab_engine::services::{global_scatter, harvest, pivot, report};
use serde::Serialize;
use serde_json::json;
use tracing::info;

/// Command-line arguments for melilab
#[derive(Parser, Debug)]
#[command(name = "melilab")]
#[command(about = "Pollen composition analytics for honey-quality testing")]
#[command(version)]
struct Args {
    /// Record-source API base URL (overrides ENV and TOML configuration)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the pools known to the laboratory
    Pools,
    /// Composition report for one pool
    Report {
        /// Pool id
        pool_id: i64,
    },
    /// Pool × species pivot matrix across all records
    Pivot,
    /// Global species × month scatter aggregate
    Scatter,
    /// Suggested harvest date for one pool
    Harvest {
        /// Pool id
        pool_id: i64,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn find_pool(client: &LabClient, pool_id: i64) -> Result<melilab_common::models::Pool> {
    client
        .list_pools()
        .await
        .context("Failed to fetch pool list")?
        .into_iter()
        .find(|pool| pool.id == pool_id)
        .ok_or_else(|| anyhow!("Pool {} not found", pool_id))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting melilab v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    // ENV → TOML → default; the --api-url flag overrides all tiers
    let toml_config = config::default_config_path()
        .filter(|path| path.exists())
        .map(|path| config::load_toml_config(&path))
        .transpose()?;
    let mut engine_config: EngineConfig = config::resolve(toml_config.as_ref());
    if let Some(url) = args.api_url {
        engine_config.api_base_url = url;
    }

    info!("Record source: {}", engine_config.api_base_url);

    let client = LabClient::new(&engine_config.api_base_url, engine_config.timeout_secs)
        .context("Failed to create record-source client")?;

    match args.command {
        Command::Pools => {
            let records = client
                .list_records()
                .await
                .context("Failed to fetch pollen records")?;
            let pools = report::distinct_pools(&records);
            print_json(&pools)?;
        }
        Command::Report { pool_id } => {
            let pool = find_pool(&client, pool_id).await?;
            let records = client
                .list_records_for_pool(pool_id)
                .await
                .context("Failed to fetch pool records")?;
            let report = report::build(&pool, &records);
            print_json(&report)?;
        }
        Command::Pivot => {
            let records = client
                .list_records()
                .await
                .context("Failed to fetch pollen records")?;
            let matrix = pivot::build(&records);
            print_json(&matrix)?;
        }
        Command::Scatter => {
            let pools = client
                .list_pools()
                .await
                .context("Failed to fetch pool list")?;
            let aggregate = global_scatter::aggregate(&client, &pools).await;
            print_json(&aggregate)?;
        }
        Command::Harvest { pool_id } => {
            let pool = find_pool(&client, pool_id).await?;
            let records = client
                .list_records_for_pool(pool_id)
                .await
                .context("Failed to fetch pool records")?;
            let suggestion = harvest::suggest_for_pool(&pool, &records);
            print_json(&json!({
                "pool_id": pool_id,
                "suggested_harvest_date": suggestion,
            }))?;
        }
    }

    Ok(())
}
