use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Command};
use doctor_cell::{DoctorService, PopularityService};
use reporting_cell::MonthlyReportService;
use shared_config::AppConfig;
use shared_database::{ClinicStore, InMemoryStore, SupabaseStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    let store = build_store(&config);

    let popularity = Arc::new(PopularityService::new(store.clone()));

    match cli.command {
        Command::RecomputePopularity => {
            let doctors = popularity.recompute_all().await?;
            info!("Rescored {} doctors", doctors.len());
            print_json(&doctors)
        }
        Command::MonthlyReport { year, month } => {
            let report = MonthlyReportService::new(store)
                .generate_monthly_report(year, month)
                .await?;
            print_json(&report)
        }
        Command::Doctors {
            specialty_id,
            active_only,
        } => {
            let directory = DoctorService::new(store, popularity);
            let doctors = match (specialty_id, active_only) {
                (Some(id), true) => directory.list_active_by_specialty_ordered_by_popularity(id).await?,
                (Some(id), false) => directory.list_by_specialty_ordered_by_popularity(id).await?,
                (None, true) => directory.list_active().await?,
                (None, false) => directory.list_all().await?,
            };
            print_json(&doctors)
        }
    }
}

fn build_store(config: &AppConfig) -> Arc<dyn ClinicStore> {
    if config.is_configured() {
        info!("Using PostgREST store at {}", config.supabase_url);
        Arc::new(SupabaseStore::new(config))
    } else {
        warn!("SUPABASE_URL / SUPABASE_ANON_PUBLIC_KEY missing, using an empty in-memory store");
        Arc::new(InMemoryStore::new())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
