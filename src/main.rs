mod cli;
mod export;

use anyhow::Context;
use clap::Parser;
use config_manager::SystemConfig;
use job_orchestrator::HttpGasOrchestrator;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SystemConfig::load_from_path(path),
        None => SystemConfig::load(),
    }
    .context("failed to load configuration")?;

    let orchestrator =
        HttpGasOrchestrator::from_config(&config).context("failed to build gas orchestrator")?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, cancelling calculation");
            ctrl_c_token.cancel();
        }
    });

    let progress = |message: &str| info!("⏳ {}", message);

    let result = orchestrator
        .run(&cli.address, Some(&progress), &cancel)
        .await
        .with_context(|| format!("gas calculation failed for {}", cli.address))?;

    if let Some(path) = &cli.csv {
        let csv = export::transactions_csv(&result)?;
        std::fs::write(path, csv)
            .with_context(|| format!("failed to write CSV to {}", path.display()))?;
        info!(
            "📄 Wrote {} transactions to {}",
            result.transactions.len(),
            path.display()
        );
    }

    let json = if cli.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{}", json);

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gas_tracker=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
