//! GovDesk Server — Application entry point.

mod config;

use govdesk_core::catalog::Catalog;
use govdesk_core::error::GovResult;
use govdesk_db::DbManager;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

async fn run() -> GovResult<()> {
    let config = ServerConfig::from_env()?;

    let manager = DbManager::connect(&config.db)
        .await
        .map_err(govdesk_db::DbError::from)?;
    govdesk_db::run_migrations(manager.client()).await?;

    if config.seed_demo {
        govdesk_db::seed::seed_demo_data(manager.client(), config.auth.pepper.clone()).await?;
    }

    let catalog = Catalog::builtin()?;
    tracing::info!(
        workshops = catalog.workshops().len(),
        items = catalog.items().len(),
        modules = catalog.modules().len(),
        "Governance catalog loaded"
    );

    // TODO: Start REST API server

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("govdesk=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting GovDesk server...");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "GovDesk server failed to start");
        std::process::exit(1);
    }

    tracing::info!("GovDesk server stopped.");
}
