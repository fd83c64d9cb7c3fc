//! ResearchTandem wallet server
//!
//! Main entry point for the balance and withdrawal service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tandem_api::{AppState, create_router};
use tandem_core::ledger::WithdrawalService;
use tandem_db::{AdvisoryLock, DbEarningRepository, DbWithdrawalRepository, connect_with};
use tandem_gateway::MesombClient;
use tandem_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tandem=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let gateway = MesombClient::new(config.payout.clone())?;
    info!(
        deposit_url = %gateway.deposit_url(),
        payout_timeout_secs = config.ledger.payout_timeout_secs,
        count_confirmed_bookings = config.ledger.count_confirmed_bookings,
        "Payout gateway configured"
    );

    let ledger = WithdrawalService::new(
        Arc::new(DbEarningRepository::new(db.clone())),
        Arc::new(DbWithdrawalRepository::new(db.clone())),
        Arc::new(gateway),
        Arc::new(AdvisoryLock::new(db)),
        &config.ledger,
    );

    let state = AppState {
        ledger: Arc::new(ledger),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
