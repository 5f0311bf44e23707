use std::{sync::Arc, time::Instant};

use lexinsight_agent::GatewayTransport;
use lexinsight_core::config::Config;
use lexinsight_domains::profile_or_default;
use lexinsight_server::{build_router, logging::BroadcastLayer, AppState};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (log_tx, _) = broadcast::channel::<String>(512);
    let broadcast_layer = BroadcastLayer::new(log_tx.clone());
    let log_ring = Arc::clone(&broadcast_layer.ring);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexinsight=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(broadcast_layer)
        .init();

    let config = Config::from_env()?;
    let profile = profile_or_default(&config.analysis_profile);
    let gateway = GatewayTransport::from_config(&config, profile.clone())?;
    if !gateway.is_configured() {
        warn!(category = "system", "GATEWAY_API_KEY not set; analysis requests will fail");
    }
    info!(
        category = "system",
        model = %config.model,
        profile = %profile.name,
        timeout_s = config.analysis_timeout_s,
        "relay configured"
    );

    let state = Arc::new(AppState {
        gateway: Arc::new(gateway),
        profile,
        timeout: config.timeout(),
        start_time: Instant::now(),
        log_tx,
        log_ring,
    });

    let app = build_router(state);

    let addr = config.bind_addr();
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
