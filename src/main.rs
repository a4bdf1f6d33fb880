use maintenance_reports::{
    api::{build_router, AppState},
    config::Config,
    reporting::ReportingEngine,
    store::create_store,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration; out-of-range values stop startup
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            let config = Config::fallback(e)?;
            eprintln!("Using default configuration");
            config
        }
    };

    // Initialize tracing
    let json_logs = config.observability.json_logs;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "maintenance_reports={},tower_http=info",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!(
        service = %config.observability.service_name,
        "Starting maintenance reports v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize data source
    let store = create_store(&config.data)?;
    tracing::info!("Data source initialized");

    let engine = Arc::new(ReportingEngine::new(store, config.reporting.clone()));
    tracing::info!(
        query_timeout_ms = config.reporting.query_timeout_ms,
        activity_default_from = %config.reporting.activity_default_from,
        "Reporting engine initialized"
    );

    let app_state = AppState::new(engine)
        .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = config.bind_address();
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Reports: http://{}/v1/reports", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
