use approval_frontend::config::get_configuration;
use approval_frontend::startup::build_app;
use dotenvy::dotenv;
use service_core::observability::logging::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "approval-frontend",
        &configuration.observability.log_level,
        configuration.observability.otlp_endpoint.as_deref(),
    )?;

    approval_frontend::services::metrics::init_metrics()?;

    let app = build_app(&configuration).map_err(|e| anyhow::anyhow!("Startup error: {}", e))?;

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting approval-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
