mod api;
mod cli;
mod router;
mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config() -> batchgate_core::Config {
    batchgate_core::config::load_dotenv();
    batchgate_core::Config::from_env()
}

async fn serve(config: batchgate_core::Config) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();
    let state = Arc::new(state::AppState::new(config));
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server is running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let config = load_config();
    config.log_summary();

    let args: Vec<String> = std::env::args().collect();
    if cli::dispatch(&config, &args).await? {
        return Ok(());
    }

    serve(config).await
}
