//! Gateway binary.

use anyhow::Result;
use sgs_gateway::config::Config;
use sgs_gateway::routes;
use sgs_gateway::state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Configuration loading logs through a bootstrap subscriber; the
    // configured one replaces it once the settings are known.
    let config = {
        let bootstrap = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .finish();
        let _guard = tracing::subscriber::set_default(bootstrap);
        Config::load()?
    };
    init_tracing(&config);

    let addr = config.socket_addr();
    let app = routes::router(AppState::new(config));

    info!("Gateway listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        "compact" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
