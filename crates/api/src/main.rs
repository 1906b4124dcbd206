//! Webhook relay API server

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod error;
mod reply;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api=debug".parse()?)
                .add_directive("processor=debug".parse()?)
                .add_directive("relay=info".parse()?)
                .add_directive("sources=info".parse()?),
        )
        .init();

    info!("📨 Starting webhook relay");

    // Load configuration
    let config = common::Config::from_env();

    if config.shared_secret.is_none() {
        warn!("SHARED_SECRET is not set; token-checked sources will reject every call");
    }
    if config.chat_relay_url.is_none() {
        info!("CHAT_RELAY_URL is not set; notifications disabled");
    }
    for (name, settings) in [
        ("form submission", &config.form),
        ("signature event", &config.signature),
        ("order approval", &config.order_approval),
        ("order result", &config.order_result),
    ] {
        match &settings.destination {
            Some(url) => info!("Relaying {} events to {}", name, url),
            None => info!("No destination for {} events; acknowledging only", name),
        }
    }

    let state = Arc::new(AppState::new(&config));

    let app = routes::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    info!("🚀 Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
