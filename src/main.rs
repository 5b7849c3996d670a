//! Voice Bridge
//!
//! Backend for a browser dialer built on Twilio Voice: issues access
//! tokens, answers the TwiML app's voice webhook with `<Dial>` markup and
//! relays call-status callbacks to the logs.

mod models;
mod server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("voice_bridge=info".parse()?))
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = server::config::ServerConfig::from_env()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async move {
            tracing::info!("Starting Voice Bridge on port {}", config.port);
            server::run_server(config).await
        })
}
