use poem::listener::TcpListener;
use qr_gateway::core::request::RenderDefaults;
use qr_gateway::settings::get_config;
use qr_gateway::{AppState, default_dispatcher, init_openapi_route};
use tracing::Level;

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_level = Level::INFO;
    // Logging to File
    let file_appender = tracing_appender::rolling::daily("./logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(log_level)
        .init();

    tracing::info!("Initializing QR Gateway...");

    let config = get_config();
    tracing::info!("run with config: {:?}", config);

    let dispatcher = default_dispatcher(&config)?;

    // Init App State
    let app_state = Arc::new(AppState {
        dispatcher,
        defaults: RenderDefaults::default(),
    });

    tracing::info!("render dispatcher initialized successfully");

    let app = init_openapi_route(app_state.clone(), &config);
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!(
        "{}:{}",
        config.host, config.port
    )))
    .run(app)
    .await?;

    Ok(())
}
