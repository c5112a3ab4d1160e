use std::error::Error;

use clap::Parser;
use init_tracing_opentelemetry::tracing_subscriber_ext::init_subscribers;
use video_catalog::server::{self, AppState, Config};

#[derive(Parser)]
struct ServerOptions {
    #[arg(long, env, default_value_t = 8080)]
    port: u16,
    #[command(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_subscribers()?;

    let options = ServerOptions::parse();

    let pool = options.config.connect_lazy()?;
    let router = server::router(AppState { pool: pool.clone() });

    let address = format!("0.0.0.0:{}", options.port).parse()?;

    tracing::info!("Starting server on {}", address);

    axum::Server::bind(&address)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    opentelemetry::global::shutdown_tracer_provider();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
