//! Binary entrypoint for the Nifki wiki server.
//!
//! See [`nifki_server::config`] for the environment variables it reads.

use nifki_server::config::Config;
use nifki_server::router::build_router;
use nifki_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    let addr = config.bind_addr.clone();

    let state = AppState::new(config).expect("Failed to initialize application state");
    let app = build_router(state);

    tracing::info!("nifki server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
