// Race overlay server: UDP standings ingest, frame production, and WebSocket streaming.

use std::process::ExitCode;

use tracing::{error, info};

use classifica_server::app::AppState;
use classifica_server::config::Config;
use classifica_server::http;
use classifica_server::tasks;
use classifica_server::udp;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let socket = match udp::bind_udp_socket(config.udp_addr).await {
        Ok(socket) => socket,
        Err(err) => {
            error!(?err, addr = %config.udp_addr, "failed to bind udp socket");
            return ExitCode::FAILURE;
        }
    };

    let http_addr = config.http_addr;
    let app_state = AppState::new(config);

    let udp_store = app_state.store.clone();
    let udp_source = app_state.config.source_ip;
    let udp_start = app_state.start_instant;
    tokio::spawn(udp::udp_loop(socket, udp_store, udp_source, udp_start));

    let frame_store = app_state.store.clone();
    let frame_tx = app_state.tx.clone();
    let frame_seq = app_state.sequence.clone();
    let frame_start = app_state.start_instant;
    let frame_config = app_state.config.clone();
    tokio::spawn(async move {
        tasks::frame_task(frame_store, frame_tx, frame_seq, frame_start, frame_config).await;
    });

    let app = http::router(app_state);

    info!(addr = %http_addr, "starting server");
    if let Err(err) = axum::Server::bind(&http_addr)
        .serve(app.into_make_service())
        .await
    {
        error!(?err, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
