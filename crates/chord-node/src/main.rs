use actix_web::{web, App, HttpServer};
use anyhow::Context;
use chord_core::{MemoryStore, RingView};
use chord_node::{activity, config, hop_client, router};
use router::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match config::Config::from_args() {
        Ok(c) => c,
        Err(()) => std::process::exit(1),
    };

    init_tracing(&config.log_level);

    let self_address = config.self_address();
    let ring = match RingView::build(&self_address, &config.peers) {
        Ok(ring) => ring,
        Err(e) => {
            tracing::error!(error = %e, "failed to construct ring view");
            std::process::exit(1);
        }
    };
    tracing::info!(
        self_address = %self_address,
        predecessor = %ring.predecessor.address,
        successor = %ring.successor.address,
        fingers = ring.fingers.len(),
        "ring view constructed"
    );

    let activity = activity::ActivityTimer::new(config.idle_timeout_mins.unwrap_or(0));
    let state = web::Data::new(AppState {
        ring,
        store: Arc::new(MemoryStore::new()),
        hop_client: Arc::new(hop_client::ReqwestHopClient::new()),
        activity: activity.clone(),
    });

    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(router::configure))
        .bind((config.hostname.as_str(), config.port))
        .with_context(|| format!("failed to bind {}:{}", config.hostname, config.port))?
        .run();

    let server_handle = server.handle();

    // Graceful shutdown on SIGTERM/SIGINT: stop accepting new connections,
    // drain in-flight ones, then exit 0.
    actix_rt::spawn({
        let server_handle = server_handle.clone();
        async move {
            let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT, shutting down"),
            }
            server_handle.stop(true).await;
        }
    });

    // Optional idle watchdog: an operator convenience, off unless configured.
    if let Some(idle_limit_mins) = config.idle_timeout_mins {
        if idle_limit_mins > 0 {
            actix_rt::spawn({
                let activity = activity.clone();
                let server_handle = server_handle.clone();
                async move {
                    loop {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        if activity.is_idle() {
                            tracing::info!(idle_limit_mins, "idle watchdog expired, shutting down");
                            server_handle.stop(true).await;
                            break;
                        }
                    }
                }
            });
        }
    }

    server.await
}
