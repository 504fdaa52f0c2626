//! # Marketdesk Server
//!
//! HTTP and WebSocket front end over `marketdesk-core`.
//!
//! | Route | Payload |
//! |-------|---------|
//! | `GET /api/equities` | equity index quotes |
//! | `GET /api/equities/chart/:symbol` | chart bars (`period`, `interval` query) |
//! | `GET /api/fx`, `/api/rates`, `/api/credit`, `/api/securitized`, `/api/structured`, `/api/commodities` | quotes per domain |
//! | `GET /api/rates/yield-curves` | treasury curve comparison |
//! | `GET /api/news`, `/api/news/:category` | headlines |
//! | `GET /api/macro` | macro indicators and insights |
//! | `GET /api/dashboard` | static summary |
//! | `GET /health` | `OK` |
//! | `GET /ws` | live update stream |

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod ws;

use std::future::Future;

use axum::routing::get;
use axum::Router;
use marketdesk_core::{LiveBroadcaster, QuoteDomain};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use config::Cli;
pub use error::{ApiError, ServerError};
pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/equities", routes::quotes(QuoteDomain::Equities))
        .route("/api/equities/chart/:symbol", get(routes::equity_chart))
        .route("/api/fx", routes::quotes(QuoteDomain::Fx))
        .route("/api/rates", routes::quotes(QuoteDomain::Rates))
        .route("/api/rates/yield-curves", get(routes::rate_curves))
        .route("/api/credit", routes::quotes(QuoteDomain::Credit))
        .route("/api/securitized", routes::quotes(QuoteDomain::Securitized))
        .route("/api/structured", routes::quotes(QuoteDomain::Structured))
        .route("/api/commodities", routes::quotes(QuoteDomain::Commodities))
        .route("/api/news", get(routes::general_news))
        .route("/api/news/:category", get(routes::category_news))
        .route("/api/macro", get(routes::macro_indicators))
        .route("/api/dashboard", get(routes::dashboard))
        .route("/health", get(routes::health))
        .route("/ws", get(ws::live_updates))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds the state, optionally starts the live broadcaster and serves until
/// a shutdown signal arrives.
pub async fn serve(cli: Cli) -> Result<(), ServerError> {
    let state = AppState::from_cli(&cli)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let broadcaster = cli.enable_live_broadcast.then(|| {
        let broadcaster = LiveBroadcaster::new(state.market.clone(), cli.broadcast_interval())
            .with_sender(state.live.clone());
        let stop = shutdown_rx.clone();
        tokio::spawn(async move { broadcaster.run(stopped(stop)).await })
    });

    let listener = TcpListener::bind(cli.bind)
        .await
        .map_err(|source| ServerError::Bind { addr: cli.bind, source })?;
    info!(addr = %cli.bind, live_broadcast = cli.enable_live_broadcast, "marketdesk listening");

    let served = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await;

    if let Some(handle) = broadcaster {
        if let Err(error) = handle.await {
            error!(%error, "live broadcaster task failed");
        }
    }

    served.map_err(ServerError::from)
}

fn stopped(mut shutdown: watch::Receiver<bool>) -> impl Future<Output = ()> {
    async move {
        let _ = shutdown.wait_for(|stop| *stop).await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            error!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                error!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
