//! Read-only HTTP layer over the persisted signal table.

pub mod routes;
pub mod types;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
}

/// Build the router without binding, so tests can drive it directly.
pub fn router(settings: Settings) -> Router {
    Router::new()
        .route("/signals", get(routes::list_signals))
        .route("/signals/summary", get(routes::summary))
        .route("/cases", get(routes::all_cases))
        .route("/cases/:case_id", get(routes::case_detail))
        .route("/cases/:drug/:event", get(routes::list_cases))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { settings })
}

pub async fn serve(settings: Settings, host: String, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "serving pv-signal-lab API");
    axum::serve(listener, router(settings).into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
