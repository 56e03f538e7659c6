use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use record_store::RecordStore;
use server_api::{relay_rsvp, RelayContext, RsvpRejection};
use shared::error::ErrorCode;
use shared::protocol::{
    ErrorBody, HealthReport, HealthStatus, RsvpAccepted, HEALTH_ROUTE, RSVP_ROUTE,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{build_record_store, load_settings};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let store = build_record_store(&settings)?;
    match store.check_access().await {
        Ok(()) => info!("record store reachable"),
        Err(error) => warn!(%error, "record store check failed; continuing"),
    }

    let state = AppState {
        relay: RelayContext::new(store),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "rsvp relay listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route(HEALTH_ROUTE, get(health))
        .route(RSVP_ROUTE, post(submit_rsvp))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    match state.relay.store.check_access().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthReport {
                status: HealthStatus::Healthy,
                timestamp: Utc::now(),
                record_store: Some("ok".into()),
                error: None,
            }),
        ),
        Err(err) => {
            warn!(%err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthReport {
                    status: HealthStatus::Unhealthy,
                    timestamp: Utc::now(),
                    record_store: None,
                    error: Some(err.to_string()),
                }),
            )
        }
    }
}

async fn submit_rsvp(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RsvpAccepted>, (StatusCode, Json<ErrorBody>)> {
    relay_rsvp(&state.relay, &body)
        .await
        .map(Json)
        .map_err(|rejection| {
            let api_error = rejection.api_error();
            let status = status_for(api_error.code);
            let mut body = ErrorBody::new(api_error.message);
            if let RsvpRejection::Failed(failure) = rejection {
                error!(details = %failure.details, "RSVP dispatch failed");
                body = body.with_details(failure.details);
                if let Some(summary) = failure.summary {
                    body = body.with_data(summary);
                }
            }
            (status, Json(body))
        })
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
