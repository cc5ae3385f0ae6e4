pub mod builds;
pub mod catalog;
pub mod health;

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(catalog::routes())
        .merge(builds::routes())
        .merge(health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Count a read request against the caller's per-IP budget.
pub(crate) fn limit_reads(state: &AppState, addr: SocketAddr) -> Result<(), AppError> {
    state
        .read_limiter
        .check(addr.ip())
        .map_err(AppError::RateLimited)
}
