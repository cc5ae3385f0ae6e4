use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    routing::get,
    Json, Router,
};

use kartpicker_core::{compatible_parts, CompatibilityRule, ElectricMotor, Engine, Part, PartCategory};

use crate::db;
use crate::error::AppError;
use crate::models::{PartsQuery, RulesQuery};
use crate::routes::limit_reads;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/engines", get(list_engines))
        .route("/api/engines/{id}", get(get_engine))
        .route("/api/engines/{id}/compatible-parts", get(get_compatible_parts))
        .route("/api/motors", get(list_motors))
        .route("/api/parts", get(list_parts))
        .route("/api/rules", get(list_rules))
}

pub(crate) fn parse_category(raw: &str) -> Result<PartCategory, AppError> {
    PartCategory::parse(raw)
        .ok_or_else(|| AppError::Validation(format!("Unknown part category: {}", raw)))
}

fn category_filter(query: &PartsQuery) -> Result<Option<PartCategory>, AppError> {
    query
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(parse_category)
        .transpose()
}

pub(crate) async fn find_engine(state: &AppState, id: &str) -> Result<Engine, AppError> {
    db::get_engine(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Engine not found: {}", id)))
}

pub(crate) async fn find_motor(state: &AppState, id: &str) -> Result<ElectricMotor, AppError> {
    db::get_motor(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Motor not found: {}", id)))
}

/// GET /api/engines
async fn list_engines(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<Vec<Engine>>, AppError> {
    limit_reads(&state, addr)?;
    Ok(Json(db::list_engines(&state.pool).await?))
}

/// GET /api/engines/{id}
async fn get_engine(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<String>,
) -> Result<Json<Engine>, AppError> {
    limit_reads(&state, addr)?;
    Ok(Json(find_engine(&state, &id).await?))
}

/// GET /api/motors
async fn list_motors(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<Vec<ElectricMotor>>, AppError> {
    limit_reads(&state, addr)?;
    Ok(Json(db::list_motors(&state.pool).await?))
}

/// GET /api/parts?category=...
async fn list_parts(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<PartsQuery>,
) -> Result<Json<Vec<Part>>, AppError> {
    limit_reads(&state, addr)?;
    let category = category_filter(&query)?;
    Ok(Json(db::list_parts(&state.pool, category).await?))
}

/// GET /api/rules?source_category=...&target_category=...&active=...
async fn list_rules(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<RulesQuery>,
) -> Result<Json<Vec<CompatibilityRule>>, AppError> {
    limit_reads(&state, addr)?;
    Ok(Json(db::list_rules(&state.pool, &query).await?))
}

/// GET /api/engines/{id}/compatible-parts?category=...
///
/// Candidate parts minus those an error-severity engine rule rules out,
/// unless a curated direct fit says otherwise.
async fn get_compatible_parts(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<String>,
    Query(query): Query<PartsQuery>,
) -> Result<Json<Vec<Part>>, AppError> {
    limit_reads(&state, addr)?;
    let category = category_filter(&query)?;
    let engine = find_engine(&state, &id).await?;

    let candidates = db::list_parts(&state.pool, category).await?;
    let rules = db::active_rules(&state.pool).await?;
    let fitments = db::list_fitments(&state.pool, &engine.id).await?;

    let kept: Vec<Part> = compatible_parts(&engine, &candidates, &rules, &fitments)
        .into_iter()
        .cloned()
        .collect();

    tracing::debug!(
        "{} of {} parts compatible with {}",
        kept.len(),
        candidates.len(),
        engine.name
    );
    Ok(Json(kept))
}
