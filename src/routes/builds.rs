use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use kartpicker_core::{
    budget_status, calculate_performance_with_base, check_compatibility, check_ev_compatibility,
    check_fitments, cost_breakdown, evaluate_rule, total_cost, CompatibilityRule,
    CompatibilityWarning, Engine, EnginePartFitment, Part, PerformanceMetrics, PowerSource,
    SelectedParts,
};

use crate::db;
use crate::error::AppError;
use crate::models::{
    BuildSummaryRequest, BuildSummaryResponse, CompatibilityRequest, CompatibilityResponse,
    PartSelection, PerformanceRequest,
};
use crate::routes::catalog::{find_engine, find_motor, parse_category};
use crate::routes::limit_reads;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/compatibility", post(post_compatibility))
        .route("/api/performance", post(post_performance))
        .route("/api/builds/summary", post(post_build_summary))
}

async fn resolve_power_source(
    state: &AppState,
    engine_id: Option<&str>,
    motor_id: Option<&str>,
) -> Result<Option<PowerSource>, AppError> {
    match (engine_id, motor_id) {
        (Some(_), Some(_)) => Err(AppError::Validation(
            "Select either an engine or a motor, not both".to_string(),
        )),
        (Some(id), None) => Ok(Some(PowerSource::Engine(find_engine(state, id).await?))),
        (None, Some(id)) => Ok(Some(PowerSource::Motor(find_motor(state, id).await?))),
        (None, None) => Ok(None),
    }
}

/// Fetch parts by id, failing on the first id the catalog does not know.
async fn fetch_parts(state: &AppState, ids: &[&str]) -> Result<Vec<Part>, AppError> {
    let by_id: HashMap<String, Part> = db::get_parts(&state.pool, ids)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    ids.iter()
        .map(|id| {
            by_id
                .get(*id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Part not found: {}", id)))
        })
        .collect()
}

/// Turn `{category: id | [ids]}` into selected parts. Each part must belong
/// to the slot it was selected for.
async fn resolve_parts(
    state: &AppState,
    selection: &BTreeMap<String, PartSelection>,
) -> Result<SelectedParts, AppError> {
    let mut slots = Vec::with_capacity(selection.len());
    for (raw, ids) in selection {
        slots.push((parse_category(raw)?, ids.ids()));
    }

    let all_ids: Vec<&str> = slots.iter().flat_map(|(_, ids)| ids.iter().copied()).collect();
    let parts = fetch_parts(state, &all_ids).await?;
    let mut parts = parts.into_iter();

    let mut selected = SelectedParts::new();
    for (category, ids) in slots {
        let slot: Vec<Part> = parts.by_ref().take(ids.len()).collect();
        if let Some(stray) = slot.iter().find(|p| p.category != category) {
            return Err(AppError::Validation(format!(
                "Part {} is a {}, not a {}",
                stray.id, stray.category, category
            )));
        }
        if !slot.is_empty() {
            selected.set(category, slot);
        }
    }
    Ok(selected)
}

/// Built-in checks, spec-key and field-operator rules, and curated fitments.
fn build_warnings(
    power_source: Option<&PowerSource>,
    parts: &SelectedParts,
    rules: &[CompatibilityRule],
    fitments: &[EnginePartFitment],
) -> Vec<CompatibilityWarning> {
    let engine: Option<&Engine> = power_source.and_then(PowerSource::as_engine);
    let flat: Vec<Part> = parts.iter().cloned().collect();

    let mut warnings = check_compatibility(power_source, parts, rules);

    warnings.extend(
        rules
            .iter()
            .filter(|r| r.is_active && r.condition.field_check().is_some())
            .filter_map(|rule| evaluate_rule(rule, engine, &flat)),
    );

    if let Some(engine) = engine {
        warnings.extend(check_fitments(engine, &flat, fitments));
    }

    warnings
}

async fn evaluate_warnings(
    state: &AppState,
    power_source: Option<&PowerSource>,
    parts: &SelectedParts,
) -> Result<Vec<CompatibilityWarning>, AppError> {
    let rules = db::active_rules(&state.pool).await?;
    let fitments = match power_source.and_then(PowerSource::as_engine) {
        Some(engine) => db::list_fitments(&state.pool, &engine.id).await?,
        None => Vec::new(),
    };
    Ok(build_warnings(power_source, parts, &rules, &fitments))
}

/// POST /api/compatibility
async fn post_compatibility(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<CompatibilityRequest>,
) -> Result<Json<CompatibilityResponse>, AppError> {
    limit_reads(&state, addr)?;

    let power_source = resolve_power_source(
        &state,
        request.engine_id.as_deref(),
        request.motor_id.as_deref(),
    )
    .await?;
    let parts = resolve_parts(&state, &request.parts).await?;

    let warnings = evaluate_warnings(&state, power_source.as_ref(), &parts).await?;
    tracing::debug!(
        "Compatibility check over {} parts produced {} warnings",
        parts.len(),
        warnings.len()
    );

    Ok(Json(CompatibilityResponse { warnings }))
}

/// POST /api/performance
async fn post_performance(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<PerformanceRequest>,
) -> Result<Json<PerformanceMetrics>, AppError> {
    limit_reads(&state, addr)?;

    let engine = match request.engine_id.as_deref() {
        Some(id) => Some(find_engine(&state, id).await?),
        None => None,
    };
    let ids: Vec<&str> = request.part_ids.iter().map(String::as_str).collect();
    let parts = fetch_parts(&state, &ids).await?;

    Ok(Json(calculate_performance_with_base(
        engine.as_ref(),
        &parts,
        state.base_kart_weight,
    )))
}

/// POST /api/builds/summary
async fn post_build_summary(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<BuildSummaryRequest>,
) -> Result<Json<BuildSummaryResponse>, AppError> {
    limit_reads(&state, addr)?;

    if let Some(budget) = request.budget {
        if !budget.is_finite() || budget < 0.0 {
            return Err(AppError::Validation(
                "budget must be a non-negative number".to_string(),
            ));
        }
    }

    let power_source = resolve_power_source(
        &state,
        request.engine_id.as_deref(),
        request.motor_id.as_deref(),
    )
    .await?;
    let parts = resolve_parts(&state, &request.parts).await?;

    let warnings = evaluate_warnings(&state, power_source.as_ref(), &parts).await?;
    let ev_checks = power_source
        .as_ref()
        .and_then(PowerSource::as_motor)
        .map(|motor| check_ev_compatibility(motor, &parts))
        .unwrap_or_default();

    let flat: Vec<Part> = parts.iter().cloned().collect();
    let performance = calculate_performance_with_base(
        power_source.as_ref().and_then(PowerSource::as_engine),
        &flat,
        state.base_kart_weight,
    );

    let total = total_cost(power_source.as_ref(), &parts);

    Ok(Json(BuildSummaryResponse {
        power_source: power_source.as_ref().map(|p| p.name().to_string()),
        warnings,
        ev_checks,
        performance,
        total_cost: total,
        cost_breakdown: cost_breakdown(power_source.as_ref(), &parts),
        budget: budget_status(total, request.budget),
        evaluated_at: Utc::now().to_rfc3339(),
    }))
}
