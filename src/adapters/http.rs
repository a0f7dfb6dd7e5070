use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{closure::ClosureDate, error::ClosureError},
    },
    axum::{
        Json, Router,
        extract::{Query, State},
        http::StatusCode,
        routing::get,
    },
    chrono::Utc,
    serde::Deserialize,
    std::time::Duration,
    tower_http::{cors::CorsLayer, timeout::TimeoutLayer},
};

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let timeout = TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/test", get(connection_check_handler))
        .route("/api/closures", get(closures_handler))
        .layer(timeout)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Proves the credentials work by listing outlets.
pub async fn connection_check_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outlets = state.provider.list_outlets().await?;
    tracing::info!(outlets = outlets.len(), "vendor connection ok");
    Ok(Json(serde_json::json!({
        "success": true,
        "outlets_count": outlets.len(),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ClosuresQuery {
    date: Option<String>,
}

pub async fn closures_handler(
    State(state): State<AppState>,
    Query(query): Query<ClosuresQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = query.date.ok_or_else(|| {
        ClosureError::Validation("date query parameter is required (YYYY-MM-DD)".into())
    })?;
    let date = ClosureDate::parse(&raw)?;

    let batch = state.aggregator.aggregate(&date).await?;
    let complete = batch.complete_count();
    let degraded = batch.degraded_count();

    Ok(Json(serde_json::json!({
        "success": true,
        "date": batch.date,
        "total": batch.reports.len(),
        "matched": batch.matched,
        "complete": complete,
        "degraded": degraded,
        "truncated": batch.truncated,
        "note": batch.note,
        "unfinished": batch.unfinished,
        "diagnostics": batch.diagnostics,
        "data": batch.reports,
    })))
}
