use crate::infra::{AdvisorState, AppState};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use crop_advisor::error::AppError;
use crop_advisor::forecast::{ForecastReportView, ForecastRequest};
use crop_advisor::suitability::{ObservationInput, SuggestionReport, SuitabilityError};
use serde_json::json;
use tracing::{info, warn};

pub(crate) fn with_advisor_routes(advisor: AdvisorState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/crops/suggestions", post(suggestions_endpoint))
        .route(
            "/api/v1/crops/forecast",
            get(history_forecast_endpoint).post(forecast_endpoint),
        )
        .with_state(advisor)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// An absent body or a JSON `null` is treated as an observation with no fields.
fn parse_observation(body: &[u8]) -> Result<ObservationInput, AppError> {
    let input: Option<ObservationInput> = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice(body)?
    };
    input.ok_or_else(|| SuitabilityError::MissingRequiredField("phLevel").into())
}

fn parse_forecast_request(body: &[u8]) -> Result<ForecastRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ForecastRequest::default());
    }
    Ok(serde_json::from_slice(body)?)
}

fn rejected(err: AppError) -> AppError {
    warn!(status = %err.status(), error = %err, "request rejected");
    err
}

pub(crate) async fn suggestions_endpoint(
    State(advisor): State<AdvisorState>,
    body: Bytes,
) -> Result<Json<SuggestionReport>, AppError> {
    let input = parse_observation(&body).map_err(rejected)?;
    let report = advisor.suggest(&input).map_err(rejected)?;

    info!(
        suggestions = report.suggested_crops.len(),
        "served crop suggestions"
    );
    Ok(Json(report))
}

pub(crate) async fn forecast_endpoint(
    State(advisor): State<AdvisorState>,
    body: Bytes,
) -> Result<Json<ForecastReportView>, AppError> {
    let request = parse_forecast_request(&body).map_err(rejected)?;
    let view = tokio::task::spawn_blocking(move || advisor.forecast(request))
        .await?
        .map_err(rejected)?;

    info!(crops = view.all_crops.len(), "served price forecast");
    Ok(Json(view))
}

pub(crate) async fn history_forecast_endpoint(
    State(advisor): State<AdvisorState>,
) -> Result<Json<ForecastReportView>, AppError> {
    let view = advisor.extrapolate().map_err(rejected)?;

    info!(
        crops = view.all_crops.len(),
        "served history price forecast"
    );
    Ok(Json(view))
}
