use crate::api::api_error::APIError;
use crate::api::model::ChallengeResponse;
use crate::api::server::AppState;
use crate::solver::ChallengeRequest;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    let prefix = format!("/apis/{}/v1alpha1", state.config.group_name);
    Router::new()
        .route("/healthcheck", get(health_check))
        .route(&format!("{prefix}/:solver/present"), post(present))
        .route(&format!("{prefix}/:solver/cleanup"), post(cleanup))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn present(
    State(state): State<AppState>,
    Path(solver_name): Path<String>,
    WithRejection(Json(ch), _): WithRejection<Json<ChallengeRequest>, APIError>,
) -> Result<Json<ChallengeResponse>, APIError> {
    let solver = state.registry.get(&solver_name)?;
    tracing::info!(
        "accepted present for \"{}\" via solver \"{}\"",
        ch.resolved_fqdn,
        solver.name()
    );
    solver.present(&ch).await?;
    Ok(Json(ChallengeResponse::solved(ch.uid)))
}

async fn cleanup(
    State(state): State<AppState>,
    Path(solver_name): Path<String>,
    WithRejection(Json(ch), _): WithRejection<Json<ChallengeRequest>, APIError>,
) -> Result<Json<ChallengeResponse>, APIError> {
    let solver = state.registry.get(&solver_name)?;
    tracing::info!(
        "accepted cleanup for \"{}\" via solver \"{}\"",
        ch.resolved_fqdn,
        solver.name()
    );
    solver.cleanup(&ch).await?;
    Ok(Json(ChallengeResponse::solved(ch.uid)))
}
