use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::debug;

use application::{RealtimeStatusDto, RegisterQueueDto};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct HeartbeatQuery {
    queue_id: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/realtime", realtime_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn realtime_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_queue))
        .route("/heartbeat", post(heartbeat))
        .route("/status", get(realtime_status))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn register_queue(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RegisterQueueDto>, ApiError> {
    let user_id = state.jwt_service.extract_user_from_headers(&headers)?;
    let dto = state.realtime_service.register(user_id).await?;

    Ok(Json(dto))
}

async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HeartbeatQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = state.jwt_service.extract_user_from_headers(&headers)?;
    if query.queue_id.is_empty() {
        return Err(ApiError::bad_request("queue_id is required"));
    }

    state.realtime_service.heartbeat(&query.queue_id).await?;
    debug!(user_id = %user_id, queue_id = %query.queue_id, "heartbeat relayed");

    Ok(Json(MessageResponse {
        message: "Heartbeat successful",
    }))
}

async fn realtime_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RealtimeStatusDto>, ApiError> {
    let user_id = state.jwt_service.extract_user_from_headers(&headers)?;
    let dto = state.realtime_service.status(user_id).await?;

    Ok(Json(dto))
}
