//! HTTP routes and request handling.

use crate::protocol::{BuildRequest, ErrorResponse, MessageResponse, RollResponse};
use crate::session::GameSession;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use settlers_core::GameError;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("{0}")]
    BadRequest(String),

    #[error("failed to encode game state")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Game(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_reply(status, &self.to_string()).into_response()
    }
}

/// Build the router: `POST /roll`, `POST /build/settlement`, `GET /status`.
pub fn router(session: Arc<GameSession>) -> Router {
    Router::new()
        .route("/roll", post(roll))
        .route("/build/settlement", post(build_settlement))
        .route("/status", get(status))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(session)
}

/// Serve the API until the process exits.
pub async fn run_server(addr: SocketAddr, session: Arc<GameSession>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Settlers server listening on {}", addr);

    axum::serve(listener, router(session)).await?;
    Ok(())
}

fn error_reply(status: StatusCode, error: &str) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: error.into() }))
}

async fn method_not_allowed() -> impl IntoResponse {
    error_reply(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

async fn not_found() -> impl IntoResponse {
    error_reply(StatusCode::NOT_FOUND, "not found")
}

async fn roll(State(session): State<Arc<GameSession>>) -> Json<RollResponse> {
    let (roll, players) = session.roll();
    Json(RollResponse { roll, players })
}

async fn build_settlement(
    State(session): State<Arc<GameSession>>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    session
        .build_settlement(request.player_id, request.corner_id)
        .inspect_err(|e| warn!(player = request.player_id, corner = request.corner_id, "Build rejected: {}", e))?;

    Ok(Json(MessageResponse::success()))
}

async fn status(State(session): State<Arc<GameSession>>) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(session.snapshot()?))
}
