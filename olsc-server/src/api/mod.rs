//! Live score API handlers.
//!
//! All endpoints are nested under `/api/v1`.
//!
//! # Endpoints
//!
//! - `POST   /clock/{match_id}/start`  – start or resume the match clock
//! - `POST   /clock/{match_id}/pause`  – pause with an optional reason
//! - `POST   /clock/{match_id}/finish` – finish the match (terminal)
//! - `GET    /clock/{match_id}`        – read the clock snapshot
//! - `DELETE /clock/{match_id}`        – administrative clock reset
//! - `POST   /feed/{match_id}/start`   – initialize the event feed
//! - `POST   /feed/{match_id}`         – append a match event
//! - `GET    /stats/{match_id}`        – aggregated stats plus raw events
//! - `GET    /matches/{match_id}/live` – WebSocket live state stream

use axum::{
    Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::state::AppState;
use olsc_core::clock::ClockError;
use olsc_core::feed::FeedError;
use olsc_core::store::StoreError;

mod clock;
mod feed;
mod live;

/// Attempts per store operation before a transient failure surfaces as 503.
const MAX_STORE_ATTEMPTS: u32 = 3;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clock/{match_id}/start", post(clock::start_clock))
        .route("/clock/{match_id}/pause", post(clock::pause_clock))
        .route("/clock/{match_id}/finish", post(clock::finish_clock))
        .route(
            "/clock/{match_id}",
            get(clock::get_clock).delete(clock::reset_clock),
        )
        .route("/feed/{match_id}/start", post(feed::start_feed))
        .route("/feed/{match_id}", post(feed::append_event))
        .route("/stats/{match_id}", get(feed::get_stats))
        .route("/matches/{match_id}/live", get(live::live_ws))
}

/// Errors that can occur in API handlers.
#[derive(Debug)]
pub(super) enum ApiError {
    /// The referenced match state does not exist.
    NotFound(String),
    /// The request body was malformed or failed typed validation.
    InvalidInput(String),
    /// The match is finished; mutations are rejected.
    MatchFinished(String),
    /// The store could not serve the request.
    Unavailable(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Unavailable(e)
    }
}

impl From<ClockError> for ApiError {
    fn from(e: ClockError) -> Self {
        match e {
            ClockError::MatchFinished(match_id) => ApiError::MatchFinished(match_id),
        }
    }
}

impl From<FeedError> for ApiError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::NotFound(match_id) => ApiError::NotFound(match_id),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound(match_id) => (
                StatusCode::NOT_FOUND,
                format!("no state for match {match_id}"),
            )
                .into_response(),
            ApiError::InvalidInput(reason) => (StatusCode::BAD_REQUEST, reason).into_response(),
            ApiError::MatchFinished(match_id) => (
                StatusCode::CONFLICT,
                format!("match {match_id} is already finished"),
            )
                .into_response(),
            ApiError::Unavailable(e) => {
                tracing::error!(error = %e, "store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "store unavailable").into_response()
            }
        }
    }
}
