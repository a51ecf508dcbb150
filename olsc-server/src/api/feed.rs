//! Feed and stats API handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use olsc_core::events::MatchChanged;
use olsc_core::feed::{FeedError, MatchFeed};
use olsc_core::retry::with_retry;
use olsc_sdk::objects::{MatchEvent, MatchStats, StoredMatchEvent};
use time::OffsetDateTime;

use super::{ApiError, MAX_STORE_ATTEMPTS};
use crate::state::AppState;

/// `POST /feed/{match_id}/start` — initialize the event feed.
///
/// Starting an already started feed resets it: 0-0, empty log.
pub(super) async fn start_feed(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchStats>, ApiError> {
    let stats = with_retry(MAX_STORE_ATTEMPTS, || {
        state.feeds.mutate(&match_id, |slot| {
            let feed = MatchFeed::new(match_id.as_str());
            let stats = feed.aggregate();
            *slot = Some(feed);
            stats
        })
    })
    .await?;

    state.bus.publish(MatchChanged::feed(match_id.as_str()));
    Ok(Json(stats))
}

/// `POST /feed/{match_id}` — append an event to the log.
///
/// The tagged event type enforces kind and team validity at
/// deserialization, so nothing invalid reaches the log. Appending to a
/// finished match is rejected; to an unstarted feed, not found.
pub(super) async fn append_event(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    body: Result<Json<MatchEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredMatchEvent>), ApiError> {
    let Json(event) = body?;

    // Clock and feed are separate documents, each atomic on its own; a
    // finish landing between this check and the mutate below can still
    // admit one event.
    let clock = with_retry(MAX_STORE_ATTEMPTS, || state.clocks.get(&match_id)).await?;
    if clock.is_some_and(|c| c.is_finished()) {
        return Err(ApiError::MatchFinished(match_id));
    }

    let stored = with_retry(MAX_STORE_ATTEMPTS, || {
        let event = event.clone();
        let id = match_id.clone();
        state.feeds.mutate(&match_id, move |slot| match slot.as_mut() {
            None => Err(FeedError::NotFound(id)),
            Some(feed) => Ok(feed.append(event, OffsetDateTime::now_utc())),
        })
    })
    .await??;

    state.bus.publish(MatchChanged::feed(match_id.as_str()));
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /stats/{match_id}` — aggregated stats plus the raw event list.
pub(super) async fn get_stats(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchStats>, ApiError> {
    let feed = with_retry(MAX_STORE_ATTEMPTS, || state.feeds.get(&match_id))
        .await?
        .ok_or_else(|| FeedError::NotFound(match_id.clone()))?;

    Ok(Json(feed.aggregate()))
}
