//! Clock API handlers.
//!
//! Every mutation runs as one atomic read-modify-write against the
//! clock document and publishes a change notification on success. The
//! read applies the three-hour ceiling as a side effect, so a clock
//! left running is auto-stopped by whoever looks at it next.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use olsc_core::clock::ClockRecord;
use olsc_core::events::MatchChanged;
use olsc_core::retry::with_retry;
use olsc_sdk::objects::{ClockCommand, ClockSnapshot};
use time::OffsetDateTime;

use super::{ApiError, MAX_STORE_ATTEMPTS};
use crate::state::AppState;

/// `POST /clock/{match_id}/start` — start or resume the match clock.
///
/// Creates the clock on first use. Resuming clears the pause reason and
/// keeps accumulated time; a finished match rejects the command.
pub(super) async fn start_clock(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<ClockSnapshot>, ApiError> {
    let snapshot = with_retry(MAX_STORE_ATTEMPTS, || {
        state.clocks.mutate(&match_id, |slot| -> Result<_, ApiError> {
            let now = OffsetDateTime::now_utc();
            match slot.as_mut() {
                None => {
                    let clock = ClockRecord::started(match_id.as_str(), now);
                    let snapshot = clock.snapshot(now);
                    *slot = Some(clock);
                    Ok(snapshot)
                }
                Some(clock) => {
                    clock.start(now)?;
                    Ok(clock.snapshot(now))
                }
            }
        })
    })
    .await??;

    state.bus.publish(MatchChanged::clock(match_id.as_str()));
    Ok(Json(snapshot))
}

/// `POST /clock/{match_id}/pause` — pause with an optional reason.
pub(super) async fn pause_clock(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    body: Result<Option<Json<ClockCommand>>, JsonRejection>,
) -> Result<Json<ClockSnapshot>, ApiError> {
    let command = body?.map(|Json(c)| c).unwrap_or_default();

    let snapshot = with_retry(MAX_STORE_ATTEMPTS, || {
        state.clocks.mutate(&match_id, |slot| match slot.as_mut() {
            None => Err(ApiError::NotFound(match_id.clone())),
            Some(clock) => {
                let now = OffsetDateTime::now_utc();
                clock.pause(now, command.reason.clone())?;
                Ok(clock.snapshot(now))
            }
        })
    })
    .await??;

    state.bus.publish(MatchChanged::clock(match_id.as_str()));
    Ok(Json(snapshot))
}

/// `POST /clock/{match_id}/finish` — finish the match. Terminal.
pub(super) async fn finish_clock(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    body: Result<Option<Json<ClockCommand>>, JsonRejection>,
) -> Result<Json<ClockSnapshot>, ApiError> {
    let command = body?.map(|Json(c)| c).unwrap_or_default();

    let snapshot = with_retry(MAX_STORE_ATTEMPTS, || {
        state.clocks.mutate(&match_id, |slot| match slot.as_mut() {
            None => Err(ApiError::NotFound(match_id.clone())),
            Some(clock) => {
                let now = OffsetDateTime::now_utc();
                clock.finish(now, command.reason.clone())?;
                Ok(clock.snapshot(now))
            }
        })
    })
    .await??;

    state.bus.publish(MatchChanged::clock(match_id.as_str()));
    Ok(Json(snapshot))
}

/// `GET /clock/{match_id}` — read the clock snapshot.
///
/// Never 404s: a match without a clock yields the zero-value snapshot.
/// Applies the three-hour ceiling before answering.
pub(super) async fn get_clock(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<ClockSnapshot>, ApiError> {
    let (snapshot, auto_stopped) = with_retry(MAX_STORE_ATTEMPTS, || {
        state.clocks.mutate(&match_id, |slot| match slot.as_mut() {
            None => (ClockSnapshot::absent(match_id.as_str()), false),
            Some(clock) => {
                let now = OffsetDateTime::now_utc();
                let before = clock.clone();
                clock.apply_ceiling(now);
                (clock.snapshot(now), *clock != before)
            }
        })
    })
    .await?;

    if auto_stopped {
        state.bus.publish(MatchChanged::clock(match_id.as_str()));
    }
    Ok(Json(snapshot))
}

/// `DELETE /clock/{match_id}` — administrative reset. Idempotent.
pub(super) async fn reset_clock(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let existed = with_retry(MAX_STORE_ATTEMPTS, || state.clocks.remove(&match_id)).await?;

    if existed {
        state.bus.publish(MatchChanged::clock(match_id.as_str()));
    }
    Ok(StatusCode::NO_CONTENT)
}
