//! WebSocket message types for the live match stream.
//!
//! The `GET /matches/{match_id}/live` endpoint upgrades to a WebSocket
//! connection and pushes [`WsServerMessage`] JSON frames.
//!
//! # Protocol
//!
//! 1. The server sends a [`WsServerMessage::StateUpdate`] with the
//!    current full match state immediately after the upgrade.
//! 2. Subsequent [`WsServerMessage::StateUpdate`] frames are sent
//!    whenever the match clock or event log changes.
//! 3. Every frame carries the full state (clock snapshot plus the whole
//!    event log), so a consumer can recompute aggregates from any single
//!    frame without tracking deltas.

use serde::{Deserialize, Serialize};

use super::clock::ClockSnapshot;
use super::events::StoredMatchEvent;

/// The full live state of one match: clock plus event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStateSnapshot {
    pub match_id: String,
    pub clock: ClockSnapshot,
    pub events: Vec<StoredMatchEvent>,
}

/// Server-to-client WebSocket message.
///
/// Serialized as an internally-tagged JSON object so the client can
/// dispatch on the `"type"` field:
///
/// ```json
/// {"type":"state_update","state":{ ... }}
/// {"type":"error","code":1011,"reason":"internal error"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// A full match state snapshot (sent as the first frame and on every
    /// subsequent change).
    StateUpdate { state: MatchStateSnapshot },

    /// A server-side error that does **not** close the connection by
    /// itself. The server may still send a close frame afterwards.
    Error { code: u16, reason: String },
}

/// Well-known WebSocket close codes used by the live match stream.
///
/// Codes in the 4000–4999 range are reserved for application use by
/// [RFC 6455 §7.4.2](https://www.rfc-editor.org/rfc/rfc6455#section-7.4.2).
pub struct WsCloseCode;

impl WsCloseCode {
    /// Normal closure (client went away or server is shutting down).
    pub const NORMAL: u16 = 1000;

    /// An unexpected server-side error prevented the connection from
    /// continuing.
    pub const INTERNAL_ERROR: u16 = 1011;
}
