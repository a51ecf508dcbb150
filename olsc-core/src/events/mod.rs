//! Change propagation for live match state.
//!
//! Every successful clock or feed mutation publishes a [`MatchChanged`]
//! notification. Notifications are idempotent and ephemeral; they carry
//! the match id and the source of the change, never the state itself, so
//! observers re-read the store and always see the latest snapshot even
//! after missed notifications.

pub mod channels;
pub mod types;

pub use channels::{ChangeBus, MatchChangedReceiver, DEFAULT_CHANNEL_BUFFER};
pub use types::{ChangeSource, MatchChanged};
