//! Wire objects shared between the server and its consumers.

pub mod clock;
pub mod events;
pub mod stats;
pub mod ws;

pub use clock::{ClockCommand, ClockSnapshot};
pub use events::{CardColor, MatchEvent, StoredMatchEvent, TeamSide};
pub use stats::{MatchStats, TeamCounters};
pub use ws::{MatchStateSnapshot, WsCloseCode, WsServerMessage};
