//! Typed match events.
//!
//! Events are modelled as an internally-tagged enum keyed by `"type"`,
//! so each kind declares exactly the fields it carries and an event with
//! an unknown kind or team fails deserialization at the boundary instead
//! of reaching the log. Absent optional fields are omitted from the
//! serialized document rather than stored as nulls.

use serde::{Deserialize, Serialize};

/// Which side of the match an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

/// Disciplinary card color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardColor {
    Yellow,
    Red,
}

/// A single recorded match event.
///
/// `minute` is operator-supplied and may be non-monotonic (stoppage
/// time); the log is ordered by arrival, never by minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    Goal {
        team: TeamSide,
        minute: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<String>,
        /// Explicit score value for point-scoring sports; a plain goal
        /// counts as 1.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        points: Option<u32>,
    },
    Foul {
        team: TeamSide,
        minute: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<String>,
    },
    Card {
        team: TeamSide,
        minute: u32,
        color: CardColor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<String>,
    },
    Substitution {
        team: TeamSide,
        minute: u32,
        player_in: String,
        player_out: String,
    },
    Penalty {
        team: TeamSide,
        minute: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<String>,
    },
    Corner {
        team: TeamSide,
        minute: u32,
    },
    FreeKick {
        team: TeamSide,
        minute: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<String>,
    },
}

impl MatchEvent {
    /// The side this event is attributed to.
    pub fn team(&self) -> TeamSide {
        match self {
            MatchEvent::Goal { team, .. }
            | MatchEvent::Foul { team, .. }
            | MatchEvent::Card { team, .. }
            | MatchEvent::Substitution { team, .. }
            | MatchEvent::Penalty { team, .. }
            | MatchEvent::Corner { team, .. }
            | MatchEvent::FreeKick { team, .. } => *team,
        }
    }

    /// The operator-supplied match minute.
    pub fn minute(&self) -> u32 {
        match self {
            MatchEvent::Goal { minute, .. }
            | MatchEvent::Foul { minute, .. }
            | MatchEvent::Card { minute, .. }
            | MatchEvent::Substitution { minute, .. }
            | MatchEvent::Penalty { minute, .. }
            | MatchEvent::Corner { minute, .. }
            | MatchEvent::FreeKick { minute, .. } => *minute,
        }
    }

    /// The event kind as it appears in the wire `"type"` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            MatchEvent::Goal { .. } => "goal",
            MatchEvent::Foul { .. } => "foul",
            MatchEvent::Card { .. } => "card",
            MatchEvent::Substitution { .. } => "substitution",
            MatchEvent::Penalty { .. } => "penalty",
            MatchEvent::Corner { .. } => "corner",
            MatchEvent::FreeKick { .. } => "free_kick",
        }
    }
}

/// An event as it sits in the append-only log, with server-assigned
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMatchEvent {
    /// Append-order index within the match's log.
    pub seq: u64,
    /// Server timestamp (unix seconds) at which the event was appended.
    pub recorded_at: i64,
    #[serde(flatten)]
    pub event: MatchEvent,
}
