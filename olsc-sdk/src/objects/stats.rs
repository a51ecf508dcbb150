use serde::{Deserialize, Serialize};

use super::events::StoredMatchEvent;

/// Per-team event counters derived from the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCounters {
    pub fouls: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub penalties: u32,
    pub corners: u32,
    pub free_kicks: u32,
}

/// Aggregated match statistics.
///
/// Always the fold of `events` under the scoring rules; no field here is
/// an independent source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub match_id: String,
    pub home_score: u32,
    pub away_score: u32,
    pub home: TeamCounters,
    pub away: TeamCounters,
    /// The raw event log the scores and counters were derived from.
    pub events: Vec<StoredMatchEvent>,
}
