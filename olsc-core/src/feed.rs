//! Append-only match event log and its derived aggregates.
//!
//! The log is the source of truth; the cached score pair on the feed is a
//! read optimization kept in step with every goal append. Aggregation is
//! always a fold over the log in append order, and when the cache ever
//! disagrees with the fold, the fold wins.

use olsc_sdk::objects::{
    CardColor, MatchEvent, MatchStats, StoredMatchEvent, TeamCounters, TeamSide,
};
use time::OffsetDateTime;
use tracing::warn;

/// Errors from feed operations.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The feed was never started for this match.
    #[error("match {0} has no feed")]
    NotFound(String),
}

/// The event log document for one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchFeed {
    match_id: String,
    /// Cached score pair, incremented on every goal append.
    home_score: u32,
    away_score: u32,
    events: Vec<StoredMatchEvent>,
}

impl MatchFeed {
    /// A fresh feed: 0-0, empty log. Starting an existing feed replaces
    /// it with this.
    pub fn new(match_id: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            home_score: 0,
            away_score: 0,
            events: Vec::new(),
        }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn events(&self) -> &[StoredMatchEvent] {
        &self.events
    }

    /// Append an event, assigning its `seq` and `recorded_at`, and apply
    /// the cached score increment for goals in the same step.
    pub fn append(&mut self, event: MatchEvent, now: OffsetDateTime) -> StoredMatchEvent {
        if let MatchEvent::Goal { team, points, .. } = &event {
            let points = points.unwrap_or(1);
            match team {
                TeamSide::Home => self.home_score = self.home_score.saturating_add(points),
                TeamSide::Away => self.away_score = self.away_score.saturating_add(points),
            }
        }
        let stored = StoredMatchEvent {
            seq: self.events.len() as u64,
            recorded_at: now.unix_timestamp(),
            event,
        };
        self.events.push(stored.clone());
        stored
    }

    /// Fold the log into [`MatchStats`].
    ///
    /// Deterministic in append order. The fold's scores are checked
    /// against the cached pair; on divergence the fold wins and a
    /// warning is logged.
    pub fn aggregate(&self) -> MatchStats {
        let mut home_score = 0u32;
        let mut away_score = 0u32;
        let mut home = TeamCounters::default();
        let mut away = TeamCounters::default();

        for stored in &self.events {
            let counters = match stored.event.team() {
                TeamSide::Home => &mut home,
                TeamSide::Away => &mut away,
            };
            match &stored.event {
                MatchEvent::Goal { team, points, .. } => {
                    let points = points.unwrap_or(1);
                    match team {
                        TeamSide::Home => home_score = home_score.saturating_add(points),
                        TeamSide::Away => away_score = away_score.saturating_add(points),
                    }
                }
                MatchEvent::Foul { .. } => counters.fouls += 1,
                MatchEvent::Card { color, .. } => match color {
                    CardColor::Yellow => counters.yellow_cards += 1,
                    CardColor::Red => counters.red_cards += 1,
                },
                MatchEvent::Penalty { .. } => counters.penalties += 1,
                MatchEvent::Corner { .. } => counters.corners += 1,
                MatchEvent::FreeKick { .. } => counters.free_kicks += 1,
                MatchEvent::Substitution { .. } => {}
            }
        }

        if (home_score, away_score) != (self.home_score, self.away_score) {
            warn!(
                match_id = %self.match_id,
                cached_home = self.home_score,
                cached_away = self.away_score,
                fold_home = home_score,
                fold_away = away_score,
                "cached score diverged from event log, using the fold"
            );
        }

        MatchStats {
            match_id: self.match_id.clone(),
            home_score,
            away_score,
            home,
            away,
            events: self.events.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn goal(team: TeamSide, minute: u32, points: Option<u32>) -> MatchEvent {
        MatchEvent::Goal {
            team,
            minute,
            player: None,
            points,
        }
    }

    #[test]
    fn append_assigns_sequential_seq_and_timestamps() {
        let mut feed = MatchFeed::new("m1");
        let first = feed.append(goal(TeamSide::Home, 12, None), now());
        let second = feed.append(
            MatchEvent::Corner {
                team: TeamSide::Away,
                minute: 13,
            },
            now(),
        );
        assert_eq!(first.seq, 0);
        assert_eq!(second.seq, 1);
        assert_eq!(first.recorded_at, 1_700_000_000);
    }

    #[test]
    fn aggregate_folds_scores_and_counters() {
        let mut feed = MatchFeed::new("m1");
        feed.append(goal(TeamSide::Home, 12, None), now());
        feed.append(goal(TeamSide::Away, 30, Some(3)), now());
        feed.append(
            MatchEvent::Card {
                team: TeamSide::Home,
                minute: 41,
                color: CardColor::Yellow,
                player: Some("Kovač".into()),
            },
            now(),
        );
        feed.append(
            MatchEvent::Card {
                team: TeamSide::Home,
                minute: 77,
                color: CardColor::Red,
                player: Some("Kovač".into()),
            },
            now(),
        );
        feed.append(
            MatchEvent::Foul {
                team: TeamSide::Away,
                minute: 55,
                player: None,
            },
            now(),
        );
        feed.append(
            MatchEvent::Substitution {
                team: TeamSide::Away,
                minute: 60,
                player_in: "Diaz".into(),
                player_out: "Silva".into(),
            },
            now(),
        );

        let stats = feed.aggregate();
        assert_eq!(stats.home_score, 1);
        assert_eq!(stats.away_score, 3);
        assert_eq!(stats.home.yellow_cards, 1);
        assert_eq!(stats.home.red_cards, 1);
        assert_eq!(stats.away.fouls, 1);
        assert_eq!(stats.events.len(), 6);
    }

    #[test]
    fn aggregate_is_deterministic_and_ignores_minute_order() {
        let mut feed = MatchFeed::new("m1");
        // Stoppage time: minutes arrive out of order.
        feed.append(goal(TeamSide::Home, 90, None), now());
        feed.append(goal(TeamSide::Home, 45, None), now());

        let first = feed.aggregate();
        let second = feed.aggregate();
        assert_eq!(first, second);
        assert_eq!(first.events[0].event.minute(), 90);
        assert_eq!(first.events[1].event.minute(), 45);
    }

    #[test]
    fn fold_wins_over_a_diverged_cache() {
        let mut feed = MatchFeed::new("m1");
        feed.append(goal(TeamSide::Home, 10, None), now());
        feed.home_score = 5;

        let stats = feed.aggregate();
        assert_eq!(stats.home_score, 1);
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        let mut feed = MatchFeed::new("m1");
        feed.append(goal(TeamSide::Home, 1, Some(u32::MAX)), now());
        feed.append(goal(TeamSide::Home, 2, Some(1)), now());

        let stats = feed.aggregate();
        assert_eq!(stats.home_score, u32::MAX);
    }

    #[test]
    fn restart_resets_score_and_log() {
        let mut feed = MatchFeed::new("m1");
        feed.append(goal(TeamSide::Home, 10, None), now());

        let feed = MatchFeed::new(feed.match_id().to_string());
        let stats = feed.aggregate();
        assert_eq!((stats.home_score, stats.away_score), (0, 0));
        assert!(stats.events.is_empty());
    }
}
