//! Match clock state machine.
//!
//! One [`ClockRecord`] per match, living in the document store. The clock
//! accumulates elapsed play time with sub-second precision and exposes
//! whole seconds at the read boundary. A hard ceiling of three hours is
//! applied on read: a clock left running past it is forced to paused with
//! a fixed reason, and every later read returns exactly the ceiling.
//!
//! Transitions take `now` explicitly so tests drive simulated time; store
//! wrappers supply `OffsetDateTime::now_utc()`.

use olsc_sdk::objects::ClockSnapshot;
use time::OffsetDateTime;

/// Hard ceiling on elapsed play time.
pub const MAX_ELAPSED_SECS: f64 = 10_800.0;

/// Reason recorded when the ceiling forces a pause.
pub const AUTO_STOP_REASON: &str = "Auto-stopped after 3 hours";

/// Reason recorded when `finish` is called without one.
pub const DEFAULT_FINISH_REASON: &str = "Match finished";

/// Errors from clock transitions.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The match was finished; no further transitions are allowed.
    #[error("match {0} is already finished")]
    MatchFinished(String),
}

/// The phase a clock is in.
///
/// `started_at` only exists in `Running`, so a stopped clock with a stale
/// start timestamp cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockPhase {
    Running { started_at: OffsetDateTime },
    Paused { reason: Option<String> },
    Finished { reason: String },
}

/// Clock state for one match.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockRecord {
    match_id: String,
    /// Seconds accumulated over completed running spans.
    elapsed: f64,
    phase: ClockPhase,
}

impl ClockRecord {
    /// Create a clock that starts running at `now`.
    pub fn started(match_id: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            match_id: match_id.into(),
            elapsed: 0.0,
            phase: ClockPhase::Running { started_at: now },
        }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, ClockPhase::Finished { .. })
    }

    /// Start or resume the clock.
    ///
    /// Resuming preserves accumulated time and clears the pause reason.
    /// Starting an already running clock re-affirms `started_at = now`;
    /// time since the previous start is discarded, matching a scorekeeper
    /// restarting the current span.
    pub fn start(&mut self, now: OffsetDateTime) -> Result<(), ClockError> {
        if self.is_finished() {
            return Err(ClockError::MatchFinished(self.match_id.clone()));
        }
        self.phase = ClockPhase::Running { started_at: now };
        Ok(())
    }

    /// Pause the clock, accumulating the running span.
    ///
    /// Pausing an already paused clock overwrites the reason.
    pub fn pause(&mut self, now: OffsetDateTime, reason: Option<String>) -> Result<(), ClockError> {
        if self.is_finished() {
            return Err(ClockError::MatchFinished(self.match_id.clone()));
        }
        self.accumulate(now);
        self.phase = ClockPhase::Paused { reason };
        Ok(())
    }

    /// Finish the match. Terminal: every later transition is rejected.
    pub fn finish(
        &mut self,
        now: OffsetDateTime,
        reason: Option<String>,
    ) -> Result<(), ClockError> {
        if self.is_finished() {
            return Err(ClockError::MatchFinished(self.match_id.clone()));
        }
        self.accumulate(now);
        self.phase = ClockPhase::Finished {
            reason: reason.unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
        };
        Ok(())
    }

    /// Apply the three-hour ceiling as of `now`.
    ///
    /// Idempotent: once the ceiling is hit, elapsed is pinned to exactly
    /// `MAX_ELAPSED_SECS` and the phase is paused with [`AUTO_STOP_REASON`].
    pub fn apply_ceiling(&mut self, now: OffsetDateTime) {
        if self.is_finished() {
            return;
        }
        if self.elapsed_at(now) >= MAX_ELAPSED_SECS {
            self.elapsed = MAX_ELAPSED_SECS;
            self.phase = ClockPhase::Paused {
                reason: Some(AUTO_STOP_REASON.to_string()),
            };
        }
    }

    /// Elapsed seconds as of `now`, clamped to the ceiling.
    fn elapsed_at(&self, now: OffsetDateTime) -> f64 {
        let live = match self.phase {
            ClockPhase::Running { started_at } => (now - started_at).as_seconds_f64().max(0.0),
            _ => 0.0,
        };
        (self.elapsed + live).min(MAX_ELAPSED_SECS)
    }

    /// The wire snapshot as of `now`. Elapsed is rounded to whole seconds.
    pub fn snapshot(&self, now: OffsetDateTime) -> ClockSnapshot {
        let (running, paused_reason, finished) = match &self.phase {
            ClockPhase::Running { .. } => (true, None, false),
            ClockPhase::Paused { reason } => (false, reason.clone(), false),
            ClockPhase::Finished { reason } => (false, Some(reason.clone()), true),
        };
        ClockSnapshot {
            match_id: self.match_id.clone(),
            elapsed: self.elapsed_at(now).round() as u64,
            running,
            paused_reason,
            finished,
        }
    }

    fn accumulate(&mut self, now: OffsetDateTime) {
        if let ClockPhase::Running { started_at } = self.phase {
            self.elapsed += (now - started_at).as_seconds_f64().max(0.0);
        }
    }
}
