use serde::{Deserialize, Serialize};

/// Point-in-time view of a match clock as returned by the clock API.
///
/// `elapsed` is whole seconds; sub-second precision exists only inside
/// the store, so two snapshots taken while the clock runs are always
/// non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub match_id: String,
    /// Accumulated running time in whole seconds.
    pub elapsed: u64,
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_reason: Option<String>,
    /// Terminal flag; a finished clock rejects further `start` commands.
    #[serde(default)]
    pub finished: bool,
}

impl ClockSnapshot {
    /// The zero-value snapshot returned for a match with no clock record.
    pub fn absent(match_id: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            elapsed: 0,
            running: false,
            paused_reason: None,
            finished: false,
        }
    }
}

/// Request body for `pause` and `finish` clock commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
