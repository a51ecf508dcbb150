//! Change notification types.

/// Which subsystem produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// A clock transition (start / pause / finish / auto-stop / reset).
    Clock,
    /// A feed mutation (start / append).
    Feed,
}

impl std::fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeSource::Clock => write!(f, "clock"),
            ChangeSource::Feed => write!(f, "feed"),
        }
    }
}

/// Notification that a match's live state changed.
///
/// Carries identifiers only; observers fetch current state from the
/// store, which makes delivery idempotent and lag harmless.
#[derive(Debug, Clone)]
pub struct MatchChanged {
    pub match_id: String,
    pub source: ChangeSource,
}

impl MatchChanged {
    pub fn clock(match_id: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            source: ChangeSource::Clock,
        }
    }

    pub fn feed(match_id: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            source: ChangeSource::Feed,
        }
    }
}
