//! Application state shared across all request handlers.

use crate::config::RuntimeConfig;
use olsc_core::clock::ClockRecord;
use olsc_core::events::ChangeBus;
use olsc_core::feed::MatchFeed;
use olsc_core::store::Collection;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Clock documents, one per match.
    pub clocks: Arc<Collection<ClockRecord>>,
    /// Feed documents, one per match.
    pub feeds: Arc<Collection<MatchFeed>>,
    /// Change bus driving WebSocket push.
    pub bus: ChangeBus,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: Arc<RwLock<RuntimeConfig>>,
}

impl AppState {
    /// Create a new AppState with empty stores.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            clocks: Arc::new(Collection::new()),
            feeds: Arc::new(Collection::new()),
            bus: ChangeBus::default(),
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Update the configuration (used during SIGHUP reload).
    pub async fn update_config(&self, new_config: RuntimeConfig) {
        let mut config = self.config.write().await;
        *config = new_config;
    }
}
