//! Runtime configuration derived from the file config plus CLI overrides.

use std::net::SocketAddr;

/// Configuration as used at runtime, behind `AppState`'s lock.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// The address the server listens on. A reload does not rebind; the
    /// new value takes effect on restart.
    pub listen: SocketAddr,
    /// Allowed CORS origins; empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            allowed_origins: Vec::new(),
        }
    }
}
