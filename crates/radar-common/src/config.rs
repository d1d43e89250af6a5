//! Configuration for the render engine.

use crate::error::{RenderError, RenderResult};
use serde::{Deserialize, Serialize};

/// Configuration for the rendered-frame cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Maximum number of rendered frames kept in memory.
    pub capacity: usize,

    /// Seconds after which a cached frame is considered stale.
    pub ttl_secs: u64,

    /// Serve stale frames instead of treating them as misses.
    pub serve_stale: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            ttl_secs: 900,
            serve_stale: false,
        }
    }
}

impl RenderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RENDER_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                config.capacity = capacity;
            }
        }

        if let Ok(val) = std::env::var("RENDER_CACHE_TTL_SECS") {
            if let Ok(ttl) = val.parse() {
                config.ttl_secs = ttl;
            }
        }

        if let Ok(val) = std::env::var("RENDER_CACHE_SERVE_STALE") {
            config.serve_stale = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> RenderResult<()> {
        if self.capacity == 0 {
            return Err(RenderError::InvalidConfig(
                "capacity must be > 0".to_string(),
            ));
        }
        if self.ttl_secs == 0 {
            return Err(RenderError::InvalidConfig(
                "ttl_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
