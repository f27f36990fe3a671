//! Service Configuration
//!
//! Configurable parameters for the resolution API.
//! Defaults reproduce a loopback-only deployment on port 8080.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration for the resolution service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvConfig {
    // === Network ===

    /// Address the lookup API listens on
    pub listen_addr: SocketAddr,

    /// Address for health and metrics endpoints (disabled when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_addr: Option<SocketAddr>,

    // === Caching ===

    /// Freshness lifetime announced in `Cache-Control` (seconds)
    pub cache_max_age_secs: u32,

    // === DNS ===

    /// Read upstream servers from the system configuration (resolv.conf)
    pub use_system_resolver: bool,

    /// Timeout of a single DNS query (seconds)
    pub lookup_timeout_secs: u64,

    /// Attempts per query before giving up
    pub lookup_attempts: usize,
}

impl Default for ResolvConfig {
    fn default() -> Self {
        Self {
            // Network
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            metrics_addr: None,

            // Caching - 15 minutes
            cache_max_age_secs: 900,

            // DNS
            use_system_resolver: true,
            lookup_timeout_secs: 5,
            lookup_attempts: 2,
        }
    }
}

impl ResolvConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    // Builder-style methods for CLI overrides

    pub fn with_listen_addr(mut self, addr: Option<SocketAddr>) -> Self {
        if let Some(addr) = addr {
            self.listen_addr = addr;
        }
        self
    }

    pub fn with_metrics_addr(mut self, addr: Option<SocketAddr>) -> Self {
        if addr.is_some() {
            self.metrics_addr = addr;
        }
        self
    }

    pub fn with_cache_max_age(mut self, secs: Option<u32>) -> Self {
        if let Some(secs) = secs {
            self.cache_max_age_secs = secs;
        }
        self
    }

    pub fn with_system_resolver(mut self, enabled: bool) -> Self {
        self.use_system_resolver = enabled;
        self
    }

    /// `Cache-Control` header value for successful and error responses
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.lookup_timeout_secs == 0 {
            anyhow::bail!("lookup_timeout_secs must be greater than 0");
        }

        if self.lookup_attempts == 0 {
            anyhow::bail!("lookup_attempts must be greater than 0");
        }

        if self.metrics_addr == Some(self.listen_addr) {
            anyhow::bail!(
                "metrics_addr ({}) must differ from listen_addr",
                self.listen_addr
            );
        }

        Ok(())
    }
}
