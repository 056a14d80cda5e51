//! Store Configuration

use std::time::Duration;

/// Suffix appended to a key by `Store::copy`
pub const DEFAULT_COPY_SUFFIX: &str = "_copy";

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// TTL applied when a write passes a zero TTL (zero = never expire)
    pub default_ttl: Duration,

    /// Period between background sweeps (zero = no sweeper)
    pub sweep_interval: Duration,

    /// Suffix used to name the key created by `copy`
    pub copy_suffix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::ZERO,
            sweep_interval: Duration::ZERO,
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
        }
    }
}

impl StoreConfig {
    /// Set the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the copy suffix
    pub fn with_copy_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.copy_suffix = suffix.into();
        self
    }

    /// Whether a background sweeper should run
    pub fn sweeper_enabled(&self) -> bool {
        !self.sweep_interval.is_zero()
    }

    /// TTL a write actually gets: the explicit one unless zero
    pub fn effective_ttl(&self, ttl: Duration) -> Duration {
        if ttl.is_zero() {
            self.default_ttl
        } else {
            ttl
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(!config.sweeper_enabled());
        assert_eq!(config.copy_suffix, "_copy");
        assert_eq!(config.effective_ttl(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_effective_ttl() {
        let config = StoreConfig::default().with_default_ttl(Duration::from_secs(5));
        assert_eq!(config.effective_ttl(Duration::ZERO), Duration::from_secs(5));
        assert_eq!(
            config.effective_ttl(Duration::from_millis(10)),
            Duration::from_millis(10)
        );
    }
}
