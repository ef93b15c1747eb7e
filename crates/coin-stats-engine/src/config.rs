//! Configuration types for the statistics engines.

use std::time::Duration;

/// What to do with a weighted-average cell whose quantities sum to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroWeightPolicy {
    /// Fail the aggregation with [`EngineError::ZeroWeight`](crate::EngineError::ZeroWeight).
    #[default]
    Error,
    /// Report the cell as `0` and log a warning.
    Zero,
}

/// Configuration for the aggregation and coverage engines.
///
/// # Example
///
/// ```rust
/// use coin_stats_engine::{CacheConfig, EngineConfig, ZeroWeightPolicy};
/// use std::time::Duration;
///
/// let config = EngineConfig::builder()
///     .with_cache(CacheConfig::default())
///     .with_zero_weight(ZeroWeightPolicy::Zero)
///     .build();
///
/// assert_eq!(config.cache.unwrap().ttl, Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Result memoisation (None = every call recomputes).
    pub cache: Option<CacheConfig>,
    /// Handling of zero-weight averages.
    pub zero_weight: ZeroWeightPolicy,
}

impl EngineConfig {
    /// Creates a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    cache: Option<CacheConfig>,
    zero_weight: ZeroWeightPolicy,
}

impl EngineConfigBuilder {
    /// Enables memoisation with the given configuration.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the zero-weight policy.
    pub fn with_zero_weight(mut self, policy: ZeroWeightPolicy) -> Self {
        self.zero_weight = policy;
        self
    }

    /// Builds the EngineConfig.
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            cache: self.cache,
            zero_weight: self.zero_weight,
        }
    }
}

/// Configuration for the result cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of memoised results.
    pub max_entries: usize,
    /// Time-to-live for memoised results.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(300),
        }
    }
}
