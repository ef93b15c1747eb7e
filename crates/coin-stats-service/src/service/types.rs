//! Types for the statistics service.

use coin_stats::record::well_known;
use coin_stats_engine::{CacheConfig, EngineConfig};

use crate::geojson::ExclusionRules;

/// Configuration for the statistics service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Configuration shared by the aggregation and coverage engines.
    pub engine: EngineConfig,
    /// First coverage dimension.
    pub primary_field: String,
    /// Second coverage dimension.
    pub secondary_field: String,
    /// Rules applied to GeoJSON features before the coverage catalog is built. None by
    /// default, so every mint-layer feature takes part in coverage.
    pub exclusions: Option<ExclusionRules>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::builder()
                .with_cache(CacheConfig::default())
                .build(),
            primary_field: well_known::AUTHORITY.to_string(),
            secondary_field: well_known::MINT.to_string(),
            exclusions: None,
        }
    }
}

impl ServiceConfig {
    /// Creates a config that recomputes every query.
    pub fn no_cache() -> Self {
        Self {
            engine: EngineConfig::default(),
            ..Self::default()
        }
    }

    /// Sets the engine configuration.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Sets the two coverage dimensions.
    pub fn with_fields(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.primary_field = primary.into();
        self.secondary_field = secondary.into();
        self
    }

    /// Sets (or clears) the GeoJSON exclusion rules.
    pub fn with_exclusions(mut self, exclusions: Option<ExclusionRules>) -> Self {
        self.exclusions = exclusions;
        self
    }
}

/// Statistics about service usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Aggregation and coverage queries answered.
    pub queries: usize,
    /// Queries answered from a memo.
    pub cache_hits: usize,
    /// Queries that had to be computed.
    pub cache_misses: usize,
    /// Dataset refreshes.
    pub refreshes: usize,
}

impl ServiceStats {
    /// Returns the cache hit rate as a percentage.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            (self.cache_hits as f64 / total as f64) * 100.0
        }
    }
}

impl std::fmt::Display for ServiceStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Coin Statistics Service:")?;
        writeln!(f, "  Queries:         {}", self.queries)?;
        writeln!(f, "  Cache hits:      {}", self.cache_hits)?;
        writeln!(f, "  Cache misses:    {}", self.cache_misses)?;
        writeln!(f, "  Hit rate:        {:.1}%", self.cache_hit_rate())?;
        writeln!(f, "  Refreshes:       {}", self.refreshes)?;
        Ok(())
    }
}
