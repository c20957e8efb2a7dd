/*!
 * Pool Configuration
 *
 * Sizing and selection policy for a pool, with environment overrides
 */

use super::types::{MemoryError, MemoryResult};
use crate::core::limits::{
    DEFAULT_CRITICAL_THRESHOLD, DEFAULT_FREE_LIST_CAPACITY, DEFAULT_POOL_SIZE,
    DEFAULT_WARNING_THRESHOLD,
};
use crate::core::types::Size;
use log::warn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How allocate picks a block out of the free list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Pop the smallest free block; if it is too small the request fails and
    /// that block is dropped from the free list
    #[default]
    SmallestOnly,
    /// Pop until a large enough block turns up, then push the undersized ones back
    BestFit,
}

impl FromStr for SelectionPolicy {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smallest" | "smallest-only" => Ok(SelectionPolicy::SmallestOnly),
            "best-fit" | "bestfit" => Ok(SelectionPolicy::BestFit),
            other => Err(MemoryError::InvalidConfig(format!(
                "unknown selection policy '{}'",
                other
            ))),
        }
    }
}

/// Pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Backing region size in bytes, headers included
    pub pool_size: Size,
    /// Maximum number of free-list entries
    pub free_list_capacity: usize,
    pub policy: SelectionPolicy,
    /// Usage ratio reported as HIGH pressure
    pub warning_threshold: f64,
    /// Usage ratio reported as CRITICAL pressure
    pub critical_threshold: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            free_list_capacity: DEFAULT_FREE_LIST_CAPACITY,
            policy: SelectionPolicy::SmallestOnly,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

impl PoolConfig {
    pub fn new(pool_size: Size) -> Self {
        Self {
            pool_size,
            ..Default::default()
        }
    }

    pub fn with_free_list_capacity(mut self, capacity: usize) -> Self {
        self.free_list_capacity = capacity;
        self
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_thresholds(mut self, warning: f64, critical: f64) -> Self {
        self.warning_threshold = warning;
        self.critical_threshold = critical;
        self
    }

    /// Defaults overlaid with environment variables
    ///
    /// - HEAP_POOL_SIZE: backing region size in bytes
    /// - HEAP_POOL_FREE_LIST_CAPACITY: free-list entries
    /// - HEAP_POOL_POLICY: `smallest` or `best-fit`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = env_value::<Size>("HEAP_POOL_SIZE") {
            config.pool_size = size;
        }
        if let Some(capacity) = env_value::<usize>("HEAP_POOL_FREE_LIST_CAPACITY") {
            config.free_list_capacity = capacity;
        }
        if let Some(policy) = env_value::<SelectionPolicy>("HEAP_POOL_POLICY") {
            config.policy = policy;
        }

        config
    }

    pub fn validate(&self) -> MemoryResult<()> {
        if self.free_list_capacity == 0 {
            return Err(MemoryError::InvalidConfig(
                "free list capacity must be at least 1".to_string(),
            ));
        }

        let in_range = |ratio: f64| ratio > 0.0 && ratio <= 1.0;
        if !in_range(self.warning_threshold) || !in_range(self.critical_threshold) {
            return Err(MemoryError::InvalidConfig(format!(
                "pressure thresholds must lie in (0, 1], got {} / {}",
                self.warning_threshold, self.critical_threshold
            )));
        }
        if self.warning_threshold > self.critical_threshold {
            return Err(MemoryError::InvalidConfig(format!(
                "warning threshold {} exceeds critical threshold {}",
                self.warning_threshold, self.critical_threshold
            )));
        }

        Ok(())
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}
