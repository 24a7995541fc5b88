//! Configuration structures for the periodic system.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Period normalizer configuration.
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

impl Config {
    /// Load configuration from a JSON document.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Period normalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// A DAY feed whose newest date is older than this many days has its
    /// newest month dropped as incomplete.
    pub staleness_days: i64,
    /// Drop DAY rows that fall in the month that is still open.
    pub drop_current_period: bool,
    /// Final character of a decade label marking the authoritative row.
    pub decade_marker: char,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            staleness_days: 30,
            drop_current_period: true,
            decade_marker: '3',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.normalizer.staleness_days, 30);
        assert!(config.normalizer.drop_current_period);
        assert_eq!(config.normalizer.decade_marker, '3');
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{"normalizer": {"staleness_days": 45}}"#).unwrap();
        assert_eq!(config.normalizer.staleness_days, 45);
        assert!(config.normalizer.drop_current_period);

        let empty = Config::from_json_str("{}").unwrap();
        assert_eq!(empty.normalizer.decade_marker, '3');
    }
}
