use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_STORAGE_KEY: &str = "ecotrack-storage";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EcoConfig {
    pub storage_key: String,
    pub detection_api_url: String,
    pub detection_timeout: Duration,
    pub fallback_confidence: u8,
    pub analysis_threshold: f64,
}

impl EcoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any key/value source, falling back to defaults
    /// for keys the source doesn't have.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout_ms: u64 = parse_var(&lookup, "DETECTION_TIMEOUT_MS", 5000)?;
        let fallback_confidence: u8 = parse_var(&lookup, "FALLBACK_CONFIDENCE", 85)?;
        if fallback_confidence > 100 {
            return Err(ConfigError::Invalid {
                name: "FALLBACK_CONFIDENCE",
                value: fallback_confidence.to_string(),
            });
        }

        let analysis_threshold: f64 = parse_var(&lookup, "SCAN_ANALYSIS_THRESHOLD", 40.0)?;
        if !(analysis_threshold > 0.0 && analysis_threshold < 100.0) {
            return Err(ConfigError::Invalid {
                name: "SCAN_ANALYSIS_THRESHOLD",
                value: analysis_threshold.to_string(),
            });
        }

        Ok(Self {
            storage_key: lookup("ECOTRACK_STORAGE_KEY").unwrap_or(defaults.storage_key),
            detection_api_url: lookup("DETECTION_API_URL").unwrap_or(defaults.detection_api_url),
            detection_timeout: Duration::from_millis(timeout_ms),
            fallback_confidence,
            analysis_threshold,
        })
    }
}

impl Default for EcoConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            detection_api_url: "http://localhost:8000".to_string(),
            detection_timeout: Duration::from_millis(5000),
            fallback_confidence: 85,
            analysis_threshold: 40.0,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = EcoConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, EcoConfig::default());
        assert_eq!(config.storage_key, "ecotrack-storage");
        assert_eq!(config.fallback_confidence, 85);
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = EcoConfig::from_lookup(lookup_from(&[
            ("ECOTRACK_STORAGE_KEY", "demo-storage"),
            ("DETECTION_TIMEOUT_MS", "250"),
            ("FALLBACK_CONFIDENCE", "70"),
            ("SCAN_ANALYSIS_THRESHOLD", "45"),
        ]))
        .unwrap();

        assert_eq!(config.storage_key, "demo-storage");
        assert_eq!(config.detection_timeout, Duration::from_millis(250));
        assert_eq!(config.fallback_confidence, 70);
        assert_eq!(config.analysis_threshold, 45.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EcoConfig::from_lookup(lookup_from(&[("DETECTION_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "DETECTION_TIMEOUT_MS",
                value: "soon".to_string()
            }
        );

        assert!(EcoConfig::from_lookup(lookup_from(&[("FALLBACK_CONFIDENCE", "101")])).is_err());
        assert!(
            EcoConfig::from_lookup(lookup_from(&[("SCAN_ANALYSIS_THRESHOLD", "100")])).is_err()
        );
    }
}
