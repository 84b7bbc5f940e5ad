//! Resolver configuration: defaults plus `PROVGEO_*` environment overrides.

use std::time::Duration;

use crate::geometry::rate_gate::DEFAULT_MIN_INTERVAL;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "province-geometry/0.1 (boundary-resolver)";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "vi,en";
pub const DEFAULT_COUNTRY: &str = "Vietnam";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Nominatim base URL, without trailing slash.
    pub base_url: String,
    /// Sent on every request; the provider's usage policy requires one.
    pub user_agent: String,
    pub accept_language: String,
    /// Appended to free-text queries ("<name>, <country>").
    pub country: String,
    pub min_interval: Duration,
    pub http_timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.into(),
            country: DEFAULT_COUNTRY.into(),
            min_interval: DEFAULT_MIN_INTERVAL,
            http_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ResolverConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Defaults overridden by `lookup` (for testing).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("PROVGEO_BASE_URL") {
            cfg.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("PROVGEO_USER_AGENT") {
            cfg.user_agent = v;
        }
        if let Some(v) = lookup("PROVGEO_ACCEPT_LANGUAGE") {
            cfg.accept_language = v;
        }
        if let Some(v) = lookup("PROVGEO_COUNTRY") {
            cfg.country = v;
        }
        if let Some(v) = lookup("PROVGEO_MIN_INTERVAL_MS") {
            let ms = parse_u64("PROVGEO_MIN_INTERVAL_MS", &v)?;
            cfg.min_interval = Duration::from_millis(ms);
        }
        if let Some(v) = lookup("PROVGEO_HTTP_TIMEOUT_SECS") {
            // 0 disables the timeout
            let secs = parse_u64("PROVGEO_HTTP_TIMEOUT_SECS", &v)?;
            cfg.http_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(cfg)
    }
}

fn parse_u64(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected: "a non-negative integer",
        value: value.to_string(),
    })
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
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = ResolverConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, ResolverConfig::default());
        assert_eq!(cfg.min_interval, Duration::from_millis(1100));
        assert_eq!(cfg.accept_language, "vi,en");
    }

    #[test]
    fn test_overrides() {
        let cfg = ResolverConfig::from_lookup(lookup_from(&[
            ("PROVGEO_BASE_URL", "http://localhost:8088/"),
            ("PROVGEO_COUNTRY", "Việt Nam"),
            ("PROVGEO_MIN_INTERVAL_MS", "250"),
            ("PROVGEO_HTTP_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8088");
        assert_eq!(cfg.country, "Việt Nam");
        assert_eq!(cfg.min_interval, Duration::from_millis(250));
        assert_eq!(cfg.http_timeout, None);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_interval() {
        let err = ResolverConfig::from_lookup(lookup_from(&[("PROVGEO_MIN_INTERVAL_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("PROVGEO_MIN_INTERVAL_MS"));
    }
}
