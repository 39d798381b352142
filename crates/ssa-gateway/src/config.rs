//! Gateway configuration

use serde::{Deserialize, Serialize};

/// Backend the dashboard talks to when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Remote data gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Backend base URL, no trailing slash required
    pub base_url: String,
    /// Request timeout in seconds. `None` waits for the backend indefinitely.
    pub timeout_sec: Option<u64>,
    /// Ground-track window requested per overlay (minutes)
    pub track_duration_minutes: u32,
    /// Ground-track sampling step (seconds)
    pub track_step_seconds: u32,
    /// Alerts fetched for the conjunction table
    pub alert_limit: usize,
    /// Alerts fetched for the overview card
    pub stats_alert_limit: usize,
    /// Satellites fetched for the catalog table
    pub satellite_list_limit: usize,
    /// Classification rows fetched for the SSA panel
    pub classification_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_sec: None,
            track_duration_minutes: 100,
            track_step_seconds: 60,
            alert_limit: 100,
            stats_alert_limit: 5,
            satellite_list_limit: 50,
            classification_limit: 50,
        }
    }
}

impl GatewayConfig {
    /// Defaults overridden by `SSA_API_BASE` and `SSA_API_TIMEOUT_SEC`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base) = std::env::var("SSA_API_BASE") {
            config.base_url = base;
        }
        if let Some(timeout) = std::env::var("SSA_API_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_sec = Some(timeout);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_sec(mut self, timeout_sec: u64) -> Self {
        self.timeout_sec = Some(timeout_sec);
        self
    }

    /// Absolute URL for a backend path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_requests() {
        let config = GatewayConfig::default();
        assert_eq!(config.track_duration_minutes, 100);
        assert_eq!(config.track_step_seconds, 60);
        assert_eq!(config.timeout_sec, None);
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = GatewayConfig::default().with_base_url("http://ssa.local:8000/");
        assert_eq!(config.url("/tle/count"), "http://ssa.local:8000/tle/count");
    }
}
