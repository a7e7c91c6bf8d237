use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const ENV_BASE_URL: &str = "AUTOMATOR_API_BASE_URL";
pub const ENV_EXECUTE_ENDPOINT: &str = "AUTOMATOR_EXECUTE_ENDPOINT";
pub const ENV_PLAN_ENDPOINT: &str = "AUTOMATOR_PLAN_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "AUTOMATOR_TIMEOUT_SECS";
pub const ENV_API_KEY: &str = "AUTOMATOR_API_KEY";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_EXECUTE_PATH: &str = "/agent/execute";
pub const DEFAULT_PLAN_PATH: &str = "/agent/plan";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where the agent service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub execute_path: String,
    pub plan_path: String,
    pub timeout: Duration,
    /// Sent as `x-api-key` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            execute_path: DEFAULT_EXECUTE_PATH.to_string(),
            plan_path: DEFAULT_PLAN_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
        }
    }
}

impl ClientConfig {
    /// Reads an optional `.env`, then the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    Error::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"))
                })?;
                if secs == 0 {
                    return Err(Error::Config(format!("{ENV_TIMEOUT_SECS} must be greater than zero")));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        Ok(Self {
            base_url: get(ENV_BASE_URL).unwrap_or(defaults.base_url),
            execute_path: get(ENV_EXECUTE_ENDPOINT).unwrap_or(defaults.execute_path),
            plan_path: get(ENV_PLAN_ENDPOINT).unwrap_or(defaults.plan_path),
            timeout,
            api_key: get(ENV_API_KEY),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn execute_url(&self) -> String {
        join_url(&self.base_url, &self.execute_path)
    }

    pub fn plan_url(&self) -> String {
        join_url(&self.base_url, &self.plan_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.execute_url(), "http://localhost:8000/api/v1/agent/execute");
        assert_eq!(config.plan_url(), "http://localhost:8000/api/v1/agent/plan");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn overrides_are_applied_and_joined_cleanly() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://agent.example.com/api/"),
            (ENV_EXECUTE_ENDPOINT, "run"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_API_KEY, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.execute_url(), "https://agent.example.com/api/run");
        assert_eq!(config.plan_url(), "https://agent.example.com/api/agent/plan");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        for raw in ["soon", "0", "-1"] {
            let err = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, raw)])).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{raw}");
        }
    }
}
