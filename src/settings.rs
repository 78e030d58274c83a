use crate::api::USER_AGENT;
use crate::sync::SyncConfig;
use std::time::Duration;

/// Process-wide connection settings for the admin API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            timeout: Duration::from_secs(crate::sync::config::DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub api: ApiSettings,
    pub sync: SyncConfig,
}

impl Settings {
    /// Keeps the sync layer's fetch ceiling in step with the HTTP client timeout
    #[must_use]
    pub fn new(api: ApiSettings, notification_ttl: Duration) -> Self {
        let sync = SyncConfig {
            request_timeout: api.timeout,
            notification_ttl,
            ..SyncConfig::default()
        };
        Self { api, sync }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_backend_contract() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "http://localhost:8080/api");
        assert_eq!(settings.api.username, "admin");
        assert_eq!(settings.api.timeout, Duration::from_secs(10));
        assert!(settings.api.user_agent.starts_with("omnipoll-console/"));
        assert_eq!(settings.sync.notification_ttl, Duration::from_millis(3000));
    }

    #[test]
    fn test_request_timeout_follows_api_timeout() {
        let api = ApiSettings {
            timeout: Duration::from_secs(3),
            ..ApiSettings::default()
        };
        let settings = Settings::new(api, Duration::from_millis(1500));
        assert_eq!(settings.sync.request_timeout, Duration::from_secs(3));
        assert_eq!(settings.sync.notification_ttl, Duration::from_millis(1500));
    }
}
