//! Configuration module

use std::env;

/// Default Looker Studio report linked from the reports tab
pub const DEFAULT_REPORT_URL: &str =
    "https://lookerstudio.google.com/reporting/48e9ea6f-8ccd-4c70-b389-e1dc8ad93f36";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Completion service API key (checked at call time, not at startup)
    pub openai_api_key: Option<String>,

    /// Completion service base URL
    pub openai_base_url: String,

    /// Completion model identifier
    pub openai_model: String,

    /// Per-attempt timeout for completion requests
    pub completion_timeout_secs: u64,

    /// Retries allowed on transient completion failures
    pub completion_max_retries: u32,

    /// External report URL
    pub report_url: String,

    /// Idle lifetime of a dataset session
    pub session_ttl_minutes: i64,

    /// Upper bound on live dataset sessions
    pub max_sessions: usize,

    /// Upper bound for uploaded CSV bodies
    pub max_upload_mb: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            completion_timeout_secs: 30,
            completion_max_retries: 1,
            report_url: DEFAULT_REPORT_URL.to_string(),
            session_ttl_minutes: 30,
            max_sessions: 100,
            max_upload_mb: 10,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),

            openai_base_url: env::var("OPENAI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),

            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or(defaults.openai_model),

            completion_timeout_secs: env::var("COMPLETION_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.completion_timeout_secs),

            completion_max_retries: env::var("COMPLETION_MAX_RETRIES")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(defaults.completion_max_retries),

            report_url: env::var("REPORT_URL")
                .unwrap_or(defaults.report_url),

            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(defaults.session_ttl_minutes),

            max_sessions: env::var("MAX_SESSIONS")
                .ok()
                .and_then(|m| m.parse().ok())
                .filter(|m: &usize| *m > 0)
                .unwrap_or(defaults.max_sessions),

            max_upload_mb: env::var("MAX_UPLOAD_MB")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(defaults.max_upload_mb),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Upload limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert_eq!(config.completion_max_retries, 1);
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.max_sessions, 100);
        assert!(!config.is_production());
    }

    #[test]
    fn test_upload_limit() {
        let config = Config {
            max_upload_mb: 2,
            ..Default::default()
        };
        assert_eq!(config.max_upload_bytes(), 2 * 1024 * 1024);
    }
}
