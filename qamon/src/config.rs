//! Configuration management via environment variables
//!
//! Every setting has a `QAMON_*` name. Settings the older dashboard server
//! already read keep working under their legacy names, with a deprecation
//! warning. Empty values count as unset, so a blank webhook URL disables its
//! channel instead of producing delivery errors.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default target service base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Default pause between cycles (seconds)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 10;

/// Default per-request timeout for test GETs (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Default per-channel notification timeout (seconds)
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 5;

/// Default placeholder mapping for endpoint templates
pub const DEFAULT_PLACEHOLDERS: &str = "user_id=123,workflow_id=456,image_id=789";

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Get a non-empty environment variable
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(non_empty)
}

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use qamon::config::get_env_with_fallback;
///
/// let url = get_env_with_fallback("QAMON_API_BASE_URL", "API_BASE_URL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Some(val) = get_env(new_name) {
        return Some(val);
    }
    if let Some(val) = get_env(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse `key=value,key=value` into a placeholder mapping.
///
/// Entries without `=` or with an empty key are ignored.
pub fn parse_placeholders(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// SMTP settings for the email channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    /// Relay host
    pub server: Option<String>,
    /// Relay port (STARTTLS)
    pub port: u16,
    /// Login user
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Sender address (defaults to `username`)
    pub from: Option<String>,
    /// Recipient address
    pub to: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: Some("smtp.gmail.com".to_string()),
            port: 587,
            username: None,
            password: None,
            from: None,
            to: None,
        }
    }
}

impl SmtpConfig {
    /// Load SMTP settings from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: get_env_with_fallback("QAMON_SMTP_SERVER", "SMTP_SERVER").or(defaults.server),
            port: get_env_with_fallback_parse("QAMON_SMTP_PORT", "SMTP_PORT", defaults.port),
            username: get_env_with_fallback("QAMON_SMTP_USERNAME", "SMTP_USERNAME"),
            password: get_env_with_fallback("QAMON_SMTP_PASSWORD", "SMTP_PASSWORD"),
            from: get_env_with_fallback("QAMON_EMAIL_FROM", "EMAIL_FROM"),
            to: get_env_with_fallback("QAMON_EMAIL_TO", "EMAIL_TO"),
        }
    }

    /// Sender address, falling back to the login user.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }

    /// True when server, credentials and recipient are all present.
    pub fn is_complete(&self) -> bool {
        self.server.is_some()
            && self.username.is_some()
            && self.password.is_some()
            && self.to.is_some()
    }
}

/// Notification channel destinations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Slack incoming webhook
    pub slack_webhook_url: Option<String>,
    /// Discord webhook
    pub discord_webhook_url: Option<String>,
    /// Teams incoming webhook
    pub teams_webhook_url: Option<String>,
    /// Email relay settings
    pub smtp: SmtpConfig,
    /// Bound on each channel's delivery attempt
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            slack_webhook_url: None,
            discord_webhook_url: None,
            teams_webhook_url: None,
            smtp: SmtpConfig::default(),
            timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}

impl NotifyConfig {
    /// Load notification settings from environment variables.
    pub fn from_env() -> Self {
        Self {
            slack_webhook_url: get_env_with_fallback("QAMON_SLACK_WEBHOOK_URL", "SLACK_WEBHOOK_URL"),
            discord_webhook_url: get_env_with_fallback(
                "QAMON_DISCORD_WEBHOOK_URL",
                "DISCORD_WEBHOOK_URL",
            ),
            teams_webhook_url: get_env_with_fallback("QAMON_TEAMS_WEBHOOK_URL", "TEAMS_WEBHOOK_URL"),
            smtp: SmtpConfig::from_env(),
            timeout: Duration::from_secs(
                get_env("QAMON_NOTIFY_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS),
            ),
        }
    }
}

/// Execution loop settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Target service base URL
    pub api_base_url: String,
    /// Pause after each cycle
    pub refresh_interval: Duration,
    /// Per-request timeout for test GETs
    pub request_timeout: Duration,
    /// Endpoint placeholder values
    pub placeholders: HashMap<String, String>,
    /// Checklist input artifact
    pub checklist_file: PathBuf,
    /// Results output artifact
    pub results_file: PathBuf,
    /// History output artifact
    pub history_file: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            placeholders: parse_placeholders(DEFAULT_PLACEHOLDERS),
            checklist_file: PathBuf::from("kilo_qa_checklist.json"),
            results_file: PathBuf::from("kilo_qa_checklist_results.json"),
            history_file: PathBuf::from("kilo_qa_history.json"),
        }
    }
}

impl MonitorConfig {
    /// Load loop settings from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let refresh_secs = get_env_with_fallback_parse(
            "QAMON_REFRESH_INTERVAL_SECS",
            "REFRESH_INTERVAL",
            DEFAULT_REFRESH_INTERVAL_SECS,
        );
        let timeout_secs = get_env("QAMON_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            api_base_url: get_env_with_fallback_or(
                "QAMON_API_BASE_URL",
                "API_BASE_URL",
                DEFAULT_API_BASE_URL,
            ),
            refresh_interval: Duration::from_secs(refresh_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            placeholders: get_env("QAMON_PLACEHOLDERS")
                .map(|raw| parse_placeholders(&raw))
                .unwrap_or(defaults.placeholders),
            checklist_file: get_env("QAMON_CHECKLIST_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.checklist_file),
            results_file: get_env("QAMON_RESULTS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.results_file),
            history_file: get_env("QAMON_HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_env_with_fallback_new_name() {
        std::env::set_var("TEST_QAMON_NEW_VAR", "new_value");
        std::env::remove_var("TEST_QAMON_OLD_VAR");

        let result = get_env_with_fallback("TEST_QAMON_NEW_VAR", "TEST_QAMON_OLD_VAR");
        assert_eq!(result, Some("new_value".to_string()));

        std::env::remove_var("TEST_QAMON_NEW_VAR");
    }

    #[test]
    #[serial]
    fn test_get_env_with_fallback_old_name() {
        std::env::remove_var("TEST_QAMON_NEW_VAR2");
        std::env::set_var("TEST_QAMON_OLD_VAR2", "old_value");

        let result = get_env_with_fallback("TEST_QAMON_NEW_VAR2", "TEST_QAMON_OLD_VAR2");
        assert_eq!(result, Some("old_value".to_string()));

        std::env::remove_var("TEST_QAMON_OLD_VAR2");
    }

    #[test]
    #[serial]
    fn test_empty_value_counts_as_unset() {
        std::env::set_var("TEST_QAMON_NEW_VAR3", "");
        std::env::set_var("TEST_QAMON_OLD_VAR3", "legacy");

        let result = get_env_with_fallback("TEST_QAMON_NEW_VAR3", "TEST_QAMON_OLD_VAR3");
        assert_eq!(result, Some("legacy".to_string()));

        std::env::set_var("TEST_QAMON_OLD_VAR3", "   ");
        assert_eq!(
            get_env_with_fallback("TEST_QAMON_NEW_VAR3", "TEST_QAMON_OLD_VAR3"),
            None
        );

        std::env::remove_var("TEST_QAMON_NEW_VAR3");
        std::env::remove_var("TEST_QAMON_OLD_VAR3");
    }

    #[test]
    #[serial]
    fn test_get_env_with_fallback_parse_invalid_uses_default() {
        std::env::set_var("TEST_QAMON_NEW_VAR4", "not-a-number");
        let result: u64 = get_env_with_fallback_parse("TEST_QAMON_NEW_VAR4", "TEST_QAMON_OLD_VAR4", 7);
        assert_eq!(result, 7);
        std::env::remove_var("TEST_QAMON_NEW_VAR4");
    }

    #[test]
    fn test_parse_placeholders() {
        let map = parse_placeholders("user_id=123, workflow_id = 456,broken,=x,empty=");
        assert_eq!(map.len(), 3);
        assert_eq!(map["user_id"], "123");
        assert_eq!(map["workflow_id"], "456");
        assert_eq!(map["empty"], "");
    }

    #[test]
    fn test_monitor_config_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.placeholders["image_id"], "789");
    }

    #[test]
    #[serial]
    fn test_monitor_config_legacy_names() {
        std::env::remove_var("QAMON_API_BASE_URL");
        std::env::remove_var("QAMON_REFRESH_INTERVAL_SECS");
        std::env::set_var("API_BASE_URL", "http://target:8080");
        std::env::set_var("REFRESH_INTERVAL", "30");

        let config = MonitorConfig::from_env();
        assert_eq!(config.api_base_url, "http://target:8080");
        assert_eq!(config.refresh_interval, Duration::from_secs(30));

        std::env::remove_var("API_BASE_URL");
        std::env::remove_var("REFRESH_INTERVAL");
    }

    #[test]
    #[serial]
    fn test_notify_config_from_env() {
        for name in [
            "QAMON_SLACK_WEBHOOK_URL",
            "SLACK_WEBHOOK_URL",
            "QAMON_DISCORD_WEBHOOK_URL",
            "DISCORD_WEBHOOK_URL",
            "QAMON_TEAMS_WEBHOOK_URL",
            "TEAMS_WEBHOOK_URL",
            "QAMON_SMTP_USERNAME",
            "SMTP_USERNAME",
        ] {
            std::env::remove_var(name);
        }
        std::env::set_var("SLACK_WEBHOOK_URL", "https://hooks.slack.test/x");
        std::env::set_var("QAMON_DISCORD_WEBHOOK_URL", "");

        let config = NotifyConfig::from_env();
        assert_eq!(
            config.slack_webhook_url.as_deref(),
            Some("https://hooks.slack.test/x")
        );
        assert_eq!(config.discord_webhook_url, None);
        assert_eq!(config.teams_webhook_url, None);
        assert!(!config.smtp.is_complete());

        std::env::remove_var("SLACK_WEBHOOK_URL");
        std::env::remove_var("QAMON_DISCORD_WEBHOOK_URL");
    }

    #[test]
    fn test_smtp_sender_falls_back_to_username() {
        let smtp = SmtpConfig {
            username: Some("bot@example.com".to_string()),
            ..SmtpConfig::default()
        };
        assert_eq!(smtp.sender(), Some("bot@example.com"));

        let smtp = SmtpConfig {
            from: Some("qa@example.com".to_string()),
            ..smtp
        };
        assert_eq!(smtp.sender(), Some("qa@example.com"));
    }
}
