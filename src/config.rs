//! Runtime configuration read from the process environment.
//!
//! CLI flags are layered on top by `commands::Cli`; everything here has a
//! usable default so `backoffice` runs against a local backend out of the box.

use std::path::PathBuf;
use std::time::Duration;

use crate::api::normalize_api_url;
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

const ENV_API_URL: &str = "BACKOFFICE_API_URL";
const ENV_TIMEOUT_SECS: &str = "BACKOFFICE_TIMEOUT_SECS";
const ENV_LOG_DIR: &str = "BACKOFFICE_LOG_DIR";
const ENV_LOG_JSON: &str = "BACKOFFICE_LOG_JSON";
const ENV_TOKEN: &str = "BACKOFFICE_TOKEN";
const ENV_USER_ID: &str = "BACKOFFICE_USER_ID";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL, normalised (no trailing slash, no `/api`).
    pub api_url: String,
    pub request_timeout: Duration,
    pub log_dir: PathBuf,
    pub log_json: bool,
    /// Bearer token carried over from a previous `signin`.
    pub token: Option<String>,
    pub user_id: Option<i64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_dir: default_log_dir(),
            log_json: false,
            token: None,
            user_id: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = env_non_empty(ENV_API_URL) {
            config.api_url = normalize_api_url(&url);
        }
        if let Some(raw) = env_non_empty(ENV_TIMEOUT_SECS) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    expected: "a positive number of seconds",
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = env_non_empty(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(raw) = env_non_empty(ENV_LOG_JSON) {
            config.log_json = parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                key: ENV_LOG_JSON,
                expected: "a boolean flag",
                value: raw.clone(),
            })?;
        }
        config.token = env_non_empty(ENV_TOKEN);
        if let Some(raw) = env_non_empty(ENV_USER_ID) {
            let id = raw.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_USER_ID,
                expected: "an integer user id",
                value: raw.clone(),
            })?;
            config.user_id = Some(id);
        }

        Ok(config)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Per-user log directory: `%LOCALAPPDATA%` on Windows, `~/Library/Logs`
/// on macOS, the XDG state directory elsewhere.
pub fn default_log_dir() -> PathBuf {
    log_dir_from(env_non_empty)
}

fn log_dir_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    const APP_DIR: &str = "backoffice-pos";
    let home = lookup("HOME").or_else(|| lookup("USERPROFILE")).map(PathBuf::from);

    if cfg!(windows) {
        if let Some(base) = lookup("LOCALAPPDATA").map(PathBuf::from) {
            return base.join(APP_DIR).join("logs");
        }
    } else if cfg!(target_os = "macos") {
        if let Some(home) = &home {
            return home.join("Library").join("Logs").join(APP_DIR);
        }
    } else if let Some(state) = lookup("XDG_STATE_HOME").map(PathBuf::from) {
        if state.is_absolute() {
            return state.join(APP_DIR).join("logs");
        }
    }

    match home {
        Some(home) => home.join(".local").join("state").join(APP_DIR).join("logs"),
        None => PathBuf::from("logs"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            ENV_API_URL,
            ENV_TIMEOUT_SECS,
            ENV_LOG_DIR,
            ENV_LOG_JSON,
            ENV_TOKEN,
            ENV_USER_ID,
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_when_environment_is_empty() {
        clear_env();
        let config = AppConfig::from_env().expect("defaults");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.log_json);
        assert!(config.token.is_none());
        assert!(config.user_id.is_none());
    }

    #[test]
    #[serial]
    fn reads_and_normalises_environment() {
        clear_env();
        std::env::set_var(ENV_API_URL, "pos.example.com/api/");
        std::env::set_var(ENV_TIMEOUT_SECS, "5");
        std::env::set_var(ENV_LOG_JSON, "yes");
        std::env::set_var(ENV_TOKEN, "  tok-123 ");
        std::env::set_var(ENV_USER_ID, "7");

        let config = AppConfig::from_env().expect("config");
        assert_eq!(config.api_url, "https://pos.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.log_json);
        assert_eq!(config.token.as_deref(), Some("tok-123"));
        assert_eq!(config.user_id, Some(7));
        clear_env();
    }

    #[test]
    #[serial]
    fn rejects_bad_timeout() {
        clear_env();
        std::env::set_var(ENV_TIMEOUT_SECS, "0");
        let err = AppConfig::from_env().expect_err("zero timeout should fail");
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
        clear_env();
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn log_dir_without_home_is_relative() {
        assert_eq!(log_dir_from(lookup(&[])), PathBuf::from("logs"));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn log_dir_follows_xdg_state_home() {
        let dir = log_dir_from(lookup(&[("HOME", "/home/cashier"), ("XDG_STATE_HOME", "/var/state")]));
        assert_eq!(dir, PathBuf::from("/var/state/backoffice-pos/logs"));

        // relative XDG paths are ignored
        let dir = log_dir_from(lookup(&[("HOME", "/home/cashier"), ("XDG_STATE_HOME", "state")]));
        assert_eq!(dir, PathBuf::from("/home/cashier/.local/state/backoffice-pos/logs"));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn log_dir_uses_library_logs() {
        let dir = log_dir_from(lookup(&[("HOME", "/Users/cashier")]));
        assert_eq!(dir, PathBuf::from("/Users/cashier/Library/Logs/backoffice-pos"));
    }

    #[cfg(windows)]
    #[test]
    fn log_dir_uses_local_app_data() {
        let dir = log_dir_from(lookup(&[("LOCALAPPDATA", r"C:\Users\cashier\AppData\Local")]));
        assert_eq!(
            dir,
            PathBuf::from(r"C:\Users\cashier\AppData\Local").join("backoffice-pos").join("logs")
        );
    }
}
