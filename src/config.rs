//! Client configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::session::{DEFAULT_QUESTION_SECONDS, SessionOptions};

const CONFIG_FILE_NAME: &str = "quizdesk.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the quiz backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User id handed over by the host container.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Seconds per question.
    #[serde(default = "default_question_seconds")]
    pub question_seconds: u32,
    /// Randomize option order when a quiz is loaded.
    #[serde(default)]
    pub shuffle_answers: bool,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Log destination. The terminal belongs to the UI.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_question_seconds() -> u32 {
    DEFAULT_QUESTION_SECONDS
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_log_file() -> PathBuf {
    PathBuf::from("quizdesk.log")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: None,
            question_seconds: default_question_seconds(),
            shuffle_answers: false,
            request_timeout_secs: default_timeout(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            question_seconds: self.question_seconds.max(1),
            shuffle_answers: self.shuffle_answers,
        }
    }

    /// Apply `QUIZDESK_*` overrides from a variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("QUIZDESK_BASE_URL") {
            self.base_url = url;
        }
        if let Some(user) = lookup("QUIZDESK_USER_ID") {
            self.user_id = Some(user);
        }
    }
}

/// Load configuration from `quizdesk.toml` in the working directory, or
/// defaults when absent, then apply environment overrides.
pub fn load_config() -> Result<Config> {
    load_config_from(None)
}

/// Load config from an explicit path (which must exist), or search the
/// default location.
pub fn load_config_from(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => Some(PathBuf::from(CONFIG_FILE_NAME)).filter(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => Config::default(),
    };

    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://loyalty.bom.asia");
        assert_eq!(config.question_seconds, 30);
        assert_eq!(config.session_options(), SessionOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "user_id = \"zalo-9\"\nshuffle_answers = true\nquestion_seconds = 20"
        )
        .unwrap();

        let config = load_config_from(Some(file.path())).unwrap();
        assert_eq!(config.question_seconds, 20);
        assert!(config.shuffle_answers);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "question_seconds = \"soon\"").unwrap();

        let err = load_config_from(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("QUIZDESK_BASE_URL", "http://localhost:8080"),
            ("QUIZDESK_USER_ID", "zalo-1"),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.user_id.as_deref(), Some("zalo-1"));
    }

    #[test]
    fn test_zero_budget_is_raised_to_one_second() {
        let config = Config {
            question_seconds: 0,
            ..Config::default()
        };
        assert_eq!(config.session_options().question_seconds, 1);
    }
}
