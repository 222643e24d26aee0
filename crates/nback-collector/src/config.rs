//! Collector configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use nback_core::model::SessionConfig;
use nback_core::traits::ResultsCollector;

use crate::webhook::WebhookCollector;

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration for a results collector backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CollectorConfig {
    Webhook {
        url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

/// Top-level nback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbackConfig {
    /// Where to deliver summaries. `None` disables delivery.
    #[serde(default)]
    pub collector: Option<CollectorConfig>,
    /// Session defaults; the CLI's flags override these.
    #[serde(default)]
    pub session: SessionConfig,
    /// Max retries on transient delivery errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Directory for saved summary JSON files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./nback-results")
}

impl Default for NbackConfig {
    fn default() -> Self {
        Self {
            collector: None,
            session: SessionConfig::default(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            output_dir: default_output_dir(),
        }
    }
}

/// Expand `${VAR}` references from the process environment. Unset
/// variables expand to the empty string; an unterminated `${` is kept
/// literally.
fn resolve_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(len) => {
                let name = &rest[start + 2..start + 2 + len];
                out.push_str(&std::env::var(name).unwrap_or_default());
                rest = &rest[start + 2 + len + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_collector_config(config: &CollectorConfig) -> CollectorConfig {
    match config {
        CollectorConfig::Webhook { url, timeout_secs } => CollectorConfig::Webhook {
            url: resolve_env_vars(url),
            timeout_secs: *timeout_secs,
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `nback.toml` in the current directory
/// 2. `~/.config/nback/config.toml`
///
/// Environment variable override: `NBACK_WEBHOOK_URL`.
pub fn load_config() -> Result<NbackConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<NbackConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("nback.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<NbackConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => NbackConfig::default(),
    };

    // Apply env var override
    if let Ok(url) = std::env::var("NBACK_WEBHOOK_URL") {
        config.collector = Some(CollectorConfig::Webhook {
            url,
            timeout_secs: default_timeout_secs(),
        });
    }

    config.collector = config.collector.as_ref().map(resolve_collector_config);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("nback"))
}

/// Create a collector instance from its configuration.
pub fn create_collector(config: &CollectorConfig) -> Result<Box<dyn ResultsCollector>> {
    match config {
        CollectorConfig::Webhook { url, timeout_secs } => {
            Ok(Box::new(WebhookCollector::with_timeout(url, *timeout_secs)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_NBACK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_NBACK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_NBACK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_NBACK_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_edge_cases() {
        assert_eq!(resolve_env_vars("no references"), "no references");
        assert_eq!(resolve_env_vars("${_NBACK_UNSET_VAR_}"), "");
        assert_eq!(resolve_env_vars("dangling ${brace"), "dangling ${brace");
    }

    #[test]
    fn default_config() {
        let config = NbackConfig::default();
        assert!(config.collector.is_none());
        assert_eq!(config.session.trial_count, 30);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
max_retries = 5

[collector]
type = "webhook"
url = "https://example.com/hook"
timeout_secs = 10

[session]
trial_count = 20
lag = 3
target_match_rate = 0.25
"#;
        let config: NbackConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.collector,
            Some(CollectorConfig::Webhook { ref url, timeout_secs: 10 }) if url == "https://example.com/hook"
        ));
        assert_eq!(config.session.trial_count, 20);
        assert_eq!(config.session.lag, 3);
        assert_eq!(config.max_retries, 5);
        // Unspecified session fields fall back to defaults.
        assert_eq!(config.session.timing.stimulus_ms, 2_500);
    }

    #[test]
    fn parse_minimal_config() {
        let config: NbackConfig = toml::from_str("").unwrap();
        assert!(config.collector.is_none());
        assert_eq!(config.session.lag, 2);
    }
}
