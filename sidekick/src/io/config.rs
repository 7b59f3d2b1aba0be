//! Session configuration from `.sidekick.toml` and the environment.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// File name looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = ".sidekick.toml";

/// Tool configuration (TOML). Intended to be edited by humans; missing
/// fields default to sensible values.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    /// Model id sent to the API.
    pub model: String,

    /// API key. Usually left unset here and provided via `GEMINI_API_KEY`
    /// or `GOOGLE_API_KEY` instead; the environment wins when both exist.
    pub api_key: Option<String>,

    /// Per-request timeout for model calls, in seconds.
    pub request_timeout_secs: u64,

    /// Cap on files listed by `@scan`.
    pub scan_file_limit: usize,

    /// Cap on lines reported by `@search`.
    pub search_match_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gemini-flash-latest".to_string(),
            api_key: None,
            request_timeout_secs: 120,
            scan_file_limit: 400,
            search_match_limit: 80,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("model must be non-empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if self.scan_file_limit == 0 {
            return Err(anyhow!("scan_file_limit must be > 0"));
        }
        if self.search_match_limit == 0 {
            return Err(anyhow!("search_match_limit must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file. If the file is missing, returns
/// `AgentConfig::default()`.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    if !path.exists() {
        let cfg = AgentConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgentConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Read the API key from the process environment, preferring
/// `GEMINI_API_KEY` over `GOOGLE_API_KEY`. Empty values count as unset.
pub fn api_key_from_env() -> Option<String> {
    ["GEMINI_API_KEY", "GOOGLE_API_KEY"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Resolve the effective API key: environment first, then the config file.
/// Absence everywhere is a fatal startup error.
pub fn resolve_api_key(from_env: Option<String>, cfg: &AgentConfig) -> Result<String> {
    from_env
        .or_else(|| {
            cfg.api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
        })
        .ok_or_else(|| {
            anyhow!(
                "no API key: set GEMINI_API_KEY (or GOOGLE_API_KEY), \
                 or add api_key to {CONFIG_FILE}"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, AgentConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "model = \"gemini-2.5-flash\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.model, "gemini-2.5-flash");
        assert_eq!(
            cfg.request_timeout_secs,
            AgentConfig::default().request_timeout_secs
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "request_timeout_secs = 0\n").expect("write");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn env_key_wins_over_config_key() {
        let cfg = AgentConfig {
            api_key: Some("from-file".to_string()),
            ..AgentConfig::default()
        };
        let key = resolve_api_key(Some("from-env".to_string()), &cfg).expect("key");
        assert_eq!(key, "from-env");
    }

    #[test]
    fn config_key_used_when_env_is_absent() {
        let cfg = AgentConfig {
            api_key: Some("from-file".to_string()),
            ..AgentConfig::default()
        };
        let key = resolve_api_key(None, &cfg).expect("key");
        assert_eq!(key, "from-file");
    }

    #[test]
    fn missing_key_everywhere_is_fatal() {
        let err = resolve_api_key(None, &AgentConfig::default()).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
