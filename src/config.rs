// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::FileRecordStore;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

fn default_openai_api() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GitHubConfig {
    /// Login whose pull requests and reviews are searched.
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_github_api")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            token: String::new(),
            api_url: default_github_api(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openai_api")]
    pub api_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_url: default_openai_api(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Applied to every external HTTP call.
    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            openai: OpenAiConfig::default(),
            http_timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like `load`, but a missing file yields defaults. A malformed file is still an error.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Helper to detect whether an anyhow::Error indicates that the config file was missing.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        let toml_str = toml::to_string_pretty(self)?;
        FileRecordStore::with_lock(&path, || FileRecordStore::atomic_write(&path, &toml_str))?;
        Ok(())
    }

    /// Overlay credentials from a variable lookup (the binary passes
    /// `std::env::var`). Empty values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let take = |name: &str, slot: &mut String| {
            if let Some(v) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *slot = v;
            }
        };
        take("GITHUB_USER", &mut self.github.user);
        take("GITHUB_TOKEN", &mut self.github.token);
        take("OPENAI_API_KEY", &mut self.openai.api_key);
        take("OPENAI_MODEL", &mut self.openai.model);
        self
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;
    use std::collections::HashMap;

    #[test]
    fn test_missing_config_detected() {
        let ctx = TestContext::new();
        let err = Config::load(&ctx).unwrap_err();
        assert!(Config::is_missing_config_error(&err));
        assert_eq!(Config::load_or_default(&ctx).unwrap(), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let ctx = TestContext::new();
        let mut config = Config::default();
        config.github.user = "octocat".to_string();
        config.openai.model = "gpt-4o".to_string();
        config.http_timeout_secs = 5;
        config.save(&ctx).unwrap();

        assert_eq!(Config::load(&ctx).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(&path, "[github]\nuser = \"octocat\"\n").unwrap();

        let config = Config::load(&ctx).unwrap();
        assert_eq!(config.github.user, "octocat");
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(&path, "github = [[[").unwrap();
        let err = Config::load_or_default(&ctx).unwrap_err();
        assert!(!Config::is_missing_config_error(&err));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [("GITHUB_TOKEN", "ghp_x"), ("OPENAI_API_KEY", " ")]
            .into_iter()
            .collect();
        let mut base = Config::default();
        base.openai.api_key = "from-file".to_string();

        let config = base.with_env_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.github.token, "ghp_x");
        // Blank values do not clobber the file.
        assert_eq!(config.openai.api_key, "from-file");
    }

    #[test]
    #[serial_test::serial]
    fn test_process_env_lookup() {
        unsafe {
            std::env::set_var("OPENAI_MODEL", "gpt-test");
        }
        let config = Config::default().with_env_overrides(|k| std::env::var(k).ok());
        unsafe {
            std::env::remove_var("OPENAI_MODEL");
        }
        assert_eq!(config.openai.model, "gpt-test");
    }
}
