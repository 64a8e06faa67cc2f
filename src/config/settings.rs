use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::embeddings::DEFAULT_SEARCH_LIMIT;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub search: SearchSettings,
}

/// Credentials and models for the OpenAI embedding and chat endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,

    pub organization: Option<String>,

    #[serde(default = "default_organization_env")]
    pub organization_env: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for the chat call; embedding calls are never retried
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub threshold: Option<f32>,
}

fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}
fn default_organization_env() -> Option<String> {
    Some("OPENAI_ORG_ID".to_string())
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}
fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}
fn default_data_path() -> PathBuf {
    crate::data::data_path("drinks-happy-hour.csv")
}
fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            organization: None,
            organization_env: default_organization_env(),
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            limit: default_limit(),
            threshold: None,
        }
    }
}

impl OpenAiConfig {
    /// Explicit key first, then the configured environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve(&self.api_key, &self.api_key_env)
    }

    pub fn resolve_organization(&self) -> Option<String> {
        resolve(&self.organization, &self.organization_env)
    }
}

fn resolve(value: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(value) = value {
        return Some(value.clone());
    }
    env_var
        .as_ref()
        .and_then(|var| std::env::var(var).ok())
        .filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Load `.env`, then the config file at `path` or the default location.
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::config_path() {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!("No config directory: {:#}", e);
                    return Ok(Settings::default());
                }
            },
        };

        if config_path.exists() {
            tracing::debug!("Loading settings from {}", config_path.display());
            Self::load_from(&config_path)
        } else if path.is_some() {
            anyhow::bail!("Config file not found: {}", config_path.display())
        } else {
            Ok(Settings::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("dev", "happyhour", "happyhour")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.openai.embedding_model, "text-embedding-ada-002");
        assert_eq!(settings.openai.chat_model, "gpt-3.5-turbo");
        assert_eq!(settings.openai.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(settings.search.limit, 10);
        assert!(settings.search.threshold.is_none());
        assert!(settings.search.data_path.ends_with("drinks-happy-hour.csv"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
[openai]
chat_model = "gpt-4o-mini"

[search]
limit = 5
threshold = 0.75
"#,
        )
        .unwrap();

        assert_eq!(settings.openai.chat_model, "gpt-4o-mini");
        assert_eq!(settings.openai.embedding_model, "text-embedding-ada-002");
        assert_eq!(settings.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(settings.search.limit, 5);
        assert_eq!(settings.search.threshold, Some(0.75));
    }

    #[test]
    fn test_explicit_key_wins_over_env() {
        let config = OpenAiConfig {
            api_key: Some("sk-inline".to_string()),
            api_key_env: Some("PATH".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-inline"));
    }

    #[test]
    fn test_missing_env_resolves_to_none() {
        let config = OpenAiConfig {
            organization: None,
            organization_env: Some("HAPPYHOUR_TEST_UNSET_ORG".to_string()),
            ..Default::default()
        };
        assert!(config.resolve_organization().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\ndata_path = \"/srv/bars.csv\"\n").unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.search.data_path, PathBuf::from("/srv/bars.csv"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        assert!(Settings::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search\nlimit = ").unwrap();

        assert!(Settings::load_from(&path).is_err());
    }
}
