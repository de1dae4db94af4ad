use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_model: String,
    pub max_tokens: u32,
    pub max_retries: u32,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            google_api_key: None,
            openai_model: "gpt-4o".into(),
            gemini_model: "gemini-1.5-pro".into(),
            max_tokens: 256,
            max_retries: 3,
            timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EvalError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("emotion-eval").join("config.json"))
    }

    pub fn openai_api_key(&self) -> Result<String> {
        resolve_key(OPENAI_API_KEY_ENV, self.openai_api_key.as_deref())
    }

    pub fn google_api_key(&self) -> Result<String> {
        resolve_key(GOOGLE_API_KEY_ENV, self.google_api_key.as_deref())
    }

    pub fn set_openai_api_key(&mut self, key: String) -> Result<()> {
        self.openai_api_key = Some(key);
        self.save()
    }

    pub fn set_google_api_key(&mut self, key: String) -> Result<()> {
        self.google_api_key = Some(key);
        self.save()
    }
}

/// 環境変数（.env含む）を優先し、なければ設定ファイルの値
fn resolve_key(env_name: &'static str, stored: Option<&str>) -> Result<String> {
    if let Ok(key) = std::env::var(env_name) {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    stored
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .ok_or(EvalError::MissingApiKey(env_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.openai_model, "gpt-4o");
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"gemini_model": "gemini-2.0-flash"}"#).unwrap();
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.openai_model, "gpt-4o");
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_resolve_key_from_stored() {
        let key = resolve_key("EMOTION_EVAL_TEST_UNSET_KEY", Some("sk-test")).unwrap();
        assert_eq!(key, "sk-test");
    }

    #[test]
    fn test_resolve_key_missing() {
        let err = resolve_key("EMOTION_EVAL_TEST_UNSET_KEY", Some("  ")).unwrap_err();
        assert!(matches!(err, EvalError::MissingApiKey("EMOTION_EVAL_TEST_UNSET_KEY")));
    }
}
