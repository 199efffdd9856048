//! Startup configuration read from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_provider_openai::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use conversation_store::{default_database_path, DATA_DIR};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const PROVIDER_ENV: &str = "COG_PROVIDER";
pub const MODEL_ENV: &str = "COG_MODEL";
pub const MAX_TOKENS_ENV: &str = "COG_MAX_TOKENS";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const ORGANIZATION_ENV: &str = "OPENAI_ORGANIZATION";
pub const TIMEOUT_ENV: &str = "COG_TIMEOUT_SEC";
pub const SYSTEM_INSTRUCTIONS_ENV: &str = "COG_SYSTEM_INSTRUCTIONS";
pub const DB_PATH_ENV: &str = "COG_DB_PATH";
pub const LOG_FILE_ENV: &str = "COG_LOG_FILE";

pub const LOG_FILE: &str = "cog.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub provider_id: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: Option<String>,
    pub organization: Option<String>,
    pub timeout: Option<Duration>,
    pub system_instructions: Option<String>,
    pub database_path: PathBuf,
    pub log_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let home = dirs::home_dir().ok_or_else(|| "could not determine home directory".to_string())?;
        Self::from_lookup(&home, |key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, resolving default paths under `home`.
    pub fn from_lookup(
        home: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let max_tokens = match value(MAX_TOKENS_ENV) {
            Some(raw) => parse_positive::<u32>(MAX_TOKENS_ENV, &raw)?,
            None => DEFAULT_MAX_TOKENS,
        };
        let timeout = value(TIMEOUT_ENV)
            .map(|raw| parse_positive::<u64>(TIMEOUT_ENV, &raw).map(Duration::from_secs))
            .transpose()?;

        Ok(Self {
            provider_id: value(PROVIDER_ENV),
            api_key: value(API_KEY_ENV),
            model: value(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            base_url: value(BASE_URL_ENV),
            organization: value(ORGANIZATION_ENV),
            timeout,
            system_instructions: value(SYSTEM_INSTRUCTIONS_ENV),
            database_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| default_database_path(home)),
            log_path: value(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(DATA_DIR).join(LOG_FILE)),
        })
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match raw.parse::<T>() {
        Ok(parsed) if parsed != T::default() => Ok(parsed),
        _ => Err(format!("{key} must be a positive integer, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(Path::new("/home/tester"), |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_live_under_the_home_data_dir() {
        let config = config(&[]).expect("config");

        assert_eq!(config.provider_id, None);
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.timeout, None);
        assert_eq!(config.organization, None);
        assert_eq!(
            config.database_path,
            PathBuf::from("/home/tester/.cog/conversations.db")
        );
        assert_eq!(config.log_path, PathBuf::from("/home/tester/.cog/cog.log"));
    }

    #[test]
    fn overrides_are_trimmed_and_blank_values_ignored() {
        let config = config(&[
            (API_KEY_ENV, " sk-test "),
            (PROVIDER_ENV, "mock"),
            (MODEL_ENV, "   "),
            (MAX_TOKENS_ENV, "256"),
            (TIMEOUT_ENV, "30"),
            (ORGANIZATION_ENV, " org-cog "),
            (DB_PATH_ENV, "/tmp/cog.db"),
        ])
        .expect("config");

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.provider_id.as_deref(), Some("mock"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.organization.as_deref(), Some("org-cog"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/cog.db"));
    }

    #[test]
    fn non_positive_numbers_are_rejected() {
        let error = config(&[(MAX_TOKENS_ENV, "0")]).expect_err("zero tokens");
        assert!(error.contains(MAX_TOKENS_ENV));

        let error = config(&[(TIMEOUT_ENV, "soon")]).expect_err("bad timeout");
        assert!(error.contains("'soon'"));
    }
}
