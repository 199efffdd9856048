use std::sync::Arc;

use chat_provider::ChatProvider;
use chat_provider_mock::{MockProvider, MOCK_PROVIDER_ID};
use chat_provider_openai::{OpenAiProvider, OpenAiProviderConfig, OPENAI_PROVIDER_ID};

use crate::config::{AppConfig, API_KEY_ENV};

pub const DEFAULT_PROVIDER_ID: &str = OPENAI_PROVIDER_ID;

pub fn provider_from_config(config: &AppConfig) -> Result<Arc<dyn ChatProvider>, String> {
    provider_for_id(
        config.provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID),
        config,
    )
}

pub fn provider_for_id(
    provider_id: &str,
    config: &AppConfig,
) -> Result<Arc<dyn ChatProvider>, String> {
    match provider_id {
        OPENAI_PROVIDER_ID => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| format!("{API_KEY_ENV} environment variable is required"))?;
            let provider = OpenAiProvider::new(openai_provider_config(api_key, config))
                .map_err(|error| error.to_string())?;
            Ok(Arc::new(provider))
        }
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::default())),
        unknown => Err(format!(
            "Unsupported provider '{unknown}'. Available providers: {OPENAI_PROVIDER_ID}, {MOCK_PROVIDER_ID}"
        )),
    }
}

fn openai_provider_config(api_key: String, config: &AppConfig) -> OpenAiProviderConfig {
    let mut provider_config = OpenAiProviderConfig::new(api_key)
        .with_model(config.model.clone())
        .with_max_tokens(config.max_tokens);
    if let Some(base_url) = &config.base_url {
        provider_config = provider_config.with_base_url(base_url.clone());
    }
    if let Some(organization) = &config.organization {
        provider_config = provider_config.with_organization(organization.clone());
    }
    if let Some(timeout) = config.timeout {
        provider_config = provider_config.with_timeout(timeout);
    }
    provider_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config(pairs: &[(&'static str, &'static str)]) -> AppConfig {
        let pairs = pairs.to_vec();
        AppConfig::from_lookup(Path::new("/home/tester"), move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        })
        .expect("config")
    }

    #[test]
    fn default_provider_requires_an_api_key() {
        let error = match provider_from_config(&config(&[])) {
            Ok(_) => panic!("missing key should fail"),
            Err(error) => error,
        };
        assert_eq!(error, "OPENAI_API_KEY environment variable is required");
    }

    #[test]
    fn openai_provider_uses_configured_model() {
        let provider = provider_from_config(&config(&[
            (API_KEY_ENV, "sk-test"),
            ("COG_MODEL", "gpt-4o-mini"),
        ]))
        .expect("openai provider");

        let profile = provider.profile();
        assert_eq!(profile.provider_id, OPENAI_PROVIDER_ID);
        assert_eq!(profile.model_id, "gpt-4o-mini");
    }

    #[test]
    fn openai_settings_carry_through_to_the_adapter_config() {
        let provider_config = openai_provider_config(
            "sk-test".to_string(),
            &config(&[
                ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
                ("OPENAI_ORGANIZATION", "org-cog"),
                ("COG_MAX_TOKENS", "64"),
                ("COG_TIMEOUT_SEC", "12"),
            ]),
        );

        assert_eq!(provider_config.api_key, "sk-test");
        assert_eq!(provider_config.max_tokens, 64);
        assert_eq!(
            provider_config.base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
        assert_eq!(provider_config.organization.as_deref(), Some("org-cog"));
        assert_eq!(
            provider_config.timeout,
            Some(std::time::Duration::from_secs(12))
        );
    }

    #[test]
    fn mock_provider_needs_no_key() {
        let provider = provider_from_config(&config(&[("COG_PROVIDER", "mock")]))
            .expect("mock provider");
        assert_eq!(provider.profile().provider_id, MOCK_PROVIDER_ID);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let error = match provider_for_id("custom", &config(&[])) {
            Ok(_) => panic!("unknown providers should fail"),
            Err(error) => error,
        };
        assert!(error.contains("Unsupported provider 'custom'"));
    }
}
