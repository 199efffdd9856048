use std::collections::BTreeMap;

use crate::config::OpenAiConfig;
use crate::error::OpenAiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_ORGANIZATION: &str = "OpenAI-Organization";
pub const HEADER_USER_AGENT: &str = "User-Agent";

/// Build a deterministic header map for Chat Completions requests.
pub fn build_headers(config: &OpenAiConfig) -> Result<BTreeMap<String, String>, OpenAiError> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
        return Err(OpenAiError::MissingApiKey);
    }

    let mut headers = BTreeMap::new();
    headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {api_key}"));
    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    let user_agent = config
        .user_agent
        .as_deref()
        .and_then(sanitize_nonempty)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), user_agent);

    if let Some(organization) = config.organization.as_deref().and_then(sanitize_nonempty) {
        headers.insert(HEADER_ORGANIZATION.to_owned(), organization);
    }

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

fn sanitize_nonempty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn default_user_agent() -> String {
    format!(
        "cog/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
