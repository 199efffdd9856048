//! OpenAI Chat Completions implementation of the shared `chat_provider` contract.
//!
//! The adapter owns a blocking entry point over the async transport: each call
//! builds a current-thread runtime, sends one request, and reduces the response
//! to the first choice's text.

use std::sync::Arc;
use std::time::Duration;

use chat_provider::{
    ChatMessage, ChatProvider, CompletionError, CompletionRequest, ProviderInitError,
    ProviderProfile,
};
pub use openai_api::config::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use openai_api::{
    ChatCompletionRequest, ChatCompletionResponse, OpenAiClient, OpenAiConfig, OpenAiError,
    WireMessage,
};

/// Stable provider identifier used by startup selection.
pub const OPENAI_PROVIDER_ID: &str = "openai";

/// Runtime configuration for the OpenAI provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: Option<String>,
    pub organization: Option<String>,
    pub timeout: Option<Duration>,
}

impl OpenAiProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: None,
            organization: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_openai_config(self) -> OpenAiConfig {
        let model = sanitize_model(self.model);
        let mut config = OpenAiConfig::new(self.api_key)
            .with_model(model)
            .with_max_tokens(self.max_tokens.max(1));

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(organization) = self.organization {
            config = config.with_organization(organization);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAiError>;
}

#[derive(Debug)]
struct DefaultCompletionClient {
    client: OpenAiClient,
}

impl CompletionClient for DefaultCompletionClient {
    fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                OpenAiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.complete(request))
    }
}

/// `ChatProvider` adapter backed by `openai_api` transport primitives.
pub struct OpenAiProvider {
    model: String,
    max_tokens: u32,
    completion_client: Arc<dyn CompletionClient>,
}

impl OpenAiProvider {
    /// Creates a provider using real HTTP transport.
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, ProviderInitError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderInitError::new(
                "OPENAI_API_KEY is required for the openai provider",
            ));
        }

        let openai_config = config.into_openai_config();
        let model = openai_config.model.clone();
        let max_tokens = openai_config.max_tokens;
        let completion_client = Arc::new(DefaultCompletionClient {
            client: OpenAiClient::new(openai_config).map_err(map_init_error)?,
        });

        Ok(Self {
            model,
            max_tokens,
            completion_client,
        })
    }

    fn wire_request(&self, request: CompletionRequest) -> ChatCompletionRequest {
        let messages = request
            .messages
            .into_iter()
            .map(|ChatMessage { role, content }| WireMessage::new(role.as_str(), content))
            .collect();

        ChatCompletionRequest::new(self.model.clone(), messages).with_max_tokens(self.max_tokens)
    }

    #[cfg(test)]
    fn with_completion_client_for_tests(
        model: impl Into<String>,
        completion_client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            model: sanitize_model(model.into()),
            max_tokens: DEFAULT_MAX_TOKENS,
            completion_client,
        }
    }
}

impl ChatProvider for OpenAiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: OPENAI_PROVIDER_ID.to_string(),
            model_id: self.model.clone(),
        }
    }

    fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let wire_request = self.wire_request(request);
        let response = self
            .completion_client
            .complete(&wire_request)
            .map_err(map_completion_error)?;

        response
            .first_choice_text()
            .map(str::to_string)
            .ok_or(CompletionError::EmptyResponse)
    }
}

fn sanitize_model(model: String) -> String {
    let trimmed = model.trim();
    if trimmed.is_empty() {
        DEFAULT_MODEL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn map_init_error(error: OpenAiError) -> ProviderInitError {
    ProviderInitError::new(format!("failed to initialize OpenAI client: {error}"))
}

fn map_completion_error(error: OpenAiError) -> CompletionError {
    match error {
        OpenAiError::Status(status, message) => CompletionError::Status {
            status: status.as_u16(),
            message,
        },
        OpenAiError::Request(error) => CompletionError::Transport(error.to_string()),
        other => CompletionError::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard};

    use chat_provider::ChatRole;
    use openai_api::error::StatusCode;
    use openai_api::payload::parse_response;

    use super::*;

    fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    struct FakeCompletionClient {
        observed: Mutex<Option<ChatCompletionRequest>>,
        outcome: Mutex<Option<Result<ChatCompletionResponse, OpenAiError>>>,
    }

    impl FakeCompletionClient {
        fn responding(body: &str) -> Arc<Self> {
            let response = parse_response(body).expect("valid response fixture");
            Arc::new(Self {
                observed: Mutex::new(None),
                outcome: Mutex::new(Some(Ok(response))),
            })
        }

        fn failing(error: OpenAiError) -> Arc<Self> {
            Arc::new(Self {
                observed: Mutex::new(None),
                outcome: Mutex::new(Some(Err(error))),
            })
        }

        fn observed(&self) -> Option<ChatCompletionRequest> {
            lock_unpoisoned(&self.observed).clone()
        }
    }

    impl CompletionClient for FakeCompletionClient {
        fn complete(
            &self,
            request: &ChatCompletionRequest,
        ) -> Result<ChatCompletionResponse, OpenAiError> {
            *lock_unpoisoned(&self.observed) = Some(request.clone());
            lock_unpoisoned(&self.outcome)
                .take()
                .expect("fake completion outcome should be consumed exactly once")
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("Hello"),
            ChatMessage::new(ChatRole::Assistant, "Hi"),
            ChatMessage::user("Again"),
        ])
    }

    #[test]
    fn first_choice_text_is_returned_and_roles_are_translated() {
        let client = FakeCompletionClient::responding(
            r#"{"model":"gpt-4o-mini-2024","choices":[{"message":{"role":"assistant","content":"Hi there"}}]}"#,
        );
        let provider =
            OpenAiProvider::with_completion_client_for_tests("gpt-4o-mini", client.clone());

        let reply = provider.complete(request()).expect("completion");
        assert_eq!(reply, "Hi there");

        let observed = client.observed().expect("request observed");
        assert_eq!(observed.model, "gpt-4o-mini");
        assert_eq!(observed.max_tokens, Some(DEFAULT_MAX_TOKENS));
        let roles: Vec<&str> = observed
            .messages
            .iter()
            .map(|message| message.role.as_str())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }

    #[test]
    fn zero_choices_map_to_empty_response() {
        let client = FakeCompletionClient::responding(r#"{"choices":[]}"#);
        let provider = OpenAiProvider::with_completion_client_for_tests("gpt-4o-mini", client);

        assert_eq!(
            provider.complete(request()),
            Err(CompletionError::EmptyResponse)
        );
    }

    #[test]
    fn status_errors_keep_code_and_message() {
        let client = FakeCompletionClient::failing(OpenAiError::Status(
            StatusCode::UNAUTHORIZED,
            "Incorrect API key provided".to_string(),
        ));
        let provider = OpenAiProvider::with_completion_client_for_tests("gpt-4o-mini", client);

        assert_eq!(
            provider.complete(request()),
            Err(CompletionError::Status {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            })
        );
    }

    #[test]
    fn blank_model_falls_back_to_default() {
        let client = FakeCompletionClient::responding(r#"{"choices":[]}"#);
        let provider = OpenAiProvider::with_completion_client_for_tests("  ", client);
        assert_eq!(provider.profile().model_id, DEFAULT_MODEL);
        assert_eq!(provider.profile().provider_id, OPENAI_PROVIDER_ID);
    }

    #[test]
    fn missing_api_key_is_rejected_at_construction() {
        let error = match OpenAiProvider::new(OpenAiProviderConfig::new("  ")) {
            Ok(_) => panic!("blank key must be rejected"),
            Err(error) => error,
        };
        assert!(error.message().contains("OPENAI_API_KEY"));
    }
}
