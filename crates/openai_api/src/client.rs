use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::config::OpenAiConfig;
use crate::error::{parse_error_message, OpenAiError};
use crate::headers::build_headers;
use crate::payload::{parse_response, ChatCompletionRequest, ChatCompletionResponse, WireMessage};
use crate::url::normalize_chat_completions_url;

#[derive(Debug)]
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, OpenAiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(OpenAiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_completions_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, OpenAiError> {
        let headers = build_headers(&self.config)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| OpenAiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    OpenAiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    /// Builds the wire payload for `messages` using the configured model and token cap.
    pub fn payload_for(&self, messages: Vec<WireMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest::new(self.config.model.clone(), messages)
            .with_max_tokens(self.config.max_tokens)
    }

    pub fn build_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<reqwest::RequestBuilder, OpenAiError> {
        if request.messages.is_empty() {
            return Err(OpenAiError::Unknown(
                "chat completion request has no messages".to_owned(),
            ));
        }

        let headers = self.build_headers()?;
        let mut payload = request.clone();
        payload.stream = false;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload))
    }

    /// Sends one request and returns the parsed response.
    ///
    /// Non-2xx statuses surface as [`OpenAiError::Status`] with the server's
    /// error message when one can be extracted from the body.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAiError> {
        let response = self.build_request(request)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}
