use openai_api::{
    normalize_chat_completions_url, ChatCompletionRequest, OpenAiClient, OpenAiConfig,
    OpenAiError, WireMessage,
};

fn client(base_url: &str) -> OpenAiClient {
    let config = OpenAiConfig::new("sk-test")
        .with_base_url(base_url)
        .with_model("gpt-4o-mini")
        .with_max_tokens(256);
    OpenAiClient::new(config).expect("client")
}

#[test]
fn http_request_targets_chat_completions_endpoint() {
    let client = client("https://api.openai.com/v1");
    let payload = client.payload_for(vec![
        WireMessage::new("system", "be brief"),
        WireMessage::new("user", "hello"),
    ]);

    let http_request = client
        .build_request(&payload)
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(
        http_request.url().as_str(),
        normalize_chat_completions_url("https://api.openai.com/v1")
    );
    assert_eq!(http_request.method(), "POST");
    assert_eq!(
        http_request
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok()),
        Some("Bearer sk-test")
    );

    let body = http_request
        .body()
        .and_then(|body| body.as_bytes())
        .expect("buffered json body");
    let json: serde_json::Value = serde_json::from_slice(body).expect("json body");
    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["max_tokens"], 256);
    assert_eq!(json["stream"], false);
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][1]["content"], "hello");
}

#[test]
fn http_request_rejects_empty_history() {
    let client = client("https://api.openai.com/v1");
    let error = client
        .build_request(&ChatCompletionRequest::new("gpt-4o-mini", Vec::new()))
        .expect_err("empty history must fail");
    assert!(matches!(error, OpenAiError::Unknown(_)));
}

#[test]
fn http_request_requires_api_key() {
    let client = OpenAiClient::new(OpenAiConfig::new("")).expect("client");
    let payload = client.payload_for(vec![WireMessage::new("user", "hi")]);
    let error = client
        .build_request(&payload)
        .expect_err("missing key must fail");
    assert!(matches!(error, OpenAiError::MissingApiKey));
}
