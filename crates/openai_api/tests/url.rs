use openai_api::normalize_chat_completions_url;
use openai_api::url::DEFAULT_OPENAI_BASE_URL;

#[test]
fn url_blank_input_uses_default_base() {
    assert_eq!(
        normalize_chat_completions_url("  "),
        format!("{DEFAULT_OPENAI_BASE_URL}/chat/completions")
    );
}

#[test]
fn url_appends_full_path_to_version_root() {
    assert_eq!(
        normalize_chat_completions_url("https://api.openai.com/v1/"),
        "https://api.openai.com/v1/chat/completions"
    );
    assert_eq!(
        normalize_chat_completions_url("http://localhost:8080"),
        "http://localhost:8080/chat/completions"
    );
}

#[test]
fn url_completes_chat_suffix_and_keeps_full_endpoint() {
    assert_eq!(
        normalize_chat_completions_url("https://proxy.example/v1/chat"),
        "https://proxy.example/v1/chat/completions"
    );
    assert_eq!(
        normalize_chat_completions_url("https://proxy.example/v1/chat/completions/"),
        "https://proxy.example/v1/chat/completions"
    );
}
