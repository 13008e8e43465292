//! End-to-end command tests against a mock OpenAI-compatible server.

use std::io::Write;

use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use digest_cli::{chat, summarize, test_connection};
use digest_types::{ProviderSettings, Settings};

fn self_hosted_settings(endpoint: &str) -> Settings {
    let mut settings = Settings {
        active_provider_id: "self-hosted".to_string(),
        max_retries: 0,
        ..Default::default()
    };
    settings.provider_configs.insert(
        "self-hosted".to_string(),
        ProviderSettings {
            provider_id: "self-hosted".to_string(),
            api_key: None,
            model: "llama3".to_string(),
            endpoint: Some(endpoint.to_string()),
            context_window: 32_000,
        },
    );
    settings
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": text } }]
    }))
}

fn json_file(value: serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file
}

fn content_file() -> NamedTempFile {
    json_file(json!({
        "type": "article",
        "url": "https://example.com/post",
        "title": "A post",
        "content": "Rust makes systems programming approachable.",
        "wordCount": 5
    }))
}

#[tokio::test]
async fn test_summarize_against_mock_server() {
    let server = MockServer::start().await;
    let summary = json!({"tldr": "Short", "summary": "Body", "tags": ["rust"]}).to_string();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(&summary))
        .expect(1)
        .mount(&server)
        .await;

    let settings = self_hosted_settings(&server.uri());
    let input = content_file();

    summarize(&settings, input.path(), None, None, None, None, false)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "llama3");
    assert_eq!(body["max_tokens"], 4096);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_summarize_text_reply_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("I can't help with that."))
        .expect(1)
        .mount(&server)
        .await;

    let settings = self_hosted_settings(&server.uri());
    let input = content_file();

    let err = summarize(&settings, input.path(), None, None, None, None, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("text instead of a summary"));
}

#[tokio::test]
async fn test_chat_sends_summary_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("It is about Rust."))
        .expect(1)
        .mount(&server)
        .await;

    let settings = self_hosted_settings(&server.uri());
    let input = content_file();
    let summary = json_file(json!({"tldr": "Old", "summary": "Old body"}));

    chat(
        &settings,
        input.path(),
        summary.path(),
        "What is it about?".to_string(),
        false,
        false,
        None,
    )
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let system = body["messages"][0]["content"].as_str().unwrap();
    assert!(system.contains("titled \"A post\""));
    assert!(system.contains("\"tldr\": \"Old\""));
    assert_eq!(body["messages"][1]["content"], "What is it about?");
}

#[tokio::test]
async fn test_connection_failure_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let settings = self_hosted_settings(&server.uri());
    assert!(test_connection(&settings, None).await.is_err());
}

#[tokio::test]
async fn test_summarize_missing_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = self_hosted_settings(&server.uri());
    settings.active_provider_id = "deepseek".to_string();
    settings.provider_configs.insert(
        "deepseek".to_string(),
        ProviderSettings {
            provider_id: "deepseek".to_string(),
            api_key: None,
            model: "deepseek-chat".to_string(),
            endpoint: Some(server.uri()),
            context_window: 64_000,
        },
    );
    let input = content_file();

    let err = summarize(&settings, input.path(), None, None, None, None, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Please configure your LLM API key"));
}
