use serde_json::json;
use studymate_server::config::AiConfig;
use studymate_server::error::AiError;
use studymate_server::{AppError, ChatCompletionClient, LlmClient};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn config(server: &MockServer) -> AiConfig {
    AiConfig {
        base_url: format!("{}/v1", server.uri()),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        temperature: 0.2,
        timeout_secs: 5,
        requests_per_minute: 10,
    }
}

#[tokio::test]
async fn test_completion_request_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "messages": [
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "{\"topics\": []}" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(&config(&server)).expect("client");
    let reply = client.complete("be brief", "hello").await.expect("completion");
    assert_eq!(reply, "{\"topics\": []}");
}

#[tokio::test]
async fn test_upstream_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(&config(&server)).expect("client");
    match client.complete("s", "u").await {
        Err(AppError::Ai(AiError::Status(429, body))) => assert_eq!(body, "slow down"),
        other => panic!("Expected upstream status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(&config(&server)).expect("client");
    let result = client.complete("s", "u").await;
    assert!(matches!(result, Err(AppError::Ai(AiError::EmptyResponse))));
}

#[tokio::test]
async fn test_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::new(&config(&server)).expect("client");
    let result = client.complete("s", "u").await;
    assert!(matches!(result, Err(AppError::Ai(AiError::MalformedResponse(_)))));
}
