//! OpenAI-compatible client against a fake chat-completions server.

mod common;

use std::sync::{Arc, Mutex};

use a2a_agents::llm::{
    BackendError, ChatBackend, ChatMessage, OpenAiClient, OpenAiConfig, TextGenerationBackend,
    ToolDefinition,
};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use common::serve;
use serde_json::{json, Value};

#[derive(Clone)]
struct FakeOpenAi {
    status: StatusCode,
    reply: Value,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(fake): State<FakeOpenAi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.requests.lock().unwrap().push((auth, body));
    (fake.status, Json(fake.reply.clone()))
}

async fn start_fake(status: StatusCode, reply: Value) -> (String, FakeOpenAi) {
    let fake = FakeOpenAi {
        status,
        reply,
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(fake.clone());
    let (base_url, _handle) = serve(app).await;
    (format!("{base_url}/v1/"), fake)
}

fn client(base_url: &str, key: Option<&str>) -> OpenAiClient {
    OpenAiClient::new(
        OpenAiConfig::openai(key.map(str::to_string), "gpt-4o-mini").with_base_url(base_url),
    )
    .unwrap()
}

#[tokio::test]
async fn generate_sends_bearer_and_returns_first_choice() {
    let (base_url, fake) = start_fake(
        StatusCode::OK,
        json!({
            "choices": [
                {"message": {"role": "assistant", "content": "```tsx\nX\n```"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        }),
    )
    .await;

    let text = client(&base_url, Some("sk-test"))
        .generate("Build a button")
        .await
        .unwrap();

    assert_eq!(text, "```tsx\nX\n```");

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Build a button");
    assert!(body.get("tools").is_none());
}

#[tokio::test]
async fn chat_sends_tools_and_parses_tool_calls() {
    let (base_url, fake) = start_fake(
        StatusCode::OK,
        json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "send_message", "arguments": "{\"agent_name\":\"itinerary\",\"task\":\"{}\"}"}
                }]
            }}]
        }),
    )
    .await;
    let tools = [ToolDefinition {
        name: "send_message".into(),
        description: "Send a task".into(),
        parameters: json!({"type": "object"}),
    }];

    let reply = client(&base_url, Some("sk-test"))
        .chat(&[ChatMessage::system("sys"), ChatMessage::user("hi")], &tools)
        .await
        .unwrap();

    assert_eq!(reply.requested_tool_calls()[0].function.name, "send_message");

    let requests = fake.requests.lock().unwrap();
    let body = &requests[0].1;
    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["name"], "send_message");
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn temperature_is_forwarded() {
    let (base_url, fake) = start_fake(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": "ok"}}]}),
    )
    .await;
    let client = OpenAiClient::new(
        OpenAiConfig::openai(Some("sk-test".into()), "gpt-4o-mini")
            .with_base_url(&base_url)
            .with_temperature(0.25),
    )
    .unwrap();

    client.generate("x").await.unwrap();

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests[0].1["temperature"], 0.25);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (base_url, _fake) = start_fake(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"message": "slow down"}}),
    )
    .await;

    let err = client(&base_url, Some("sk-test"))
        .generate("x")
        .await
        .unwrap_err();

    match err {
        BackendError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("slow down"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn no_choices_is_empty_completion() {
    let (base_url, _fake) = start_fake(StatusCode::OK, json!({"choices": []})).await;

    let err = client(&base_url, Some("sk-test"))
        .generate("x")
        .await
        .unwrap_err();

    assert_eq!(err, BackendError::EmptyCompletion);
}

#[tokio::test]
async fn missing_key_fails_without_request() {
    let (base_url, fake) = start_fake(StatusCode::OK, json!({"choices": []})).await;

    let err = client(&base_url, None).generate("x").await.unwrap_err();

    assert_eq!(err, BackendError::MissingApiKey("OPENAI_API_KEY".into()));
    assert!(fake.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn gemini_config_names_google_key() {
    let config = OpenAiConfig::gemini(None, "gemini-2.5-pro");
    let err = OpenAiClient::new(config)
        .unwrap()
        .chat(&[ChatMessage::user("hi")], &[])
        .await
        .unwrap_err();

    assert_eq!(err, BackendError::MissingApiKey("GOOGLE_API_KEY".into()));
}
