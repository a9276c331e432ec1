//! Itinerary worker behaviour.

mod common;

use a2a_agents::llm::BackendError;
use a2a_agents::worker::{ItineraryAgent, WorkerAgent};
use common::ScriptedBackend;

const TOKYO_PLAN: &str = "Sure!\n```json\n{\"days\": [{\"day\": 1, \"title\": \"Asakusa\", \"activities\": []}, {\"day\": 2, \"title\": \"Shibuya\", \"activities\": []}]}\n```";

#[tokio::test]
async fn plan_parses_fenced_json() {
    let backend = ScriptedBackend::replying([TOKYO_PLAN]);
    let agent = ItineraryAgent::new(backend.clone());

    let result = agent
        .handle_text(r#"{"destination": "Tokyo", "days": 2, "interests": ["food"]}"#)
        .await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["destination"], "Tokyo");
    assert_eq!(json["days"], 2);
    assert_eq!(json["itinerary"]["days"][1]["title"], "Shibuya");

    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("Tokyo"));
    assert!(prompt.contains("food"));
}

#[tokio::test]
async fn unfenced_json_is_accepted() {
    let backend = ScriptedBackend::replying(["  {\"days\": []}  "]);
    let agent = ItineraryAgent::new(backend);

    let result = agent
        .handle_text(r#"{"action": "plan", "destination": "Oslo"}"#)
        .await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["days"], 3);
}

#[tokio::test]
async fn prose_reply_is_an_invalid_itinerary() {
    let backend = ScriptedBackend::replying(["Day 1: walk around. Day 2: rest."]);
    let agent = ItineraryAgent::new(backend);

    let result = agent.plan("Rome", 2, &[], None).await;

    assert!(result
        .error_message()
        .unwrap()
        .starts_with("Model returned an invalid itinerary"));
}

#[tokio::test]
async fn missing_destination_is_rejected_before_model_call() {
    let backend = ScriptedBackend::replying([]);
    let agent = ItineraryAgent::new(backend.clone());

    let result = agent.handle_text(r#"{"days": 4}"#).await;

    assert!(result.error_message().unwrap().starts_with("Invalid params"));
    assert!(backend.prompts().is_empty());
}

#[tokio::test]
async fn backend_error_is_reported() {
    let backend = ScriptedBackend::failing(BackendError::Timeout("120s".into()));
    let agent = ItineraryAgent::new(backend);

    let result = agent.plan("Paris", 1, &[], Some("low")).await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn other_actions_are_unknown() {
    let agent = ItineraryAgent::new(ScriptedBackend::replying([]));

    let result = agent.handle_text(r#"{"action": "generate"}"#).await;

    assert_eq!(result.error_message(), Some("Unknown action: generate"));
}
