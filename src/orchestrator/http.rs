//! HTTP surface of the orchestrator.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /health` | Liveness probe |
//! | `GET /agents` | Registered downstream agents |
//! | `POST /` | Chat: `{"message", "sessionId"?}` → `{"sessionId", "reply"}` |

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::AgentError;

use super::{AgentInfo, OrchestratorAgent};

/// Body of `POST /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Response of `POST /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
}

/// Router for the orchestrator, with permissive CORS for the frontend.
pub fn orchestrator_router(agent: Arc<OrchestratorAgent>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/agents", get(list_agents))
        .route("/", post(chat))
        .with_state(agent)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "agent": "orchestrator",
        "protocol": "AG-UI",
    }))
}

async fn list_agents(State(agent): State<Arc<OrchestratorAgent>>) -> Json<Vec<AgentInfo>> {
    Json(agent.agents())
}

async fn chat(
    State(agent): State<Arc<OrchestratorAgent>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    match agent.chat(request.session_id, &request.message).await {
        Ok(reply) => Json(ChatResponse {
            session_id: reply.session_id,
            reply: reply.reply,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Chat turn failed");
            let status = match e {
                AgentError::Backend(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
