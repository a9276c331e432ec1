//! Axum integration: ready-made HTTP routes for an A2A worker.
//!
//! [`a2a_router`] serves:
//! - `POST /` and `POST /a2a`: JSON-RPC 2.0 dispatch
//! - `GET /.well-known/agent-card.json` and `GET /.well-known/agent.json`:
//!   agent card discovery
//!
//! # Supported JSON-RPC Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | `message/send` | Send a message and get the agent's reply message |
//! | `message/stream` | Same, delivered as SSE events |
//! | `tasks/cancel` | Ask the executor to cancel a task |

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::stream::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::error::AgentError;
use crate::types::{
    AgentCard, JsonRpcId, JsonRpcRequest, JsonRpcResponse, SendMessageParams,
    StreamResponse, TaskIdParams,
};

use super::request_handler::RequestHandler;

/// Path of the agent card.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Older agent card path, still served.
pub const LEGACY_AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Shared state for the axum routes.
struct AppState {
    handler: Arc<dyn RequestHandler>,
    agent_card: AgentCard,
}

/// Create an axum Router with the A2A protocol routes.
pub fn a2a_router(handler: Arc<dyn RequestHandler>, agent_card: AgentCard) -> Router {
    let state = Arc::new(AppState {
        handler,
        agent_card,
    });

    Router::new()
        .route(AGENT_CARD_PATH, get(handle_agent_card))
        .route(LEGACY_AGENT_CARD_PATH, get(handle_agent_card))
        .route("/", post(handle_jsonrpc))
        .route("/a2a", post(handle_jsonrpc))
        .with_state(state)
}

/// Serve the agent card.
async fn handle_agent_card(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.agent_card.clone())
}

fn rpc_error(id: Option<JsonRpcId>, err: AgentError) -> Response {
    Json(JsonRpcResponse::from_agent_error(id, err)).into_response()
}

fn rpc_success<T: serde::Serialize>(id: Option<JsonRpcId>, result: &T) -> Response {
    match serde_json::to_value(result) {
        Ok(v) => Json(JsonRpcResponse::success(id, v)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            rpc_error(id, AgentError::internal_error(e.to_string()))
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, AgentError> {
    serde_json::from_value(params).map_err(|e| AgentError::invalid_params(e.to_string()))
}

/// Main JSON-RPC dispatch handler.
///
/// Malformed bodies get JSON-RPC errors rather than HTTP rejections:
/// invalid JSON is -32700, a JSON value that is not a request is -32600.
async fn handle_jsonrpc(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return rpc_error(None, AgentError::from(e)),
    };

    let id = value
        .get("id")
        .and_then(|v| serde_json::from_value::<JsonRpcId>(v.clone()).ok());

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => return rpc_error(id, AgentError::invalid_request(e.to_string())),
    };

    if request.jsonrpc != "2.0" {
        return rpc_error(
            request.id,
            AgentError::invalid_request("JSON-RPC version must be \"2.0\""),
        );
    }

    debug!(method = %request.method, "JSON-RPC request received");

    match request.method.as_str() {
        "message/send" => handle_message_send(state, request).await,
        "message/stream" => handle_message_stream(state, request).await,
        "tasks/cancel" => handle_tasks_cancel(state, request).await,
        method => {
            warn!(method = %method, "Unknown JSON-RPC method");
            rpc_error(request.id, AgentError::method_not_found(method))
        }
    }
}

/// Handle `message/send`.
async fn handle_message_send(state: Arc<AppState>, request: JsonRpcRequest) -> Response {
    let params: SendMessageParams = match parse_params(request.params) {
        Ok(p) => p,
        Err(e) => return rpc_error(request.id, e),
    };

    match state.handler.on_message_send(params).await {
        Ok(message) => rpc_success(request.id, &message),
        Err(e) => rpc_error(request.id, e),
    }
}

/// Handle `message/stream`: SSE, one JSON-RPC envelope per event.
async fn handle_message_stream(state: Arc<AppState>, request: JsonRpcRequest) -> Response {
    if !state.agent_card.capabilities.streaming {
        return rpc_error(
            request.id,
            AgentError::unsupported_operation("streaming is not supported by the agent"),
        );
    }

    let params: SendMessageParams = match parse_params(request.params) {
        Ok(p) => p,
        Err(e) => return rpc_error(request.id, e),
    };

    match state.handler.on_message_send_stream(params).await {
        Ok(rx) => Sse::new(make_sse_stream(request.id, rx))
            .keep_alive(KeepAlive::default())
            .into_response(),
        Err(e) => rpc_error(request.id, e),
    }
}

/// Handle `tasks/cancel`.
async fn handle_tasks_cancel(state: Arc<AppState>, request: JsonRpcRequest) -> Response {
    let params: TaskIdParams = match parse_params(request.params) {
        Ok(p) => p,
        Err(e) => return rpc_error(request.id, e),
    };

    match state.handler.on_cancel_task(params).await {
        Ok(update) => rpc_success(request.id, &update),
        Err(e) => {
            debug!(error = %e, "Cancel rejected");
            rpc_error(request.id, e)
        }
    }
}

// ---- SSE streaming ----

/// Create an SSE stream from a broadcast receiver.
///
/// Each event is wrapped in a JSON-RPC success envelope. The stream sends a
/// `done` event and ends after the first final event or when the channel
/// closes.
fn make_sse_stream(
    request_id: Option<JsonRpcId>,
    mut rx: broadcast::Receiver<StreamResponse>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let is_final = event.is_final();
                    let event_type = match &event {
                        StreamResponse::StatusUpdate(_) => "statusUpdate",
                        StreamResponse::Message(_) => "message",
                    };

                    match serde_json::to_value(&event) {
                        Ok(result_value) => {
                            let rpc_response =
                                JsonRpcResponse::success(request_id.clone(), result_value);
                            match serde_json::to_string(&rpc_response) {
                                Ok(json) => {
                                    yield Ok(Event::default().event(event_type).data(json));
                                }
                                Err(e) => {
                                    error!(error = %e, "Failed to serialize SSE JSON-RPC response");
                                }
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to serialize SSE event");
                        }
                    }

                    if is_final {
                        yield Ok(Event::default().event("done").data(""));
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    yield Ok(Event::default().event("done").data(""));
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "SSE stream lagged, some events were missed");
                }
            }
        }
    }
}
