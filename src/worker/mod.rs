//! Worker agents and their task-dispatch contract.
//!
//! A worker receives a JSON object as the text of an A2A message, picks a
//! handler by its `action` field and answers with a [`TaskResult`]. Every
//! failure along the way (bad JSON, unknown action, wrong field types, model
//! errors) becomes an error result; nothing escapes [`WorkerAgent::handle_text`].

pub mod component_builder;
pub mod fence;
pub mod itinerary;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AgentError, AgentResult};

pub use component_builder::ComponentBuilderAgent;
pub use fence::extract_fenced_block;
pub use itinerary::ItineraryAgent;

// ============================================================================
// Request
// ============================================================================

/// A parsed task envelope: the action to run plus its remaining fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    action: String,
    fields: Map<String, Value>,
}

impl TaskRequest {
    /// Parse an envelope from message text.
    ///
    /// The text must be a JSON object. A missing `action` falls back to
    /// `default_action`; a non-string `action` is rejected.
    pub fn parse(text: &str, default_action: &str) -> AgentResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut fields) = value else {
            return Err(AgentError::parse_error(
                "task envelope must be a JSON object",
            ));
        };

        let action = match fields.remove("action") {
            None | Some(Value::Null) => default_action.to_string(),
            Some(Value::String(action)) => action,
            Some(other) => {
                return Err(AgentError::invalid_params(format!(
                    "action must be a string, got {other}"
                )))
            }
        };

        Ok(Self { action, fields })
    }

    /// The requested action.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The envelope fields other than `action`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Deserialize the fields into a handler's argument struct.
    ///
    /// Unknown fields are ignored; defaults come from the target type.
    pub fn arguments<T: DeserializeOwned>(&self) -> AgentResult<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| AgentError::invalid_params(e.to_string()))
    }
}

// ============================================================================
// Result
// ============================================================================

/// Outcome of one worker action, tagged on `status`.
///
/// Success carries exactly one payload and error carries exactly one
/// message; the enum makes any other combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskResult {
    /// The action produced a payload.
    Success(TaskOutput),
    /// The action failed.
    Error(TaskFailure),
}

/// Success payloads, one per worker action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOutput {
    /// Result of `generate`.
    Component(GeneratedComponent),
    /// Result of `modify`.
    Modification(ModifiedComponent),
    /// Result of `plan`.
    Itinerary(ItineraryPlan),
}

/// A freshly generated React component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedComponent {
    pub component_name: String,
    pub code: String,
    pub language: String,
    pub framework: String,
    #[serde(rename = "type")]
    pub component_type: String,
}

/// An existing component after a requested change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedComponent {
    pub code: String,
    pub language: String,
    pub modification_applied: String,
}

/// A day-by-day trip plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryPlan {
    pub destination: String,
    pub days: u32,
    /// Plan as returned by the model, already parsed.
    pub itinerary: Value,
}

/// Why an action failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Component the failed `generate` was for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    /// Human-readable message.
    pub error: String,
}

impl TaskResult {
    /// An error result with only a message.
    pub fn failure(error: impl Into<String>) -> Self {
        TaskResult::Error(TaskFailure {
            component_name: None,
            error: error.into(),
        })
    }

    /// An error result naming the component it concerns.
    pub fn component_failure(component_name: impl Into<String>, error: impl Into<String>) -> Self {
        TaskResult::Error(TaskFailure {
            component_name: Some(component_name.into()),
            error: error.into(),
        })
    }

    /// Whether the action succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Success(_))
    }

    /// The error message, if the action failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            TaskResult::Error(failure) => Some(&failure.error),
            TaskResult::Success(_) => None,
        }
    }

    /// Serialize to the JSON text sent back to the caller.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({"status": "error", "error": e.to_string()}).to_string()
        })
    }
}

impl From<AgentError> for TaskResult {
    fn from(err: AgentError) -> Self {
        TaskResult::failure(err.to_string())
    }
}

// ============================================================================
// Worker trait
// ============================================================================

/// A worker agent: a fixed table of actions over a text-generation backend.
#[async_trait]
pub trait WorkerAgent: Send + Sync + 'static {
    /// Action used when the envelope has none.
    fn default_action(&self) -> &'static str;

    /// The actions this worker handles. [`handle_text`](Self::handle_text)
    /// only dispatches actions listed here.
    fn actions(&self) -> &'static [&'static str];

    /// Run the handler for `request.action()`.
    ///
    /// Actions without a handler yield `"Unknown action: {action}"`.
    async fn dispatch(&self, request: TaskRequest) -> TaskResult;

    /// Parse `text` as an envelope and dispatch it.
    async fn handle_text(&self, text: &str) -> TaskResult {
        let request = match TaskRequest::parse(text, self.default_action()) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "Rejected task envelope");
                return err.into();
            }
        };

        if !self.actions().iter().any(|a| *a == request.action()) {
            tracing::warn!(action = request.action(), "Unknown action");
            return AgentError::UnknownAction(request.action().to_string()).into();
        }

        tracing::debug!(action = request.action(), "Dispatching task");
        self.dispatch(request).await
    }
}
