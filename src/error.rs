//! Error types — JSON-RPC error codes, protocol errors and agent failures.
//!
//! - Standard JSON-RPC 2.0 errors (-32700 through -32603)
//! - A2A-specific errors used by these agents (-32004)
//! - Agent-level failures (configuration, backend calls, unknown actions)

use crate::llm::BackendError;
use crate::types::JsonRpcError;

// ---------------------------------------------------------------------------
// Standard JSON-RPC 2.0 error codes
// ---------------------------------------------------------------------------

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i64 = -32700;

/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;

/// The method does not exist / is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// A2A-specific error codes
// ---------------------------------------------------------------------------

/// The requested operation is not supported.
pub const UNSUPPORTED_OPERATION: i64 = -32004;

// ---------------------------------------------------------------------------
// AgentError enum
// ---------------------------------------------------------------------------

/// Unified error type for the agents in this crate.
///
/// Protocol variants carry a message and an optional structured `data`
/// payload that is forwarded in JSON-RPC error responses. Agent variants
/// describe failures of the surrounding system (missing credentials, model
/// backend failures, unknown worker actions).
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    // -- Protocol errors (map to JSON-RPC error codes) --
    /// Invalid JSON payload (code -32700).
    #[error("Parse error: {message}")]
    ParseError {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Request payload validation error (code -32600).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Method not found (code -32601).
    #[error("Method not found: {message}")]
    MethodNotFound {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Invalid parameters (code -32602).
    #[error("Invalid params: {message}")]
    InvalidParams {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Internal error (code -32603).
    #[error("Internal error: {message}")]
    InternalError {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Operation not supported (code -32004).
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    // -- Agent-level failures --
    /// A credential or setting the agent needs is absent.
    ///
    /// Reported as a warning at startup; calls that need it fail later.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// A runtime dependency (listener, HTTP client) could not be set up.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// The request named an action the worker has no handler for.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The text-generation backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The executor does not support canceling in-flight work (code -32004).
    #[error("Cancellation unsupported: {0}")]
    CancellationUnsupported(String),

    // -- Client/transport-side errors --
    /// Transport-level error (connection failed, request failed, etc.).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error with status code and response body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Invalid JSON received from a remote agent.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// A JSON-RPC error response was received from the remote agent.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },
}

/// Convenience result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

impl AgentError {
    /// Create a `ParseError` with a message and no data.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InvalidRequest` with a message and no data.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `MethodNotFound` with a message and no data.
    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::MethodNotFound {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InvalidParams` with a message and no data.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InternalError` with a message and no data.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `UnsupportedOperation` with a message and no data.
    pub fn unsupported_operation(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
            data: None,
        }
    }

    /// Returns the JSON-RPC error code for this error variant.
    ///
    /// Failures without a dedicated code map to -32603 (internal error).
    pub fn code(&self) -> i64 {
        match self {
            AgentError::ParseError { .. } => PARSE_ERROR,
            AgentError::InvalidRequest { .. } => INVALID_REQUEST,
            AgentError::MethodNotFound { .. } => METHOD_NOT_FOUND,
            AgentError::InvalidParams { .. } | AgentError::UnknownAction(_) => INVALID_PARAMS,
            AgentError::UnsupportedOperation { .. } | AgentError::CancellationUnsupported(_) => {
                UNSUPPORTED_OPERATION
            }
            AgentError::JsonRpc { code, .. } => *code,
            AgentError::InternalError { .. }
            | AgentError::ConfigurationMissing(_)
            | AgentError::DependencyUnavailable(_)
            | AgentError::Backend(_)
            | AgentError::Transport(_)
            | AgentError::Timeout(_)
            | AgentError::Http { .. }
            | AgentError::InvalidJson(_) => INTERNAL_ERROR,
        }
    }
}

impl From<AgentError> for JsonRpcError {
    fn from(err: AgentError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let data = match &err {
            AgentError::ParseError { data, .. }
            | AgentError::InvalidRequest { data, .. }
            | AgentError::MethodNotFound { data, .. }
            | AgentError::InvalidParams { data, .. }
            | AgentError::InternalError { data, .. }
            | AgentError::UnsupportedOperation { data, .. }
            | AgentError::JsonRpc { data, .. } => data.clone(),
            _ => None,
        };
        JsonRpcError {
            code,
            message,
            data,
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError {
            message: err.to_string(),
            data: None,
        }
    }
}
