//! A2A client: call remote A2A agents.
//!
//! - [`A2AClient`]: JSON-RPC over HTTP for `message/send` and `tasks/cancel`
//! - [`CardResolver`]: agent card discovery via the well-known URL

mod a2a_client;
mod card_resolver;

pub use a2a_client::{A2AClient, DEFAULT_REQUEST_TIMEOUT};
pub use card_resolver::{CardResolver, DEFAULT_CARD_TIMEOUT};

use crate::error::AgentError;

/// Map a failed HTTP exchange with `url` to an [`AgentError`].
fn request_error(err: reqwest::Error, url: &str) -> AgentError {
    if err.is_timeout() {
        AgentError::Timeout(format!("request to {url} timed out: {err}"))
    } else if err.is_connect() {
        AgentError::Transport(format!("failed to connect to {url}: {err}"))
    } else {
        AgentError::Transport(format!("request to {url} failed: {err}"))
    }
}

/// `Err(Http)` for a non-2xx response, carrying its body.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AgentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AgentError::Http {
        status: status.as_u16(),
        body,
    })
}
