//! Agent card discovery.
//!
//! Fetches a remote agent's card from its well-known URL.

use std::time::Duration;

use crate::error::{AgentError, AgentResult};
use crate::types::AgentCard;

use super::{ensure_success, request_error};

/// How long a card fetch may take before giving up.
pub const DEFAULT_CARD_TIMEOUT: Duration = Duration::from_secs(10);

/// Current well-known path of the agent card.
const DEFAULT_AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Previous well-known path, tried when the current one is missing.
const PREV_AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Resolves [`AgentCard`]s from agent base URLs.
///
/// ```no_run
/// use a2a_agents::client::CardResolver;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let card = CardResolver::new().resolve("http://localhost:9001").await?;
/// println!("Agent: {} v{}", card.name, card.version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardResolver {
    client: reqwest::Client,
    timeout: Duration,
    /// Override the default agent card path.
    card_path: Option<String>,
}

impl CardResolver {
    /// Create a new resolver with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: DEFAULT_CARD_TIMEOUT,
            card_path: None,
        }
    }

    /// Give up on a card fetch after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the card from `path` only, with no fallback.
    pub fn with_card_path(mut self, path: impl Into<String>) -> Self {
        self.card_path = Some(path.into());
        self
    }

    /// Fetch and parse the agent card from the given base URL.
    ///
    /// Tries `/.well-known/agent-card.json` first and falls back to
    /// `/.well-known/agent.json` on a 404.
    ///
    /// # Errors
    ///
    /// [`AgentError::Transport`] on connection failures, [`AgentError::Timeout`]
    /// when the agent stalls, [`AgentError::Http`] on non-2xx responses and
    /// [`AgentError::InvalidJson`] on parse failures.
    pub async fn resolve(&self, base_url: &str) -> AgentResult<AgentCard> {
        let base = base_url.trim_end_matches('/');

        if let Some(path) = self.card_path.as_deref() {
            return self.fetch_card(base, path).await;
        }

        match self.fetch_card(base, DEFAULT_AGENT_CARD_PATH).await {
            Ok(card) => Ok(card),
            Err(AgentError::Http { status: 404, .. }) => {
                tracing::debug!(
                    "agent card not found at {}{}, trying fallback path {}",
                    base,
                    DEFAULT_AGENT_CARD_PATH,
                    PREV_AGENT_CARD_PATH,
                );
                self.fetch_card(base, PREV_AGENT_CARD_PATH).await
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_card(&self, base: &str, path: &str) -> AgentResult<AgentCard> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let url = format!("{base}{path}");

        tracing::debug!("resolving agent card from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, &url))?;

        let bytes = ensure_success(response)
            .await?
            .bytes()
            .await
            .map_err(|e| AgentError::Transport(format!("failed to read agent card response: {e}")))?;

        let card: AgentCard = serde_json::from_slice(&bytes)
            .map_err(|e| AgentError::InvalidJson(format!("failed to parse agent card: {e}")))?;

        tracing::debug!("resolved agent card: {} v{}", card.name, card.version);

        Ok(card)
    }

    /// The JSON-RPC endpoint advertised by a card.
    ///
    /// The first `JSONRPC` entry of `supportedInterfaces` wins; otherwise the
    /// card's own `url` is used when its preferred transport is JSON-RPC.
    pub fn get_a2a_url(card: &AgentCard) -> Option<String> {
        card.supported_interfaces
            .iter()
            .find(|iface| iface.transport.eq_ignore_ascii_case("JSONRPC"))
            .map(|iface| iface.url.clone())
            .or_else(|| {
                (card.preferred_transport.eq_ignore_ascii_case("JSONRPC") && !card.url.is_empty())
                    .then(|| card.url.clone())
            })
    }
}

impl Default for CardResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::AgentCardBuilder;

    #[test]
    fn a2a_url_prefers_supported_interface() {
        let card = AgentCardBuilder::new("A", "a", "1.0.0")
            .with_url("http://localhost:9001/")
            .with_jsonrpc_interface("http://agent:9001/a2a")
            .build();
        assert_eq!(
            CardResolver::get_a2a_url(&card).as_deref(),
            Some("http://agent:9001/a2a")
        );
    }

    #[test]
    fn a2a_url_falls_back_to_card_url() {
        let card = AgentCardBuilder::new("A", "a", "1.0.0")
            .with_url("http://localhost:9001/")
            .build();
        assert_eq!(
            CardResolver::get_a2a_url(&card).as_deref(),
            Some("http://localhost:9001/")
        );
    }
}
