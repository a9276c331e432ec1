//! Command line and environment configuration.
//!
//! Every setting has a flag and an environment variable; `.env` is loaded
//! by the binary before parsing.

use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::error::AgentError;
use crate::llm::{GEMINI_OPENAI_BASE_URL, OPENAI_BASE_URL};
use crate::orchestrator::{OrchestratorConfig, DEFAULT_MAX_TOOL_ROUNDS};

/// Default port of the orchestrator.
pub const ORCHESTRATOR_PORT: u16 = 9000;
/// Default port of the component builder worker.
pub const COMPONENT_BUILDER_PORT: u16 = 9001;
/// Default port of the itinerary worker.
pub const ITINERARY_PORT: u16 = 9002;

/// A2A agents: two workers and the orchestrator that calls them.
#[derive(Debug, Parser)]
#[command(name = "a2a-agents")]
#[command(about = "Component builder and itinerary A2A agents, plus their orchestrator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(
        long,
        global = true,
        env = "DEBUG",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the component builder worker over A2A
    ComponentBuilder(ComponentBuilderArgs),
    /// Serve the itinerary worker over A2A
    Itinerary(ItineraryArgs),
    /// Serve the orchestrator chat endpoint
    Orchestrator(OrchestratorArgs),
}

/// OpenAI credentials shared by both workers.
#[derive(Debug, Clone, Args)]
pub struct OpenAiArgs {
    /// OpenAI API key
    #[arg(long = "openai-api-key", env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long = "openai-base-url", env = "OPENAI_BASE_URL", default_value = OPENAI_BASE_URL)]
    pub base_url: String,
}

#[derive(Debug, Clone, Args)]
pub struct ComponentBuilderArgs {
    /// Port to listen on
    #[arg(long, env = "COMPONENT_BUILDER_PORT", default_value_t = COMPONENT_BUILDER_PORT)]
    pub port: u16,

    /// Model used for generation
    #[arg(long, env = "COMPONENT_BUILDER_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    #[command(flatten)]
    pub openai: OpenAiArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ItineraryArgs {
    /// Port to listen on
    #[arg(long, env = "ITINERARY_PORT", default_value_t = ITINERARY_PORT)]
    pub port: u16,

    /// Model used for planning
    #[arg(long, env = "ITINERARY_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    #[command(flatten)]
    pub openai: OpenAiArgs,
}

#[derive(Debug, Clone, Args)]
pub struct OrchestratorArgs {
    /// Port to listen on
    #[arg(long, env = "ORCHESTRATOR_PORT", default_value_t = ORCHESTRATOR_PORT)]
    pub port: u16,

    /// Public URL of this orchestrator, for logs only
    #[arg(long, env = "ORCHESTRATOR_URL")]
    pub public_url: Option<String>,

    /// Chat model
    #[arg(long, env = "ORCHESTRATOR_MODEL", default_value = "gemini-2.5-pro")]
    pub model: String,

    /// Google API key
    #[arg(long = "google-api-key", env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Gemini OpenAI-compatible base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = GEMINI_OPENAI_BASE_URL)]
    pub gemini_base_url: String,

    /// Base URL of the component builder worker
    #[arg(long, env = "COMPONENT_BUILDER_URL", default_value = "http://localhost:9001")]
    pub component_builder_url: String,

    /// Base URL of the itinerary worker
    #[arg(long, env = "ITINERARY_AGENT_URL", default_value = "http://localhost:9002")]
    pub itinerary_agent_url: String,

    /// Idle time after which a chat session is forgotten
    #[arg(long, env = "SESSION_TIMEOUT_SECONDS", default_value_t = 3600)]
    pub session_timeout_seconds: u64,

    /// Keep chat sessions in memory; when false every request starts fresh
    #[arg(
        long,
        env = "USE_IN_MEMORY_STORAGE",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub use_in_memory_storage: bool,

    /// Upper bound on tool-calling rounds per user message
    #[arg(long, env = "ORCHESTRATOR_MAX_TOOL_ROUNDS", default_value_t = DEFAULT_MAX_TOOL_ROUNDS)]
    pub max_tool_rounds: usize,
}

impl OrchestratorArgs {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_seconds)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            model: self.model.clone(),
            max_tool_rounds: self.max_tool_rounds,
            ..OrchestratorConfig::default()
        }
    }

    #[cfg(feature = "client")]
    pub fn backend_config(&self) -> crate::llm::OpenAiConfig {
        crate::llm::OpenAiConfig::gemini(self.google_api_key.clone(), self.model.clone())
            .with_base_url(self.gemini_base_url.clone())
    }
}

#[cfg(feature = "client")]
impl OpenAiArgs {
    pub fn backend_config(&self, model: &str) -> crate::llm::OpenAiConfig {
        crate::llm::OpenAiConfig::openai(self.api_key.clone(), model)
            .with_base_url(self.base_url.clone())
    }
}

/// `Err(ConfigurationMissing)` when `key` is absent or blank.
///
/// Callers log the error and keep starting; model calls then fail per request.
pub fn require_api_key(key: Option<&str>, env_var: &str) -> Result<(), AgentError> {
    match key {
        Some(k) if !k.trim().is_empty() => Ok(()),
        _ => Err(AgentError::ConfigurationMissing(format!(
            "{env_var} environment variable not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn blank_key_is_missing() {
        assert!(require_api_key(Some("sk-1"), "OPENAI_API_KEY").is_ok());
        let err = require_api_key(Some("  "), "OPENAI_API_KEY").unwrap_err();
        assert!(matches!(err, AgentError::ConfigurationMissing(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert!(require_api_key(None, "GOOGLE_API_KEY").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "a2a-agents",
            "orchestrator",
            "--port",
            "9100",
            "--use-in-memory-storage",
            "false",
            "--max-tool-rounds",
            "3",
        ])
        .unwrap();

        let Command::Orchestrator(args) = cli.command else {
            panic!("expected orchestrator subcommand");
        };
        assert_eq!(args.port, 9100);
        assert!(!args.use_in_memory_storage);
        assert_eq!(args.orchestrator_config().max_tool_rounds, 3);
        assert_eq!(args.orchestrator_config().name, "OrchestratorAgent");
    }

    #[test]
    fn base_url_defaults_come_from_llm_module() {
        let Command::Orchestrator(args) = Cli::try_parse_from(["a2a-agents", "orchestrator"])
            .unwrap()
            .command
        else {
            panic!("expected orchestrator subcommand");
        };
        assert_eq!(args.gemini_base_url, GEMINI_OPENAI_BASE_URL);

        let Command::Itinerary(args) = Cli::try_parse_from(["a2a-agents", "itinerary"])
            .unwrap()
            .command
        else {
            panic!("expected itinerary subcommand");
        };
        assert_eq!(args.openai.base_url, OPENAI_BASE_URL);
    }
}
