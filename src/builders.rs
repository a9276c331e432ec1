//! Builder patterns for agent cards, skills and servers.

use crate::types::*;

/// Builder for constructing [`AgentCard`] with sensible defaults.
///
/// # Example
///
/// ```
/// use a2a_agents::builders::{AgentCardBuilder, AgentSkillBuilder};
///
/// let card = AgentCardBuilder::new("My Agent", "An example agent", "1.0.0")
///     .with_url("http://localhost:9001/")
///     .with_skill(AgentSkillBuilder::new("chat", "Chat", "Conversational AI").with_tags(["conversation"]).build())
///     .with_streaming(true)
///     .build();
/// assert_eq!(card.default_input_modes, vec!["text".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct AgentCardBuilder {
    name: String,
    description: String,
    version: String,
    url: String,
    supported_interfaces: Vec<AgentInterface>,
    capabilities: AgentCapabilities,
    default_input_modes: Vec<String>,
    default_output_modes: Vec<String>,
    skills: Vec<AgentSkill>,
    preferred_transport: String,
    protocol_version: String,
    supports_authenticated_extended_card: bool,
}

impl AgentCardBuilder {
    /// Create a new builder with required fields.
    ///
    /// # Arguments
    ///
    /// * `name` - Human-readable agent name
    /// * `description` - Description of agent capabilities
    /// * `version` - Version string (e.g., "1.0.0")
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            url: String::new(),
            supported_interfaces: Vec::new(),
            capabilities: AgentCapabilities::default(),
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            skills: Vec::new(),
            preferred_transport: "JSONRPC".to_string(),
            protocol_version: "0.3.0".to_string(),
            supports_authenticated_extended_card: false,
        }
    }

    /// Set the agent's primary URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Add a JSON-RPC interface at the given URL.
    ///
    /// Also becomes the card URL when none was set.
    pub fn with_jsonrpc_interface(mut self, url: impl Into<String>) -> Self {
        let url_str = url.into();
        self.supported_interfaces.push(AgentInterface {
            url: url_str.clone(),
            transport: "JSONRPC".to_string(),
        });
        if self.url.is_empty() {
            self.url = url_str;
        }
        self
    }

    /// Enable or disable streaming support.
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.capabilities.streaming = enabled;
        self
    }

    /// Add a skill. Skills keep insertion order; ids are not deduplicated.
    pub fn with_skill(mut self, skill: AgentSkill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Advertise (or not) the authenticated extended card.
    pub fn with_authenticated_extended_card(mut self, enabled: bool) -> Self {
        self.supports_authenticated_extended_card = enabled;
        self
    }

    /// Build the [`AgentCard`].
    pub fn build(self) -> AgentCard {
        AgentCard {
            name: self.name,
            description: self.description,
            url: self.url,
            version: self.version,
            protocol_version: self.protocol_version,
            preferred_transport: self.preferred_transport,
            supported_interfaces: self.supported_interfaces,
            default_input_modes: self.default_input_modes,
            default_output_modes: self.default_output_modes,
            capabilities: self.capabilities,
            skills: self.skills,
            supports_authenticated_extended_card: self.supports_authenticated_extended_card,
        }
    }
}

/// Builder for [`AgentSkill`].
#[derive(Debug, Clone)]
pub struct AgentSkillBuilder {
    skill: AgentSkill,
}

impl AgentSkillBuilder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            skill: AgentSkill {
                id: id.into(),
                name: name.into(),
                description: description.into(),
                tags: Vec::new(),
                examples: Vec::new(),
            },
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skill.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skill
            .examples
            .extend(examples.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> AgentSkill {
        self.skill
    }
}

/// Card served by the component builder worker on `port`.
pub fn component_builder_card(port: u16) -> AgentCard {
    let generate = AgentSkillBuilder::new(
        "generate_component",
        "Generate React Component",
        "Generates a new React component from specifications",
    )
    .with_tags(["react", "components", "shadcn/ui", "generation"])
    .with_examples([
        "Generate a button component",
        "Create a form component with validation",
        "Build a data table with sorting",
    ])
    .build();

    let modify = AgentSkillBuilder::new(
        "modify_component",
        "Modify React Component",
        "Modifies an existing React component",
    )
    .with_tags(["react", "components", "modification"])
    .with_examples([
        "Add dark mode support to the button",
        "Make the form responsive",
        "Add loading state to the submit button",
    ])
    .build();

    AgentCardBuilder::new(
        "Component Builder Agent",
        "LangGraph + OpenAI agent that generates and modifies React components using shadcn/ui",
        "1.0.0",
    )
    .with_url(format!("http://localhost:{port}/"))
    .with_streaming(true)
    .with_skill(generate)
    .with_skill(modify)
    .with_authenticated_extended_card(false)
    .build()
}

/// Card served by the itinerary worker on `port`.
pub fn itinerary_card(port: u16) -> AgentCard {
    let plan = AgentSkillBuilder::new(
        "plan_itinerary",
        "Plan Itinerary",
        "Plans a day-by-day travel itinerary for a destination",
    )
    .with_tags(["travel", "itinerary", "planning"])
    .with_examples([
        "Plan a 3 day trip to Tokyo",
        "Weekend in Lisbon focused on food and museums",
        "A budget 5 day itinerary for Mexico City",
    ])
    .build();

    AgentCardBuilder::new(
        "Itinerary Agent",
        "OpenAI agent that plans travel itineraries",
        "1.0.0",
    )
    .with_url(format!("http://localhost:{port}/"))
    .with_streaming(true)
    .with_skill(plan)
    .build()
}

/// Builder for an A2A worker's axum router.
///
/// # Example
///
/// ```rust,ignore
/// use a2a_agents::builders::{component_builder_card, ServerBuilder};
/// use a2a_agents::server::WorkerExecutor;
/// use std::sync::Arc;
///
/// let app = ServerBuilder::new(Arc::new(WorkerExecutor::new(agent)))
///     .with_agent_card_direct(component_builder_card(9001))
///     .with_cors(true)
///     .build();
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:9001").await?;
/// axum::serve(listener, app).await?;
/// ```
#[cfg(feature = "server")]
pub struct ServerBuilder {
    executor: std::sync::Arc<dyn crate::server::AgentExecutor>,
    agent_card: Option<AgentCard>,
    cors_enabled: bool,
}

#[cfg(feature = "server")]
impl ServerBuilder {
    /// Create a new server builder with the given agent executor.
    pub fn new(executor: std::sync::Arc<dyn crate::server::AgentExecutor>) -> Self {
        Self {
            executor,
            agent_card: None,
            cors_enabled: false,
        }
    }

    /// Set the agent card directly.
    pub fn with_agent_card_direct(mut self, card: AgentCard) -> Self {
        self.agent_card = Some(card);
        self
    }

    /// Enable or disable CORS middleware.
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Build the axum router.
    pub fn build(self) -> axum::Router {
        use crate::server::{a2a_router, DefaultRequestHandler};
        use std::sync::Arc;

        let handler = Arc::new(DefaultRequestHandler::new(self.executor));
        let card = self.agent_card.unwrap_or_else(|| {
            AgentCardBuilder::new("A2A Agent", "An A2A-compatible agent", "1.0.0").build()
        });

        let mut router = a2a_router(handler, card);

        if self.cors_enabled {
            use tower_http::cors::CorsLayer;
            router = router.layer(CorsLayer::permissive());
        }

        router
    }
}
