use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use a2a_agents::builders::{component_builder_card, itinerary_card, ServerBuilder};
use a2a_agents::config::{
    require_api_key, Cli, Command, ComponentBuilderArgs, ItineraryArgs, OrchestratorArgs,
};
use a2a_agents::llm::{OpenAiClient, OpenAiConfig};
use a2a_agents::orchestrator::http::orchestrator_router;
use a2a_agents::orchestrator::session::spawn_session_reaper;
use a2a_agents::orchestrator::{OrchestratorAgent, RegisteredAgent, SessionStore};
use a2a_agents::server::WorkerExecutor;
use a2a_agents::worker::{ComponentBuilderAgent, ItineraryAgent};
use a2a_agents::AgentError;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    a2a_agents::telemetry::init_tracing(cli.debug);

    match cli.command {
        Command::ComponentBuilder(args) => run_component_builder(args).await,
        Command::Itinerary(args) => run_itinerary(args).await,
        Command::Orchestrator(args) => run_orchestrator(args).await,
    }
}

fn backend(config: OpenAiConfig) -> Result<Arc<OpenAiClient>> {
    if let Err(e) = require_api_key(config.api_key.as_deref(), &config.api_key_env) {
        warn!(error = %e, "Model calls will fail until the key is set");
    }
    let client = OpenAiClient::new(config)
        .map_err(|e| AgentError::DependencyUnavailable(e.to_string()))?;
    Ok(Arc::new(client))
}

async fn run_component_builder(args: ComponentBuilderArgs) -> Result<()> {
    let backend = backend(args.openai.backend_config(&args.model))?;
    let agent = ComponentBuilderAgent::new(backend);

    let app = ServerBuilder::new(Arc::new(WorkerExecutor::new(agent)))
        .with_agent_card_direct(component_builder_card(args.port))
        .with_cors(true)
        .build();

    info!(model = %args.model, "Component Builder Agent ready");
    serve(args.port, app).await
}

async fn run_itinerary(args: ItineraryArgs) -> Result<()> {
    let backend = backend(args.openai.backend_config(&args.model))?;
    let agent = ItineraryAgent::new(backend);

    let app = ServerBuilder::new(Arc::new(WorkerExecutor::new(agent)))
        .with_agent_card_direct(itinerary_card(args.port))
        .with_cors(true)
        .build();

    info!(model = %args.model, "Itinerary Agent ready");
    serve(args.port, app).await
}

async fn run_orchestrator(args: OrchestratorArgs) -> Result<()> {
    let backend = backend(args.backend_config())?;

    let component_builder = RegisteredAgent::connect(
        "component_builder",
        "Generates and modifies React components",
        &args.component_builder_url,
    )
    .await;
    let itinerary = RegisteredAgent::connect(
        "itinerary",
        "Creates structured itineraries and plans",
        &args.itinerary_agent_url,
    )
    .await;

    let mut agent = OrchestratorAgent::new(args.orchestrator_config(), backend)
        .with_agent(component_builder)
        .with_agent(itinerary);
    if args.use_in_memory_storage {
        agent = agent.with_sessions(SessionStore::new(args.session_timeout()));
    }
    let agent = Arc::new(agent);

    if args.use_in_memory_storage {
        let every = args.session_timeout().min(Duration::from_secs(60)).max(Duration::from_secs(1));
        spawn_session_reaper(agent.clone(), every);
    }

    info!(
        model = %args.model,
        public_url = args.public_url.as_deref().unwrap_or("-"),
        sessions = args.use_in_memory_storage,
        "Orchestrator Agent ready"
    );
    serve(args.port, orchestrator_router(agent)).await
}

async fn serve(port: u16, app: axum::Router) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AgentError::DependencyUnavailable(format!("cannot bind {addr}: {e}")))?;

    info!("listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
