//! Trip itinerary planning.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::fence::{extract_fenced_block, ITINERARY_FENCE_TAGS};
use super::{ItineraryPlan, TaskOutput, TaskRequest, TaskResult, WorkerAgent};
use crate::error::AgentError;
use crate::llm::TextGenerationBackend;

/// Model used by the itinerary planner unless overridden.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Envelope fields of a `plan` request.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanArgs {
    pub destination: String,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub budget: Option<String>,
}

fn default_days() -> u32 {
    3
}

/// Plans day-by-day trips. Single action: `plan`.
#[derive(Clone)]
pub struct ItineraryAgent {
    backend: Arc<dyn TextGenerationBackend>,
}

impl ItineraryAgent {
    pub fn new(backend: Arc<dyn TextGenerationBackend>) -> Self {
        Self { backend }
    }

    /// Ask the model for a JSON itinerary and parse it.
    pub async fn plan(
        &self,
        destination: &str,
        days: u32,
        interests: &[String],
        budget: Option<&str>,
    ) -> TaskResult {
        let prompt = plan_prompt(destination, days, interests, budget);

        let text = match self.backend.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!(destination, error = %err, "Itinerary planning failed");
                return TaskResult::failure(err.to_string());
            }
        };

        let body = extract_fenced_block(&text, ITINERARY_FENCE_TAGS);
        match serde_json::from_str(&body) {
            Ok(itinerary) => {
                debug!(destination, days, "Planned itinerary");
                TaskResult::Success(TaskOutput::Itinerary(ItineraryPlan {
                    destination: destination.to_string(),
                    days,
                    itinerary,
                }))
            }
            Err(err) => TaskResult::failure(format!("Model returned an invalid itinerary: {err}")),
        }
    }
}

#[async_trait]
impl WorkerAgent for ItineraryAgent {
    fn default_action(&self) -> &'static str {
        "plan"
    }

    fn actions(&self) -> &'static [&'static str] {
        &["plan"]
    }

    async fn dispatch(&self, request: TaskRequest) -> TaskResult {
        match request.action() {
            "plan" => match request.arguments::<PlanArgs>() {
                Ok(args) => {
                    self.plan(
                        &args.destination,
                        args.days,
                        &args.interests,
                        args.budget.as_deref(),
                    )
                    .await
                }
                Err(err) => err.into(),
            },
            other => AgentError::UnknownAction(other.to_string()).into(),
        }
    }
}

fn plan_prompt(destination: &str, days: u32, interests: &[String], budget: Option<&str>) -> String {
    let interests = if interests.is_empty() {
        "general sightseeing".to_string()
    } else {
        interests.join(", ")
    };
    let budget = budget.unwrap_or("flexible");

    format!(
        "Create a {days}-day travel itinerary with the following details:

**Destination**: {destination}
**Interests**: {interests}
**Budget**: {budget}

Return ONLY a JSON object of this shape, no explanations:
{{\"days\": [{{\"day\": 1, \"title\": \"...\", \"activities\": [{{\"time\": \"09:00\", \"activity\": \"...\", \"location\": \"...\"}}]}}]}}"
    )
}
