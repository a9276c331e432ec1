//! React component generation and modification.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::fence::{extract_fenced_block, COMPONENT_FENCE_TAGS};
use super::{
    GeneratedComponent, ModifiedComponent, TaskOutput, TaskRequest, TaskResult, WorkerAgent,
};
use crate::error::AgentError;
use crate::llm::TextGenerationBackend;

/// Model used by the component builder unless overridden.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const LANGUAGE: &str = "typescript";
const FRAMEWORK: &str = "react";

/// Envelope fields of a `generate` request.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateArgs {
    #[serde(default = "default_component_name")]
    pub component_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default = "default_component_type")]
    pub component_type: String,
    #[serde(default = "default_shadcn_based")]
    pub shadcn_based: bool,
}

/// Envelope fields of a `modify` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ModifyArgs {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub request: String,
}

fn default_component_name() -> String {
    "Component".to_string()
}

fn default_component_type() -> String {
    "ui".to_string()
}

fn default_shadcn_based() -> bool {
    true
}

/// Generates new React components and edits existing ones.
///
/// Actions: `generate` (default) and `modify`.
#[derive(Clone)]
pub struct ComponentBuilderAgent {
    backend: Arc<dyn TextGenerationBackend>,
}

impl ComponentBuilderAgent {
    pub fn new(backend: Arc<dyn TextGenerationBackend>) -> Self {
        Self { backend }
    }

    /// Generate a component from a name and description.
    pub async fn generate(
        &self,
        component_name: &str,
        description: &str,
        component_type: &str,
        shadcn_based: bool,
    ) -> TaskResult {
        let prompt = generate_prompt(component_name, description, component_type, shadcn_based);

        match self.backend.generate(&prompt).await {
            Ok(text) => {
                let code = extract_fenced_block(&text, COMPONENT_FENCE_TAGS);
                if code.is_empty() {
                    return TaskResult::component_failure(
                        component_name,
                        "Model returned an empty component",
                    );
                }
                debug!(component = component_name, bytes = code.len(), "Generated component");
                TaskResult::Success(TaskOutput::Component(GeneratedComponent {
                    component_name: component_name.to_string(),
                    code,
                    language: LANGUAGE.to_string(),
                    framework: FRAMEWORK.to_string(),
                    component_type: component_type.to_string(),
                }))
            }
            Err(err) => {
                warn!(component = component_name, error = %err, "Component generation failed");
                TaskResult::component_failure(component_name, err.to_string())
            }
        }
    }

    /// Apply `modification_request` to `component_code`.
    pub async fn modify(&self, component_code: &str, modification_request: &str) -> TaskResult {
        let prompt = modify_prompt(component_code, modification_request);

        match self.backend.generate(&prompt).await {
            Ok(text) => {
                let code = extract_fenced_block(&text, COMPONENT_FENCE_TAGS);
                if code.is_empty() {
                    return TaskResult::failure("Model returned an empty component");
                }
                TaskResult::Success(TaskOutput::Modification(ModifiedComponent {
                    code,
                    language: LANGUAGE.to_string(),
                    modification_applied: modification_request.to_string(),
                }))
            }
            Err(err) => {
                warn!(error = %err, "Component modification failed");
                TaskResult::failure(err.to_string())
            }
        }
    }
}

#[async_trait]
impl WorkerAgent for ComponentBuilderAgent {
    fn default_action(&self) -> &'static str {
        "generate"
    }

    fn actions(&self) -> &'static [&'static str] {
        &["generate", "modify"]
    }

    async fn dispatch(&self, request: TaskRequest) -> TaskResult {
        match request.action() {
            "generate" => match request.arguments::<GenerateArgs>() {
                Ok(args) => {
                    self.generate(
                        &args.component_name,
                        &args.description,
                        &args.component_type,
                        args.shadcn_based,
                    )
                    .await
                }
                Err(err) => err.into(),
            },
            "modify" => match request.arguments::<ModifyArgs>() {
                Ok(args) => self.modify(&args.code, &args.request).await,
                Err(err) => err.into(),
            },
            other => AgentError::UnknownAction(other.to_string()).into(),
        }
    }
}

fn generate_prompt(
    component_name: &str,
    description: &str,
    component_type: &str,
    shadcn_based: bool,
) -> String {
    let base = if shadcn_based {
        "shadcn/ui components"
    } else {
        "Custom React"
    };

    format!(
        "Generate a production-ready React component with the following specifications:

**Component Name**: {component_name}
**Type**: {component_type}
**Description**: {description}
**Base**: {base}

Requirements:
1. Use TypeScript with full type safety
2. Export as named export
3. Include JSDoc comments
4. Use React 19 features (hooks, suspense)
5. Follow Next.js best practices
6. Include proper error handling
7. Make it responsive
8. Add accessibility features

Return ONLY valid TypeScript code, no markdown, no explanations.
Make sure the component is immediately usable."
    )
}

fn modify_prompt(component_code: &str, modification_request: &str) -> String {
    format!(
        "Please modify the following React component based on this request:

**Current Component**:
```typescript
{component_code}
```

**Modification Request**: {modification_request}

Requirements:
1. Maintain TypeScript types
2. Preserve JSDoc comments
3. Keep the component's core functionality
4. Return ONLY the modified component code
5. No markdown, no explanations

Return the complete modified component:"
    )
}
