//! # Design Producer
//!
//! LLM-backed author of the design specification.

use async_trait::async_trait;
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::ModelConfig;
use crate::producers::{render_briefing, render_change_request, DesignProducer, ResolutionReport};
use crate::prompts;
use crate::run_llm_function;
use crate::session::{ChangeRequest, DesignSpec, SharedSessionState};

/// Structured response to a design change request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct DesignRevision {
    /// Whether the request was handled
    pub success: bool,
    /// Concrete modifications made (empty = design untouched)
    pub modifications: Vec<String>,
    /// One-line summary for the negotiation log
    pub summary: String,
    /// Replacement design, present only when something changed
    pub revised: Option<DesignSpec>,
}

/// Design producer that talks to a configured LLM provider.
pub struct LlmDesignProducer {
    config: ModelConfig,
}

impl LlmDesignProducer {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    async fn generate(&self, input: String) -> anyhow::Result<DesignSpec> {
        run_llm_function!(
            self.config.clone(),
            DesignSpec,
            prompts::DESIGNER.to_string(),
            input
        )
    }

    async fn revise(&self, input: String) -> anyhow::Result<DesignRevision> {
        run_llm_function!(
            self.config.clone(),
            DesignRevision,
            prompts::DESIGNER_RESOLVE.to_string(),
            input
        )
    }
}

#[async_trait]
impl DesignProducer for LlmDesignProducer {
    async fn produce(
        &self,
        state: &SharedSessionState,
        max_steps: u32,
    ) -> EngineResult<DesignSpec> {
        let briefing = render_briefing(state);
        tracing::debug!("Requesting design generation ({} chars)", briefing.len());

        let mut last_error = String::new();
        for attempt in 1..=max_steps.max(1) {
            match self.generate(briefing.clone()).await {
                Ok(spec) => return Ok(spec),
                Err(e) => {
                    tracing::warn!("Design generation attempt {} failed: {}", attempt, e);
                    last_error = e.to_string();
                }
            }
        }
        Err(EngineError::Producer {
            role: "designer".to_string(),
            reason: last_error,
        })
    }

    async fn resolve_conflicts(
        &self,
        state: &SharedSessionState,
        request: &ChangeRequest,
    ) -> EngineResult<ResolutionReport<DesignSpec>> {
        let mut input = render_briefing(state);
        input.push('\n');
        input.push_str(&render_change_request(state, request));

        let revision = self
            .revise(input)
            .await
            .map_err(|e| EngineError::Producer {
                role: "designer".to_string(),
                reason: e.to_string(),
            })?;

        Ok(ResolutionReport {
            success: revision.success,
            modifications: revision.modifications.len() as u32,
            summary: revision.summary,
            revised: revision.revised,
        })
    }
}
