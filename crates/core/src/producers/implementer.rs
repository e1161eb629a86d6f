//! # Implementation Producer
//!
//! LLM-backed author of the implementation bundle.

use async_trait::async_trait;
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::ModelConfig;
use crate::producers::{
    render_briefing, render_change_request, ImplementationProducer, ResolutionReport,
};
use crate::prompts;
use crate::run_llm_function;
use crate::session::{ChangeRequest, ImplementationBundle, SharedSessionState};

/// Structured response to an implementation change request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ImplementationRevision {
    /// Whether the request was handled
    pub success: bool,
    /// Concrete modifications made (empty = bundle untouched)
    pub modifications: Vec<String>,
    /// One-line summary for the negotiation log
    pub summary: String,
    /// Replacement bundle, present only when something changed
    pub revised: Option<ImplementationBundle>,
}

/// Implementation producer that talks to a configured LLM provider.
pub struct LlmImplementationProducer {
    config: ModelConfig,
}

impl LlmImplementationProducer {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    async fn generate(&self, input: String) -> anyhow::Result<ImplementationBundle> {
        run_llm_function!(
            self.config.clone(),
            ImplementationBundle,
            prompts::IMPLEMENTER.to_string(),
            input
        )
    }

    async fn revise(&self, input: String) -> anyhow::Result<ImplementationRevision> {
        run_llm_function!(
            self.config.clone(),
            ImplementationRevision,
            prompts::IMPLEMENTER_RESOLVE.to_string(),
            input
        )
    }
}

#[async_trait]
impl ImplementationProducer for LlmImplementationProducer {
    async fn produce(
        &self,
        state: &SharedSessionState,
        max_steps: u32,
    ) -> EngineResult<ImplementationBundle> {
        let briefing = render_briefing(state);
        tracing::debug!(
            "Requesting implementation generation ({} chars)",
            briefing.len()
        );

        let mut last_error = String::new();
        for attempt in 1..=max_steps.max(1) {
            match self.generate(briefing.clone()).await {
                Ok(bundle) => return Ok(bundle),
                Err(e) => {
                    tracing::warn!("Implementation generation attempt {} failed: {}", attempt, e);
                    last_error = e.to_string();
                }
            }
        }
        Err(EngineError::Producer {
            role: "implementer".to_string(),
            reason: last_error,
        })
    }

    async fn resolve_conflicts(
        &self,
        state: &SharedSessionState,
        request: &ChangeRequest,
    ) -> EngineResult<ResolutionReport<ImplementationBundle>> {
        let mut input = render_briefing(state);
        input.push('\n');
        if let Some(implementation) = &state.implementation {
            input.push_str("## Current Implementation\n");
            match serde_json::to_string_pretty(implementation.content()) {
                Ok(json) => input.push_str(&json),
                Err(e) => tracing::warn!("Failed to render implementation for briefing: {}", e),
            }
            input.push('\n');
        }
        input.push_str(&render_change_request(state, request));

        let revision = self
            .revise(input)
            .await
            .map_err(|e| EngineError::Producer {
                role: "implementer".to_string(),
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
