//! # Reasoning Oracle
//!
//! LLM-backed free-form reasoning seam. The planning loop feeds it a
//! session snapshot and expects a single JSON decision back, but the
//! oracle itself is just prompt-in, text-out.

use async_trait::async_trait;
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::ModelConfig;
use crate::producers::ReasoningOracle;
use crate::prompts;
use crate::run_llm_function;

/// Wrapper so the provider returns structured text we can unwrap.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct OracleReply {
    /// The oracle's full textual reply
    pub reply: String,
}

/// Reasoning oracle that talks to a configured LLM provider.
pub struct LlmOracle {
    config: ModelConfig,
}

impl LlmOracle {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    async fn ask(&self, prompt: String) -> anyhow::Result<OracleReply> {
        run_llm_function!(
            self.config.clone(),
            OracleReply,
            prompts::PLANNER.to_string(),
            prompt
        )
    }
}

#[async_trait]
impl ReasoningOracle for LlmOracle {
    async fn decide(&self, prompt: &str) -> EngineResult<String> {
        tracing::debug!("Consulting reasoning oracle ({} chars)", prompt.len());
        let reply = self
            .ask(prompt.to_string())
            .await
            .map_err(|e| EngineError::Oracle(e.to_string()))?;
        Ok(reply.reply)
    }
}
