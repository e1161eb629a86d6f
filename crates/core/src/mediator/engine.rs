//! # Engine
//!
//! The facade that runs a full generation session: seed the shared
//! state, execute the skill sequence (fixed or oracle-planned), then
//! hand the session to the mediator's convergence loop and report the
//! result. The caller gets a final artifact only when the session
//! actually converged.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::checkers::{ConsistencySuite, StandardCheckers};
use crate::mediator::convergence::{ConvergenceOutcome, Mediator, MediatorConfig};
use crate::mediator::planner::{Planner, PlannerConfig};
use crate::producers::{DesignProducer, ImplementationProducer, KnowledgeSource, ReasoningOracle};
use crate::session::{ImplementationBundle, SharedSessionState, Versioned};
use crate::skills::{Skill, SkillDispatcher};
use crate::validation::ValidationConfig;

/// Skill order for a non-autonomous session.
const FIXED_SEQUENCE: [Skill; 6] = [
    Skill::DiscoverSources,
    Skill::RetrieveKnowledge,
    Skill::AssembleContext,
    Skill::GenerateDesign,
    Skill::GenerateImplementation,
    Skill::ValidateImplementation,
];

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// When set, the oracle plans the skill sequence instead of the
    /// fixed one
    pub autonomous: bool,
    /// Bound on a producer's internal generation attempts per call
    pub max_producer_steps: u32,
    pub mediator: MediatorConfig,
    pub planner: PlannerConfig,
    #[serde(skip)]
    pub validation: ValidationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autonomous: false,
            max_producer_steps: 3,
            mediator: MediatorConfig::default(),
            planner: PlannerConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

/// What a finished session hands back to the caller.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub session_id: String,
    /// The converged implementation; `None` when the session did not
    /// converge
    pub artifact: Option<Versioned<ImplementationBundle>>,
    pub outcome: ConvergenceOutcome,
    pub errors: Vec<String>,
    pub negotiation_log: Vec<String>,
}

/// Runs generation sessions end to end.
pub struct Engine {
    dispatcher: SkillDispatcher,
    oracle: Arc<dyn ReasoningOracle>,
    mediator: Mediator,
    planner: Planner,
    autonomous: bool,
}

impl Engine {
    pub fn new(
        designer: Arc<dyn DesignProducer>,
        implementer: Arc<dyn ImplementationProducer>,
        oracle: Arc<dyn ReasoningOracle>,
        knowledge: Arc<dyn KnowledgeSource>,
        config: EngineConfig,
    ) -> Self {
        let dispatcher = SkillDispatcher::new(
            designer,
            implementer,
            knowledge,
            Arc::new(StandardCheckers),
            config.validation.clone(),
        )
        .with_max_producer_steps(config.max_producer_steps);
        Self {
            dispatcher,
            oracle,
            mediator: Mediator::new(config.mediator),
            planner: Planner::new(config.planner),
            autonomous: config.autonomous,
        }
    }

    /// Swap in a different checker suite.
    pub fn with_suite(mut self, suite: Arc<dyn ConsistencySuite>) -> Self {
        self.dispatcher.suite = suite;
        self
    }

    /// Run one full generation session.
    pub async fn generate(
        &self,
        requirements: HashMap<String, String>,
        context: HashMap<String, String>,
    ) -> GenerationReport {
        let mut state = SharedSessionState::new(requirements, context);
        tracing::info!(
            "Starting generation session {} (autonomous={})",
            state.session_id,
            self.autonomous
        );

        if self.autonomous {
            let steps = self
                .planner
                .run(self.oracle.as_ref(), &self.dispatcher, &mut state)
                .await;
            tracing::debug!("Planning loop executed {} steps", steps);
        } else {
            for skill in FIXED_SEQUENCE {
                let outcome = self
                    .dispatcher
                    .dispatch(&mut state, skill, &serde_json::Value::Null)
                    .await;
                if !outcome.success {
                    tracing::warn!(
                        "Fixed-sequence skill '{}' failed: {}",
                        skill.name(),
                        outcome.error.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }

        let outcome = self.mediator.converge(&self.dispatcher, &mut state).await;
        tracing::info!(
            "Session {} finished: converged={} reason={:?} after {} rounds",
            state.session_id,
            outcome.converged,
            outcome.reason,
            outcome.iterations
        );

        let artifact = if outcome.converged {
            state.implementation.take()
        } else {
            None
        };

        GenerationReport {
            session_id: state.session_id,
            artifact,
            outcome,
            errors: state.errors,
            negotiation_log: state.negotiation_log,
        }
    }
}
