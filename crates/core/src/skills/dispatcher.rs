//! # Skill Dispatcher
//!
//! Runs skills behind a uniform failure boundary: every dispatch is
//! recorded in the action history, and a failing skill becomes a
//! recorded session error plus a failed outcome instead of tearing the
//! loop down.

use std::sync::Arc;

use crate::checkers::ConsistencySuite;
use crate::producers::{DesignProducer, ImplementationProducer, KnowledgeSource};
use crate::session::SharedSessionState;
use crate::skills::{handlers, Skill, SkillOutcome};
use crate::validation::ValidationConfig;

/// Shared handles the skill handlers execute against.
pub struct SkillDispatcher {
    pub(crate) designer: Arc<dyn DesignProducer>,
    pub(crate) implementer: Arc<dyn ImplementationProducer>,
    pub(crate) knowledge: Arc<dyn KnowledgeSource>,
    pub(crate) suite: Arc<dyn ConsistencySuite>,
    pub(crate) validation: ValidationConfig,
    /// Bound handed to producers' internal generation loops
    pub(crate) max_producer_steps: u32,
}

impl SkillDispatcher {
    pub fn new(
        designer: Arc<dyn DesignProducer>,
        implementer: Arc<dyn ImplementationProducer>,
        knowledge: Arc<dyn KnowledgeSource>,
        suite: Arc<dyn ConsistencySuite>,
        validation: ValidationConfig,
    ) -> Self {
        Self {
            designer,
            implementer,
            knowledge,
            suite,
            validation,
            max_producer_steps: 3,
        }
    }

    pub fn with_max_producer_steps(mut self, max_steps: u32) -> Self {
        self.max_producer_steps = max_steps;
        self
    }

    /// Dispatch a skill against the session state.
    ///
    /// Never returns an error: handler failures are recorded on the
    /// state and surfaced as a failed [`SkillOutcome`].
    pub async fn dispatch(
        &self,
        state: &mut SharedSessionState,
        skill: Skill,
        args: &serde_json::Value,
    ) -> SkillOutcome {
        tracing::debug!("Dispatching skill '{}'", skill.name());
        let outcome = match handlers::execute(self, state, skill, args).await {
            Ok(outcome) => outcome,
            Err(e) => {
                state.record_error(format!("Skill '{}' failed: {}", skill.name(), e));
                SkillOutcome::fail(e.to_string())
            }
        };
        state.record_action(skill.name());
        outcome
    }

    /// Dispatch by wire name. An unknown name is a recoverable session
    /// error, not a panic; the planner sees the failure and replans.
    pub async fn dispatch_named(
        &self,
        state: &mut SharedSessionState,
        name: &str,
        args: &serde_json::Value,
    ) -> SkillOutcome {
        match Skill::parse(name) {
            Some(skill) => self.dispatch(state, skill, args).await,
            None => {
                let reason = format!("Unknown skill '{}'", name);
                state.record_error(reason.clone());
                state.record_action(name);
                SkillOutcome::fail(reason)
            }
        }
    }
}
