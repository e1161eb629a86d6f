//! # Concord Core
//!
//! An orchestration and convergence engine for multi-producer artifact
//! generation. A session negotiates a design spec and an implementation
//! bundle over a shared state bus: consistency checkers surface typed
//! conflicts, validation gates keep unacceptable candidates out of the
//! session, and the mediator drives targeted resolution rounds until
//! the artifacts agree or the loop is exhausted.

pub mod checkers;
pub mod error;
pub mod llm;
pub mod mediator;
pub mod models;
pub mod producers;
pub mod prompts;
pub mod session;
pub mod skills;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use checkers::{ConsistencySuite, StandardCheckers};
pub use error::{EngineError, EngineResult};
pub use mediator::{
    ConvergenceOutcome, ConvergenceReason, Engine, EngineConfig, GenerationReport, Mediator,
    MediatorConfig, Plan, Planner, PlannerConfig,
};
pub use models::{LlmProvider, ModelConfig};
pub use producers::{
    ContextKnowledge, DesignProducer, ImplementationProducer, KnowledgeSource, LlmDesignProducer,
    LlmImplementationProducer, LlmOracle, ReasoningOracle, ResolutionReport,
};
pub use session::{
    Conflict, ConflictKind, ConflictSource, DataSchema, DesignSpec, ImplementationBundle,
    KnowledgePattern, Severity, SharedSessionState, Versioned,
};
pub use skills::{Skill, SkillDispatcher, SkillOutcome};
pub use validation::{Gate, GateFailure, ValidationConfig};
