//! # Mediator
//!
//! The negotiation brain: the convergence loop that drives conflict
//! counts down, the optional oracle-backed planning loop, and the engine
//! facade that runs a whole generation session end to end.

pub mod convergence;
pub mod engine;
pub mod planner;

pub use convergence::{ConvergenceOutcome, ConvergenceReason, Mediator, MediatorConfig};
pub use engine::{Engine, EngineConfig, GenerationReport};
pub use planner::{Plan, Planner, PlannerConfig};
