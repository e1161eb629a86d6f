//! # Engine Errors
//!
//! Explicit failure taxonomy. Failures cross the dispatch boundary as
//! values carrying an error kind, never as panics, and each kind has a
//! defined recovery: checker input errors collapse to zero conflicts,
//! skill errors are absorbed by the dispatcher, validation hard failures
//! discard the candidate, and plan-parse failures fall back to the
//! deterministic default plan. Convergence exhaustion is not an error at
//! all; it is a structured outcome the caller interprets.

use thiserror::Error;

use crate::validation::Gate;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed artifact handed to a checker. Recovered locally; the
    /// checker contributes zero conflicts for the round.
    #[error("checker input: {0}")]
    CheckerInput(String),

    /// A skill handler failed (including oracle/transport failures inside
    /// it). Recovered by the dispatcher and recorded to the session.
    #[error("skill '{skill}' failed: {reason}")]
    SkillExecution { skill: String, reason: String },

    /// A candidate artifact was rejected by a validation gate. The
    /// candidate is discarded whole; prior state stays untouched.
    #[error("validation hard failure at {gate} gate: {reason}")]
    Validation { gate: Gate, reason: String },

    /// The reasoning oracle could not be consulted.
    #[error("reasoning oracle: {0}")]
    Oracle(String),

    /// A producer's run/resolve entry point failed.
    #[error("{role} producer: {reason}")]
    Producer { role: String, reason: String },
}

impl From<crate::validation::GateFailure> for EngineError {
    fn from(failure: crate::validation::GateFailure) -> Self {
        EngineError::Validation {
            gate: failure.gate,
            reason: failure.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_context() {
        let e = EngineError::SkillExecution {
            skill: "generate_design".into(),
            reason: "provider unreachable".into(),
        };
        let text = e.to_string();
        assert!(text.contains("generate_design"));
        assert!(text.contains("provider unreachable"));
    }

    #[test]
    fn test_gate_failure_converts() {
        let failure = crate::validation::GateFailure {
            gate: Gate::ForbiddenContent,
            reason: "placeholder-assignment at line 3".into(),
        };
        let e = EngineError::from(failure);
        assert!(e.to_string().contains("forbidden-content"));
    }
}
