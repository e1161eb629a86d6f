//! # Validation Gates
//!
//! Pre-acceptance screens applied to a freshly produced implementation
//! candidate before it may overwrite the session's current artifact.
//!
//! Hard-failure semantics: the candidate is discarded entirely, the
//! session's existing artifact is left untouched, the failure reason goes
//! to the session error list, and the calling skill reports failure.

pub mod forbidden;
pub mod static_check;
pub mod structural;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::{DesignSpec, ImplementationBundle};
pub use forbidden::{default_rules, LexicalRule, RuleAction};
pub use static_check::StaticCheckConfig;

/// Which gate rejected a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    ForbiddenContent,
    Structural,
    StaticCheck,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gate::ForbiddenContent => "forbidden-content",
            Gate::Structural => "structural",
            Gate::StaticCheck => "static-check",
        };
        f.write_str(name)
    }
}

/// A hard gate rejection
#[derive(Debug, Clone)]
pub struct GateFailure {
    pub gate: Gate,
    pub reason: String,
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gate rejected candidate: {}", self.gate, self.reason)
    }
}

/// Gate configuration carried by the engine
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Ordered lexical rule table for the forbidden-content gate
    pub rules: Vec<LexicalRule>,
    /// External checker; `None` disables the static-check gate
    pub static_check: Option<StaticCheckConfig>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            static_check: None,
        }
    }
}

/// Run every gate against a candidate, in cost order: lexical scan first,
/// structural rules second, the external tool last.
pub async fn run_gates(
    candidate: &ImplementationBundle,
    design: Option<&DesignSpec>,
    config: &ValidationConfig,
) -> Result<(), GateFailure> {
    forbidden::check(candidate, &config.rules)?;
    structural::check(candidate, design)?;
    if let Some(static_config) = &config.static_check {
        static_check::check(&candidate.source, static_config).await?;
    }
    Ok(())
}
