//! # Conflict Model
//!
//! Typed records describing a disagreement between two produced artifacts.
//! Conflicts are emitted by the consistency checkers, stamped with the
//! negotiation iteration that detected them, and replaced wholesale each
//! round so stale findings can never linger past a resolution.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Category of disagreement between artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The design declares a component the implementation lacks
    MissingComponent,
    /// A required field, prop or callback is absent
    MissingField,
    /// The implementation's assumed data shape disagrees with the schema
    SchemaMismatch,
    /// The implementation reads data the source does not provide
    DataSourceMismatch,
    /// Same-named contract with incompatible types on each side
    TypeIncompatibility,
    /// A mandated domain/UX pattern is not honored
    PatternDeviation,
}

/// Severity of a conflict. Ordering matters: `High` sorts last so the
/// maximum over a list is the worst finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Which producer owns the artifact that must change to resolve the conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSource {
    Design,
    Implementation,
}

/// A detected disagreement between two artifacts
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Conflict {
    /// Stable identifier, derived from the kind and the subject
    pub id: String,
    pub kind: ConflictKind,
    pub severity: Severity,
    /// Artifact that should change to resolve this
    pub source: ConflictSource,
    /// Human-readable description of the disagreement
    pub description: String,
    /// Advisory fix for the owning producer
    pub suggested_resolution: String,
    /// Negotiation iteration that detected this conflict (0 = initial check)
    pub detected_at_iteration: u32,
    /// One-way flag: transitions false -> true, never back
    #[serde(default)]
    resolved: bool,
}

impl Conflict {
    pub fn new(
        id: impl Into<String>,
        kind: ConflictKind,
        severity: Severity,
        source: ConflictSource,
        description: impl Into<String>,
        suggested_resolution: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            severity,
            source,
            description: description.into(),
            suggested_resolution: suggested_resolution.into(),
            detected_at_iteration: 0,
            resolved: false,
        }
    }

    /// Stamp the negotiation iteration that detected this conflict
    pub fn at_iteration(mut self, iteration: u32) -> Self {
        self.detected_at_iteration = iteration;
        self
    }

    /// Mark the conflict resolved. The transition is one-way; calling this
    /// twice is harmless and there is no way to un-resolve.
    pub fn resolve(&mut self) {
        self.resolved = true;
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// Count conflicts at `High` severity
pub fn high_severity_count(conflicts: &[Conflict]) -> usize {
    conflicts
        .iter()
        .filter(|c| c.severity == Severity::High)
        .count()
}

/// Count conflicts by owning side: `(design, implementation)`
pub fn source_counts(conflicts: &[Conflict]) -> (usize, usize) {
    let design = conflicts
        .iter()
        .filter(|c| c.source == ConflictSource::Design)
        .count();
    (design, conflicts.len() - design)
}
