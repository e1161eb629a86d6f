//! # Skills
//!
//! The catalog of operations the engine can perform on a session, and
//! the dispatcher that runs them behind a uniform failure boundary.

pub mod dispatcher;
pub mod handlers;

use serde::{Deserialize, Serialize};

pub use dispatcher::SkillDispatcher;

// ============================================================================
// Skill Catalog
// ============================================================================

/// Every operation the engine can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    DiscoverSources,
    RetrieveKnowledge,
    AssembleContext,
    GenerateDesign,
    RefineDesign,
    GenerateImplementation,
    RegenerateImplementation,
    ResolveDesignConflicts,
    ResolveImplementationConflicts,
    ValidateImplementation,
    EvaluateProgress,
    Finish,
}

impl Skill {
    /// Stable wire name, used by the planner protocol.
    pub fn name(&self) -> &'static str {
        match self {
            Skill::DiscoverSources => "discover_sources",
            Skill::RetrieveKnowledge => "retrieve_knowledge",
            Skill::AssembleContext => "assemble_context",
            Skill::GenerateDesign => "generate_design",
            Skill::RefineDesign => "refine_design",
            Skill::GenerateImplementation => "generate_implementation",
            Skill::RegenerateImplementation => "regenerate_implementation",
            Skill::ResolveDesignConflicts => "resolve_design_conflicts",
            Skill::ResolveImplementationConflicts => "resolve_implementation_conflicts",
            Skill::ValidateImplementation => "validate_implementation",
            Skill::EvaluateProgress => "evaluate_progress",
            Skill::Finish => "finish",
        }
    }

    /// Reverse of [`Skill::name`]. Unknown names return `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.name() == name)
    }

    /// One-line description surfaced to the planner.
    pub fn description(&self) -> &'static str {
        match self {
            Skill::DiscoverSources => "Discover the data schema available to the session",
            Skill::RetrieveKnowledge => "Retrieve the knowledge patterns the session must honor",
            Skill::AssembleContext => "Fold discovered schema and patterns into the shared state",
            Skill::GenerateDesign => "Generate the design specification from requirements",
            Skill::RefineDesign => "Regenerate the design with the current session context",
            Skill::GenerateImplementation => "Generate the implementation bundle from the design",
            Skill::RegenerateImplementation => "Regenerate the implementation bundle from scratch",
            Skill::ResolveDesignConflicts => "Ask the design producer to fix design-owned conflicts",
            Skill::ResolveImplementationConflicts => {
                "Ask the implementation producer to fix implementation-owned conflicts"
            }
            Skill::ValidateImplementation => "Run consistency checkers over the current artifacts",
            Skill::EvaluateProgress => "Re-check conflicts and summarize where the session stands",
            Skill::Finish => "Declare the session goal achieved",
        }
    }

    /// The full catalog, in the order a fresh session would use them.
    pub fn all() -> &'static [Skill] {
        &[
            Skill::DiscoverSources,
            Skill::RetrieveKnowledge,
            Skill::AssembleContext,
            Skill::GenerateDesign,
            Skill::RefineDesign,
            Skill::GenerateImplementation,
            Skill::RegenerateImplementation,
            Skill::ResolveDesignConflicts,
            Skill::ResolveImplementationConflicts,
            Skill::ValidateImplementation,
            Skill::EvaluateProgress,
            Skill::Finish,
        ]
    }

    /// Render the catalog for a planner prompt.
    pub fn catalog() -> String {
        Self::all()
            .iter()
            .map(|s| format!("- {}: {}", s.name(), s.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// Skill Outcomes
// ============================================================================

/// Uniform result of dispatching a skill.
///
/// Skill failures are session events, not process failures: the
/// dispatcher records them on the state and the loop keeps running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillOutcome {
    pub success: bool,
    /// Failure reason, present iff `success` is false
    pub error: Option<String>,
    /// Optional structured payload for the caller
    pub data: Option<serde_json::Value>,
}

impl SkillOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    pub fn ok_with(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_parse_round_trip() {
        for skill in Skill::all() {
            assert_eq!(Skill::parse(skill.name()), Some(*skill));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!(Skill::parse("summon_demon"), None);
        assert_eq!(Skill::parse(""), None);
    }

    #[test]
    fn test_catalog_lists_every_skill() {
        let catalog = Skill::catalog();
        for skill in Skill::all() {
            assert!(catalog.contains(skill.name()));
        }
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Skill::GenerateDesign).unwrap();
        assert_eq!(json, "\"generate_design\"");
        let back: Skill = serde_json::from_str("\"resolve_implementation_conflicts\"").unwrap();
        assert_eq!(back, Skill::ResolveImplementationConflicts);
    }
}
