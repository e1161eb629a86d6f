//! # Producers
//!
//! The LLM-backed roles that author session artifacts: the design
//! producer, the implementation producer and the reasoning oracle.
//! Producers read the shared state and return artifacts or resolution
//! reports; they never write the state themselves, so version and gate
//! invariants stay enforced in one place.

pub mod designer;
pub mod implementer;
pub mod oracle;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::session::{ChangeRequest, DesignSpec, ImplementationBundle, SharedSessionState};

pub use designer::LlmDesignProducer;
pub use implementer::LlmImplementationProducer;
pub use oracle::LlmOracle;

// ============================================================================
// Resolution Reporting
// ============================================================================

/// What a producer did with a change request.
///
/// `revised` carries the full replacement artifact when the producer
/// changed anything. A report with `success` but zero `modifications`
/// means the producer looked and decided nothing needed to change; the
/// engine treats that as a no-op and does not bump the artifact version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionReport<T> {
    /// Whether the producer considers the request handled
    pub success: bool,
    /// Count of concrete modifications made (0 = artifact untouched)
    pub modifications: u32,
    /// Human-readable summary for the negotiation log
    pub summary: String,
    /// Replacement artifact, present only when something changed
    pub revised: Option<T>,
}

impl<T> ResolutionReport<T> {
    /// Report that nothing needed to change.
    pub fn unchanged(summary: impl Into<String>) -> Self {
        Self {
            success: true,
            modifications: 0,
            summary: summary.into(),
            revised: None,
        }
    }

    /// Report a successful revision.
    pub fn revised(modifications: u32, summary: impl Into<String>, artifact: T) -> Self {
        Self {
            success: true,
            modifications,
            summary: summary.into(),
            revised: Some(artifact),
        }
    }

    /// Report that the producer could not handle the request.
    pub fn failed(summary: impl Into<String>) -> Self {
        Self {
            success: false,
            modifications: 0,
            summary: summary.into(),
            revised: None,
        }
    }
}

// ============================================================================
// Producer Traits
// ============================================================================

/// Authors and revises the design specification.
#[async_trait]
pub trait DesignProducer: Send + Sync {
    /// Produce a design from the current session state. `max_steps`
    /// bounds the producer's internal generation/refinement loop.
    async fn produce(
        &self,
        state: &SharedSessionState,
        max_steps: u32,
    ) -> EngineResult<DesignSpec>;

    /// Resolve design-owned conflicts named by a change request.
    async fn resolve_conflicts(
        &self,
        state: &SharedSessionState,
        request: &ChangeRequest,
    ) -> EngineResult<ResolutionReport<DesignSpec>>;
}

/// Authors and revises the implementation bundle.
#[async_trait]
pub trait ImplementationProducer: Send + Sync {
    /// Produce an implementation from the current session state.
    /// `max_steps` bounds the producer's internal loop.
    async fn produce(
        &self,
        state: &SharedSessionState,
        max_steps: u32,
    ) -> EngineResult<ImplementationBundle>;

    /// Resolve implementation-owned conflicts named by a change request.
    async fn resolve_conflicts(
        &self,
        state: &SharedSessionState,
        request: &ChangeRequest,
    ) -> EngineResult<ResolutionReport<ImplementationBundle>>;
}

/// Free-form reasoning seam used by the planning loop.
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    /// Answer a reasoning prompt with plain text.
    async fn decide(&self, prompt: &str) -> EngineResult<String>;
}

// ============================================================================
// Knowledge Sourcing
// ============================================================================

/// Supplies the data schema and mandated patterns for a session.
///
/// The default implementation reads them out of the session context;
/// integrations can plug in a live catalog instead.
pub trait KnowledgeSource: Send + Sync {
    /// Discover the data schema available to the session, if any.
    fn discover_schema(&self, state: &SharedSessionState) -> Option<crate::session::DataSchema>;

    /// Retrieve the knowledge patterns the session must honor.
    fn retrieve_patterns(&self, state: &SharedSessionState) -> Vec<crate::session::KnowledgePattern>;
}

/// Reads schema and patterns from well-known context keys.
///
/// `data_schema` and `knowledge_patterns` entries are parsed as JSON;
/// malformed entries are logged and skipped rather than failing the run.
#[derive(Debug, Default, Clone)]
pub struct ContextKnowledge;

impl KnowledgeSource for ContextKnowledge {
    fn discover_schema(&self, state: &SharedSessionState) -> Option<crate::session::DataSchema> {
        let raw = state.context.get("data_schema")?;
        match serde_json::from_str(raw) {
            Ok(schema) => Some(schema),
            Err(e) => {
                tracing::warn!("Malformed data_schema in session context: {}", e);
                None
            }
        }
    }

    fn retrieve_patterns(&self, state: &SharedSessionState) -> Vec<crate::session::KnowledgePattern> {
        let Some(raw) = state.context.get("knowledge_patterns") else {
            return Vec::new();
        };
        match serde_json::from_str(raw) {
            Ok(patterns) => patterns,
            Err(e) => {
                tracing::warn!("Malformed knowledge_patterns in session context: {}", e);
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Prompt Assembly
// ============================================================================

/// Render the shared session state into the producer-facing briefing.
pub(crate) fn render_briefing(state: &SharedSessionState) -> String {
    let mut out = String::new();

    if !state.requirements.is_empty() {
        out.push_str("## Requirements\n");
        let mut keys: Vec<_> = state.requirements.keys().collect();
        keys.sort();
        for key in keys {
            out.push_str(&format!("- {}: {}\n", key, state.requirements[key]));
        }
    }

    if let Some(schema) = &state.data_schema {
        out.push_str(&format!("\n## Data Schema ({})\n", schema.source_id));
        for field in &schema.fields {
            out.push_str(&format!("- {} ({})\n", field.path, field.field_type));
        }
    }

    if !state.knowledge.is_empty() {
        out.push_str("\n## Knowledge Patterns\n");
        for pattern in &state.knowledge {
            let tag = if pattern.mandatory { "mandatory" } else { "advisory" };
            out.push_str(&format!("- [{}] {}: {}\n", tag, pattern.name, pattern.directive));
        }
    }

    if let Some(design) = &state.design {
        out.push_str("\n## Current Design\n");
        match serde_json::to_string_pretty(design.content()) {
            Ok(json) => out.push_str(&json),
            Err(e) => tracing::warn!("Failed to render design for briefing: {}", e),
        }
        out.push('\n');
    }

    out
}

/// Render a change request plus its conflicts for a resolve prompt.
pub(crate) fn render_change_request(
    state: &SharedSessionState,
    request: &ChangeRequest,
) -> String {
    let mut out = format!(
        "## Change Request ({:?} -> {:?}, priority {:?})\n{}\nSuggested action: {}\n",
        request.from_role,
        request.to_role,
        request.priority,
        request.description,
        request.suggested_action,
    );

    let owned: Vec<_> = state
        .conflicts
        .iter()
        .filter(|c| !c.is_resolved())
        .collect();
    if !owned.is_empty() {
        out.push_str("\n## Open Conflicts\n");
        for conflict in owned {
            out.push_str(&format!(
                "- [{:?}/{:?}] {} (suggested: {})\n",
                conflict.kind, conflict.severity, conflict.description, conflict.suggested_resolution,
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DataField, DataSchema};

    #[test]
    fn test_context_knowledge_parses_schema() {
        let mut state = SharedSessionState::new(Default::default(), Default::default());
        let schema = DataSchema {
            source_id: "crm".to_string(),
            fields: vec![DataField {
                path: "deals.items.amount".to_string(),
                field_type: "number".to_string(),
            }],
        };
        state.context.insert(
            "data_schema".to_string(),
            serde_json::to_string(&schema).unwrap(),
        );

        let found = ContextKnowledge.discover_schema(&state).unwrap();
        assert_eq!(found.source_id, "crm");
        assert_eq!(found.fields.len(), 1);
    }

    #[test]
    fn test_context_knowledge_tolerates_malformed_entries() {
        let mut state = SharedSessionState::new(Default::default(), Default::default());
        state
            .context
            .insert("data_schema".to_string(), "not json".to_string());
        state
            .context
            .insert("knowledge_patterns".to_string(), "{broken".to_string());

        assert!(ContextKnowledge.discover_schema(&state).is_none());
        assert!(ContextKnowledge.retrieve_patterns(&state).is_empty());
    }

    #[test]
    fn test_unchanged_report_has_no_artifact() {
        let report: ResolutionReport<DesignSpec> = ResolutionReport::unchanged("nothing to do");
        assert!(report.success);
        assert_eq!(report.modifications, 0);
        assert!(report.revised.is_none());
    }

    #[test]
    fn test_briefing_includes_schema_and_patterns() {
        let mut state = SharedSessionState::new(Default::default(), Default::default());
        state
            .requirements
            .insert("goal".to_string(), "pipeline board".to_string());
        state.data_schema = Some(DataSchema {
            source_id: "crm".to_string(),
            fields: vec![DataField {
                path: "deals.items.stage".to_string(),
                field_type: "string".to_string(),
            }],
        });

        let briefing = render_briefing(&state);
        assert!(briefing.contains("pipeline board"));
        assert!(briefing.contains("deals.items.stage"));
    }
}
