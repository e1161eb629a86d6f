//! # Skill Handlers
//!
//! One handler per catalog entry. Handlers are the only code that writes
//! artifacts into the session state, so the version and gate invariants
//! live here: a candidate bundle passes every gate before it overwrites
//! the previous one, and a version only moves when a producer reported a
//! real modification.

use serde_json::json;

use crate::error::{EngineError, EngineResult};
use crate::producers::ResolutionReport;
use crate::session::{
    high_severity_count, ChangeRequest, Conflict, ConflictSource, Role, Severity,
    SharedSessionState, Versioned,
};
use crate::skills::{Skill, SkillDispatcher, SkillOutcome};
use crate::validation::run_gates;

/// Negotiation iteration carried in the skill arguments, 0 when absent.
fn iteration_arg(args: &serde_json::Value) -> u32 {
    args.get("iteration")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32
}

pub(crate) async fn execute(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
    skill: Skill,
    args: &serde_json::Value,
) -> EngineResult<SkillOutcome> {
    match skill {
        Skill::DiscoverSources => discover_sources(d, state),
        Skill::RetrieveKnowledge => retrieve_knowledge(d, state),
        Skill::AssembleContext => assemble_context(state),
        Skill::GenerateDesign | Skill::RefineDesign => generate_design(d, state).await,
        Skill::GenerateImplementation | Skill::RegenerateImplementation => {
            generate_implementation(d, state).await
        }
        Skill::ResolveDesignConflicts => {
            resolve_design_conflicts(d, state, iteration_arg(args)).await
        }
        Skill::ResolveImplementationConflicts => {
            resolve_implementation_conflicts(d, state, iteration_arg(args)).await
        }
        Skill::ValidateImplementation => validate_implementation(d, state, iteration_arg(args)),
        Skill::EvaluateProgress => evaluate_progress(d, state, iteration_arg(args)),
        Skill::Finish => finish(state),
    }
}

// ============================================================================
// Context Skills
// ============================================================================

fn discover_sources(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
) -> EngineResult<SkillOutcome> {
    match d.knowledge.discover_schema(state) {
        Some(schema) => {
            let fields = schema.fields.len();
            state.log(format!(
                "Discovered data schema '{}' with {} fields",
                schema.source_id, fields
            ));
            state.data_schema = Some(schema);
            Ok(SkillOutcome::ok_with(json!({ "fields": fields })))
        }
        None => {
            state.log("No data schema discovered; schema checks will be skipped");
            Ok(SkillOutcome::ok_with(json!({ "fields": 0 })))
        }
    }
}

fn retrieve_knowledge(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
) -> EngineResult<SkillOutcome> {
    let patterns = d.knowledge.retrieve_patterns(state);
    state.log(format!("Retrieved {} knowledge patterns", patterns.len()));
    let count = patterns.len();
    state.knowledge = patterns;
    Ok(SkillOutcome::ok_with(json!({ "patterns": count })))
}

fn assemble_context(state: &mut SharedSessionState) -> EngineResult<SkillOutcome> {
    let summary = format!(
        "requirements={} schema_fields={} patterns={}",
        state.requirements.len(),
        state
            .data_schema
            .as_ref()
            .map(|s| s.fields.len())
            .unwrap_or(0),
        state.knowledge.len(),
    );
    state
        .context
        .insert("context_summary".to_string(), summary.clone());
    state.log(format!("Assembled session context: {}", summary));
    Ok(SkillOutcome::ok())
}

// ============================================================================
// Generation Skills
// ============================================================================

async fn generate_design(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
) -> EngineResult<SkillOutcome> {
    let spec = d.designer.produce(state, d.max_producer_steps).await?;
    let components = spec.components.len();
    match &mut state.design {
        Some(existing) => existing.replace(spec),
        None => state.design = Some(Versioned::new(spec)),
    }
    let version = state.design.as_ref().map(|v| v.version()).unwrap_or(0);
    state.log(format!(
        "Design produced: {} components (v{})",
        components, version
    ));
    Ok(SkillOutcome::ok_with(
        json!({ "components": components, "version": version }),
    ))
}

async fn generate_implementation(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
) -> EngineResult<SkillOutcome> {
    let candidate = d.implementer.produce(state, d.max_producer_steps).await?;

    // Gates run against the candidate before it can touch the session.
    // A hard failure discards it whole; the prior bundle stays current.
    let design = state.design.as_ref().map(|v| v.content());
    run_gates(&candidate, design, &d.validation).await?;

    let components = candidate.components.len();
    match &mut state.implementation {
        Some(existing) => existing.replace(candidate),
        None => state.implementation = Some(Versioned::new(candidate)),
    }
    state.implementation_validated = false;
    let version = state
        .implementation
        .as_ref()
        .map(|v| v.version())
        .unwrap_or(0);
    state.log(format!(
        "Implementation produced: {} components (v{})",
        components, version
    ));
    Ok(SkillOutcome::ok_with(
        json!({ "components": components, "version": version }),
    ))
}

// ============================================================================
// Resolution Skills
// ============================================================================

/// Latest pending change request addressed to `role`, if the mediator
/// issued one; otherwise a request synthesized from the open conflicts
/// the role owns.
fn request_for(
    state: &SharedSessionState,
    role: Role,
    side: ConflictSource,
    iteration: u32,
) -> Option<ChangeRequest> {
    if let Some(request) = state
        .change_requests
        .iter()
        .rev()
        .find(|r| r.to_role == role)
    {
        return Some(request.clone());
    }

    let owned: Vec<&Conflict> = state
        .conflicts
        .iter()
        .filter(|c| !c.is_resolved() && c.source == side)
        .collect();
    if owned.is_empty() {
        return None;
    }

    let priority = owned
        .iter()
        .map(|c| c.severity)
        .max()
        .unwrap_or(Severity::Low);
    let description = format!(
        "Resolve {} open conflicts: {}",
        owned.len(),
        owned
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let suggested_action = owned
        .iter()
        .map(|c| c.suggested_resolution.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    Some(ChangeRequest {
        from_role: Role::Mediator,
        to_role: role,
        description,
        suggested_action,
        priority,
        created_at_iteration: iteration,
    })
}

async fn resolve_design_conflicts(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
    iteration: u32,
) -> EngineResult<SkillOutcome> {
    let Some(request) = request_for(state, Role::Designer, ConflictSource::Design, iteration)
    else {
        state.log("No design-owned conflicts to resolve");
        return Ok(SkillOutcome::ok_with(json!({ "modifications": 0 })));
    };

    let report = d.designer.resolve_conflicts(state, &request).await?;
    apply_design_report(state, report)
}

async fn resolve_implementation_conflicts(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
    iteration: u32,
) -> EngineResult<SkillOutcome> {
    let Some(request) = request_for(
        state,
        Role::Implementer,
        ConflictSource::Implementation,
        iteration,
    ) else {
        state.log("No implementation-owned conflicts to resolve");
        return Ok(SkillOutcome::ok_with(json!({ "modifications": 0 })));
    };

    let report = d.implementer.resolve_conflicts(state, &request).await?;

    // Gate the revised bundle before it can replace the current one.
    if let Some(revised) = &report.revised {
        let design = state.design.as_ref().map(|v| v.content());
        run_gates(revised, design, &d.validation).await?;
    }

    apply_implementation_report(state, report)
}

pub(crate) fn apply_design_report(
    state: &mut SharedSessionState,
    report: ResolutionReport<crate::session::DesignSpec>,
) -> EngineResult<SkillOutcome> {
    state.log(format!("Designer resolution: {}", report.summary));
    if !report.success {
        state.record_error(format!("Designer could not resolve: {}", report.summary));
        return Ok(SkillOutcome::fail(report.summary));
    }

    let modifications = report.modifications;
    if modifications >= 1 {
        if let Some(revised) = report.revised {
            match &mut state.design {
                Some(existing) => existing.replace(revised),
                None => state.design = Some(Versioned::new(revised)),
            }
            state.iterations_since_last_change = 0;
        } else {
            tracing::warn!(
                "Designer reported {} modifications but returned no artifact",
                modifications
            );
        }
    }
    Ok(SkillOutcome::ok_with(
        json!({ "modifications": modifications }),
    ))
}

pub(crate) fn apply_implementation_report(
    state: &mut SharedSessionState,
    report: ResolutionReport<crate::session::ImplementationBundle>,
) -> EngineResult<SkillOutcome> {
    state.log(format!("Implementer resolution: {}", report.summary));
    if !report.success {
        state.record_error(format!("Implementer could not resolve: {}", report.summary));
        return Ok(SkillOutcome::fail(report.summary));
    }

    let modifications = report.modifications;
    if modifications >= 1 {
        if let Some(revised) = report.revised {
            match &mut state.implementation {
                Some(existing) => existing.replace(revised),
                None => state.implementation = Some(Versioned::new(revised)),
            }
            state.implementation_validated = false;
            state.iterations_since_last_change = 0;
        } else {
            tracing::warn!(
                "Implementer reported {} modifications but returned no artifact",
                modifications
            );
        }
    }
    Ok(SkillOutcome::ok_with(
        json!({ "modifications": modifications }),
    ))
}

// ============================================================================
// Assessment Skills
// ============================================================================

fn validate_implementation(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
    iteration: u32,
) -> EngineResult<SkillOutcome> {
    if state.implementation.is_none() {
        return Err(EngineError::SkillExecution {
            skill: Skill::ValidateImplementation.name().to_string(),
            reason: "no implementation to validate".to_string(),
        });
    }

    let conflicts: Vec<Conflict> = d
        .suite
        .run(state)
        .into_iter()
        .map(|c| c.at_iteration(iteration))
        .collect();
    let total = conflicts.len();
    let high = high_severity_count(&conflicts);
    state.replace_conflicts(conflicts);
    state.implementation_validated = high == 0;
    state.log(format!(
        "Validation: {} conflicts ({} high severity)",
        total, high
    ));
    Ok(SkillOutcome::ok_with(
        json!({ "conflicts": total, "high": high }),
    ))
}

fn evaluate_progress(
    d: &SkillDispatcher,
    state: &mut SharedSessionState,
    iteration: u32,
) -> EngineResult<SkillOutcome> {
    let conflicts: Vec<Conflict> = d
        .suite
        .run(state)
        .into_iter()
        .map(|c| c.at_iteration(iteration))
        .collect();
    let total = conflicts.len();
    let high = high_severity_count(&conflicts);
    state.replace_conflicts(conflicts);
    state.log(format!(
        "Progress: design={} implementation={} conflicts={} high={}",
        state.design.is_some(),
        state.implementation.is_some(),
        total,
        high
    ));
    Ok(SkillOutcome::ok_with(json!({
        "has_design": state.design.is_some(),
        "has_implementation": state.implementation.is_some(),
        "conflicts": total,
        "high": high,
    })))
}

fn finish(state: &mut SharedSessionState) -> EngineResult<SkillOutcome> {
    if state.implementation.is_none() {
        return Err(EngineError::SkillExecution {
            skill: Skill::Finish.name().to_string(),
            reason: "cannot finish without an implementation".to_string(),
        });
    }
    if !state.implementation_validated {
        return Err(EngineError::SkillExecution {
            skill: Skill::Finish.name().to_string(),
            reason: "implementation has not passed validation".to_string(),
        });
    }
    state.goal_achieved = true;
    state.log("Session goal achieved");
    Ok(SkillOutcome::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::StandardCheckers;
    use crate::producers::ContextKnowledge;
    use crate::session::{ConflictKind, ImplComponent, ImplementationBundle};
    use crate::testing::{ScriptedDesigner, ScriptedImplementer};
    use crate::validation::ValidationConfig;
    use std::sync::Arc;

    fn state() -> SharedSessionState {
        SharedSessionState::new(Default::default(), Default::default())
    }

    fn dispatcher_with(
        designer: ScriptedDesigner,
        implementer: ScriptedImplementer,
    ) -> SkillDispatcher {
        SkillDispatcher::new(
            Arc::new(designer),
            Arc::new(implementer),
            Arc::new(ContextKnowledge),
            Arc::new(StandardCheckers),
            ValidationConfig::default(),
        )
    }

    fn clean_bundle() -> ImplementationBundle {
        ImplementationBundle {
            components: vec![ImplComponent {
                name: "Board".into(),
                props: vec![],
                callbacks: vec![],
                data_paths: vec![],
            }],
            endpoints: vec![],
            source: "export const stages = [\"todo\", \"done\"];".into(),
        }
    }

    #[tokio::test]
    async fn test_generate_implementation_gated_candidate_is_discarded() {
        let mut bad = clean_bundle();
        bad.source = "const mockData = [1, 2, 3];".into();
        let d = dispatcher_with(
            ScriptedDesigner::default(),
            ScriptedImplementer::producing(vec![bad]),
        );
        let mut s = state();

        let outcome = d
            .dispatch(&mut s, Skill::GenerateImplementation, &serde_json::Value::Null)
            .await;

        assert!(!outcome.success);
        assert!(s.implementation.is_none());
        assert_eq!(s.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_implementation_clean_candidate_lands_at_v1() {
        let d = dispatcher_with(
            ScriptedDesigner::default(),
            ScriptedImplementer::producing(vec![clean_bundle()]),
        );
        let mut s = state();

        let outcome = d
            .dispatch(&mut s, Skill::GenerateImplementation, &serde_json::Value::Null)
            .await;

        assert!(outcome.success);
        assert_eq!(s.implementation.as_ref().map(|v| v.version()), Some(1));
    }

    #[tokio::test]
    async fn test_noop_resolution_does_not_bump_version() {
        let d = dispatcher_with(
            ScriptedDesigner::default(),
            ScriptedImplementer::resolving(vec![ResolutionReport::unchanged("nothing to change")]),
        );
        let mut s = state();
        s.implementation = Some(Versioned::new(clean_bundle()));
        s.replace_conflicts(vec![Conflict::new(
            "impl/x",
            ConflictKind::MissingField,
            Severity::Medium,
            ConflictSource::Implementation,
            "missing prop",
            "add the prop",
        )]);

        let outcome = d
            .dispatch(
                &mut s,
                Skill::ResolveImplementationConflicts,
                &serde_json::Value::Null,
            )
            .await;

        assert!(outcome.success);
        assert_eq!(s.implementation.as_ref().map(|v| v.version()), Some(1));
    }

    #[tokio::test]
    async fn test_real_resolution_bumps_version_by_exactly_one() {
        let revised = clean_bundle();
        let d = dispatcher_with(
            ScriptedDesigner::default(),
            ScriptedImplementer::resolving(vec![ResolutionReport::revised(
                2,
                "added the missing prop",
                revised,
            )]),
        );
        let mut s = state();
        s.implementation = Some(Versioned::new(clean_bundle()));
        s.replace_conflicts(vec![Conflict::new(
            "impl/x",
            ConflictKind::MissingField,
            Severity::Medium,
            ConflictSource::Implementation,
            "missing prop",
            "add the prop",
        )]);

        let outcome = d
            .dispatch(
                &mut s,
                Skill::ResolveImplementationConflicts,
                &serde_json::Value::Null,
            )
            .await;

        assert!(outcome.success);
        assert_eq!(s.implementation.as_ref().map(|v| v.version()), Some(2));
        assert_eq!(s.iterations_since_last_change, 0);
    }

    #[tokio::test]
    async fn test_gated_resolution_keeps_prior_bundle() {
        let mut bad = clean_bundle();
        bad.source = "const fakeUsers = [];".into();
        let d = dispatcher_with(
            ScriptedDesigner::default(),
            ScriptedImplementer::resolving(vec![ResolutionReport::revised(
                1,
                "rewrote the data layer",
                bad,
            )]),
        );
        let mut s = state();
        s.implementation = Some(Versioned::new(clean_bundle()));
        s.replace_conflicts(vec![Conflict::new(
            "impl/x",
            ConflictKind::SchemaMismatch,
            Severity::High,
            ConflictSource::Implementation,
            "wrong path",
            "use the declared path",
        )]);

        let outcome = d
            .dispatch(
                &mut s,
                Skill::ResolveImplementationConflicts,
                &serde_json::Value::Null,
            )
            .await;

        assert!(!outcome.success);
        assert_eq!(s.implementation.as_ref().map(|v| v.version()), Some(1));
        assert_eq!(
            s.implementation.as_ref().map(|v| v.content().source.clone()),
            Some("export const stages = [\"todo\", \"done\"];".to_string())
        );
    }

    #[tokio::test]
    async fn test_finish_requires_validated_implementation() {
        let d = dispatcher_with(ScriptedDesigner::default(), ScriptedImplementer::default());
        let mut s = state();

        let outcome = d
            .dispatch(&mut s, Skill::Finish, &serde_json::Value::Null)
            .await;
        assert!(!outcome.success);
        assert!(!s.goal_achieved);

        s.implementation = Some(Versioned::new(clean_bundle()));
        s.implementation_validated = true;
        let outcome = d
            .dispatch(&mut s, Skill::Finish, &serde_json::Value::Null)
            .await;
        assert!(outcome.success);
        assert!(s.goal_achieved);
    }

    #[tokio::test]
    async fn test_validate_stamps_iteration_and_sets_flag() {
        let d = dispatcher_with(ScriptedDesigner::default(), ScriptedImplementer::default());
        let mut s = state();
        s.implementation = Some(Versioned::new(clean_bundle()));

        let outcome = d
            .dispatch(
                &mut s,
                Skill::ValidateImplementation,
                &serde_json::json!({ "iteration": 2 }),
            )
            .await;

        assert!(outcome.success);
        assert!(s.implementation_validated);
    }
}
