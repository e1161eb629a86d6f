//! # Convergence Loop
//!
//! The mediator's negotiation rounds. Each round targets the producer
//! owning the larger conflict bucket with an advisory change request,
//! lets it resolve, then re-measures. The loop ends with a structured
//! outcome; running out of iterations is a result, not an error.

use serde::{Deserialize, Serialize};

use crate::session::{
    high_severity_count, source_counts, ChangeRequest, Role, Severity, SharedSessionState,
};
use crate::skills::{Skill, SkillDispatcher};

/// Thresholds governing when the mediator stops negotiating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediatorConfig {
    /// Hard cap on resolution rounds
    pub max_iterations: u32,
    /// Consecutive rounds with an unchanged conflict count before
    /// declaring stalemate
    pub stalemate_rounds: u32,
    /// Residual conflict count still considered acceptable when none
    /// of the residue is high severity
    pub acceptable_total: usize,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            stalemate_rounds: 2,
            acceptable_total: 3,
        }
    }
}

/// Why the convergence loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceReason {
    /// Every conflict resolved
    NoConflicts,
    /// A small, low-stakes residue remains
    AcceptableQuality,
    /// Rounds stopped changing anything
    Stalemate,
    /// The iteration cap was reached with conflicts outstanding
    MaxIterations,
}

/// Structured result of a convergence run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceOutcome {
    pub converged: bool,
    pub reason: ConvergenceReason,
    /// Resolution rounds actually executed
    pub iterations: u32,
    pub final_conflict_count: usize,
}

/// Runs the negotiation rounds over a session.
#[derive(Debug, Clone, Default)]
pub struct Mediator {
    config: MediatorConfig,
}

impl Mediator {
    pub fn new(config: MediatorConfig) -> Self {
        Self { config }
    }

    /// Drive the session toward consistency.
    ///
    /// Performs an initial measurement, then up to `max_iterations`
    /// rounds of targeted resolution. The conflict list is replaced
    /// wholesale after every measurement so resolved findings never
    /// linger.
    pub async fn converge(
        &self,
        d: &SkillDispatcher,
        state: &mut SharedSessionState,
    ) -> ConvergenceOutcome {
        let initial = d.suite.run(state);
        state.log(format!(
            "Mediator: initial check found {} conflicts",
            initial.len()
        ));
        state.replace_conflicts(initial);

        let mut stagnant_rounds = 0u32;
        for iteration in 1..=self.config.max_iterations {
            let total = state.conflicts.len();
            let high = high_severity_count(&state.conflicts);

            if total == 0 {
                state.consecutive_agreements += 1;
                state.log("Mediator: no conflicts remain, converged");
                return self.outcome(true, ConvergenceReason::NoConflicts, iteration, 0);
            }
            if high == 0 && total <= self.config.acceptable_total {
                state.log(format!(
                    "Mediator: {} low-stakes conflicts remain, accepting",
                    total
                ));
                return self.outcome(true, ConvergenceReason::AcceptableQuality, iteration, total);
            }

            let (skill, request) = self.plan_round(state, iteration);
            state.log(format!(
                "Mediator round {}: {} conflicts ({} high), requesting {:?}",
                iteration, total, high, request.to_role
            ));
            state.change_requests.push(request);

            state.iterations_since_last_change += 1;
            let args = serde_json::json!({ "iteration": iteration });
            let outcome = d.dispatch(state, skill, &args).await;
            if !outcome.success {
                tracing::warn!(
                    "Resolution round {} failed: {}",
                    iteration,
                    outcome.error.as_deref().unwrap_or("unknown")
                );
            }

            let refreshed: Vec<_> = d
                .suite
                .run(state)
                .into_iter()
                .map(|c| c.at_iteration(iteration))
                .collect();
            let new_total = refreshed.len();
            state.replace_conflicts(refreshed);
            if new_total == 0 {
                state.consecutive_agreements += 1;
            } else {
                state.consecutive_agreements = 0;
            }

            if new_total == total {
                stagnant_rounds += 1;
            } else {
                stagnant_rounds = 0;
            }
            if stagnant_rounds >= self.config.stalemate_rounds {
                state.log(format!(
                    "Mediator: conflict count stuck at {} for {} rounds, stalemate",
                    new_total, stagnant_rounds
                ));
                return self.outcome(false, ConvergenceReason::Stalemate, iteration, new_total);
            }
        }

        // The cap landed mid-negotiation; classify whatever the last
        // measurement left behind.
        let remaining = state.conflicts.len();
        let high = high_severity_count(&state.conflicts);
        if remaining == 0 {
            state.log("Mediator: no conflicts remain, converged");
            return self.outcome(
                true,
                ConvergenceReason::NoConflicts,
                self.config.max_iterations,
                0,
            );
        }
        if high == 0 && remaining <= self.config.acceptable_total {
            state.log(format!(
                "Mediator: {} low-stakes conflicts remain, accepting",
                remaining
            ));
            return self.outcome(
                true,
                ConvergenceReason::AcceptableQuality,
                self.config.max_iterations,
                remaining,
            );
        }
        state.log(format!(
            "Mediator: iteration cap reached with {} conflicts outstanding",
            remaining
        ));
        self.outcome(
            false,
            ConvergenceReason::MaxIterations,
            self.config.max_iterations,
            remaining,
        )
    }

    /// Pick the round's target: the side owning more open conflicts,
    /// with the implementation side taking ties (it is the cheaper
    /// artifact to revise).
    fn plan_round(
        &self,
        state: &SharedSessionState,
        iteration: u32,
    ) -> (Skill, ChangeRequest) {
        let (design_count, impl_count) = source_counts(&state.conflicts);
        let priority = state
            .conflicts
            .iter()
            .map(|c| c.severity)
            .max()
            .unwrap_or(Severity::Low);

        if impl_count >= design_count {
            let request = ChangeRequest {
                from_role: Role::Mediator,
                to_role: Role::Implementer,
                description: format!(
                    "Resolve the {} implementation-owned conflicts",
                    impl_count
                ),
                suggested_action: "revise the implementation bundle to match the design, schema and patterns".to_string(),
                priority,
                created_at_iteration: iteration,
            };
            (Skill::ResolveImplementationConflicts, request)
        } else {
            let request = ChangeRequest {
                from_role: Role::Mediator,
                to_role: Role::Designer,
                description: format!("Resolve the {} design-owned conflicts", design_count),
                suggested_action: "revise the design spec to match what the session can actually build".to_string(),
                priority,
                created_at_iteration: iteration,
            };
            (Skill::ResolveDesignConflicts, request)
        }
    }

    fn outcome(
        &self,
        converged: bool,
        reason: ConvergenceReason,
        iterations: u32,
        final_conflict_count: usize,
    ) -> ConvergenceOutcome {
        ConvergenceOutcome {
            converged,
            reason,
            iterations,
            final_conflict_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::ConsistencySuite;
    use crate::producers::{ContextKnowledge, ResolutionReport};
    use crate::session::{
        Conflict, ConflictKind, ConflictSource, ImplComponent, ImplementationBundle, Versioned,
    };
    use crate::testing::{ScriptedDesigner, ScriptedImplementer, ScriptedSuite};
    use crate::validation::ValidationConfig;
    use std::sync::Arc;

    fn impl_conflict(id: &str, severity: Severity) -> Conflict {
        Conflict::new(
            id,
            ConflictKind::MissingField,
            severity,
            ConflictSource::Implementation,
            "prop missing",
            "add the prop",
        )
    }

    fn bundle() -> ImplementationBundle {
        ImplementationBundle {
            components: vec![ImplComponent {
                name: "Board".into(),
                props: vec![],
                callbacks: vec![],
                data_paths: vec![],
            }],
            endpoints: vec![],
            source: "export const stages = [];".into(),
        }
    }

    fn state_with_bundle() -> SharedSessionState {
        let mut s = SharedSessionState::new(Default::default(), Default::default());
        s.implementation = Some(Versioned::new(bundle()));
        s
    }

    fn dispatcher(
        implementer: ScriptedImplementer,
        suite: impl ConsistencySuite + 'static,
    ) -> SkillDispatcher {
        SkillDispatcher::new(
            Arc::new(ScriptedDesigner::default()),
            Arc::new(implementer),
            Arc::new(ContextKnowledge),
            Arc::new(suite),
            ValidationConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_full_resolution_converges_after_one_round() {
        // one high conflict, resolved in round 1, clean re-measure
        let suite = ScriptedSuite::with_rounds(vec![
            vec![impl_conflict("impl/a", Severity::High)],
            vec![],
        ]);
        let implementer = ScriptedImplementer::resolving(vec![ResolutionReport::revised(
            1,
            "added the prop",
            bundle(),
        )]);
        let d = dispatcher(implementer, suite);
        let mut s = state_with_bundle();

        let outcome = Mediator::default().converge(&d, &mut s).await;

        assert!(outcome.converged);
        assert_eq!(outcome.reason, ConvergenceReason::NoConflicts);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.final_conflict_count, 0);
        assert!(s.consecutive_agreements >= 1);
    }

    #[tokio::test]
    async fn test_low_stakes_residue_is_acceptable_quality() {
        // 5 high conflicts, 4 implementation-owned and 1 design-owned:
        // the implementation bucket is bigger, one resolution round
        // drops the count to a single low finding, accepted
        let design_conflict = Conflict::new(
            "design/z",
            ConflictKind::MissingComponent,
            Severity::High,
            ConflictSource::Design,
            "undeliverable component",
            "drop it",
        );
        let suite = ScriptedSuite::with_rounds(vec![
            vec![
                impl_conflict("impl/a", Severity::High),
                impl_conflict("impl/b", Severity::High),
                impl_conflict("impl/c", Severity::High),
                impl_conflict("impl/d", Severity::High),
                design_conflict,
            ],
            vec![impl_conflict("impl/d", Severity::Low)],
        ]);
        let implementer = ScriptedImplementer::resolving(vec![ResolutionReport::revised(
            4,
            "fixed the serious findings",
            bundle(),
        )]);
        let d = dispatcher(implementer, suite);
        let mut s = state_with_bundle();

        let outcome = Mediator::default().converge(&d, &mut s).await;

        assert!(outcome.converged);
        assert_eq!(outcome.reason, ConvergenceReason::AcceptableQuality);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.final_conflict_count, 1);
        // the bigger bucket was targeted
        assert!(s.change_requests.iter().all(|r| r.to_role == Role::Implementer));
    }

    #[tokio::test]
    async fn test_noop_rounds_reach_stalemate() {
        // the same high conflict survives every measurement and the
        // producer never changes the artifact
        let persistent = || vec![impl_conflict("impl/a", Severity::High)];
        let suite =
            ScriptedSuite::with_rounds(vec![persistent(), persistent(), persistent()]);
        let implementer = ScriptedImplementer::resolving(vec![
            ResolutionReport::unchanged("nothing I can do"),
            ResolutionReport::unchanged("still nothing"),
        ]);
        let d = dispatcher(implementer, suite);
        let mut s = state_with_bundle();

        let outcome = Mediator::default().converge(&d, &mut s).await;

        assert!(!outcome.converged);
        assert_eq!(outcome.reason, ConvergenceReason::Stalemate);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.final_conflict_count, 1);
        // no-op resolutions never bumped the artifact version
        assert_eq!(s.implementation.as_ref().map(|v| v.version()), Some(1));
    }

    #[tokio::test]
    async fn test_iteration_cap_bounds_the_loop() {
        // the count oscillates (never stuck, never acceptable) so only
        // the iteration cap can end the session
        let two = || {
            vec![
                impl_conflict("impl/a", Severity::High),
                impl_conflict("impl/b", Severity::High),
            ]
        };
        let three = || {
            vec![
                impl_conflict("impl/a", Severity::High),
                impl_conflict("impl/b", Severity::High),
                impl_conflict("impl/c", Severity::High),
            ]
        };
        let suite = ScriptedSuite::with_rounds(vec![three(), two(), three(), two()]);
        let implementer = ScriptedImplementer::resolving(vec![
            ResolutionReport::revised(1, "attempt 1", bundle()),
            ResolutionReport::revised(1, "attempt 2", bundle()),
            ResolutionReport::revised(1, "attempt 3", bundle()),
        ]);
        let d = dispatcher(implementer, suite);
        let mut s = state_with_bundle();

        let outcome = Mediator::default().converge(&d, &mut s).await;

        assert!(!outcome.converged);
        assert_eq!(outcome.reason, ConvergenceReason::MaxIterations);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.final_conflict_count, 2);
        // three real revisions moved the version three times
        assert_eq!(s.implementation.as_ref().map(|v| v.version()), Some(4));
    }

    #[tokio::test]
    async fn test_clean_session_converges_without_rounds() {
        let suite = ScriptedSuite::with_rounds(vec![vec![]]);
        let d = dispatcher(ScriptedImplementer::default(), suite);
        let mut s = state_with_bundle();

        let outcome = Mediator::default().converge(&d, &mut s).await;

        assert!(outcome.converged);
        assert_eq!(outcome.reason, ConvergenceReason::NoConflicts);
        assert_eq!(outcome.iterations, 1);
    }

    #[tokio::test]
    async fn test_design_bucket_targets_the_designer() {
        let design_conflict = Conflict::new(
            "design/a",
            ConflictKind::MissingComponent,
            Severity::High,
            ConflictSource::Design,
            "undeliverable component",
            "drop it from the design",
        );
        let suite = ScriptedSuite::with_rounds(vec![vec![design_conflict], vec![]]);
        let d = SkillDispatcher::new(
            Arc::new(ScriptedDesigner::resolving(vec![ResolutionReport::revised(
                1,
                "dropped the component",
                crate::session::DesignSpec {
                    title: "board".into(),
                    components: vec![],
                    wiring: vec![],
                    notes: vec![],
                },
            )])),
            Arc::new(ScriptedImplementer::default()),
            Arc::new(ContextKnowledge),
            Arc::new(suite),
            ValidationConfig::default(),
        );
        let mut s = state_with_bundle();
        s.design = Some(Versioned::new(crate::session::DesignSpec {
            title: "board".into(),
            components: vec![],
            wiring: vec![],
            notes: vec![],
        }));

        let outcome = Mediator::default().converge(&d, &mut s).await;

        assert!(outcome.converged);
        assert_eq!(s.design.as_ref().map(|v| v.version()), Some(2));
        assert!(s
            .change_requests
            .iter()
            .any(|r| r.to_role == Role::Designer));
    }
}
