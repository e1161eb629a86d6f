//! # Planning Loop
//!
//! Optional autonomous mode: instead of running the fixed skill
//! sequence, the engine asks the reasoning oracle which skill to run
//! next, one step at a time. Oracle replies are parsed defensively; a
//! reply the parser cannot salvage falls back to a deterministic
//! re-assessment plan rather than aborting the session.

use serde::{Deserialize, Serialize};

use crate::producers::ReasoningOracle;
use crate::session::SharedSessionState;
use crate::skills::{Skill, SkillDispatcher};

/// Bounds for the planning loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Hard cap on planned steps
    pub max_iterations: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { max_iterations: 4 }
    }
}

/// One planned step, as the oracle declares it.
///
/// `skill` stays a wire name rather than a parsed [`Skill`] so an
/// unknown name flows through the dispatcher's recovery path instead of
/// failing at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub skill: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
    #[serde(default)]
    pub expected_outcome: String,
}

impl Plan {
    /// The deterministic fallback when a reply cannot be parsed.
    fn reassess(reason: &str) -> Self {
        Self {
            skill: Skill::EvaluateProgress.name().to_string(),
            reasoning: format!("fallback: {}", reason),
            arguments: serde_json::Value::Null,
            expected_outcome: "re-assess where the session stands".to_string(),
        }
    }
}

/// Parse an oracle reply into a [`Plan`].
///
/// Tries, in order: the whole reply as JSON, the reply with a Markdown
/// code fence stripped, and the first `{...}` span. Anything else
/// degrades to the re-assessment fallback.
pub fn parse_plan(reply: &str) -> Plan {
    let trimmed = reply.trim();
    if let Ok(plan) = serde_json::from_str::<Plan>(trimmed) {
        return plan;
    }

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim);
    if let Some(inner) = unfenced {
        if let Ok(plan) = serde_json::from_str::<Plan>(inner) {
            return plan;
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(plan) = serde_json::from_str::<Plan>(&trimmed[start..=end]) {
                return plan;
            }
        }
    }

    tracing::warn!("Unparseable plan reply ({} chars), re-assessing", reply.len());
    Plan::reassess("unparseable plan reply")
}

/// Render the session snapshot the oracle plans from.
fn render_snapshot(state: &SharedSessionState, step: u32) -> String {
    let mut out = format!(
        "## Session Snapshot (step {})\n\
         - design: {}\n\
         - implementation: {}\n\
         - implementation_validated: {}\n\
         - open_conflicts: {}\n\
         - goal_achieved: {}\n",
        step,
        state.design.is_some(),
        state.implementation.is_some(),
        state.implementation_validated,
        state.conflicts.iter().filter(|c| !c.is_resolved()).count(),
        state.goal_achieved,
    );

    let errors = state.recent_errors(3);
    if !errors.is_empty() {
        out.push_str("\n## Recent Errors\n");
        for error in errors {
            out.push_str(&format!("- {}\n", error));
        }
    }

    let actions = state.recent_actions(5);
    if !actions.is_empty() {
        out.push_str("\n## Recent Actions\n");
        for action in actions {
            out.push_str(&format!("- {}\n", action));
        }
    }

    out.push_str("\n## Available Skills\n");
    out.push_str(&Skill::catalog());
    out
}

/// Oracle-driven skill loop.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Plan and dispatch skills until the goal is achieved or the step
    /// cap is hit. Returns the number of steps executed.
    ///
    /// An unreachable oracle degrades to the fallback plan for that
    /// step; the loop itself never fails.
    pub async fn run(
        &self,
        oracle: &dyn ReasoningOracle,
        d: &SkillDispatcher,
        state: &mut SharedSessionState,
    ) -> u32 {
        let mut steps = 0;
        for step in 1..=self.config.max_iterations {
            let snapshot = render_snapshot(state, step);
            let plan = match oracle.decide(&snapshot).await {
                Ok(reply) => parse_plan(&reply),
                Err(e) => {
                    state.record_error(format!("Planner step {}: {}", step, e));
                    Plan::reassess("oracle unreachable")
                }
            };

            state.log(format!(
                "Planner step {}: {} ({})",
                step, plan.skill, plan.reasoning
            ));
            let outcome = d.dispatch_named(state, &plan.skill, &plan.arguments).await;
            steps = step;

            if state.goal_achieved {
                break;
            }
            if plan.skill == Skill::Finish.name() && outcome.success {
                break;
            }
        }
        steps
    }
}
