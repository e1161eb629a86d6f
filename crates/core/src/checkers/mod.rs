//! # Consistency Checkers
//!
//! Four independent pure functions comparing pairs of artifacts and
//! emitting [`Conflict`]s. No shared state, no side effects, and never a
//! panic for missing input: an absent artifact reduces a checker to "no
//! conflicts found".
//!
//! The engine runs the whole suite each round and replaces the session's
//! conflict list wholesale with the concatenated result.

pub mod compatibility;
pub mod design_impl;
pub mod knowledge;
pub mod schema;

use crate::session::{Conflict, SharedSessionState};

/// Seam over the checker suite so the mediator can be exercised with
/// scripted conflict trajectories in tests.
pub trait ConsistencySuite: Send + Sync {
    fn run(&self, state: &SharedSessionState) -> Vec<Conflict>;
}

/// The production suite: all four checkers, concatenated in a fixed order.
#[derive(Debug, Default)]
pub struct StandardCheckers;

impl ConsistencySuite for StandardCheckers {
    fn run(&self, state: &SharedSessionState) -> Vec<Conflict> {
        let design = state.design.as_ref().map(|v| v.content());
        let implementation = state.implementation.as_ref().map(|v| v.content());

        let mut conflicts = design_impl::check(design, implementation);
        conflicts.extend(schema::check(implementation, state.data_schema.as_ref()));
        conflicts.extend(knowledge::check(implementation, &state.knowledge));
        conflicts.extend(compatibility::check(design, implementation));
        conflicts
    }
}
