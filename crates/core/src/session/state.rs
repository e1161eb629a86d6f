//! # Shared Session State
//!
//! The single mutable state bus for one generation session. Exactly one
//! component (a skill handler, a checker run, or the planning step) holds
//! write access at any instant; the state is created at the start of a
//! `generate` call and discarded when the session ends.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::artifact::{DataSchema, DesignSpec, ImplementationBundle, KnowledgePattern, Versioned};
use super::conflict::{Conflict, Severity};

/// Participant roles referenced by change requests and questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Mediator,
    Analyzer,
    Designer,
    Implementer,
    Oracle,
}

/// An advisory instruction from the mediator to a producer.
///
/// Not a command: the receiving producer may act on it partially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub from_role: Role,
    pub to_role: Role,
    pub description: String,
    pub suggested_action: String,
    pub priority: Severity,
    pub created_at_iteration: u32,
}

/// Informational channel between collaborators, carried for audit.
/// Not on the critical convergence path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub asking_role: Role,
    pub target_role: Role,
    pub question: String,
    pub context: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub resolved: bool,
}

/// Versioned holder of everything the collaborators negotiate over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedSessionState {
    pub session_id: String,
    /// Free-form requirement key/values (intent text, target shape, ...)
    pub requirements: HashMap<String, String>,
    /// Free-form context key/values (data-source identifiers, ...)
    pub context: HashMap<String, String>,
    pub data_schema: Option<DataSchema>,
    pub knowledge: Vec<KnowledgePattern>,
    pub design: Option<Versioned<DesignSpec>>,
    pub implementation: Option<Versioned<ImplementationBundle>>,
    pub conflicts: Vec<Conflict>,
    pub change_requests: Vec<ChangeRequest>,
    pub questions: Vec<Question>,
    /// Timestamped negotiation entries, appended only
    pub negotiation_log: Vec<String>,
    /// Accumulated error messages for diagnostics
    pub errors: Vec<String>,
    pub last_error: Option<String>,
    /// Skill names in invocation order, for observability
    pub action_history: Vec<String>,
    pub consecutive_agreements: u32,
    pub iterations_since_last_change: u32,
    pub implementation_validated: bool,
    pub goal_achieved: bool,
}

impl SharedSessionState {
    pub fn new(requirements: HashMap<String, String>, context: HashMap<String, String>) -> Self {
        Self {
            session_id: session_id(),
            requirements,
            context,
            data_schema: None,
            knowledge: Vec::new(),
            design: None,
            implementation: None,
            conflicts: Vec::new(),
            change_requests: Vec::new(),
            questions: Vec::new(),
            negotiation_log: Vec::new(),
            errors: Vec::new(),
            last_error: None,
            action_history: Vec::new(),
            consecutive_agreements: 0,
            iterations_since_last_change: 0,
            implementation_validated: false,
            goal_achieved: false,
        }
    }

    /// Append a timestamped entry to the negotiation log
    pub fn log(&mut self, entry: impl AsRef<str>) {
        self.negotiation_log
            .push(format!("[{}] {}", Utc::now().to_rfc3339(), entry.as_ref()));
    }

    /// Record a failure, keeping both the full list and the latest message
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(session = %self.session_id, "{}", message);
        self.last_error = Some(message.clone());
        self.errors.push(message);
    }

    pub fn record_action(&mut self, skill: &str) {
        self.action_history.push(skill.to_string());
    }

    /// Replace the conflict list wholesale. Conflicts are recomputed fresh
    /// each round rather than patched, so nothing stale survives here.
    pub fn replace_conflicts(&mut self, conflicts: Vec<Conflict>) {
        self.conflicts = conflicts;
    }

    pub fn ask(&mut self, question: Question) {
        self.questions.push(question);
    }

    /// Answer a previously asked question. Resolution is one-way.
    pub fn answer_question(&mut self, index: usize, answer: impl Into<String>) {
        if let Some(q) = self.questions.get_mut(index) {
            q.answer = Some(answer.into());
            q.resolved = true;
        }
    }

    pub fn recent_errors(&self, n: usize) -> Vec<&str> {
        self.errors
            .iter()
            .rev()
            .take(n)
            .rev()
            .map(String::as_str)
            .collect()
    }

    pub fn recent_actions(&self, n: usize) -> Vec<&str> {
        self.action_history
            .iter()
            .rev()
            .take(n)
            .rev()
            .map(String::as_str)
            .collect()
    }

    pub fn has_both_artifacts(&self) -> bool {
        self.design.is_some() && self.implementation.is_some()
    }
}

/// Generate a session identifier (time component plus hash salt)
fn session_id() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();
    let salt = RandomState::new().build_hasher().finish() as u32;
    format!("ses-{:x}-{:x}", nanos, salt)
}
