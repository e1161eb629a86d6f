//! Forbidden-content gate: an ordered lexical rule table scanned over the
//! candidate's source text. Allow rules take precedence over deny rules so
//! legitimate configuration arrays (stage lists, column definitions, menu
//! items, empty-default state) never trip the placeholder detector.

use regex::Regex;

use super::{Gate, GateFailure};
use crate::session::ImplementationBundle;

/// What a matching rule decides for the scanned line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Allow,
    Deny,
}

/// One entry of the pluggable rule table. Rules are evaluated in order;
/// the first rule matching a line decides it.
#[derive(Debug, Clone)]
pub struct LexicalRule {
    pub label: String,
    pub action: RuleAction,
    pub pattern: Regex,
}

impl LexicalRule {
    pub fn new(
        label: impl Into<String>,
        action: RuleAction,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            label: label.into(),
            action,
            pattern: Regex::new(pattern)?,
        })
    }
}

/// The default rule table. Tuning these never touches the convergence
/// algorithm; the table is configuration.
pub fn default_rules() -> Vec<LexicalRule> {
    let rules = [
        // Allow-list first: legitimate configuration arrays and defaults.
        (
            "legitimate-config-array",
            RuleAction::Allow,
            r"(?i)\b(?:const|let|var)\s+(?:stages|columns|column_defs|columnDefs|menu_items|menuItems|tabs|steps|routes|filters|default_filters|defaultFilters|initial_state|initialState|empty_state|emptyState)\s*=",
        ),
        // Deny-list: placeholder tokens adjacent to an assignment, not
        // merely present as a substring of an unrelated identifier.
        (
            "placeholder-assignment",
            RuleAction::Deny,
            r"(?i)\b(?:const|let|var)\s+(?:mock|fake|dummy|sample|placeholder|test_data|testData)\w*\s*=",
        ),
        (
            "placeholder-field",
            RuleAction::Deny,
            r#"(?i)["']?\b(?:mock|fake|dummy|sample)_?data\b["']?\s*:"#,
        ),
        ("lorem-ipsum", RuleAction::Deny, r"(?i)\blorem\s+ipsum\b"),
        (
            "replace-me-marker",
            RuleAction::Deny,
            r"(?i)//\s*(?:TODO|FIXME)\b.*\breplace with real data\b",
        ),
    ];

    rules
        .into_iter()
        .map(|(label, action, pattern)| {
            // Patterns above are compile-time constants; a failure here is a
            // table authoring bug caught by tests.
            LexicalRule::new(label, action, pattern).unwrap_or_else(|e| {
                panic!("invalid default lexical rule '{}': {}", label, e)
            })
        })
        .collect()
}

/// A deny-rule hit
#[derive(Debug, Clone)]
pub struct ForbiddenMatch {
    pub line: usize,
    pub label: String,
    pub excerpt: String,
}

/// Scan source text line by line against the ordered rule table.
pub fn scan(source: &str, rules: &[LexicalRule]) -> Option<ForbiddenMatch> {
    for (index, line) in source.lines().enumerate() {
        for rule in rules {
            if rule.pattern.is_match(line) {
                match rule.action {
                    RuleAction::Allow => break,
                    RuleAction::Deny => {
                        return Some(ForbiddenMatch {
                            line: index + 1,
                            label: rule.label.clone(),
                            excerpt: line.trim().chars().take(120).collect(),
                        })
                    }
                }
            }
        }
    }
    None
}

/// Gate entry point: any deny match is a hard failure.
pub fn check(bundle: &ImplementationBundle, rules: &[LexicalRule]) -> Result<(), GateFailure> {
    match scan(&bundle.source, rules) {
        Some(found) => Err(GateFailure {
            gate: Gate::ForbiddenContent,
            reason: format!(
                "{} at line {}: `{}`",
                found.label, found.line, found.excerpt
            ),
        }),
        None => Ok(()),
    }
}
