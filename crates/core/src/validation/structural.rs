//! Structural/behavioral gate: rule-based checks over the candidate
//! bundle's declared shape. Issues are classified informational vs
//! critical; only critical issues hard-fail the candidate.

use super::{Gate, GateFailure};
use crate::session::{DesignSpec, ImplementationBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Informational,
    Critical,
}

#[derive(Debug, Clone)]
pub struct StructuralIssue {
    pub severity: IssueSeverity,
    pub message: String,
}

fn is_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Collect all structural issues for the candidate.
pub fn issues(bundle: &ImplementationBundle, design: Option<&DesignSpec>) -> Vec<StructuralIssue> {
    let mut found = Vec::new();

    for endpoint in &bundle.endpoints {
        if !is_snake_case(&endpoint.name) {
            found.push(StructuralIssue {
                severity: IssueSeverity::Critical,
                message: format!(
                    "endpoint '{}' has the wrong shape (expected a snake_case identifier)",
                    endpoint.name
                ),
            });
        } else if !endpoint.consumed {
            found.push(StructuralIssue {
                severity: IssueSeverity::Informational,
                message: format!("endpoint '{}' is fetched but never consumed", endpoint.name),
            });
        }
    }

    if let Some(design) = design {
        for wiring in &design.wiring {
            let wired = bundle
                .component(&wiring.source)
                .map(|c| c.callbacks.iter().any(|cb| cb == &wiring.event))
                .unwrap_or(false);
            if !wired {
                found.push(StructuralIssue {
                    severity: IssueSeverity::Critical,
                    message: format!(
                        "mandatory callback '{}' on '{}' is not wired",
                        wiring.event, wiring.source
                    ),
                });
            }
        }
    }

    for component in &bundle.components {
        for prop in &component.props {
            if prop.name.contains(' ') || prop.name.contains('-') {
                found.push(StructuralIssue {
                    severity: IssueSeverity::Critical,
                    message: format!(
                        "prop '{}' on '{}' is not a valid parameter name",
                        prop.name, component.name
                    ),
                });
            }
        }
        if !component.data_paths.is_empty() && bundle.endpoints.is_empty() {
            found.push(StructuralIssue {
                severity: IssueSeverity::Informational,
                message: format!(
                    "component '{}' reads data but the bundle declares no endpoint",
                    component.name
                ),
            });
        }
    }

    found
}

/// Gate entry point: the first critical issue hard-fails; informational
/// issues are logged and tolerated.
pub fn check(bundle: &ImplementationBundle, design: Option<&DesignSpec>) -> Result<(), GateFailure> {
    for issue in issues(bundle, design) {
        match issue.severity {
            IssueSeverity::Critical => {
                return Err(GateFailure {
                    gate: Gate::Structural,
                    reason: issue.message,
                })
            }
            IssueSeverity::Informational => {
                tracing::debug!("structural note: {}", issue.message);
            }
        }
    }
    Ok(())
}
