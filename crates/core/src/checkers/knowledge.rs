//! Knowledge-conflict checker: the implementation must honor the mandated
//! domain/UX patterns retrieved from the knowledge source.

use crate::session::{
    Conflict, ConflictKind, ConflictSource, ImplementationBundle, KnowledgePattern, Severity,
};

/// Pure comparison. Absent inputs reduce to "no conflicts found".
pub fn check(
    implementation: Option<&ImplementationBundle>,
    patterns: &[KnowledgePattern],
) -> Vec<Conflict> {
    let implementation = match implementation {
        Some(i) => i,
        None => return Vec::new(),
    };

    patterns
        .iter()
        .filter(|p| !p.marker.is_empty() && !implementation.source.contains(&p.marker))
        .map(|p| {
            Conflict::new(
                format!("knowledge/deviation/{}", p.name),
                ConflictKind::PatternDeviation,
                if p.mandatory {
                    Severity::High
                } else {
                    Severity::Low
                },
                ConflictSource::Implementation,
                format!("pattern '{}' is not honored: {}", p.name, p.directive),
                format!("apply the pattern (expected marker '{}')", p.marker),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(source: &str) -> ImplementationBundle {
        ImplementationBundle {
            components: vec![],
            endpoints: vec![],
            source: source.into(),
        }
    }

    fn pattern(mandatory: bool) -> KnowledgePattern {
        KnowledgePattern {
            name: "empty-state".into(),
            directive: "lists must render an explicit empty state".into(),
            marker: "EmptyState".into(),
            mandatory,
        }
    }

    #[test]
    fn test_absent_input_yields_no_conflicts() {
        assert!(check(None, &[pattern(true)]).is_empty());
        assert!(check(Some(&bundle("anything")), &[]).is_empty());
    }

    #[test]
    fn test_honored_pattern_passes() {
        let b = bundle("render(<EmptyState />)");
        assert!(check(Some(&b), &[pattern(true)]).is_empty());
    }

    #[test]
    fn test_mandatory_deviation_is_high() {
        let conflicts = check(Some(&bundle("render(rows)")), &[pattern(true)]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::PatternDeviation);
        assert_eq!(conflicts[0].severity, Severity::High);
    }

    #[test]
    fn test_advisory_deviation_is_low() {
        let conflicts = check(Some(&bundle("render(rows)")), &[pattern(false)]);
        assert_eq!(conflicts[0].severity, Severity::Low);
    }
}
