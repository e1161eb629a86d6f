//! Component-compatibility checker: components present on both sides must
//! agree on their prop/field contracts.

use crate::session::{
    Conflict, ConflictKind, ConflictSource, DesignSpec, ImplementationBundle, Severity,
};

/// Pure comparison. Absent inputs reduce to "no conflicts found".
pub fn check(
    design: Option<&DesignSpec>,
    implementation: Option<&ImplementationBundle>,
) -> Vec<Conflict> {
    let (design, implementation) = match (design, implementation) {
        (Some(d), Some(i)) => (d, i),
        _ => return Vec::new(),
    };

    let mut conflicts = Vec::new();

    for expected in &design.components {
        // Missing components belong to the design<->implementation checker.
        let actual = match implementation.component(&expected.name) {
            Some(c) => c,
            None => continue,
        };

        for prop in &expected.props {
            match actual.props.iter().find(|p| p.name == prop.name) {
                None if prop.required => conflicts.push(Conflict::new(
                    format!("compat/missing-prop/{}.{}", expected.name, prop.name),
                    ConflictKind::MissingField,
                    Severity::Medium,
                    ConflictSource::Implementation,
                    format!(
                        "component '{}' lacks required prop '{}'",
                        expected.name, prop.name
                    ),
                    format!("add prop '{}: {}'", prop.name, prop.prop_type),
                )),
                Some(p) if !p.prop_type.eq_ignore_ascii_case(&prop.prop_type) => {
                    conflicts.push(Conflict::new(
                        format!("compat/type/{}.{}", expected.name, prop.name),
                        ConflictKind::TypeIncompatibility,
                        Severity::High,
                        ConflictSource::Implementation,
                        format!(
                            "prop '{}.{}' is '{}' in the implementation but the design expects '{}'",
                            expected.name, prop.name, p.prop_type, prop.prop_type
                        ),
                        format!("change the prop type to '{}'", prop.prop_type),
                    ))
                }
                _ => {}
            }
        }
    }

    conflicts
}
