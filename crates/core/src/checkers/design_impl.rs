//! Design <-> implementation checker: every component and interaction the
//! design declares must have a corresponding construct in the
//! implementation, including required wiring.

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

    for component in &design.components {
        if implementation.component(&component.name).is_none() {
            conflicts.push(Conflict::new(
                format!("design-impl/missing-component/{}", component.name),
                ConflictKind::MissingComponent,
                Severity::High,
                ConflictSource::Implementation,
                format!(
                    "design declares component '{}' ({}) with no construct in the implementation",
                    component.name, component.kind
                ),
                format!("add a '{}' component named '{}'", component.kind, component.name),
            ));
        }
    }

    for wiring in &design.wiring {
        // A missing source component is already reported above; only check
        // the callback when the source construct exists.
        if let Some(source) = implementation.component(&wiring.source) {
            if !source.callbacks.iter().any(|c| c == &wiring.event) {
                conflicts.push(Conflict::new(
                    format!("design-impl/missing-wiring/{}.{}", wiring.source, wiring.event),
                    ConflictKind::MissingField,
                    Severity::High,
                    ConflictSource::Implementation,
                    format!(
                        "'{}' is not connected to '{}': callback '{}' is missing",
                        wiring.source, wiring.target, wiring.event
                    ),
                    format!(
                        "expose callback '{}' on '{}' and route it to '{}'",
                        wiring.event, wiring.source, wiring.target
                    ),
                ));
            }
        }
    }

    conflicts
}
