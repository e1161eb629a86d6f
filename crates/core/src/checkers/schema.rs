//! Schema-alignment checker: the data shape the implementation assumes
//! (property names, nesting depth) must match the data context's declared
//! shape.

use crate::session::{
    Conflict, ConflictKind, ConflictSource, DataSchema, ImplementationBundle, Severity,
};

/// Pure comparison. Absent inputs reduce to "no conflicts found".
pub fn check(
    implementation: Option<&ImplementationBundle>,
    schema: Option<&DataSchema>,
) -> Vec<Conflict> {
    let (implementation, schema) = match (implementation, schema) {
        (Some(i), Some(s)) => (i, s),
        _ => return Vec::new(),
    };

    let mut conflicts = Vec::new();

    for component in &implementation.components {
        for path in &component.data_paths {
            if schema.resolve(path).is_some() {
                continue;
            }
            if let Some(actual) = schema.resolve_case_insensitive(path) {
                conflicts.push(Conflict::new(
                    format!("schema/naming/{}/{}", component.name, path),
                    ConflictKind::SchemaMismatch,
                    Severity::Medium,
                    ConflictSource::Implementation,
                    format!(
                        "'{}' reads '{}' but the schema spells it '{}'",
                        component.name, path, actual.path
                    ),
                    format!("use the schema spelling '{}'", actual.path),
                ));
                continue;
            }
            let leaf = path.rsplit('.').next().unwrap_or(path);
            if let Some(actual) = schema.resolve_leaf(leaf) {
                conflicts.push(Conflict::new(
                    format!("schema/depth/{}/{}", component.name, path),
                    ConflictKind::SchemaMismatch,
                    Severity::High,
                    ConflictSource::Implementation,
                    format!(
                        "'{}' reads '{}' at the wrong depth; the field lives at '{}'",
                        component.name, path, actual.path
                    ),
                    format!("access the field via '{}'", actual.path),
                ));
            } else {
                conflicts.push(Conflict::new(
                    format!("schema/unknown/{}/{}", component.name, path),
                    ConflictKind::DataSourceMismatch,
                    Severity::High,
                    ConflictSource::Implementation,
                    format!(
                        "'{}' reads '{}' which data source '{}' does not provide",
                        component.name, path, schema.source_id
                    ),
                    "drop the access or bind to a field the source declares".to_string(),
                ));
            }
        }
    }

    conflicts
}
