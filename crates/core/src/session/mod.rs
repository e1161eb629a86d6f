//! # Session State
//!
//! The conflict model, the versioned artifacts and the shared state bus
//! that one generation session negotiates over.

pub mod artifact;
pub mod conflict;
pub mod state;

pub use artifact::{
    DataField, DataSchema, DesignComponent, DesignSpec, Endpoint, ImplComponent, ImplProp,
    ImplementationBundle, KnowledgePattern, PropSpec, Versioned, Wiring,
};
pub use conflict::{
    high_severity_count, source_counts, Conflict, ConflictKind, ConflictSource, Severity,
};
pub use state::{ChangeRequest, Question, Role, SharedSessionState};
