//! # Versioned Artifacts
//!
//! The two negotiated artifacts (design spec and implementation bundle),
//! the data context they must agree with, and the version wrapper whose
//! counter only moves when a producer actually modified content.

use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Wrapper carrying a monotonically increasing version.
///
/// The version increments only through [`Versioned::replace`], which is
/// called exactly when the owning producer reported a real modification.
/// A no-op resolution therefore never moves the counter, and the mediator
/// cannot mistake phantom progress for convergence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Versioned<T> {
    content: T,
    version: u32,
}

impl<T> Versioned<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            version: 1,
        }
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Swap in modified content, bumping the version by exactly one.
    pub fn replace(&mut self, content: T) {
        self.content = content;
        self.version += 1;
    }

    pub fn into_content(self) -> T {
        self.content
    }
}

// ===========================================================================
// Design artifact
// ===========================================================================

/// A prop the design expects a component to expose
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct PropSpec {
    /// Prop name as the design declares it
    pub name: String,
    /// Declared type, e.g. "string", "number", "array<object>"
    pub prop_type: String,
    /// Whether the implementation must provide this prop
    #[serde(default)]
    pub required: bool,
}

/// A declared interaction: a source control drives a target view
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct Wiring {
    /// Component emitting the event, e.g. "OrderTable"
    pub source: String,
    /// Component that must react, e.g. "OrderDetailPanel"
    pub target: String,
    /// Callback name the source must expose, e.g. "on_select"
    pub event: String,
}

/// A component the design declares
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct DesignComponent {
    pub name: String,
    /// Component family, e.g. "table", "detail", "filter_bar"
    pub kind: String,
    /// Props the implementation side must honor
    #[serde(default)]
    pub props: Vec<PropSpec>,
    /// Dotted path into the data context this component renders
    #[serde(default)]
    pub data_binding: Option<String>,
}

/// The design-spec artifact produced by the design producer
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct DesignSpec {
    pub title: String,
    pub components: Vec<DesignComponent>,
    /// Interactions that must be wired in the implementation
    #[serde(default)]
    pub wiring: Vec<Wiring>,
    /// Free-form design notes
    #[serde(default)]
    pub notes: Vec<String>,
}

impl DesignSpec {
    pub fn component(&self, name: &str) -> Option<&DesignComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

// ===========================================================================
// Implementation artifact
// ===========================================================================

/// A prop as the implementation actually exposes it
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ImplProp {
    pub name: String,
    pub prop_type: String,
}

/// A component construct present in the implementation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ImplComponent {
    pub name: String,
    #[serde(default)]
    pub props: Vec<ImplProp>,
    /// Callback names this component exposes, e.g. "on_select"
    #[serde(default)]
    pub callbacks: Vec<String>,
    /// Dotted data paths this component reads from the data context
    #[serde(default)]
    pub data_paths: Vec<String>,
}

/// A data endpoint the implementation declares it fetches
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct Endpoint {
    /// Endpoint identifier, snake_case by convention
    pub name: String,
    /// Whether any component consumes the fetched result
    #[serde(default)]
    pub consumed: bool,
}

/// The implementation artifact produced by the implementation producer
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ImplementationBundle {
    pub components: Vec<ImplComponent>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// The emitted source text; scanned by the validation gates
    pub source: String,
}

impl ImplementationBundle {
    pub fn component(&self, name: &str) -> Option<&ImplComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

// ===========================================================================
// Data context and knowledge
// ===========================================================================

/// One field of the actual data shape, addressed by dotted path
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataField {
    /// Full dotted path, e.g. "order.customer.name"
    pub path: String,
    pub field_type: String,
}

/// The declared shape of the data context feeding the implementation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataSchema {
    /// Identifier of the data source this shape was discovered from
    pub source_id: String,
    pub fields: Vec<DataField>,
}

impl DataSchema {
    pub fn resolve(&self, path: &str) -> Option<&DataField> {
        self.fields.iter().find(|f| f.path == path)
    }

    pub fn resolve_case_insensitive(&self, path: &str) -> Option<&DataField> {
        self.fields
            .iter()
            .find(|f| f.path.eq_ignore_ascii_case(path))
    }

    /// Find a field whose final path segment matches `leaf`, regardless of
    /// nesting depth. Used to flag wrong-depth access.
    pub fn resolve_leaf(&self, leaf: &str) -> Option<&DataField> {
        self.fields
            .iter()
            .find(|f| f.path.rsplit('.').next() == Some(leaf))
    }
}

/// A mandated domain/UX pattern retrieved from the knowledge source
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgePattern {
    pub name: String,
    /// What the pattern demands, in prose
    pub directive: String,
    /// Lexical marker whose presence in the implementation source counts
    /// as honoring the pattern
    pub marker: String,
    #[serde(default)]
    pub mandatory: bool,
}
