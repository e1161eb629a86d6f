//! Default prompt templates bundled at compile time.

/// Design producer - full generation/refinement
pub const DESIGNER: &str = include_str!("prompts/designer.md");

/// Design producer - targeted conflict resolution
pub const DESIGNER_RESOLVE: &str = include_str!("prompts/designer_resolve.md");

/// Implementation producer - full generation/regeneration
pub const IMPLEMENTER: &str = include_str!("prompts/implementer.md");

/// Implementation producer - targeted conflict resolution
pub const IMPLEMENTER_RESOLVE: &str = include_str!("prompts/implementer_resolve.md");

/// Reasoning oracle - next-skill planning decision
pub const PLANNER: &str = include_str!("prompts/planner.md");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_bundled() {
        for prompt in [
            DESIGNER,
            DESIGNER_RESOLVE,
            IMPLEMENTER,
            IMPLEMENTER_RESOLVE,
            PLANNER,
        ] {
            assert!(!prompt.trim().is_empty());
        }
    }

    #[test]
    fn test_resolve_prompts_forbid_fabrication() {
        assert!(DESIGNER_RESOLVE.contains("zero modifications"));
        assert!(IMPLEMENTER_RESOLVE.contains("zero modifications"));
    }
}
