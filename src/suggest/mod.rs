//! Optimization suggestion generation.
//!
//! Operates over the outputs of coverage analysis and chain detection:
//! recognizes known heavy dependencies by URL, grades each wasteful bundle
//! on a priority ladder, and proposes code-split, lazy-load, and chain-merge
//! remediations.

pub mod alternatives;
pub mod heuristics;

// Re-export main types for convenience
pub use alternatives::{AlternativesCatalog, DependencyAlternative, Effort};
pub use heuristics::{
    code_split_suggestions, detect_heavy_dependency, lazy_load_candidates, merge_candidates,
    priority_for, ChainMergeSuggestion, CodeSplitSuggestion, Priority, SuggestOptions,
    SuggestOptionsError,
};
