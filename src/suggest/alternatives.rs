//! Known heavy dependencies and their lighter alternatives.
//!
//! The catalog is process-wide read-only configuration, not derived from
//! observed data: it is built once and injected into the heuristics that
//! consume it, so tests can substitute their own tables. Entry order is
//! significant — URL matching reports the first catalog entry that matches.

use serde::{Deserialize, Serialize};

/// Migration effort grade for switching to an alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    /// Drop-in or near drop-in replacement.
    Low,
    /// API differences requiring localized rewrites.
    Medium,
    /// A different programming model.
    High,
}

impl Effort {
    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Effort::Low => "low",
            Effort::Medium => "medium",
            Effort::High => "high",
        }
    }
}

/// A lighter replacement for a known heavy dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyAlternative {
    /// Replacement package or platform feature.
    pub alternative: String,

    /// Rough bundle-size reduction in kilobytes.
    pub size_savings_kb: u64,

    /// Migration effort grade.
    pub effort: Effort,
}

impl DependencyAlternative {
    /// Build a catalog entry.
    pub fn new(alternative: impl Into<String>, size_savings_kb: u64, effort: Effort) -> Self {
        Self {
            alternative: alternative.into(),
            size_savings_kb,
            effort,
        }
    }
}

/// Ordered mapping from heavy-dependency names to their alternatives.
///
/// # Example
///
/// ```
/// use pagescope::suggest::AlternativesCatalog;
///
/// let catalog = AlternativesCatalog::default();
/// let options = catalog.alternatives_for("moment").unwrap();
/// assert!(!options.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct AlternativesCatalog {
    entries: Vec<(String, Vec<DependencyAlternative>)>,
}

impl Default for AlternativesCatalog {
    fn default() -> Self {
        use Effort::{High, Low, Medium};

        Self::with_entries(vec![
            (
                "moment".to_string(),
                vec![
                    DependencyAlternative::new("dayjs", 65, Low),
                    DependencyAlternative::new("date-fns", 55, Medium),
                ],
            ),
            (
                "lodash".to_string(),
                vec![
                    DependencyAlternative::new("lodash-es with tree-shaking", 50, Low),
                    DependencyAlternative::new("native array/object methods", 70, Medium),
                ],
            ),
            (
                "underscore".to_string(),
                vec![DependencyAlternative::new("lodash-es with tree-shaking", 15, Medium)],
            ),
            (
                "axios".to_string(),
                vec![
                    DependencyAlternative::new("native fetch", 15, Low),
                    DependencyAlternative::new("redaxios", 14, Low),
                ],
            ),
            (
                "jquery".to_string(),
                vec![
                    DependencyAlternative::new("native DOM APIs", 85, High),
                    DependencyAlternative::new("cash-dom", 80, Medium),
                ],
            ),
            (
                "bluebird".to_string(),
                vec![DependencyAlternative::new("native Promise", 75, Low)],
            ),
            (
                "uuid".to_string(),
                vec![DependencyAlternative::new("crypto.randomUUID", 10, Low)],
            ),
        ])
    }
}

impl AlternativesCatalog {
    /// Build a catalog from a substitute table, preserving entry order.
    pub fn with_entries(entries: Vec<(String, Vec<DependencyAlternative>)>) -> Self {
        Self { entries }
    }

    /// Dependency names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Alternatives for a dependency name, if known.
    pub fn alternatives_for(&self, name: &str) -> Option<&[DependencyAlternative]> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, alternatives)| alternatives.as_slice())
    }

    /// Number of known heavy dependencies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_contents() {
        let catalog = AlternativesCatalog::default();

        assert!(catalog.alternatives_for("moment").is_some());
        assert!(catalog.alternatives_for("lodash").is_some());
        assert!(catalog.alternatives_for("left-pad").is_none());
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_names_preserve_declaration_order() {
        let catalog = AlternativesCatalog::with_entries(vec![
            ("zzz".to_string(), vec![DependencyAlternative::new("a", 1, Effort::Low)]),
            ("aaa".to_string(), vec![DependencyAlternative::new("b", 2, Effort::High)]),
        ]);

        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["zzz", "aaa"]);
    }

    #[test]
    fn test_effort_label() {
        assert_eq!(Effort::Low.label(), "low");
        assert_eq!(Effort::Medium.label(), "medium");
        assert_eq!(Effort::High.label(), "high");
    }

    #[test]
    fn test_alternative_fields() {
        let alternative = DependencyAlternative::new("dayjs", 65, Effort::Low);
        assert_eq!(alternative.alternative, "dayjs");
        assert_eq!(alternative.size_savings_kb, 65);
        assert_eq!(alternative.effort, Effort::Low);
    }
}
