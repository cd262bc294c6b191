//! Optimization suggestion heuristics.
//!
//! Pure functions over already-computed coverage entries and load chains:
//! heavy-dependency detection by URL pattern, priority scoring on a
//! threshold ladder, code-split candidate ranking, lazy-load candidate
//! selection, and chain merge candidates. Absent or empty inputs produce
//! empty outputs, never errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coverage::CoverageEntry;
use crate::network::BundleChain;
use crate::suggest::alternatives::AlternativesCatalog;

/// Unused bytes above which a bundle is critical.
const CRITICAL_BYTES: u64 = 100 * 1024;
/// Unused percentage above which a bundle is critical.
const CRITICAL_PERCENT: f64 = 50.0;
const HIGH_BYTES: u64 = 50 * 1024;
const HIGH_PERCENT: f64 = 30.0;
const MEDIUM_BYTES: u64 = 20 * 1024;
const MEDIUM_PERCENT: f64 = 20.0;

/// How urgently a bundle deserves splitting. Orders from most to least
/// urgent so sorting ascending ranks critical findings first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// More than 100 KB or more than half of the bundle is unused.
    Critical,
    /// More than 50 KB or 30% unused.
    High,
    /// More than 20 KB or 20% unused.
    Medium,
    /// Everything else that passed the caller's filters.
    Low,
}

impl Priority {
    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Score a bundle from its wasted bytes and wasted percentage.
///
/// Each bundle is scored independently on a strict-`>` ladder; exactly-at-
/// threshold values fall to the lower tier.
pub fn priority_for(unused_bytes: u64, unused_percent: f64) -> Priority {
    if unused_bytes > CRITICAL_BYTES || unused_percent > CRITICAL_PERCENT {
        Priority::Critical
    } else if unused_bytes > HIGH_BYTES || unused_percent > HIGH_PERCENT {
        Priority::High
    } else if unused_bytes > MEDIUM_BYTES || unused_percent > MEDIUM_PERCENT {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// A bundle worth splitting, lazy-loading, or replacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSplitSuggestion {
    /// Bundle URL.
    pub url: String,

    /// Urgency grade.
    pub priority: Priority,

    /// Total shipped bytes.
    pub total_bytes: u64,

    /// Executed bytes.
    pub used_bytes: u64,

    /// Never-executed bytes.
    pub unused_bytes: u64,

    /// Used fraction as a percentage.
    pub usage_percent: f64,

    /// True for cross-origin or vendor-named bundles.
    pub is_external: bool,

    /// Name of a recognized heavy library, when the URL matches one.
    pub detected_dependency: Option<String>,
}

impl CodeSplitSuggestion {
    /// Wasted fraction as a percentage.
    pub fn unused_percent(&self) -> f64 {
        100.0 - self.usage_percent
    }
}

/// Errors for caller-supplied suggestion filters.
#[derive(Debug, Error)]
pub enum SuggestOptionsError {
    /// Percentage outside `[0, 100]`.
    #[error("minimum unused percent must be between 0 and 100, got {0}")]
    InvalidUnusedPercent(f64),
}

/// Filters applied before bundles are considered for suggestions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestOptions {
    /// Smallest bundle worth reporting, in kilobytes.
    pub min_bundle_size_kb: u64,

    /// Smallest wasted percentage worth reporting.
    pub min_unused_percent: f64,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            min_bundle_size_kb: 50,
            min_unused_percent: 20.0,
        }
    }
}

impl SuggestOptions {
    /// Validate caller-supplied filters.
    pub fn new(min_bundle_size_kb: u64, min_unused_percent: f64) -> Result<Self, SuggestOptionsError> {
        if !min_unused_percent.is_finite() || !(0.0..=100.0).contains(&min_unused_percent) {
            return Err(SuggestOptionsError::InvalidUnusedPercent(min_unused_percent));
        }
        Ok(Self {
            min_bundle_size_kb,
            min_unused_percent,
        })
    }
}

/// Characters that bound a dependency name inside a URL path.
fn is_name_boundary(byte: u8) -> bool {
    matches!(byte, b'/' | b'.' | b'-' | b'_')
}

fn has_boundary_match(haystack: &str, needle: &str) -> bool {
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(found) = haystack[from..].find(needle) {
        let start = from + found;
        let end = start + needle.len();
        let before_ok = start == 0 || is_name_boundary(bytes[start - 1]);
        let after_ok = end == bytes.len() || is_name_boundary(bytes[end]);
        if before_ok && after_ok {
            return true;
        }
        from = start + 1;
    }
    false
}

/// Match a URL against the catalog's heavy-dependency names.
///
/// Case-insensitive; an occurrence only counts when the name is bounded on
/// both sides by a path separator, dot, hyphen, underscore, or the string
/// edge, so `my-lodashthing.js` does not match `lodash`. The first catalog
/// entry that matches wins — declaration order is the documented tie-break,
/// not a correctness property.
///
/// # Example
///
/// ```
/// use pagescope::suggest::{detect_heavy_dependency, AlternativesCatalog};
///
/// let catalog = AlternativesCatalog::default();
/// let hit = detect_heavy_dependency("https://cdn.example.net/lodash.min.js", &catalog);
/// assert_eq!(hit.as_deref(), Some("lodash"));
/// ```
pub fn detect_heavy_dependency(url: &str, catalog: &AlternativesCatalog) -> Option<String> {
    let lowered = url.to_lowercase();
    catalog
        .names()
        .find(|name| has_boundary_match(&lowered, &name.to_lowercase()))
        .map(|name| name.to_string())
}

/// Rank JS coverage entries into code-split suggestions.
///
/// Entries below the caller's size or wasted-percent minimums are skipped;
/// the rest are sorted by priority (critical first), ties broken by wasted
/// bytes descending.
pub fn code_split_suggestions(
    entries: &[CoverageEntry],
    catalog: &AlternativesCatalog,
    options: &SuggestOptions,
) -> Vec<CodeSplitSuggestion> {
    let min_bytes = options.min_bundle_size_kb * 1024;

    let mut suggestions: Vec<CodeSplitSuggestion> = entries
        .iter()
        .filter(|entry| {
            entry.total_bytes >= min_bytes
                && (100.0 - entry.usage_percent) >= options.min_unused_percent
        })
        .map(|entry| CodeSplitSuggestion {
            url: entry.url.clone(),
            priority: priority_for(entry.unused_bytes, 100.0 - entry.usage_percent),
            total_bytes: entry.total_bytes,
            used_bytes: entry.used_bytes,
            unused_bytes: entry.unused_bytes,
            usage_percent: entry.usage_percent,
            is_external: entry.is_external,
            detected_dependency: detect_heavy_dependency(&entry.url, catalog),
        })
        .collect();

    suggestions.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(b.unused_bytes.cmp(&a.unused_bytes))
    });

    suggestions
}

/// Select bundles suited to deferred loading.
///
/// Only first-party, under-half-used code qualifies: a vendor bundle's
/// remediation is the alternatives table, not a lazy import.
pub fn lazy_load_candidates(suggestions: &[CodeSplitSuggestion]) -> Vec<&CodeSplitSuggestion> {
    suggestions
        .iter()
        .filter(|s| s.usage_percent < 50.0 && !s.is_external)
        .collect()
}

/// Scripts that loaded as one sequential chain and could ship as one bundle.
///
/// Derived from a single observed page load; the scripts were loaded
/// together this session, which does not prove they always are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMergeSuggestion {
    /// Script URLs in chain order.
    pub urls: Vec<String>,

    /// Number of scripts in the chain.
    pub depth: usize,

    /// Sum of all script sizes along the chain.
    pub combined_size_bytes: u64,

    /// Elapsed time the chain occupied, milliseconds.
    pub total_time_ms: f64,
}

/// Propose merging every retained chain of two or more scripts.
pub fn merge_candidates(chains: &[BundleChain]) -> Vec<ChainMergeSuggestion> {
    chains
        .iter()
        .filter(|chain| chain.depth >= 2)
        .map(|chain| ChainMergeSuggestion {
            urls: chain.urls.clone(),
            depth: chain.depth,
            combined_size_bytes: chain.combined_size_bytes(),
            total_time_ms: chain.total_time_ms,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{ChainDetector, ChainOptions, NetworkTimingRecord};
    use crate::suggest::alternatives::{DependencyAlternative, Effort};

    fn entry(url: &str, total_bytes: u64, used_bytes: u64, is_external: bool) -> CoverageEntry {
        CoverageEntry {
            url: url.to_string(),
            total_bytes,
            used_bytes,
            unused_bytes: total_bytes - used_bytes,
            usage_percent: if total_bytes > 0 {
                (used_bytes as f64 / total_bytes as f64) * 100.0
            } else {
                0.0
            },
            is_external,
        }
    }

    #[test]
    fn test_priority_ladder() {
        assert_eq!(priority_for(200 * 1024, 10.0), Priority::Critical);
        assert_eq!(priority_for(1024, 60.0), Priority::Critical);
        assert_eq!(priority_for(60 * 1024, 10.0), Priority::High);
        assert_eq!(priority_for(1024, 35.0), Priority::High);
        assert_eq!(priority_for(30 * 1024, 10.0), Priority::Medium);
        assert_eq!(priority_for(1024, 21.0), Priority::Medium);
        assert_eq!(priority_for(1024, 5.0), Priority::Low);
    }

    #[test]
    fn test_priority_boundaries_are_strict() {
        // Exactly at a threshold falls to the lower tier on both legs.
        assert_eq!(priority_for(100 * 1024, 50.0), Priority::High);
        assert_eq!(priority_for(100 * 1024 + 1, 0.0), Priority::Critical);
        assert_eq!(priority_for(0, 50.1), Priority::Critical);
        assert_eq!(priority_for(50 * 1024, 30.0), Priority::Medium);
        assert_eq!(priority_for(20 * 1024, 20.0), Priority::Low);
    }

    #[test]
    fn test_heavy_dependency_boundary_matching() {
        let catalog = AlternativesCatalog::default();

        assert_eq!(
            detect_heavy_dependency("https://cdn.example.net/lodash.js", &catalog).as_deref(),
            Some("lodash")
        );
        assert_eq!(
            detect_heavy_dependency(
                "https://app.example.com/node_modules/lodash/lodash.js",
                &catalog
            )
            .as_deref(),
            Some("lodash")
        );
        assert_eq!(
            detect_heavy_dependency("https://cdn.example.net/Moment.MIN.js", &catalog).as_deref(),
            Some("moment")
        );
        assert_eq!(
            detect_heavy_dependency("https://app.example.com/js/my-lodashthing.js", &catalog),
            None
        );
        assert_eq!(
            detect_heavy_dependency("https://app.example.com/js/app.js", &catalog),
            None
        );
    }

    #[test]
    fn test_heavy_dependency_declaration_order_tie_break() {
        let catalog = AlternativesCatalog::with_entries(vec![
            (
                "react".to_string(),
                vec![DependencyAlternative::new("preact", 30, Effort::Medium)],
            ),
            (
                "react-dom".to_string(),
                vec![DependencyAlternative::new("preact", 100, Effort::Medium)],
            ),
        ]);

        // Both names match this URL; the earlier entry wins.
        let hit = detect_heavy_dependency("https://cdn.example.net/react-dom.js", &catalog);
        assert_eq!(hit.as_deref(), Some("react"));
    }

    #[test]
    fn test_suggestions_filtered_and_sorted() {
        let entries = vec![
            // Below size floor.
            entry("https://app.example.com/tiny.js", 10 * 1024, 0, false),
            // Barely wasteful: 10% unused, filtered out.
            entry("https://app.example.com/tight.js", 100 * 1024, 92160, false),
            // High by percent: 60 KB total, 50% unused = 30 KB.
            entry("https://app.example.com/mid.js", 60 * 1024, 30 * 1024, false),
            // Critical: 300 KB total, 200 KB unused.
            entry("https://app.example.com/big.js", 300 * 1024, 100 * 1024, false),
            // High: 120 KB total, 40 KB unused (33%).
            entry("https://app.example.com/high.js", 120 * 1024, 80 * 1024, false),
        ];

        let suggestions = code_split_suggestions(
            &entries,
            &AlternativesCatalog::default(),
            &SuggestOptions::default(),
        );

        let urls: Vec<_> = suggestions.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://app.example.com/big.js",
                "https://app.example.com/high.js",
                "https://app.example.com/mid.js",
            ]
        );
        assert_eq!(suggestions[0].priority, Priority::Critical);
        assert_eq!(suggestions[1].priority, Priority::High);
    }

    #[test]
    fn test_priority_ties_break_by_unused_bytes() {
        let entries = vec![
            entry("https://app.example.com/a.js", 200 * 1024, 40 * 1024, false),
            entry("https://app.example.com/b.js", 300 * 1024, 60 * 1024, false),
        ];

        let suggestions = code_split_suggestions(
            &entries,
            &AlternativesCatalog::default(),
            &SuggestOptions::default(),
        );

        // Both critical; b wastes more and leads.
        assert_eq!(suggestions[0].url, "https://app.example.com/b.js");
        assert_eq!(suggestions[0].priority, suggestions[1].priority);
    }

    #[test]
    fn test_suggestion_carries_detected_dependency() {
        let entries = vec![entry(
            "https://cdn.example.net/moment.min.js",
            290 * 1024,
            30 * 1024,
            true,
        )];

        let suggestions = code_split_suggestions(
            &entries,
            &AlternativesCatalog::default(),
            &SuggestOptions::default(),
        );

        assert_eq!(suggestions[0].detected_dependency.as_deref(), Some("moment"));
    }

    #[test]
    fn test_lazy_load_candidates_first_party_underused_only() {
        let entries = vec![
            entry("https://app.example.com/admin.js", 200 * 1024, 40 * 1024, false),
            entry("https://cdn.example.net/vendor.js", 200 * 1024, 40 * 1024, true),
            entry("https://app.example.com/core.js", 200 * 1024, 150 * 1024, false),
        ];

        let suggestions = code_split_suggestions(
            &entries,
            &AlternativesCatalog::default(),
            &SuggestOptions::default(),
        );
        let lazy = lazy_load_candidates(&suggestions);

        assert_eq!(lazy.len(), 1);
        assert_eq!(lazy[0].url, "https://app.example.com/admin.js");
    }

    #[test]
    fn test_merge_candidates_sum_chain_sizes() {
        let records = vec![
            NetworkTimingRecord {
                url: "https://app.example.com/a.js".to_string(),
                resource_type: "script".to_string(),
                start_time_ms: Some(0.0),
                end_time_ms: Some(100.0),
                size_bytes: 1000,
            },
            NetworkTimingRecord {
                url: "https://app.example.com/b.js".to_string(),
                resource_type: "script".to_string(),
                start_time_ms: Some(110.0),
                end_time_ms: Some(250.0),
                size_bytes: 2500,
            },
        ];

        let chains = ChainDetector::default().detect(&records, &ChainOptions::default());
        let merges = merge_candidates(&chains);

        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].combined_size_bytes, 3500);
        assert_eq!(merges[0].depth, 2);
        assert_eq!(merges[0].urls.len(), 2);
    }

    #[test]
    fn test_empty_inputs_yield_empty_outputs() {
        let catalog = AlternativesCatalog::default();

        assert!(code_split_suggestions(&[], &catalog, &SuggestOptions::default()).is_empty());
        assert!(lazy_load_candidates(&[]).is_empty());
        assert!(merge_candidates(&[]).is_empty());
    }

    #[test]
    fn test_suggest_options_validation() {
        assert!(SuggestOptions::new(0, 0.0).is_ok());
        assert!(SuggestOptions::new(50, 100.0).is_ok());
        assert!(matches!(
            SuggestOptions::new(50, 100.5),
            Err(SuggestOptionsError::InvalidUnusedPercent(_))
        ));
        assert!(SuggestOptions::new(50, -1.0).is_err());
        assert!(SuggestOptions::new(50, f64::NAN).is_err());
    }
}
