//! Coverage record classification.
//!
//! This module turns raw per-resource coverage records (source length plus
//! executed byte ranges) into usage entries, and classifies each resource's
//! origin as first-party or third-party relative to the analyzed page.

use serde::{Deserialize, Serialize};
use url::Url;

/// Default vendor-bundle naming conventions checked on same-origin URLs.
///
/// Patterns starting and ending with `/` must appear as path segments;
/// the rest are matched anywhere in the lowercased path. This is a
/// heuristic: unconventionally named vendor bundles slip through, and a
/// first-party file that happens to use these tokens is misclassified.
const VENDOR_PATH_PATTERNS: &[&str] = &[
    "/vendor/",
    "/vendors/",
    "/node_modules/",
    "vendor.",
    "vendors-",
    "vendors~",
    "chunk.vendors",
];

/// A half-open byte interval `[start, end)` of executed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    /// Inclusive start offset.
    pub start: u64,

    /// Exclusive end offset.
    pub end: u64,
}

impl ByteRange {
    /// Length of the interval in bytes. Inverted ranges count as empty.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the interval covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw per-resource coverage data as delivered by the coverage provider.
///
/// Ranges are expected to be ordered, non-overlapping, and within
/// `[0, source_length]`; classification clamps rather than fails when a
/// provider breaks that expectation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRecord {
    /// Resource URL as reported by the instrumentation source.
    pub url: String,

    /// Total source length in bytes.
    #[serde(default)]
    pub source_length: u64,

    /// Byte ranges that were executed (JS) or applied (CSS).
    #[serde(default)]
    pub executed_ranges: Vec<ByteRange>,
}

/// Usage statistics derived from one coverage record.
///
/// Invariants: `used_bytes + unused_bytes == total_bytes` and
/// `0 <= usage_percent <= 100`, for any input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEntry {
    /// Resource URL.
    pub url: String,

    /// Total source length in bytes.
    pub total_bytes: u64,

    /// Bytes covered by at least one executed range.
    pub used_bytes: u64,

    /// Bytes never executed or applied.
    pub unused_bytes: u64,

    /// Used fraction as a percentage; 0 for empty sources.
    pub usage_percent: f64,

    /// True when the resource is cross-origin or matches a vendor-bundle
    /// naming convention on the page's own origin.
    pub is_external: bool,
}

/// Classifies coverage records against a page URL.
///
/// Holds the vendor-path pattern list so tests can substitute their own
/// conventions; `Default` uses the built-in list.
///
/// # Example
///
/// ```
/// use pagescope::coverage::{ByteRange, CoverageRecord, OriginClassifier};
///
/// let classifier = OriginClassifier::default();
/// let record = CoverageRecord {
///     url: "https://app.example.com/main.js".to_string(),
///     source_length: 1000,
///     executed_ranges: vec![ByteRange { start: 0, end: 250 }],
/// };
///
/// let entry = classifier.classify(&record, "https://app.example.com/");
/// assert_eq!(entry.used_bytes, 250);
/// assert_eq!(entry.unused_bytes, 750);
/// assert!(!entry.is_external);
/// ```
#[derive(Debug, Clone)]
pub struct OriginClassifier {
    vendor_patterns: Vec<String>,
}

impl Default for OriginClassifier {
    fn default() -> Self {
        Self {
            vendor_patterns: VENDOR_PATH_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl OriginClassifier {
    /// Create a classifier with a substitute vendor-pattern list.
    pub fn with_patterns(patterns: Vec<String>) -> Self {
        Self {
            vendor_patterns: patterns,
        }
    }

    /// Derive a usage entry from a raw coverage record.
    ///
    /// Pure and total: the same record always yields the same entry, and no
    /// input can make it fail. Ranges overshooting the source length are
    /// clamped so the entry invariants hold regardless.
    pub fn classify(&self, record: &CoverageRecord, page_url: &str) -> CoverageEntry {
        let total_bytes = record.source_length;
        let covered: u64 = record.executed_ranges.iter().map(ByteRange::len).sum();
        let used_bytes = covered.min(total_bytes);
        let unused_bytes = total_bytes - used_bytes;

        let usage_percent = if total_bytes > 0 {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        } else {
            0.0
        };

        CoverageEntry {
            url: record.url.clone(),
            total_bytes,
            used_bytes,
            unused_bytes,
            usage_percent,
            is_external: self.is_third_party(&record.url, page_url),
        }
    }

    /// Decide whether a resource URL is third-party relative to the page.
    ///
    /// `data:` and `blob:` URLs are always internal (inline code has no
    /// meaningful origin), and any URL that fails to parse is treated as
    /// internal rather than erroring. Cross-origin resources are external;
    /// same-origin resources are external only when their path matches a
    /// vendor-bundle naming convention.
    pub fn is_third_party(&self, resource_url: &str, page_url: &str) -> bool {
        if resource_url.starts_with("data:") || resource_url.starts_with("blob:") {
            return false;
        }

        let (resource, page) = match (Url::parse(resource_url), Url::parse(page_url)) {
            (Ok(resource), Ok(page)) => (resource, page),
            _ => return false,
        };

        if resource.origin() != page.origin() {
            return true;
        }

        let path = resource.path().to_lowercase();
        self.vendor_patterns.iter().any(|p| path.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://app.example.com/dashboard";

    fn record(url: &str, source_length: u64, ranges: &[(u64, u64)]) -> CoverageRecord {
        CoverageRecord {
            url: url.to_string(),
            source_length,
            executed_ranges: ranges
                .iter()
                .map(|&(start, end)| ByteRange { start, end })
                .collect(),
        }
    }

    #[test]
    fn test_classify_byte_invariants() {
        let classifier = OriginClassifier::default();
        let rec = record("https://app.example.com/main.js", 1000, &[(0, 100), (400, 650)]);

        let entry = classifier.classify(&rec, PAGE);

        assert_eq!(entry.total_bytes, 1000);
        assert_eq!(entry.used_bytes, 350);
        assert_eq!(entry.unused_bytes, 650);
        assert_eq!(entry.used_bytes + entry.unused_bytes, entry.total_bytes);
        assert!((entry.usage_percent - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_empty_source() {
        let classifier = OriginClassifier::default();
        let rec = record("https://app.example.com/empty.js", 0, &[]);

        let entry = classifier.classify(&rec, PAGE);

        assert_eq!(entry.total_bytes, 0);
        assert_eq!(entry.used_bytes, 0);
        assert_eq!(entry.unused_bytes, 0);
        assert_eq!(entry.usage_percent, 0.0);
    }

    #[test]
    fn test_classify_no_ranges_is_fully_unused() {
        let classifier = OriginClassifier::default();
        let rec = record("https://app.example.com/dead.js", 5000, &[]);

        let entry = classifier.classify(&rec, PAGE);

        assert_eq!(entry.used_bytes, 0);
        assert_eq!(entry.unused_bytes, 5000);
        assert_eq!(entry.usage_percent, 0.0);
    }

    #[test]
    fn test_classify_clamps_overshooting_ranges() {
        let classifier = OriginClassifier::default();
        // Provider bug: ranges cover more than the source length.
        let rec = record("https://app.example.com/odd.js", 100, &[(0, 80), (50, 130)]);

        let entry = classifier.classify(&rec, PAGE);

        assert_eq!(entry.used_bytes, 100);
        assert_eq!(entry.unused_bytes, 0);
        assert!(entry.usage_percent <= 100.0);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let classifier = OriginClassifier::default();
        let rec = record("https://cdn.example.net/lib.js", 4096, &[(128, 512)]);

        let first = classifier.classify(&rec, PAGE);
        let second = classifier.classify(&rec, PAGE);

        assert_eq!(first, second);
    }

    #[test]
    fn test_byte_range_len() {
        assert_eq!(ByteRange { start: 10, end: 25 }.len(), 15);
        assert_eq!(ByteRange { start: 5, end: 5 }.len(), 0);
        // Inverted range degrades to empty instead of underflowing.
        assert_eq!(ByteRange { start: 9, end: 3 }.len(), 0);
        assert!(ByteRange { start: 9, end: 3 }.is_empty());
    }

    #[test]
    fn test_third_party_cross_origin() {
        let classifier = OriginClassifier::default();

        assert!(classifier.is_third_party("https://cdn.example.net/lib.js", PAGE));
        assert!(classifier.is_third_party("https://other.com/app.js", PAGE));
        // Same host, different scheme is a different origin.
        assert!(classifier.is_third_party("http://app.example.com/main.js", PAGE));
        // Same host, explicit non-default port is a different origin.
        assert!(classifier.is_third_party("https://app.example.com:8443/main.js", PAGE));
    }

    #[test]
    fn test_same_origin_plain_path_is_internal() {
        let classifier = OriginClassifier::default();

        assert!(!classifier.is_third_party("https://app.example.com/static/main.js", PAGE));
        assert!(!classifier.is_third_party("https://app.example.com/app.css", PAGE));
    }

    #[test]
    fn test_same_origin_vendor_paths_are_external() {
        let classifier = OriginClassifier::default();

        assert!(classifier.is_third_party("https://app.example.com/vendor/lib.js", PAGE));
        assert!(classifier.is_third_party(
            "https://app.example.com/node_modules/react/index.js",
            PAGE
        ));
        assert!(classifier.is_third_party("https://app.example.com/js/vendors-main.js", PAGE));
        assert!(classifier.is_third_party("https://app.example.com/chunk.vendors.js", PAGE));
        assert!(classifier.is_third_party("https://app.example.com/VENDOR.bundle.js", PAGE));
    }

    #[test]
    fn test_data_and_blob_urls_are_internal() {
        let classifier = OriginClassifier::default();

        assert!(!classifier.is_third_party("data:text/javascript,console.log(1)", PAGE));
        assert!(!classifier.is_third_party(
            "blob:https://app.example.com/9115d58c-bcda-ff47",
            PAGE
        ));
    }

    #[test]
    fn test_malformed_urls_are_internal() {
        let classifier = OriginClassifier::default();

        assert!(!classifier.is_third_party("not a url", PAGE));
        assert!(!classifier.is_third_party("https://cdn.example.net/lib.js", "also not a url"));
        assert!(!classifier.is_third_party("", ""));
    }

    #[test]
    fn test_substitute_pattern_list() {
        let classifier = OriginClassifier::with_patterns(vec!["/third_party/".to_string()]);

        assert!(classifier.is_third_party("https://app.example.com/third_party/x.js", PAGE));
        // The built-in conventions are gone with a substitute list.
        assert!(!classifier.is_third_party("https://app.example.com/vendor/lib.js", PAGE));
    }

    #[test]
    fn test_record_deserializes_from_provider_json() {
        let json = r#"{
            "url": "https://app.example.com/main.js",
            "sourceLength": 2048,
            "executedRanges": [{"start": 0, "end": 512}]
        }"#;

        let rec: CoverageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.source_length, 2048);
        assert_eq!(rec.executed_ranges.len(), 1);
        assert_eq!(rec.executed_ranges[0].end, 512);
    }
}
