//! Coverage report aggregation.
//!
//! Builds the per-type (JS/CSS) coverage lists, sorted by wasted bytes, with
//! pagination metadata and a summary computed over the complete classified
//! sets. Building a report is pure over already-collected records; session
//! bookkeeping lives in [`crate::session`].

use serde::{Deserialize, Serialize};

use crate::coverage::classify::{CoverageEntry, CoverageRecord, OriginClassifier};
use crate::paginate::{paginate, PageInfo, PageRequest};

/// Aggregate byte statistics over every classified resource.
///
/// Computed from the full JS and CSS sets before pagination, so the totals
/// are independent of the requested page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    /// Number of resources across both types.
    pub total_files: usize,

    /// Sum of source lengths in bytes.
    pub total_bytes: u64,

    /// Sum of executed/applied bytes.
    pub used_bytes: u64,

    /// Sum of never-used bytes.
    pub unused_bytes: u64,

    /// Aggregate usage percentage; 0 when nothing was measured.
    pub usage_percent: f64,
}

impl CoverageSummary {
    fn accumulate(&mut self, entries: &[CoverageEntry]) {
        for entry in entries {
            self.total_files += 1;
            self.total_bytes += entry.total_bytes;
            self.used_bytes += entry.used_bytes;
            self.unused_bytes += entry.unused_bytes;
        }
        self.usage_percent = if self.total_bytes > 0 {
            (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
        } else {
            0.0
        };
    }
}

/// Coverage entries for one resource type.
///
/// `entries` holds the complete sorted list (wasted bytes descending, ties
/// in discovery order); `page` describes the requested window into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCoverage {
    /// All entries of this type, sorted by `unused_bytes` descending.
    pub entries: Vec<CoverageEntry>,

    /// Window metadata for the requested page.
    pub page: PageInfo,
}

impl TypeCoverage {
    /// The entries belonging to the requested page.
    pub fn page_entries(&self) -> &[CoverageEntry] {
        if self.page.start_index == 0 {
            &[]
        } else {
            &self.entries[self.page.start_index - 1..self.page.end_index]
        }
    }
}

/// The session's coverage analysis result.
///
/// Overwrites the previous report in the session slot on each successful
/// stop; types that were not tracked are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    /// URL of the analyzed page.
    pub page_url: String,

    /// JavaScript coverage, when JS tracking was enabled.
    pub js: Option<TypeCoverage>,

    /// CSS coverage, when CSS tracking was enabled.
    pub css: Option<TypeCoverage>,

    /// Totals over the complete classified sets of both types.
    pub summary: CoverageSummary,
}

impl CoverageReport {
    /// JS entries as a slice, empty when JS tracking was disabled.
    pub fn js_entries(&self) -> &[CoverageEntry] {
        self.js.as_ref().map(|t| t.entries.as_slice()).unwrap_or(&[])
    }

    /// CSS entries as a slice, empty when CSS tracking was disabled.
    pub fn css_entries(&self) -> &[CoverageEntry] {
        self.css.as_ref().map(|t| t.entries.as_slice()).unwrap_or(&[])
    }
}

/// Build a coverage report from raw provider records.
///
/// For each enabled type: classify every record, sort by wasted bytes
/// descending (stable, so equal entries keep discovery order), and compute
/// the requested window. The summary spans the full classified sets of both
/// types, not just the returned pages.
pub fn build_report(
    js_records: Option<&[CoverageRecord]>,
    css_records: Option<&[CoverageRecord]>,
    page_url: &str,
    page: &PageRequest,
    classifier: &OriginClassifier,
) -> CoverageReport {
    let mut summary = CoverageSummary::default();

    let mut build_type = |records: &[CoverageRecord]| {
        let mut entries: Vec<CoverageEntry> = records
            .iter()
            .map(|record| classifier.classify(record, page_url))
            .collect();
        entries.sort_by(|a, b| b.unused_bytes.cmp(&a.unused_bytes));
        summary.accumulate(&entries);

        let (_, info) = paginate(&entries, page);
        TypeCoverage {
            entries,
            page: info,
        }
    };

    let js = js_records.map(&mut build_type);
    let css = css_records.map(&mut build_type);

    CoverageReport {
        page_url: page_url.to_string(),
        js,
        css,
        summary,
    }
}
