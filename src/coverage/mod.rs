//! Byte-coverage analysis.
//!
//! Turns raw instrumentation records (source length + executed byte ranges)
//! into per-resource usage entries, and aggregates them into the session's
//! coverage report: per-type lists sorted by wasted bytes, pagination
//! metadata, and a summary over the full classified sets.
//!
//! # Example
//!
//! ```ignore
//! use pagescope::coverage::{build_report, OriginClassifier};
//! use pagescope::paginate::PageRequest;
//!
//! let classifier = OriginClassifier::default();
//! let report = build_report(Some(&js_records), None, page_url, &PageRequest::default(), &classifier);
//!
//! for entry in report.js_entries() {
//!     println!("{}: {} unused bytes", entry.url, entry.unused_bytes);
//! }
//! ```

pub mod classify;
pub mod report;

// Re-export main types for convenience
pub use classify::{ByteRange, CoverageEntry, CoverageRecord, OriginClassifier};
pub use report::{build_report, CoverageReport, CoverageSummary, TypeCoverage};
