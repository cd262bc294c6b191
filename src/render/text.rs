//! Plain-text report renderers.

use std::io::{self, Write};

use crate::coverage::{CoverageReport, TypeCoverage};
use crate::network::BundleChain;
use crate::paginate::{paginate, PageRequest};
use crate::render::{format_ms, format_size};
use crate::suggest::{
    lazy_load_candidates, merge_candidates, AlternativesCatalog, ChainMergeSuggestion,
    CodeSplitSuggestion,
};

fn write_type_section<W: Write>(
    writer: &mut W,
    label: &str,
    coverage: &TypeCoverage,
) -> io::Result<()> {
    let page = &coverage.page;
    writeln!(writer, "--- {} ---", label)?;
    writeln!(
        writer,
        "Showing {}-{} of {} (page {} of {})",
        page.start_index,
        page.end_index,
        page.total_items,
        page.current_page + 1,
        page.total_pages
    )?;

    for entry in coverage.page_entries() {
        let origin = if entry.is_external { "third-party" } else { "first-party" };
        writeln!(writer, "{} [{}]", entry.url, origin)?;
        writeln!(
            writer,
            "  Total: {}  Used: {} ({:.1}%)  Unused: {}",
            format_size(entry.total_bytes),
            format_size(entry.used_bytes),
            entry.usage_percent,
            format_size(entry.unused_bytes)
        )?;
    }
    writeln!(writer)
}

/// Render a coverage report: summary first, then the requested page of each
/// tracked resource type.
pub fn render_coverage_report<W: Write>(
    report: &CoverageReport,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "=== Coverage Report: {} ===", report.page_url)?;
    writeln!(writer)?;

    let summary = &report.summary;
    writeln!(writer, "Files analyzed: {}", summary.total_files)?;
    writeln!(writer, "Total shipped: {}", format_size(summary.total_bytes))?;
    writeln!(
        writer,
        "Used: {} ({:.1}%)",
        format_size(summary.used_bytes),
        summary.usage_percent
    )?;
    writeln!(writer, "Unused: {}", format_size(summary.unused_bytes))?;
    writeln!(writer)?;

    if let Some(js) = &report.js {
        write_type_section(writer, "JavaScript", js)?;
    }
    if let Some(css) = &report.css {
        write_type_section(writer, "CSS", css)?;
    }
    Ok(())
}

/// Render code-split suggestions with lazy-load candidates.
///
/// The suggestion list is windowed through the shared pagination utility;
/// lazy-load candidates are computed over the full list.
pub fn render_suggestion_report<W: Write>(
    suggestions: &[CodeSplitSuggestion],
    catalog: &AlternativesCatalog,
    page: &PageRequest,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "=== Bundle Optimization Suggestions ===")?;
    writeln!(writer)?;

    if suggestions.is_empty() {
        writeln!(writer, "No bundles matched the size and waste thresholds.")?;
        return Ok(());
    }

    let (window, info) = paginate(suggestions, page);
    writeln!(
        writer,
        "Showing {}-{} of {} (page {} of {})",
        info.start_index,
        info.end_index,
        info.total_items,
        info.current_page + 1,
        info.total_pages
    )?;
    writeln!(writer)?;

    for suggestion in window {
        let origin = if suggestion.is_external { "third-party" } else { "first-party" };
        writeln!(
            writer,
            "[{}] {} ({})",
            suggestion.priority.label(),
            suggestion.url,
            origin
        )?;
        writeln!(
            writer,
            "  Total: {}  Unused: {} ({:.1}%)",
            format_size(suggestion.total_bytes),
            format_size(suggestion.unused_bytes),
            suggestion.unused_percent()
        )?;
        if let Some(name) = &suggestion.detected_dependency {
            writeln!(writer, "  Detected dependency: {}", name)?;
            if let Some(alternatives) = catalog.alternatives_for(name) {
                for alternative in alternatives {
                    writeln!(
                        writer,
                        "    Alternative: {} (saves ~{} KB, {} effort)",
                        alternative.alternative,
                        alternative.size_savings_kb,
                        alternative.effort.label()
                    )?;
                }
            }
        }
        writeln!(writer)?;
    }

    let lazy = lazy_load_candidates(suggestions);
    if !lazy.is_empty() {
        writeln!(writer, "--- Lazy-load candidates ---")?;
        for candidate in lazy {
            writeln!(
                writer,
                "{} ({:.1}% used, {} unused)",
                candidate.url,
                candidate.usage_percent,
                format_size(candidate.unused_bytes)
            )?;
        }
    }
    Ok(())
}

fn write_merge_section<W: Write>(
    writer: &mut W,
    merges: &[ChainMergeSuggestion],
) -> io::Result<()> {
    writeln!(writer, "--- Merge candidates (observed in this session) ---")?;
    for merge in merges {
        writeln!(
            writer,
            "{} scripts, {} combined, {} on the critical path:",
            merge.depth,
            format_size(merge.combined_size_bytes),
            format_ms(merge.total_time_ms)
        )?;
        for url in &merge.urls {
            writeln!(writer, "  {}", url)?;
        }
    }
    Ok(())
}

/// Render detected loading chains and the merge candidates derived from
/// them.
pub fn render_chain_report<W: Write>(
    chains: &[BundleChain],
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "=== Sequential Loading Chains ===")?;
    writeln!(writer)?;

    if chains.is_empty() {
        writeln!(writer, "No sequential loading chains detected.")?;
        return Ok(());
    }

    for (index, chain) in chains.iter().enumerate() {
        writeln!(
            writer,
            "Chain {}: {} scripts over {}",
            index + 1,
            chain.depth,
            format_ms(chain.total_time_ms)
        )?;
        for (position, node) in chain.nodes().enumerate() {
            writeln!(
                writer,
                "  {}. {} ({}, {})",
                position + 1,
                node.url,
                format_size(node.size_bytes),
                format_ms(node.load_time_ms)
            )?;
        }
        writeln!(writer)?;
    }

    write_merge_section(writer, &merge_candidates(chains))
}

/// Render a coverage report to a string.
pub fn coverage_report_to_string(report: &CoverageReport) -> io::Result<String> {
    let mut buffer = Vec::new();
    render_coverage_report(report, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Render a suggestion report to a string.
pub fn suggestion_report_to_string(
    suggestions: &[CodeSplitSuggestion],
    catalog: &AlternativesCatalog,
    page: &PageRequest,
) -> io::Result<String> {
    let mut buffer = Vec::new();
    render_suggestion_report(suggestions, catalog, page, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Render a chain report to a string.
pub fn chain_report_to_string(chains: &[BundleChain]) -> io::Result<String> {
    let mut buffer = Vec::new();
    render_chain_report(chains, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
