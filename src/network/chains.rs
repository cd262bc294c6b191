//! Sequential script-chain detection.
//!
//! Reconstructs bundle-loading chains from network timing records: a chain
//! is a run of script loads where each request starts within a short window
//! after the previous one finished, implying the later script was only
//! discovered once the earlier one had executed. Chained loads serialize the
//! network and inflate time-to-interactive; parallel loads do not.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum gap between one script finishing and the next starting for the
/// two to count as sequentially discovered, in milliseconds.
pub const GAP_THRESHOLD_MS: f64 = 50.0;

/// Smallest meaningful chain depth.
pub const MIN_CHAIN_DEPTH: usize = 2;

/// One network request as delivered by the network provider.
///
/// Requests that never produced a response carry no timing and are skipped
/// by chain detection rather than treated as errors. A missing size header
/// degrades to 0.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTimingRecord {
    /// Request URL.
    pub url: String,

    /// Provider resource-type tag; chain detection keeps `"script"` records
    /// (case-insensitive).
    #[serde(default)]
    pub resource_type: String,

    /// Wall-clock request start, milliseconds.
    #[serde(default)]
    pub start_time_ms: Option<f64>,

    /// Wall-clock response completion, milliseconds.
    #[serde(default)]
    pub end_time_ms: Option<f64>,

    /// Response body size in bytes, 0 when unknown.
    #[serde(default)]
    pub size_bytes: u64,
}

impl NetworkTimingRecord {
    fn is_script(&self) -> bool {
        self.resource_type.eq_ignore_ascii_case("script")
    }
}

/// One script load inside a chain. Linear: at most one child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleChainNode {
    /// Script URL.
    pub url: String,

    /// Response size in bytes, 0 when unknown.
    pub size_bytes: u64,

    /// Request start, milliseconds.
    pub start_time_ms: f64,

    /// Response completion, milliseconds.
    pub end_time_ms: f64,

    /// `end_time_ms - start_time_ms`.
    pub load_time_ms: f64,

    /// The script discovered by this one, if the chain continues.
    pub child: Option<Box<BundleChainNode>>,
}

/// A detected sequential loading chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleChain {
    /// Number of scripts in the chain.
    pub depth: usize,

    /// Elapsed time from the head's start to the tail's end.
    pub total_time_ms: f64,

    /// Script URLs in chain order.
    pub urls: Vec<String>,

    /// Head of the linked node list.
    pub root: BundleChainNode,
}

impl BundleChain {
    /// Walk the chain from head to tail.
    pub fn nodes(&self) -> impl Iterator<Item = &BundleChainNode> {
        std::iter::successors(Some(&self.root), |node| node.child.as_deref())
    }

    /// Sum of all node sizes along the chain.
    pub fn combined_size_bytes(&self) -> u64 {
        self.nodes().map(|node| node.size_bytes).sum()
    }
}

/// Errors for caller-supplied chain-detection parameters.
#[derive(Debug, Error)]
pub enum ChainOptionsError {
    /// A one-script "chain" is just a script; depth must allow a successor.
    #[error("minimum chain depth must be at least {MIN_CHAIN_DEPTH}, got {0}")]
    DepthTooSmall(usize),

    /// Elapsed-time filter must be a non-negative number.
    #[error("minimum chain time must be a non-negative number of milliseconds, got {0}")]
    InvalidMinTime(f64),
}

/// Thresholds a chain must meet to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainOptions {
    /// Minimum node count, at least 2.
    pub min_depth: usize,

    /// Minimum elapsed time from head start to tail end, milliseconds.
    pub min_total_time_ms: f64,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            min_depth: MIN_CHAIN_DEPTH,
            min_total_time_ms: 100.0,
        }
    }
}

impl ChainOptions {
    /// Validate caller-supplied thresholds.
    pub fn new(min_depth: usize, min_total_time_ms: f64) -> Result<Self, ChainOptionsError> {
        if min_depth < MIN_CHAIN_DEPTH {
            return Err(ChainOptionsError::DepthTooSmall(min_depth));
        }
        if !min_total_time_ms.is_finite() || min_total_time_ms < 0.0 {
            return Err(ChainOptionsError::InvalidMinTime(min_total_time_ms));
        }
        Ok(Self {
            min_depth,
            min_total_time_ms,
        })
    }
}

/// A timed script, flattened for the assign-once walk.
#[derive(Debug, Clone)]
struct TimedScript {
    url: String,
    size_bytes: u64,
    start_ms: f64,
    end_ms: f64,
}

/// Detects sequential loading chains from network records.
///
/// The adjacency window is injectable so tests can tighten or widen it;
/// `Default` uses [`GAP_THRESHOLD_MS`].
///
/// # Example
///
/// ```ignore
/// use pagescope::network::{ChainDetector, ChainOptions};
///
/// let detector = ChainDetector::default();
/// let chains = detector.detect(&records, &ChainOptions::default());
/// for chain in &chains {
///     println!("{} scripts over {:.0} ms", chain.depth, chain.total_time_ms);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChainDetector {
    gap_threshold_ms: f64,
}

impl Default for ChainDetector {
    fn default() -> Self {
        Self {
            gap_threshold_ms: GAP_THRESHOLD_MS,
        }
    }
}

impl ChainDetector {
    /// Create a detector with a custom adjacency window.
    pub fn with_gap_threshold(gap_threshold_ms: f64) -> Self {
        Self { gap_threshold_ms }
    }

    /// Reconstruct loading chains from the page's network records.
    ///
    /// Non-script records and scripts without resolvable timing are skipped.
    /// Scripts are sorted by end time (stable, so identical timestamps keep
    /// their input order) and consumed by a greedy assign-once walk: each
    /// chain grows by taking the first unassigned script whose start falls
    /// within the adjacency window after the current end. A script belongs
    /// to at most one chain; chains failing the depth or elapsed-time
    /// thresholds are dropped without releasing their scripts.
    ///
    /// The result is deterministic for a fixed input and, for distinct
    /// timestamps, independent of the original record order.
    pub fn detect(
        &self,
        records: &[NetworkTimingRecord],
        options: &ChainOptions,
    ) -> Vec<BundleChain> {
        let mut scripts: Vec<TimedScript> = records
            .iter()
            .filter(|record| record.is_script())
            .filter_map(|record| {
                let (start_ms, end_ms) = match (record.start_time_ms, record.end_time_ms) {
                    (Some(start), Some(end)) => (start, end),
                    _ => return None,
                };
                Some(TimedScript {
                    url: record.url.clone(),
                    size_bytes: record.size_bytes,
                    start_ms,
                    end_ms,
                })
            })
            .collect();

        scripts.sort_by(|a, b| a.end_ms.total_cmp(&b.end_ms));

        let mut assigned = vec![false; scripts.len()];
        let mut chains = Vec::new();

        for head in 0..scripts.len() {
            if assigned[head] {
                continue;
            }
            assigned[head] = true;

            let mut links = vec![head];
            let mut current_end = scripts[head].end_ms;

            loop {
                let successor = (0..scripts.len()).find(|&candidate| {
                    !assigned[candidate]
                        && scripts[candidate].start_ms >= current_end
                        && scripts[candidate].start_ms <= current_end + self.gap_threshold_ms
                });
                match successor {
                    Some(next) => {
                        assigned[next] = true;
                        current_end = scripts[next].end_ms;
                        links.push(next);
                    }
                    None => break,
                }
            }

            let total_time_ms = current_end - scripts[head].start_ms;
            if links.len() < options.min_depth || total_time_ms < options.min_total_time_ms {
                continue;
            }

            let mut child: Option<Box<BundleChainNode>> = None;
            for &idx in links.iter().rev() {
                let script = &scripts[idx];
                child = Some(Box::new(BundleChainNode {
                    url: script.url.clone(),
                    size_bytes: script.size_bytes,
                    start_time_ms: script.start_ms,
                    end_time_ms: script.end_ms,
                    load_time_ms: script.end_ms - script.start_ms,
                    child,
                }));
            }

            if let Some(root) = child {
                chains.push(BundleChain {
                    depth: links.len(),
                    total_time_ms,
                    urls: links.iter().map(|&idx| scripts[idx].url.clone()).collect(),
                    root: *root,
                });
            }
        }

        tracing::debug!(
            scripts = scripts.len(),
            chains = chains.len(),
            "chain detection finished"
        );

        chains
    }
}
