//! Network timing analysis.
//!
//! Reconstructs sequential script-loading chains from the page's network
//! request records. A chain means each script was only discovered after the
//! previous one finished loading, serializing the network instead of
//! fetching in parallel.

pub mod chains;

// Re-export main types for convenience
pub use chains::{
    BundleChain, BundleChainNode, ChainDetector, ChainOptions, ChainOptionsError,
    NetworkTimingRecord, GAP_THRESHOLD_MS,
};
