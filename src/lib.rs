//! PageScope - Web page resource analyzer with unused-byte and load-chain insights
//!
//! This crate analyzes a page's runtime resource-loading behavior from
//! instrumentation data: per-file byte coverage and network request timing.
//! It surfaces shipped-but-unused JavaScript/CSS and sequential script
//! loading chains, and turns both into prioritized optimization suggestions.

pub mod coverage;
pub mod network;
pub mod paginate;
pub mod render;
pub mod session;
pub mod suggest;
