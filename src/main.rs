//! PageScope CLI entrypoint.
//!
//! Replays captured instrumentation data (coverage records and network
//! request timings, as JSON files) through the analysis engine and renders
//! the resulting reports.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pagescope::coverage::OriginClassifier;
use pagescope::network::{ChainDetector, ChainOptions, NetworkTimingRecord};
use pagescope::paginate::PageRequest;
use pagescope::render;
use pagescope::session::{
    chain_analysis, code_split_analysis, start_tracking, stop_tracking, CoverageCapture,
    CoverageProvider, NetworkProvider, ProviderError, SessionError, SessionState, StartOptions,
};
use pagescope::suggest::{lazy_load_candidates, merge_candidates, AlternativesCatalog, SuggestOptions};

#[derive(Parser)]
#[command(name = "pagescope")]
#[command(version)]
#[command(about = "Web page resource analyzer surfacing unused bytes and sequential script load chains", long_about = None)]
struct Cli {
    /// Log level filter (e.g. "debug", "pagescope=trace")
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze byte coverage from a captured tracking session
    Coverage {
        /// Capture file holding js/css coverage records
        #[arg(short, long)]
        records: PathBuf,

        /// URL of the analyzed page
        #[arg(short, long)]
        page_url: String,

        /// Entries per page (1-5)
        #[arg(long, default_value_t = 5)]
        page_size: usize,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Detect sequential script loading chains from network records
    Chains {
        /// File holding the page's network timing records
        #[arg(short = 'r', long)]
        requests: PathBuf,

        /// Minimum scripts per reported chain (at least 2)
        #[arg(long, default_value_t = 2)]
        min_depth: usize,

        /// Minimum elapsed chain time in milliseconds
        #[arg(long, default_value_t = 100.0)]
        min_time_ms: f64,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate bundle optimization suggestions from a captured session
    Suggest {
        /// Capture file holding js/css coverage records
        #[arg(short, long)]
        records: PathBuf,

        /// URL of the analyzed page
        #[arg(short, long)]
        page_url: String,

        /// Smallest bundle worth reporting, in kilobytes
        #[arg(long, default_value_t = 50)]
        min_bundle_kb: u64,

        /// Smallest wasted percentage worth reporting (0-100)
        #[arg(long, default_value_t = 20.0)]
        min_unused_percent: f64,

        /// Suggestions per page (1-5)
        #[arg(long, default_value_t = 5)]
        page_size: usize,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Coverage provider replaying a capture file recorded by live tooling.
struct FileCoverageProvider {
    path: PathBuf,
}

impl CoverageProvider for FileCoverageProvider {
    fn begin(&mut self, _options: &StartOptions) -> Result<(), ProviderError> {
        Ok(())
    }

    fn end(&mut self) -> Result<CoverageCapture, ProviderError> {
        let content = read_provider_file(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|err| ProviderError::new(format!("invalid coverage capture: {}", err)))
    }
}

/// Network provider replaying recorded request timings.
struct FileNetworkProvider {
    path: PathBuf,
}

impl NetworkProvider for FileNetworkProvider {
    fn current_requests(
        &mut self,
        _include_all: bool,
    ) -> Result<Vec<NetworkTimingRecord>, ProviderError> {
        let content = read_provider_file(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|err| ProviderError::new(format!("invalid request records: {}", err)))
    }
}

fn read_provider_file(path: &Path) -> Result<String, ProviderError> {
    fs::read_to_string(path)
        .map_err(|err| ProviderError::new(format!("failed to read {}: {}", path.display(), err)))
}

fn invalid_parameter(err: impl std::fmt::Display) -> SessionError {
    SessionError::InvalidParameter(err.to_string())
}

fn replay_capture(records: PathBuf, page_url: &str, page: &PageRequest) -> Result<pagescope::coverage::CoverageReport> {
    let mut state = SessionState::new();
    let mut provider = FileCoverageProvider { path: records };

    start_tracking(&mut state, &mut provider, StartOptions::default())?;
    let report = stop_tracking(
        &mut state,
        &mut provider,
        page_url,
        page,
        &OriginClassifier::default(),
    )?;
    Ok(report)
}

fn run_coverage(
    records: PathBuf,
    page_url: String,
    page_size: usize,
    page_index: usize,
    json: bool,
) -> Result<()> {
    let page = PageRequest::new(page_size, page_index).map_err(invalid_parameter)?;
    let report = replay_capture(records, &page_url, &page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::coverage_report_to_string(&report)?);
    }
    Ok(())
}

fn run_chains(requests: PathBuf, min_depth: usize, min_time_ms: f64, json: bool) -> Result<()> {
    let options = ChainOptions::new(min_depth, min_time_ms).map_err(invalid_parameter)?;
    let mut provider = FileNetworkProvider { path: requests };

    let chains = chain_analysis(&mut provider, &ChainDetector::default(), &options)?;

    if json {
        let merges = merge_candidates(&chains);
        let payload = serde_json::json!({
            "chains": chains,
            "mergeCandidates": merges,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", render::chain_report_to_string(&chains)?);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_suggest(
    records: PathBuf,
    page_url: String,
    min_bundle_kb: u64,
    min_unused_percent: f64,
    page_size: usize,
    page_index: usize,
    json: bool,
) -> Result<()> {
    let page = PageRequest::new(page_size, page_index).map_err(invalid_parameter)?;
    let options = SuggestOptions::new(min_bundle_kb, min_unused_percent).map_err(invalid_parameter)?;
    let catalog = AlternativesCatalog::default();

    let mut state = SessionState::new();
    let mut provider = FileCoverageProvider { path: records };
    start_tracking(&mut state, &mut provider, StartOptions::default())?;
    stop_tracking(
        &mut state,
        &mut provider,
        &page_url,
        &PageRequest::default(),
        &OriginClassifier::default(),
    )?;

    let suggestions = code_split_analysis(&state, &catalog, &options)?;

    if json {
        let lazy = lazy_load_candidates(&suggestions);
        let payload = serde_json::json!({
            "suggestions": suggestions,
            "lazyLoadCandidates": lazy,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!(
            "{}",
            render::suggestion_report_to_string(&suggestions, &catalog, &page)?
        );
    }
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(&cli.log) {
        eprintln!("warning: failed to init tracing: {err:#}");
    }

    match cli.command {
        Commands::Coverage {
            records,
            page_url,
            page_size,
            page,
            json,
        } => run_coverage(records, page_url, page_size, page, json),
        Commands::Chains {
            requests,
            min_depth,
            min_time_ms,
            json,
        } => run_chains(requests, min_depth, min_time_ms, json),
        Commands::Suggest {
            records,
            page_url,
            min_bundle_kb,
            min_unused_percent,
            page_size,
            page,
            json,
        } => run_suggest(
            records,
            page_url,
            min_bundle_kb,
            min_unused_percent,
            page_size,
            page,
            json,
        ),
    }
}
