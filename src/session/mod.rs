//! Session state and acquisition boundary.
//!
//! The engine itself is synchronous over materialized data; this module owns
//! the seam to the outside world: the coverage/network provider traits, the
//! per-session tracking state machine (`Idle -> Running -> Idle`), and the
//! error taxonomy for precondition violations and acquisition failures.
//!
//! The state machine guarantees that a stop always lands back in `Idle`,
//! even when the provider fails, and that the previously stored report
//! survives any failed stop: the new report is only written on success.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coverage::{build_report, CoverageRecord, CoverageReport, OriginClassifier};
use crate::network::{BundleChain, ChainDetector, ChainOptions, NetworkTimingRecord};
use crate::paginate::PageRequest;
use crate::suggest::{
    code_split_suggestions, AlternativesCatalog, CodeSplitSuggestion, SuggestOptions,
};

/// Failure reported by an external instrumentation provider.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    /// Wrap a provider-side failure description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by session operations.
///
/// Every variant is recoverable: precondition violations leave the session
/// untouched, and acquisition failures reset tracking to idle so the next
/// call starts from a well-defined state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `start` while a tracking session is running.
    #[error("coverage tracking is already running; stop it before starting again")]
    AlreadyTracking,

    /// `stop` without a running tracking session.
    #[error("no coverage tracking session is running")]
    NotTracking,

    /// `start` with both resource types disabled.
    #[error("at least one of JavaScript or CSS coverage must be enabled")]
    NothingEnabled,

    /// Suggestion analysis without a stored coverage report.
    #[error("no coverage report available; run a tracking session first")]
    NoReport,

    /// A caller-visible parameter failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The instrumentation provider failed while starting or stopping.
    #[error("coverage instrumentation failed: {0}")]
    Acquisition(#[from] ProviderError),
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Parameters for starting a tracking session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    /// Whether the provider should clear collected data on page navigation.
    pub reset_on_navigation: bool,

    /// Track JavaScript execution coverage.
    pub include_js: bool,

    /// Track CSS rule usage coverage.
    pub include_css: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            reset_on_navigation: false,
            include_js: true,
            include_css: true,
        }
    }
}

/// Which resource types the running session tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageOptions {
    /// JavaScript coverage enabled.
    pub include_js: bool,

    /// CSS coverage enabled.
    pub include_css: bool,
}

/// Raw records collected by the coverage provider for one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageCapture {
    /// JavaScript coverage records.
    #[serde(default)]
    pub js: Vec<CoverageRecord>,

    /// CSS coverage records.
    #[serde(default)]
    pub css: Vec<CoverageRecord>,
}

/// Instrumentation source for per-file byte-usage tracking.
pub trait CoverageProvider {
    /// Start collecting coverage. May fail; the session stays idle then.
    fn begin(&mut self, options: &StartOptions) -> Result<(), ProviderError>;

    /// Stop collecting and return everything gathered since `begin`.
    fn end(&mut self) -> Result<CoverageCapture, ProviderError>;
}

/// Instrumentation source for the page's network requests.
pub trait NetworkProvider {
    /// Requests observed for the current page. `include_all` asks for every
    /// request rather than the most recent page load only.
    fn current_requests(&mut self, include_all: bool)
        -> Result<Vec<NetworkTimingRecord>, ProviderError>;
}

/// Mutable per-session state, read and written only through accessors.
///
/// Holds the tracking flag, the enabled resource types, and the single
/// "last coverage report" slot that each successful stop overwrites.
#[derive(Debug, Default)]
pub struct SessionState {
    tracking: bool,
    options: CoverageOptions,
    last_report: Option<CoverageReport>,
}

impl SessionState {
    /// Create an idle session with nothing tracked and no stored report.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a tracking session is running.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Set the tracking flag.
    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
    }

    /// Resource types of the current or most recent session.
    pub fn coverage_options(&self) -> CoverageOptions {
        self.options
    }

    /// Record the resource types for a starting session.
    pub fn set_coverage_options(&mut self, options: CoverageOptions) {
        self.options = options;
    }

    /// The last successfully computed coverage report, if any.
    pub fn last_report(&self) -> Option<&CoverageReport> {
        self.last_report.as_ref()
    }

    /// Overwrite the stored coverage report.
    pub fn set_last_report(&mut self, report: CoverageReport) {
        self.last_report = Some(report);
    }
}

/// Begin a coverage tracking session: `Idle -> Running`.
///
/// Rejected without any state change when a session is already running or
/// neither resource type is enabled. A provider failure is logged and
/// surfaced, and the session stays idle.
pub fn start_tracking(
    state: &mut SessionState,
    provider: &mut dyn CoverageProvider,
    options: StartOptions,
) -> SessionResult<()> {
    if state.is_tracking() {
        return Err(SessionError::AlreadyTracking);
    }
    if !options.include_js && !options.include_css {
        return Err(SessionError::NothingEnabled);
    }

    provider.begin(&options).map_err(|err| {
        tracing::warn!(error = %err, "coverage instrumentation failed to start");
        SessionError::from(err)
    })?;

    state.set_coverage_options(CoverageOptions {
        include_js: options.include_js,
        include_css: options.include_css,
    });
    state.set_tracking(true);
    tracing::debug!(
        include_js = options.include_js,
        include_css = options.include_css,
        "coverage tracking started"
    );
    Ok(())
}

/// End the running session and build its report: `Running -> Idle`.
///
/// Rejected without state change when no session is running. The tracking
/// flag is cleared before the provider is asked to stop, so the transition
/// to idle happens even when acquisition fails; in that case the previously
/// stored report is left untouched and no partial report is published.
pub fn stop_tracking(
    state: &mut SessionState,
    provider: &mut dyn CoverageProvider,
    page_url: &str,
    page: &PageRequest,
    classifier: &OriginClassifier,
) -> SessionResult<CoverageReport> {
    if !state.is_tracking() {
        return Err(SessionError::NotTracking);
    }
    let options = state.coverage_options();
    state.set_tracking(false);

    let capture = provider.end().map_err(|err| {
        tracing::warn!(error = %err, "coverage instrumentation failed to stop");
        SessionError::from(err)
    })?;

    let report = build_report(
        options.include_js.then_some(capture.js.as_slice()),
        options.include_css.then_some(capture.css.as_slice()),
        page_url,
        page,
        classifier,
    );
    state.set_last_report(report.clone());
    tracing::debug!(
        files = report.summary.total_files,
        unused_bytes = report.summary.unused_bytes,
        "coverage report stored"
    );
    Ok(report)
}

/// Generate code-split suggestions from the session's stored report.
///
/// Fails with [`SessionError::NoReport`] when no tracking session has
/// completed yet.
pub fn code_split_analysis(
    state: &SessionState,
    catalog: &AlternativesCatalog,
    options: &SuggestOptions,
) -> SessionResult<Vec<CodeSplitSuggestion>> {
    let report = state.last_report().ok_or(SessionError::NoReport)?;
    Ok(code_split_suggestions(report.js_entries(), catalog, options))
}

/// Fetch the page's requests and detect sequential loading chains.
pub fn chain_analysis(
    provider: &mut dyn NetworkProvider,
    detector: &ChainDetector,
    options: &ChainOptions,
) -> SessionResult<Vec<BundleChain>> {
    let records = provider.current_requests(true).map_err(|err| {
        tracing::warn!(error = %err, "network provider failed");
        SessionError::from(err)
    })?;
    Ok(detector.detect(&records, options))
}
