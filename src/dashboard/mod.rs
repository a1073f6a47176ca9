//! The extract-then-analyze workflow.
//!
//! [`Dashboard`] owns a [`WorkflowState`] cell and drives two chained API
//! calls. Network failures never escape: they are folded into the state's
//! error fields, which is what observers render.

mod models;
mod state;

pub use models::{AnalysisResult, ExtractRequest, Extraction, ExtractionResult};
pub use state::{Phase, WorkflowState};

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ValidationError};
use crate::http::ApiClient;
use crate::reactive::{Observable, Subject, Subscription};
use crate::session::SessionState;

pub const EXTRACT_PATH: &str = "/api/extract";
pub const ANALYZE_PATH: &str = "/api/analyze";

pub const ANALYSIS_PRECONDITION_MESSAGE: &str =
    "Cannot perform AI analysis. Initial data extraction was not successful or contained errors.";

const SESSION_EXPIRED_HINT: &str =
    ". Your session might have expired. Please try logging out and logging back in.";

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+$").expect("URL pattern is valid"));

/// Client-side check applied before a URL is submitted.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    if URL_PATTERN.is_match(url) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUrl)
    }
}

/// How a workflow step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The reply was stored.
    Applied,
    /// The call failed and the error was stored.
    Failed,
    /// Rejected before any request; the reason is in the state.
    Invalid,
    /// Another step is in flight. Nothing changed.
    Busy,
    /// A newer submission started while this call was in flight; its reply
    /// was dropped.
    Superseded,
}

/// Drives extraction and analysis for one user.
pub struct Dashboard {
    api: ApiClient,
    state: Subject<WorkflowState>,
    username: Subject<Option<String>>,
    _username_sync: Subscription,
}

impl Dashboard {
    pub fn new(api: ApiClient, session: &SessionState) -> Self {
        let username = Subject::new(session.username());
        let mirror = username.clone();
        let sync = session
            .username_changes()
            .subscribe(move |name: &Option<String>| mirror.set(name.clone()));

        Self {
            api,
            state: Subject::new(WorkflowState::default()),
            username,
            _username_sync: sync,
        }
    }

    /// Submit `url` for extraction.
    ///
    /// Any earlier extraction and analysis are cleared first. A submission
    /// made while another call is in flight supersedes it.
    pub async fn submit_url(&self, url: &str) -> StepOutcome {
        if let Err(e) = validate_url(url) {
            self.state.update(|s| s.reject_submission(e.to_string()));
            return StepOutcome::Invalid;
        }

        let generation = self.state.update(WorkflowState::begin_extraction);
        info!("Submitting {} for extraction", url);

        let request = ExtractRequest {
            url: url.to_string(),
        };
        let result = self
            .api
            .post_json::<_, ExtractionResult>(EXTRACT_PATH, &request)
            .await;

        let outcome = self.state.try_update(|s| {
            if s.generation != generation {
                return None;
            }
            s.extraction_loading = false;
            Some(match result {
                Ok(extraction) => {
                    if let Extraction::SoftError { title } = extraction.classify() {
                        warn!("Extraction of {} reported an issue: {}", url, title);
                        s.extraction_error = Some(format!("Extraction issue: {}", title));
                    }
                    s.extraction = Some(extraction);
                    StepOutcome::Applied
                }
                Err(e) => {
                    warn!("Extraction of {} failed: {}", url, e.log_line());
                    s.extraction_error = Some(failure_message("Error submitting URL", &e));
                    StepOutcome::Failed
                }
            })
        });

        outcome.unwrap_or_else(|| {
            debug!("Discarding stale extraction reply for {}", url);
            StepOutcome::Superseded
        })
    }

    /// Request AI analysis of the current extraction.
    pub async fn request_analysis(&self) -> StepOutcome {
        let started = self.state.try_update(|s| {
            let extraction = match &s.extraction {
                Some(e) if !e.has_soft_error() => e.clone(),
                _ => {
                    s.analysis_error = Some(ANALYSIS_PRECONDITION_MESSAGE.to_string());
                    s.analysis = None;
                    return Some(Err(StepOutcome::Invalid));
                }
            };
            if s.is_busy() {
                return None;
            }
            s.begin_analysis();
            Some(Ok((extraction, s.generation)))
        });

        let (extraction, generation) = match started {
            Some(Ok(started)) => started,
            Some(Err(outcome)) => {
                debug!("Analysis requested without a usable extraction");
                return outcome;
            }
            None => {
                debug!("Analysis requested while busy; ignoring");
                return StepOutcome::Busy;
            }
        };

        info!("Requesting analysis of {}", extraction.requested_url);
        let result = self
            .api
            .post_json::<_, AnalysisResult>(ANALYZE_PATH, &extraction)
            .await;

        let outcome = self.state.try_update(|s| {
            if s.generation != generation {
                return None;
            }
            s.analysis_loading = false;
            Some(match result {
                Ok(analysis) => {
                    s.analysis = Some(analysis);
                    StepOutcome::Applied
                }
                Err(e) => {
                    warn!(
                        "Analysis of {} failed: {}",
                        extraction.requested_url,
                        e.log_line()
                    );
                    s.analysis_error = Some(failure_message("Error getting AI analysis", &e));
                    StepOutcome::Failed
                }
            })
        });

        outcome.unwrap_or_else(|| {
            debug!(
                "Discarding stale analysis reply for {}",
                extraction.requested_url
            );
            StepOutcome::Superseded
        })
    }

    pub fn can_request_analysis(&self) -> bool {
        self.state.get().can_request_analysis()
    }

    pub fn phase(&self) -> Phase {
        self.state.get().phase()
    }

    pub fn state(&self) -> WorkflowState {
        self.state.get()
    }

    pub fn changes(&self) -> Observable<WorkflowState> {
        self.state.observable()
    }

    /// Display name of the logged-in user, kept in sync with the session.
    pub fn username(&self) -> Option<String> {
        self.username.get()
    }

    pub fn username_changes(&self) -> Observable<Option<String>> {
        self.username.observable()
    }
}

fn failure_message(prefix: &str, err: &ApiError) -> String {
    let mut message = format!("{}: {}", prefix, err);
    if err.is_auth_rejection() {
        message.push_str(SESSION_EXPIRED_HINT);
    }
    message
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("phase", &self.phase())
            .field("username", &self.username())
            .finish_non_exhaustive()
    }
}
