//! Extract-then-analyze workflow state.

use super::models::{AnalysisResult, ExtractionResult};

/// Coarse position in the workflow, derived from [`WorkflowState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ExtractingLoading,
    ExtractedReady,
    AnalyzingLoading,
    AnalyzedReady,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    pub extraction: Option<ExtractionResult>,
    pub analysis: Option<AnalysisResult>,
    pub extraction_error: Option<String>,
    pub analysis_error: Option<String>,
    pub extraction_loading: bool,
    pub analysis_loading: bool,
    /// Bumped by every accepted submission. Completions that captured an
    /// older value are discarded.
    pub generation: u64,
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        if self.extraction_loading {
            Phase::ExtractingLoading
        } else if self.analysis_loading {
            Phase::AnalyzingLoading
        } else if self.analysis.is_some() {
            Phase::AnalyzedReady
        } else if self.extraction.is_some() {
            Phase::ExtractedReady
        } else {
            Phase::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.extraction_loading || self.analysis_loading
    }

    /// An extraction exists, it carries no soft error, and nothing is in
    /// flight.
    pub fn can_request_analysis(&self) -> bool {
        self.extraction
            .as_ref()
            .is_some_and(|e| !e.has_soft_error())
            && !self.is_busy()
    }

    /// Reset for a new submission and return the new generation.
    pub(crate) fn begin_extraction(&mut self) -> u64 {
        self.generation += 1;
        self.extraction = None;
        self.analysis = None;
        self.extraction_error = None;
        self.analysis_error = None;
        self.extraction_loading = true;
        self.analysis_loading = false;
        self.generation
    }

    /// Record a submission rejected before any request. It still supersedes
    /// whatever is in flight; the previous analysis is left as it was.
    pub(crate) fn reject_submission(&mut self, error: String) {
        self.generation += 1;
        self.extraction = None;
        self.extraction_error = Some(error);
        self.extraction_loading = false;
        self.analysis_loading = false;
    }

    pub(crate) fn begin_analysis(&mut self) {
        self.analysis = None;
        self.analysis_error = None;
        self.analysis_loading = true;
    }
}
