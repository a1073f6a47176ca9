//! Wire types for the extract and analyze endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Marker that turns a successful extraction into a soft failure.
const SOFT_ERROR_MARKER: &str = "error:";

/// Body of `POST /api/extract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

/// What the backend scraped from a page.
///
/// The same value is posted back verbatim to `/api/analyze`, so unknown
/// fields are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub requested_url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub og_image_urls: Option<Vec<String>>,
    pub open_graph_tags: Option<BTreeMap<String, String>>,
    pub twitter_tags: Option<BTreeMap<String, String>>,
    pub social_media_links: Option<Vec<String>>,
    pub image_count: Option<u32>,
    pub open_graph_tag_count: Option<u32>,
    pub twitter_tag_count: Option<u32>,
    pub has_favicon: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// An extraction, classified by whether its title reports a failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extraction<'a> {
    Clean,
    SoftError { title: &'a str },
}

impl ExtractionResult {
    /// The backend reports some scrape failures as a 2xx whose title
    /// contains `error:` (any case).
    pub fn classify(&self) -> Extraction<'_> {
        match self.title.as_deref() {
            Some(title) if title.to_lowercase().contains(SOFT_ERROR_MARKER) => {
                Extraction::SoftError { title }
            }
            _ => Extraction::Clean,
        }
    }

    pub fn has_soft_error(&self) -> bool {
        matches!(self.classify(), Extraction::SoftError { .. })
    }
}

/// AI assessment of an extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: Option<String>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    pub opportunities: Option<Vec<String>>,
    pub red_flags: Option<Vec<String>>,
}
