//! Buffered HTTP response.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

/// HTTP response with its body already read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub url: Url,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Body as text. Invalid UTF-8 is replaced rather than rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
