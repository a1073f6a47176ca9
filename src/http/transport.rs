//! The network seam under [`ApiClient`](super::ApiClient).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request};

use super::ApiResponse;
use crate::error::ApiError;

pub const USER_AGENT: &str = concat!("compann/", env!("CARGO_PKG_VERSION"));

/// Sends a fully prepared request and buffers the reply.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<ApiResponse, ApiError>;
}

/// Transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(USER_AGENT))
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<ApiResponse, ApiError> {
        let url = request.url().clone();
        let transport_error = |e: reqwest::Error| ApiError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.execute(request).await.map_err(transport_error)?;
        let status = response.status();

        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(ApiResponse {
            url,
            status,
            body,
        })
    }
}
