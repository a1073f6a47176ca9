//! API client. Every outbound request passes through the
//! [`RequestAuthorizer`] before it reaches the transport.

mod authorizer;
mod response;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use authorizer::{is_auth_endpoint, RequestAuthorizer};
pub use response::ApiResponse;
pub use transport::{ReqwestTransport, Transport, USER_AGENT};

use std::sync::Arc;

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Request};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::ApiError;

/// JSON client for the analyzer API, bound to one base URL.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    authorizer: RequestAuthorizer,
}

impl ApiClient {
    pub fn new(base_url: Url, transport: Arc<dyn Transport>, authorizer: RequestAuthorizer) -> Self {
        Self {
            base_url,
            transport,
            authorizer,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path such as `/api/extract` against the base URL.
    ///
    /// A base URL with a path prefix (`https://host/prefix`) keeps it.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// POST a JSON body and decode a JSON reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(path, body).await?;
        response.json().map_err(|e| ApiError::Decode {
            url: response.url.to_string(),
            message: e.to_string(),
        })
    }

    /// POST a JSON body and return the raw 2xx reply.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let payload = serde_json::to_vec(body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let mut request = Request::new(Method::POST, url);
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        *request.body_mut() = Some(payload.into());

        self.execute(request).await
    }

    /// Authorize and send a request. Non-2xx replies become
    /// [`ApiError::Status`].
    pub async fn execute(&self, mut request: Request) -> Result<ApiResponse, ApiError> {
        let authorized = self.authorizer.authorize(&mut request);
        let method = request.method().clone();
        let url = request.url().to_string();
        debug!("{} {} (authorized: {})", method, url, authorized);

        let response = self.transport.send(request).await?;
        debug!("{} {} -> {}", method, url, response.status);

        if !response.status.is_success() {
            return Err(ApiError::Status {
                url,
                status: response.status,
                body: response.text(),
            });
        }

        Ok(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
