//! In-process transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request, StatusCode};
use tokio::sync::oneshot;
use url::Url;

use super::{ApiResponse, Transport};
use crate::error::ApiError;

/// What the transport saw for one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<serde_json::Value>,
}

enum Reply {
    Response(StatusCode, Vec<u8>),
    TransportError(String),
}

struct Scripted {
    reply: Reply,
    gate: Option<oneshot::Receiver<()>>,
}

/// Held reply. Dropping it without calling `release` also releases.
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

/// Replies with queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, reply: Reply, gate: Option<oneshot::Receiver<()>>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Scripted { reply, gate });
    }

    pub fn reply_json(&self, status: StatusCode, body: serde_json::Value) {
        self.push(Reply::Response(status, body.to_string().into_bytes()), None);
    }

    pub fn reply_text(&self, status: StatusCode, body: &str) {
        self.push(Reply::Response(status, body.as_bytes().to_vec()), None);
    }

    pub fn reply_transport_error(&self, message: &str) {
        self.push(Reply::TransportError(message.to_string()), None);
    }

    /// Queue a JSON reply that is only delivered once the gate is released.
    pub fn reply_later(&self, status: StatusCode, body: serde_json::Value) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.push(
            Reply::Response(status, body.to_string().into_bytes()),
            Some(rx),
        );
        Gate(tx)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn record(request: &Request) -> RecordedRequest {
    let header = |name: HeaderName| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    RecordedRequest {
        method: request.method().clone(),
        url: request.url().clone(),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body: request
            .body()
            .and_then(|b| b.as_bytes())
            .and_then(|b| serde_json::from_slice(b).ok()),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<ApiResponse, ApiError> {
        let recorded = record(&request);
        self.requests.lock().unwrap().push(recorded);

        let scripted = self.replies.lock().unwrap().pop_front();
        let Some(Scripted { reply, gate }) = scripted else {
            return Err(ApiError::Transport {
                url: request.url().to_string(),
                message: "no scripted reply".to_string(),
            });
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match reply {
            Reply::Response(status, body) => Ok(ApiResponse {
                url: request.url().clone(),
                status,
                body,
            }),
            Reply::TransportError(message) => Err(ApiError::Transport {
                url: request.url().to_string(),
                message,
            }),
        }
    }
}
