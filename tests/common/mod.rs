//! Shared test support: a scripted in-process transport standing in for the
//! remote advertising platform.

use adclone::api::{GraphRequest, GraphTransport, Method, RemoteError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// Handler receives the request and how many calls to the same path came
/// before it, and decides the platform's answer.
type Handler = Box<dyn Fn(&GraphRequest, usize) -> Result<Value, RemoteError> + Send + Sync>;

pub struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<GraphRequest>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&GraphRequest, usize) -> Result<Value, RemoteError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GraphRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose path matches exactly
    pub fn calls_to(&self, path: &str) -> Vec<GraphRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.path == path)
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls_to(path).len()
    }

    pub fn posts_to(&self, path: &str) -> Vec<GraphRequest> {
        self.calls_to(path)
            .into_iter()
            .filter(|c| c.method == Method::Post)
            .collect()
    }
}

#[async_trait]
impl GraphTransport for MockTransport {
    async fn execute(&self, request: &GraphRequest) -> Result<Value, RemoteError> {
        let nth = {
            let mut calls = self.calls.lock().unwrap();
            let nth = calls.iter().filter(|c| c.path == request.path).count();
            calls.push(request.clone());
            nth
        };
        (self.handler)(request, nth)
    }
}

pub fn rate_limited() -> RemoteError {
    RemoteError::RateLimited {
        code: 17,
        message: "User request limit reached".to_string(),
    }
}

pub fn object_error(message: &str) -> RemoteError {
    RemoteError::Object {
        code: 100,
        status: Some(400),
        message: message.to_string(),
    }
}

pub fn auth_error() -> RemoteError {
    RemoteError::Auth {
        code: 190,
        message: "Error validating access token".to_string(),
    }
}
