//! Test doubles shared across module tests

use crate::error::{Error, Result};
use crate::http::{ApiResponse, RequestConfig, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Transport that replays canned responses in order and records every request
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
    requests: Mutex<Vec<(String, RequestConfig)>>,
    base_url: Option<String>,
}

impl FakeTransport {
    pub(crate) fn new(responses: Vec<Result<ApiResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            base_url: None,
        }
    }

    /// Resolve relative paths against `base_url`
    pub(crate) fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// One 200 response per body, no headers
    pub(crate) fn with_bodies(bodies: Vec<Value>) -> Self {
        Self::new(bodies.into_iter().map(|b| Ok(ApiResponse::ok(b))).collect())
    }

    pub(crate) fn requests(&self) -> Vec<(String, RequestConfig)> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str, request: &RequestConfig) -> Result<ApiResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), request.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other(format!("unexpected request to {url}"))))
    }

    fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.starts_with("http") => format!("{base}{url}"),
            _ => url.to_string(),
        }
    }
}
