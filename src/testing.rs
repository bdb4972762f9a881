//! Scripted upstream for tests.

use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

#[derive(Clone, Debug)]
pub enum Canned {
    Json(Value),
    Status(u16),
    Unreachable,
    Hang,
}

/// Answers requests by URL prefix and records every call. Requests matching
/// no prefix fail as unreachable.
#[derive(Default)]
pub struct MockUpstream {
    routes: Mutex<Vec<(String, Canned)>>,
    calls: Mutex<Vec<UpstreamRequest>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url_prefix: &str, canned: Canned) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((url_prefix.to_string(), canned));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, url_prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.url.starts_with(url_prefix))
            .count()
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn get_json(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
        let canned = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
            .map(|(_, canned)| canned.clone());
        self.calls.lock().unwrap().push(request.clone());

        match canned {
            Some(Canned::Json(body)) => Ok(body),
            Some(Canned::Status(status)) => Err(UpstreamError::Status {
                status,
                body: String::new(),
            }),
            Some(Canned::Hang) => std::future::pending().await,
            Some(Canned::Unreachable) | None => {
                Err(UpstreamError::Unreachable(format!("no route to {}", request.url)))
            }
        }
    }
}
