//! Scripted in-memory transport for tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::{ApiError, ApiResult};

/// Replies with queued responses in order and records every request
///
/// Clones share the same script and log.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<ApiResult<ApiResponse>>,
    requests: Vec<ApiRequest>,
    yield_before_reply: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn push(&self, status: u16, body: Value) {
        self.inner
            .lock()
            .unwrap()
            .replies
            .push_back(Ok(ApiResponse { status, body }));
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: ApiError) {
        self.inner.lock().unwrap().replies.push_back(Err(error));
    }

    /// Suspend once before replying so concurrent callers interleave
    pub fn yield_before_reply(&self) {
        self.inner.lock().unwrap().yield_before_reply = true;
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let should_yield = {
            let mut state = self.inner.lock().unwrap();
            state.requests.push(request);
            state.yield_before_reply
        };
        if should_yield {
            tokio::task::yield_now().await;
        }
        self.inner
            .lock()
            .unwrap()
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".into())))
    }
}
