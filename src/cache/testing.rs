//! Scripted in-memory transport for tests.

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{ApiRequest, ApiResponse, Transport, TransportError};

/// Replies to requests from a queue of canned responses and records every
/// request it sees. An exhausted queue answers with a 500.
#[derive(Clone, Default)]
pub struct MockTransport {
  responses: Arc<Mutex<VecDeque<Result<ApiResponse, TransportError>>>>,
  requests: Arc<Mutex<Vec<ApiRequest>>>,
  latency: Option<Duration>,
}

impl MockTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Delay every response, leaving room for other tasks to run mid-request.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  pub fn respond(&self, body: Value) -> &Self {
    self.respond_with_status(200, body)
  }

  pub fn respond_with_status(&self, status: u16, body: Value) -> &Self {
    self
      .responses
      .lock()
      .unwrap()
      .push_back(Ok(ApiResponse { status, body }));
    self
  }

  pub fn fail(&self, error: TransportError) -> &Self {
    self.responses.lock().unwrap().push_back(Err(error));
    self
  }

  pub fn requests(&self) -> Vec<ApiRequest> {
    self.requests.lock().unwrap().clone()
  }

  pub fn request_count(&self) -> usize {
    self.requests.lock().unwrap().len()
  }
}

impl Transport for MockTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
    self.requests.lock().unwrap().push(request);
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
    self
      .responses
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err(TransportError::from_status(500, None, None)))
  }
}
