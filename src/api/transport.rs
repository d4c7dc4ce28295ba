//! Request/response contract between the cache and whatever carries requests to the API.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;

use super::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  Get,
  Post,
  Put,
  Delete,
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Delete => "DELETE",
    };
    f.write_str(name)
  }
}

/// A single outbound request, path relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  pub path: String,
  pub query: Vec<(String, String)>,
  pub body: Option<Value>,
}

impl ApiRequest {
  pub fn get(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
    Self {
      method: Method::Get,
      path: path.into(),
      query,
      body: None,
    }
  }

  pub fn post(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: Method::Post,
      path: path.into(),
      query: Vec::new(),
      body: Some(body),
    }
  }

  pub fn put(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: Method::Put,
      path: path.into(),
      query: Vec::new(),
      body: Some(body),
    }
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self {
      method: Method::Delete,
      path: path.into(),
      query: Vec::new(),
      body: None,
    }
  }

  /// Look up a query parameter by name.
  pub fn param(&self, name: &str) -> Option<&str> {
    self
      .query
      .iter()
      .find(|(k, _)| k == name)
      .map(|(_, v)| v.as_str())
  }
}

/// A successful reply: HTTP status plus the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
  pub status: u16,
  pub body: Value,
}

/// Carries requests to the remote API.
///
/// Implementations resolve failures into a [`TransportError`] and return the
/// status and JSON body on success. An empty body is returned as `Value::Null`.
pub trait Transport: Send + Sync {
  fn send(
    &self,
    request: ApiRequest,
  ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

/// Typed facade over a [`Transport`].
#[derive(Clone)]
pub struct Api<T> {
  transport: T,
}

impl<T: Transport> Api<T> {
  pub fn new(transport: T) -> Self {
    Self { transport }
  }

  pub async fn get<R: DeserializeOwned>(
    &self,
    path: &str,
    query: Vec<(String, String)>,
  ) -> Result<R, TransportError> {
    self.call(ApiRequest::get(path, query)).await
  }

  pub async fn post<R: DeserializeOwned>(
    &self,
    path: &str,
    body: &impl Serialize,
  ) -> Result<R, TransportError> {
    self.call(ApiRequest::post(path, encode(body)?)).await
  }

  pub async fn put<R: DeserializeOwned>(
    &self,
    path: &str,
    body: &impl Serialize,
  ) -> Result<R, TransportError> {
    self.call(ApiRequest::put(path, encode(body)?)).await
  }

  pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, TransportError> {
    self.call(ApiRequest::delete(path)).await
  }

  async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, TransportError> {
    let response = self.transport.send(request).await?;
    serde_json::from_value(response.body)
      .map_err(|e| TransportError::decode(response.status, &e))
  }
}

fn encode(body: &impl Serialize) -> Result<Value, TransportError> {
  serde_json::to_value(body)
    .map_err(|e| TransportError::new(0, format!("Failed to encode request body: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::testing::MockTransport;
  use serde_json::json;

  #[tokio::test]
  async fn test_decode_failure_keeps_received_status() {
    let transport = MockTransport::new();
    transport.respond_with_status(201, json!({ "id": "not a number" }));
    let api = Api::new(transport);

    let err = api
      .post::<Vec<u64>>("/time-entries", &json!({}))
      .await
      .unwrap_err();
    assert_eq!(err.status, 201);
    assert!(err.message.starts_with("Unexpected response format"));
  }

  #[tokio::test]
  async fn test_typed_get_decodes_body() {
    let transport = MockTransport::new();
    transport.respond(json!([1, 2, 3]));
    let api = Api::new(transport.clone());

    let ids: Vec<u64> = api
      .get("/clients", vec![("limit".into(), "3".into())])
      .await
      .unwrap();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(transport.requests()[0].param("limit"), Some("3"));
  }
}
