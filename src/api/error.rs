//! Typed transport failure with a human-readable message resolved from the HTTP status.

use thiserror::Error;

pub const RATE_LIMIT_MESSAGE: &str =
  "Rate limit exceeded - Please wait before making more requests";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request - Please check your input";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized - Please check your API key";
pub const SERVER_ERROR_MESSAGE: &str = "Internal server error - Please try again later";
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Failure of a request to the remote API.
///
/// `status` is the HTTP status code, or 0 when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
  pub status: u16,
  pub message: String,
}

impl TransportError {
  pub fn new(status: u16, message: impl Into<String>) -> Self {
    Self {
      status,
      message: message.into(),
    }
  }

  /// Build an error from a received status, resolving the user-facing message.
  pub fn from_status(
    status: u16,
    server_message: Option<&str>,
    transport_message: Option<&str>,
  ) -> Self {
    Self::new(
      status,
      resolve_message(status, server_message, transport_message),
    )
  }

  /// No response was received at all.
  pub fn network(transport_message: impl Into<String>) -> Self {
    let transport_message = transport_message.into();
    Self::from_status(0, None, Some(&transport_message))
  }

  /// The response arrived but its body did not have the expected shape.
  pub fn decode(status: u16, err: &serde_json::Error) -> Self {
    Self::new(status, format!("Unexpected response format: {}", err))
  }

  pub fn is_network(&self) -> bool {
    self.status == 0
  }

  /// The resolved message, or `fallback` when it is blank.
  pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
    if self.message.trim().is_empty() {
      fallback
    } else {
      &self.message
    }
  }
}

/// Map a status code plus whatever text is available to the message shown to the user.
pub fn resolve_message(
  status: u16,
  server_message: Option<&str>,
  transport_message: Option<&str>,
) -> String {
  let server_message = non_blank(server_message);

  match status {
    429 => RATE_LIMIT_MESSAGE.to_string(),
    404 => server_message.unwrap_or(NOT_FOUND_MESSAGE).to_string(),
    400 => server_message.unwrap_or(INVALID_REQUEST_MESSAGE).to_string(),
    401 => UNAUTHORIZED_MESSAGE.to_string(),
    500 => SERVER_ERROR_MESSAGE.to_string(),
    _ => server_message
      .or_else(|| non_blank(transport_message))
      .unwrap_or(FALLBACK_MESSAGE)
      .to_string(),
  }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
  s.filter(|s| !s.trim().is_empty())
}

/// Pull a server-supplied message out of an error response body.
///
/// Accepts `{"message": ".."}` or `{"error": ".."}`.
pub fn server_message(body: &serde_json::Value) -> Option<&str> {
  body
    .get("message")
    .and_then(|v| v.as_str())
    .or_else(|| body.get("error").and_then(|v| v.as_str()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rate_limit_ignores_server_message() {
    let err = TransportError::from_status(429, Some("slow down"), None);
    assert_eq!(err.to_string(), RATE_LIMIT_MESSAGE);
    assert_eq!(err.status, 429);
  }

  #[test]
  fn test_not_found_prefers_server_message() {
    assert_eq!(
      resolve_message(404, Some("Client 7 does not exist"), None),
      "Client 7 does not exist"
    );
    assert_eq!(resolve_message(404, None, None), NOT_FOUND_MESSAGE);
    assert_eq!(resolve_message(404, Some("  "), None), NOT_FOUND_MESSAGE);
  }

  #[test]
  fn test_bad_request() {
    assert_eq!(
      resolve_message(400, Some("comment is required"), None),
      "comment is required"
    );
    assert_eq!(resolve_message(400, None, None), INVALID_REQUEST_MESSAGE);
  }

  #[test]
  fn test_fixed_messages() {
    assert_eq!(
      resolve_message(401, Some("bad token"), None),
      UNAUTHORIZED_MESSAGE
    );
    assert_eq!(
      resolve_message(500, Some("stack trace"), None),
      SERVER_ERROR_MESSAGE
    );
  }

  #[test]
  fn test_other_status_fallback_chain() {
    assert_eq!(
      resolve_message(503, Some("maintenance"), Some("status 503")),
      "maintenance"
    );
    assert_eq!(resolve_message(503, None, Some("status 503")), "status 503");
    assert_eq!(resolve_message(503, None, None), FALLBACK_MESSAGE);
  }

  #[test]
  fn test_network_error_has_status_zero() {
    let err = TransportError::network("connection refused");
    assert!(err.is_network());
    assert_eq!(err.message, "connection refused");

    let err = TransportError::network("");
    assert_eq!(err.message, FALLBACK_MESSAGE);
  }

  #[test]
  fn test_message_or() {
    let err = TransportError::new(418, "");
    assert_eq!(err.message_or("Failed to fetch clients"), "Failed to fetch clients");

    let err = TransportError::new(418, "teapot");
    assert_eq!(err.message_or("Failed to fetch clients"), "teapot");
  }

  #[test]
  fn test_server_message_extraction() {
    let body = serde_json::json!({ "message": "nope" });
    assert_eq!(server_message(&body), Some("nope"));

    let body = serde_json::json!({ "error": "also nope" });
    assert_eq!(server_message(&body), Some("also nope"));

    let body = serde_json::json!({ "detail": 3 });
    assert_eq!(server_message(&body), None);
  }
}
