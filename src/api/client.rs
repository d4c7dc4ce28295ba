use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::{server_message, TransportError};
use super::transport::{ApiRequest, ApiResponse, Method, Transport};

/// reqwest-backed transport with bearer-token auth.
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
  base_url: Url,
}

impl HttpTransport {
  pub fn new(config: &Config) -> Result<Self> {
    let api_key = Config::get_api_key()?;
    let base_url = config.base_url()?;
    Self::with_api_key(&base_url, &api_key, config.api.timeout())
  }

  pub fn with_api_key(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
    let base_url =
      Url::parse(base_url).map_err(|e| eyre!("Invalid API base URL {}: {}", base_url, e))?;
    if base_url.cannot_be_a_base() {
      return Err(eyre!("Invalid API base URL {}: not a base URL", base_url));
    }

    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
      .map_err(|e| eyre!("API key is not a valid header value: {}", e))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(timeout)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, base_url })
  }
}

/// Append a relative API path to the base URL as path segments.
fn endpoint(base_url: &Url, path: &str) -> Url {
  let mut url = base_url.clone();
  if let Ok(mut segments) = url.path_segments_mut() {
    segments
      .pop_if_empty()
      .extend(path.split('/').filter(|s| !s.is_empty()));
  }
  url
}

impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
    let url = endpoint(&self.base_url, &request.path);
    let builder = match request.method {
      Method::Get => self.client.get(url),
      Method::Post => self.client.post(url),
      Method::Put => self.client.put(url),
      Method::Delete => self.client.delete(url),
    };
    let builder = if request.query.is_empty() {
      builder
    } else {
      builder.query(&request.query)
    };
    let builder = match &request.body {
      Some(body) => builder.json(body),
      None => builder,
    };

    let response = builder
      .send()
      .await
      .map_err(|e| TransportError::network(e.to_string()))?;

    let status = response.status();
    debug!(method = %request.method, path = %request.path, status = status.as_u16(), "api response");

    let bytes = response
      .bytes()
      .await
      .map_err(|e| TransportError::from_status(status.as_u16(), None, Some(&e.to_string())))?;

    if !status.is_success() {
      let body: Option<Value> = serde_json::from_slice(&bytes).ok();
      let server = body.as_ref().and_then(server_message);
      return Err(TransportError::from_status(
        status.as_u16(),
        server,
        status.canonical_reason(),
      ));
    }

    let status = status.as_u16();
    if bytes.is_empty() {
      return Ok(ApiResponse {
        status,
        body: Value::Null,
      });
    }

    let body = serde_json::from_slice(&bytes).map_err(|e| TransportError::decode(status, &e))?;
    Ok(ApiResponse { status, body })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn join(base: &str, path: &str) -> String {
    endpoint(&Url::parse(base).unwrap(), path).to_string()
  }

  #[test]
  fn test_endpoint_appends_to_base_path() {
    assert_eq!(
      join("https://api.example.com/v1", "/clients/7/projects"),
      "https://api.example.com/v1/clients/7/projects"
    );
    assert_eq!(
      join("https://api.example.com/v1/", "/time-entries"),
      "https://api.example.com/v1/time-entries"
    );
  }

  #[test]
  fn test_endpoint_at_root() {
    assert_eq!(
      join("https://api.example.com", "/clients"),
      "https://api.example.com/clients"
    );
  }

  #[test]
  fn test_rejects_invalid_base_url() {
    assert!(HttpTransport::with_api_key("not a url", "k", Duration::from_secs(1)).is_err());
    assert!(HttpTransport::with_api_key("mailto:a@b.c", "k", Duration::from_secs(1)).is_err());
  }
}
