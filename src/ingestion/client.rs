//! # Resource Client Module
//!
//! ## Purpose
//! Authenticated HTTP wrapper for the congress.gov API. Owns the shared
//! connection pool, attaches the API key header and default response format,
//! negotiates JSON versus raw bytes by content type, and retries transient
//! server errors with exponential backoff.
//!
//! ## Input/Output Specification
//! - **Input**: `EndpointRequest` values (relative path + query) or absolute
//!   artifact URLs
//! - **Output**: `ApiBody::Json` for JSON responses, `ApiBody::Bytes` for
//!   everything else (document downloads return binary/HTML, not JSON)
//! - **Retry policy**: bounded attempts, exponential backoff, retrying only
//!   500/502/504 and transport-level failures
//!
//! ## Key Features
//! - Single shared session (connection pool + headers) for all calls
//! - Explicit request primitive instead of per-verb dynamic dispatch
//! - 403 on artifact downloads surfaces as a distinct outcome so the
//!   document resolver can trigger its fallback path without retrying

use crate::config::ApiConfig;
use crate::errors::{IngestError, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Status codes treated as transient and retried
const RETRYABLE_STATUS: [u16; 3] = [500, 502, 504];

/// An immutable description of one API request
#[derive(Debug, Clone)]
pub struct EndpointRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
}

impl EndpointRequest {
    /// GET request against a relative endpoint path, e.g.
    /// `bill/117/hr/3076/actions`
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append one query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Endpoint path, used for logging and error context
    pub fn endpoint(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

/// Response body after content negotiation
#[derive(Debug)]
pub enum ApiBody {
    /// Structured body (`content-type: application/json`)
    Json(Value),
    /// Raw bytes for any other content type
    Bytes(Vec<u8>),
}

/// Outcome of fetching an absolute artifact URL
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Successful response body
    Body(Vec<u8>),
    /// HTTP 403; not retried, the caller falls back to a browser download
    Forbidden,
}

/// Authenticated HTTP client for the remote API
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    base_url: Url,
    retry_attempts: u32,
    retry_base_delay: Duration,
}

impl ResourceClient {
    /// Build a client from configuration. The API key is attached as a
    /// default header; credentials are never placed in query strings.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key_value =
            HeaderValue::from_str(&config.api_key).map_err(|e| IngestError::Config {
                message: format!("Invalid API key format: {}", e),
            })?;
        headers.insert("x-api-key", key_value);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .user_agent("congress-ingest/0.1")
            .build()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| IngestError::Config {
            message: format!("Invalid base URL '{}': {}", config.base_url, e),
        })?;

        Ok(Self {
            http,
            base_url,
            retry_attempts: config.retry_attempts.max(1),
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Issue a request and negotiate the response body by content type.
    ///
    /// # Errors
    /// `IngestError::Http` for a persistent non-2xx status,
    /// `IngestError::Transport` when the retry budget is exhausted on
    /// transport failures.
    pub async fn call(&self, request: &EndpointRequest) -> Result<ApiBody> {
        let url = self
            .base_url
            .join(&request.path)
            .map_err(|e| IngestError::Config {
                message: format!("Invalid endpoint path '{}': {}", request.path, e),
            })?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let outcome = self
                .http
                .request(request.method.clone(), url.clone())
                .query(&[("format", "json")])
                .query(request.query())
                .send()
                .await;

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Self::negotiate_body(response).await;
                    }
                    if RETRYABLE_STATUS.contains(&status.as_u16())
                        && attempt < self.retry_attempts
                    {
                        self.backoff(attempt, request.endpoint(), status).await;
                        continue;
                    }
                    return Err(IngestError::Http {
                        status: status.as_u16(),
                        endpoint: request.endpoint().to_string(),
                    });
                }
                Err(err) if attempt < self.retry_attempts => {
                    warn!(
                        endpoint = request.endpoint(),
                        attempt, error = %err,
                        "transport failure, retrying"
                    );
                    tokio::time::sleep(self.retry_delay(attempt)).await;
                }
                Err(err) => {
                    return Err(IngestError::Transport {
                        endpoint: request.endpoint().to_string(),
                        details: err.to_string(),
                    });
                }
            }
        }
    }

    /// Issue a request expecting a JSON body
    pub async fn call_json(&self, request: &EndpointRequest) -> Result<Value> {
        match self.call(request).await? {
            ApiBody::Json(value) => Ok(value),
            ApiBody::Bytes(_) => Err(IngestError::Decode {
                context: format!("response from '{}'", request.endpoint()),
                details: "expected JSON, got a non-JSON content type".to_string(),
            }),
        }
    }

    /// Fetch an absolute artifact URL through the same retry-enabled session.
    ///
    /// A 403 is returned as `DownloadOutcome::Forbidden` without retrying;
    /// the caller decides whether to fall back to a browser download.
    pub async fn download(&self, url: &str) -> Result<DownloadOutcome> {
        let parsed = Url::parse(url).map_err(|e| IngestError::Config {
            message: format!("Invalid artifact URL '{}': {}", url, e),
        })?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.http.get(parsed.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::FORBIDDEN {
                        return Ok(DownloadOutcome::Forbidden);
                    }
                    if status.is_success() {
                        let bytes = response.bytes().await?;
                        return Ok(DownloadOutcome::Body(bytes.to_vec()));
                    }
                    if RETRYABLE_STATUS.contains(&status.as_u16())
                        && attempt < self.retry_attempts
                    {
                        self.backoff(attempt, url, status).await;
                        continue;
                    }
                    return Err(IngestError::Http {
                        status: status.as_u16(),
                        endpoint: url.to_string(),
                    });
                }
                Err(err) if attempt < self.retry_attempts => {
                    warn!(url, attempt, error = %err, "download failure, retrying");
                    tokio::time::sleep(self.retry_delay(attempt)).await;
                }
                Err(err) => {
                    return Err(IngestError::Transport {
                        endpoint: url.to_string(),
                        details: err.to_string(),
                    });
                }
            }
        }
    }

    async fn negotiate_body(response: reqwest::Response) -> Result<ApiBody> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            Ok(ApiBody::Json(response.json().await?))
        } else {
            Ok(ApiBody::Bytes(response.bytes().await?.to_vec()))
        }
    }

    async fn backoff(&self, attempt: u32, endpoint: &str, status: StatusCode) {
        let delay = self.retry_delay(attempt);
        debug!(
            endpoint,
            attempt,
            status = status.as_u16(),
            delay_ms = delay.as_millis() as u64,
            "transient server error, backing off"
        );
        tokio::time::sleep(delay).await;
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = EndpointRequest::get("bill")
            .with_query("limit", "250")
            .with_query("offset", "500");
        assert_eq!(request.endpoint(), "bill");
        assert_eq!(
            request.query(),
            &[
                ("limit".to_string(), "250".to_string()),
                ("offset".to_string(), "500".to_string())
            ]
        );
    }

    #[test]
    fn test_retry_delay_doubles() {
        let config = ApiConfig {
            base_url: "https://api.congress.gov/v3/".to_string(),
            api_key: "k".to_string(),
            timeout_seconds: 5,
            page_limit: 250,
            retry_attempts: 3,
            retry_base_delay_ms: 100,
        };
        let client = ResourceClient::new(&config).unwrap();
        assert_eq!(client.retry_delay(1), Duration::from_millis(100));
        assert_eq!(client.retry_delay(2), Duration::from_millis(200));
        assert_eq!(client.retry_delay(3), Duration::from_millis(400));
    }
}
