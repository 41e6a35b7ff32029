//! Transport seam between the session middleware and the network.
//!
//! `Transport::execute` returns `Ok(Response)` for every HTTP response,
//! whatever its status, and `Err` only when no response was obtained
//! (connection failure, timeout, malformed request).

use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{header, multipart, Client, RequestBuilder, StatusCode};
use tracing::{debug, warn};

use super::operation::{Body, Operation, Response};
use super::ApiError;

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 500;

/// Upper bound for the random jitter added to each backoff.
const BACKOFF_JITTER_MS: u64 = 250;

pub trait Transport: Send + Sync {
    fn execute<'a>(&'a self, op: &'a Operation) -> BoxFuture<'a, Result<Response, ApiError>>;
}

/// reqwest-backed transport rooted at the API base URL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Build a transport sharing an existing connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, target: &str) -> String {
        if target.starts_with('/') {
            format!("{}{}", self.base_url, target)
        } else {
            format!("{}/{}", self.base_url, target)
        }
    }

    fn header_map(op: &Operation) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        for (name, value) in &op.headers {
            let name = header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("Bad header name {}: {}", name, e)))?;
            let value = header::HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("Bad header value for {}: {}", name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Multipart forms are consumed on send, so each attempt builds a new one.
    fn attach_body(request: RequestBuilder, body: &Body) -> RequestBuilder {
        match body {
            Body::Json(value) => request.json(value),
            Body::File(file) => {
                let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
                request.multipart(multipart::Form::new().part(file.field.clone(), part))
            }
        }
    }

    async fn send(&self, op: &Operation) -> Result<Response, ApiError> {
        let url = self.url_for(&op.target);
        let headers = Self::header_map(op)?;
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .request(op.method.clone(), &url)
                .headers(headers.clone());
            if let Some(ref body) = op.body {
                request = Self::attach_body(request, body);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RATE_LIMIT_RETRIES {
                retries += 1;
                // ThreadRng is not Send; keep it out of the await below
                let jitter = {
                    use rand::Rng;
                    rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS)
                };
                let delay = backoff_ms + jitter;
                warn!(url = %url, retry = retries, backoff_ms = delay, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                backoff_ms *= 2;
                continue;
            }

            let body = response.text().await?;
            debug!(method = %op.method, url = %url, status = status.as_u16(), "Response received");
            return Ok(Response::new(status, body));
        }
    }
}

impl Transport for HttpTransport {
    fn execute<'a>(&'a self, op: &'a Operation) -> BoxFuture<'a, Result<Response, ApiError>> {
        self.send(op).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_paths() {
        let transport = HttpTransport::with_client(Client::new(), "http://localhost:5000/api/");
        assert_eq!(transport.base_url(), "http://localhost:5000/api");
        assert_eq!(transport.url_for("/ideas"), "http://localhost:5000/api/ideas");
        assert_eq!(transport.url_for("ideas/3"), "http://localhost:5000/api/ideas/3");
    }

    #[test]
    fn test_header_map_rejects_invalid_values() {
        let op = Operation::get("/draft").with_header("X-Bad", "line\nbreak");
        assert!(matches!(
            HttpTransport::header_map(&op),
            Err(ApiError::InvalidRequest(_))
        ));

        let mut op = Operation::get("/draft");
        op.set_bearer("abc");
        let headers = HttpTransport::header_map(&op).expect("valid headers");
        assert_eq!(
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );
    }
}
