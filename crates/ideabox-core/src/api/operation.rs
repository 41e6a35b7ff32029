//! Outgoing operation and response descriptors.
//!
//! An `Operation` is what callers hand to the transport: method, target path
//! (relative to the API base URL), headers and an optional body. It also
//! carries the `retried` flag that stops an operation from going through the
//! refresh path more than once.

use std::collections::BTreeMap;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ApiError;

/// Header name used for bearer credentials.
pub const AUTHORIZATION: &str = "Authorization";

const BEARER_PREFIX: &str = "Bearer ";

/// A file sent as one part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Request payload. Kept as plain data so a replay can rebuild it.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(serde_json::Value),
    File(FilePart),
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub method: Method,
    pub target: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Body>,
    retried: bool,
}

impl Operation {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: BTreeMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
        self.body = Some(Body::Json(value));
        Ok(self)
    }

    /// Attach a single file as a multipart form field.
    pub fn file(
        mut self,
        field: impl Into<String>,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.body = Some(Body::File(FilePart {
            field: field.into(),
            filename: filename.into(),
            bytes,
        }));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set (or replace) the bearer authorization header.
    pub fn set_bearer(&mut self, token: &str) {
        self.headers
            .insert(AUTHORIZATION.to_string(), format!("{}{}", BEARER_PREFIX, token));
    }

    /// The bearer token currently stamped on this operation, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Flip `retried` to true. Returns false if it was already set, in which
    /// case the operation must not be retried again.
    pub fn mark_retried(&mut self) -> bool {
        if self.retried {
            return false;
        }
        self.retried = true;
        true
    }
}

/// How a response should be treated by the refresh path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    AuthExpired,
    Failure,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn classify(&self) -> Outcome {
        if self.status.is_success() {
            Outcome::Success
        } else if self.status == StatusCode::UNAUTHORIZED {
            Outcome::AuthExpired
        } else {
            Outcome::Failure
        }
    }

    /// Turn a non-success response into the matching `ApiError`.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_retried_only_once() {
        let mut op = Operation::get("/draft");
        assert!(!op.is_retried());
        assert!(op.mark_retried());
        assert!(op.is_retried());
        assert!(!op.mark_retried());
        assert!(op.is_retried());
    }

    #[test]
    fn test_set_bearer_replaces_previous_token() {
        let mut op = Operation::get("/draft");
        assert_eq!(op.bearer(), None);

        op.set_bearer("old");
        op.set_bearer("new");
        assert_eq!(op.bearer(), Some("new"));
        assert_eq!(op.headers.get(AUTHORIZATION).map(String::as_str), Some("Bearer new"));
    }

    #[test]
    fn test_response_classification() {
        assert_eq!(Response::new(StatusCode::OK, "").classify(), Outcome::Success);
        assert_eq!(Response::new(StatusCode::CREATED, "").classify(), Outcome::Success);
        assert_eq!(
            Response::new(StatusCode::UNAUTHORIZED, "").classify(),
            Outcome::AuthExpired
        );
        assert_eq!(Response::new(StatusCode::FORBIDDEN, "").classify(), Outcome::Failure);
        assert_eq!(
            Response::new(StatusCode::INTERNAL_SERVER_ERROR, "").classify(),
            Outcome::Failure
        );
    }

    #[test]
    fn test_json_body() {
        let op = Operation::post("/draft")
            .json(&serde_json::json!({"title": "t", "content": "c"}))
            .expect("body should encode");
        match op.body {
            Some(Body::Json(ref value)) => assert_eq!(value["title"].as_str(), Some("t")),
            ref other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[test]
    fn test_file_body_survives_clone_for_replay() {
        let op = Operation::post("/upload").file("file", "roof.png", vec![1, 2, 3]);
        let replay = op.clone();
        assert_eq!(
            replay.body,
            Some(Body::File(FilePart {
                field: "file".to_string(),
                filename: "roof.png".to_string(),
                bytes: vec![1, 2, 3],
            }))
        );
    }
}
