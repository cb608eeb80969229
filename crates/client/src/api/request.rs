//! Replayable request descriptions.
//!
//! The refresh-and-replay policy needs to issue the same request twice,
//! and `reqwest` requests are consumed on send. The pipeline therefore
//! works on an owned description it can rebuild a wire request from at
//! any time, including multipart bodies.

use std::path::PathBuf;

use reqwest::Method;
use serde_json::Value;

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field.
    Text { name: String, value: String },
    /// File field; the bytes are read from disk when the wire request is
    /// built, so a replay re-reads the same path.
    File { name: String, path: PathBuf },
}

impl FormPart {
    /// A text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A file field read from `path`.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Body of an [`ApiRequest`].
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON payload.
    Json(Value),
    /// Multipart form payload.
    Multipart(Vec<FormPart>),
}

/// A complete, replayable description of an outbound API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured API base, e.g. `products/`.
    /// Must not start with `/` or it would discard the base path.
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    /// A GET request with no body.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    /// A POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    /// A POST request with a multipart form body.
    #[must_use]
    pub fn post_multipart(path: impl Into<String>, parts: Vec<FormPart>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Multipart(parts),
        }
    }

    /// A PUT request with a multipart form body.
    #[must_use]
    pub fn put_multipart(path: impl Into<String>, parts: Vec<FormPart>) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: RequestBody::Multipart(parts),
        }
    }

    /// A DELETE request with no body.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }
}
