//! The transport capability the client core is written against.
//!
//! A [`Transport`] sends one [`ApiRequest`] and hands back the [`RawResponse`]
//! whatever its status. Non-2xx statuses are data, not errors: deciding what a
//! 404 or 429 means is left to [`ApiResponse`](crate::ApiResponse) and the bulk
//! loops. Only faults that leave no response behind (connection errors,
//! timeouts, bad configuration) come back as `Err`.
//!
//! [`HttpTransport`](crate::HttpTransport) is the reqwest-backed
//! implementation. Tests and embedders can plug in their own.

use crate::query::{QueryParams, ToQuery};
use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde_json::Value;
use std::future::Future;

/// Sends requests to the Management API.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response, whatever its status.
    fn request(&self, request: ApiRequest) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// A single API request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path, relative to the API root (e.g. `spaces/1/stories`).
    pub path: String,

    /// Query parameters, in insertion order.
    pub query: QueryParams,

    /// JSON body, if any.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a request with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds a query parameter, replacing an earlier one with the same key.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Adds every parameter produced by `params`.
    pub fn with_query(mut self, params: &impl ToQuery) -> Self {
        self.query.extend(params.to_query());
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// What a transport got back for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The raw response body.
    pub body: String,

    /// The final URL the request was sent to, including the query string.
    pub url: String,
}

impl RawResponse {
    /// Creates a response with no headers and an empty URL.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            url: String::new(),
        }
    }

    /// Adds a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Sets the URL the response was received from.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}
