//! The response adapter.
//!
//! [`ApiResponse`] wraps a [`RawResponse`] and knows how to read it: the
//! decoded body as a [`Document`] or a typed [`Payload`], the pagination
//! headers, and a human-readable error message for failed calls. The raw
//! status, headers and body stay reachable for debugging.

use crate::document::Document;
use crate::record::Payload;
use crate::transport::RawResponse;
use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Header carrying the total number of items across all pages.
pub const TOTAL_HEADER: &str = "total";
/// Header carrying the page size the server applied.
pub const PER_PAGE_HEADER: &str = "per-page";

const UNKNOWN_ERROR: &str = "Unknown error";

/// A Management API response, typed by the payload it is expected to carry.
///
/// Reading the payload is lazy: [`data`](Self::data) decodes the body each
/// time it is called, so a response can be inspected as a [`Document`] even
/// when the typed conversion fails.
///
/// # Examples
///
/// ```
/// use storyblok_mapi::{ApiResponse, RawResponse, Stories};
/// use http::StatusCode;
///
/// let raw = RawResponse::new(
///     StatusCode::OK,
///     r#"{"stories":[{"name":"Home","slug":"home"}]}"#,
/// )
/// .with_header("total", "1")?;
///
/// let response: ApiResponse<Stories> = ApiResponse::new(raw);
/// assert!(response.is_ok());
/// assert_eq!(response.total(), Some(1));
/// assert_eq!(response.data()?.first().map(|s| s.slug()).as_deref(), Some("home"));
/// # Ok::<(), storyblok_mapi::Error>(())
/// ```
pub struct ApiResponse<P = Document> {
    raw: RawResponse,
    _payload: PhantomData<fn() -> P>,
}

impl<P> ApiResponse<P> {
    pub fn new(raw: RawResponse) -> Self {
        Self {
            raw,
            _payload: PhantomData,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.raw.status
    }

    /// Returns `true` for a 2xx status.
    pub fn is_ok(&self) -> bool {
        self.raw.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.raw.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw.header(name)
    }

    pub fn body(&self) -> &str {
        &self.raw.body
    }

    /// The URL the request was finally sent to.
    pub fn last_called_url(&self) -> &str {
        &self.raw.url
    }

    /// Total number of items across all pages, from the `total` header.
    pub fn total(&self) -> Option<u64> {
        self.numeric_header(TOTAL_HEADER)
    }

    /// Page size the server applied, from the `per-page` header.
    pub fn per_page(&self) -> Option<u64> {
        self.numeric_header(PER_PAGE_HEADER)
    }

    fn numeric_header(&self, name: &str) -> Option<u64> {
        self.header(name)?.trim().parse().ok()
    }

    /// Decodes the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value> {
        if self.raw.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.raw.body).map_err(|e| Error::Decode {
            raw_response: self.raw.body.clone(),
            serde_error: e.to_string(),
            status: self.raw.status,
        })
    }

    /// The decoded body as a document. A `null` body reads as an empty document.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON or is a bare scalar.
    pub fn document(&self) -> Result<Document> {
        match self.json()? {
            Value::Null => Ok(Document::new()),
            value => Document::from_value(value),
        }
    }

    /// A human-readable message for a failed call.
    ///
    /// Prefers the message the server put in the body. Falls back to a
    /// canned description of the status. Empty for 2xx answers.
    pub fn error_message(&self) -> String {
        if self.is_ok() {
            return String::new();
        }
        self.json()
            .ok()
            .and_then(|body| server_message(&body))
            .unwrap_or_else(|| canned_message(self.raw.status).to_string())
    }

    /// Converts a failed response into an [`Error::Http`].
    pub fn into_error(self) -> Error {
        Error::Http {
            status: self.raw.status,
            message: self.error_message(),
            raw_response: self.raw.body,
        }
    }

    /// Returns `self` for 2xx answers and an [`Error::Http`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }

    /// Reinterprets the response as carrying another payload type.
    pub fn cast<Q>(self) -> ApiResponse<Q> {
        ApiResponse::new(self.raw)
    }

    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    pub fn into_raw(self) -> RawResponse {
        self.raw
    }
}

impl<P: Payload> ApiResponse<P> {
    /// Decodes the body into the expected payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON, lacks the payload's envelope
    /// key, or fails the payload's validity check.
    pub fn data(&self) -> Result<P> {
        P::make_from_response(self.json()?)
    }
}

impl<P> Clone for ApiResponse<P> {
    fn clone(&self) -> Self {
        Self::new(self.raw.clone())
    }
}

impl<P> fmt::Debug for ApiResponse<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("status", &self.raw.status)
            .field("url", &self.raw.url)
            .field("body", &self.raw.body)
            .finish()
    }
}

impl<P> From<RawResponse> for ApiResponse<P> {
    fn from(raw: RawResponse) -> Self {
        Self::new(raw)
    }
}

/// Extracts the message a server put in an error body.
///
/// Understands `{"error": "..."}`, `{"error": {"message": "..."}}`,
/// `{"message": "..."}`, a bare JSON string, and a list of strings.
fn server_message(body: &Value) -> Option<String> {
    let message = match body {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => match map.get("error") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Object(error)) => error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => map.get("message").and_then(Value::as_str).map(str::to_owned),
        },
        _ => None,
    };
    message.filter(|text| !text.trim().is_empty())
}

fn canned_message(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "Bad Request: the request was malformed or is missing a required parameter",
        401 => "Unauthorized: no valid access token was provided",
        403 => "Forbidden: the access token does not grant access to this resource",
        404 => "Not Found: the requested resource does not exist",
        422 => "Unprocessable Entity: the request was well-formed but could not be processed",
        429 => "Too Many Requests: the rate limit was exceeded",
        500..=599 => "Server Error: the Management API failed to process the request",
        _ => UNKNOWN_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Story;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse::new(RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            body,
        ))
    }

    #[test]
    fn test_error_message_prefers_server_text() {
        assert_eq!(
            response(404, r#"{"error":"This record could not be found"}"#).error_message(),
            "This record could not be found"
        );
        assert_eq!(
            response(422, r#"{"error":{"message":"Slug already taken"}}"#).error_message(),
            "Slug already taken"
        );
        assert_eq!(
            response(422, r#"["Name can't be blank","Slug is invalid"]"#).error_message(),
            "Name can't be blank, Slug is invalid"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_canned_text() {
        assert!(response(401, "").error_message().starts_with("Unauthorized"));
        assert!(response(429, "<html>").error_message().starts_with("Too Many Requests"));
        assert!(response(503, "{}").error_message().starts_with("Server Error"));
        assert_eq!(response(418, "{}").error_message(), "Unknown error");
        assert_eq!(response(200, "{}").error_message(), "");
    }

    #[test]
    fn test_pagination_headers() {
        let raw = RawResponse::new(StatusCode::OK, "{}")
            .with_header("total", "57")
            .unwrap()
            .with_header("per-page", "abc")
            .unwrap();
        let response: ApiResponse = ApiResponse::new(raw);

        assert_eq!(response.total(), Some(57));
        assert_eq!(response.per_page(), None);
        assert_eq!(response.header("Total"), Some("57"));
    }

    #[test]
    fn test_data_uses_response_envelope() {
        let ok = response(200, r#"{"story":{"name":"Home","slug":"home"}}"#).cast::<Story>();
        assert_eq!(ok.data().unwrap().name(), "Home");

        let not_json = response(200, "oops").cast::<Story>();
        assert!(matches!(not_json.data(), Err(Error::Decode { .. })));
        assert_eq!(not_json.body(), "oops");
    }

    #[test]
    fn test_error_for_status() {
        let err = response(404, r#"{"error":"Not here"}"#)
            .error_for_status()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Http { status, ref message, .. }
                if status == StatusCode::NOT_FOUND && message == "Not here"
        ));
        assert!(response(204, "").error_for_status().is_ok());
        assert!(response(204, "").document().unwrap().is_empty());
    }
}
