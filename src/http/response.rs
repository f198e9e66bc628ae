use std::collections::BTreeMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;

/// An HTTP status code.
///
/// Any integer is accepted. Codes outside the server's reason table still
/// produce a valid status line with the phrase "Unknown Status".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 201 Created
    pub const CREATED: StatusCode = StatusCode(201);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub const fn new(code: u16) -> Self {
        StatusCode(code)
    }

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::new(418).as_u16(), 418);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "Not Found");
    /// assert_eq!(StatusCode::new(418).reason_phrase(), "Unknown Status");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            400 => "Bad Request",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown Status",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// A finished HTTP response, ready to be written to a client.
///
/// Only produced by the `send*` methods of [`ResponseBuilder`], which take
/// the builder by value, so each builder yields at most one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Headers keyed by name as supplied; iteration order is by name
    pub headers: BTreeMap<String, String>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// Starts as `200 OK` with no headers and an empty body.
///
/// # Example
///
/// ```
/// # use courier::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new()
///     .status(StatusCode::CREATED)
///     .header("Content-Type", "text/plain")
///     .body("done")
///     .send();
///
/// assert_eq!(response.status.as_u16(), 201);
/// assert_eq!(response.headers["Content-Length"], "4");
/// ```
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    /// Creates a new response builder.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Sets the status code. Never fails; unmapped codes get "Unknown Status".
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Adds or replaces a header. The name is kept exactly as given.
    ///
    /// ```ignore
    /// builder.header("Content-Type", "text/plain")
    ///     .header("Cache-Control", "no-cache")
    /// ```
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Finishes the response.
    ///
    /// `Content-Length` is recomputed from the body whenever the body is
    /// non-empty, replacing any value set by the caller under any casing.
    pub fn send(mut self) -> Response {
        if !self.body.is_empty() {
            self.headers
                .retain(|name, _| !name.eq_ignore_ascii_case("Content-Length"));
            self.headers
                .insert("Content-Length".to_string(), self.body.len().to_string());
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }

    /// Serializes `value` as the JSON body and finishes the response.
    ///
    /// A serialization failure turns the response into a 500 with body
    /// "Internal Server Error" instead of surfacing the error.
    pub fn send_json<T: Serialize + ?Sized>(self, value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(json) => self
                .header("Content-Type", "application/json")
                .body(json)
                .send(),
            Err(e) => {
                tracing::error!(error = %e, "JSON serialization failed");
                Self::new()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body("Internal Server Error")
                    .send()
            }
        }
    }

    /// Gzips `text` as a `text/plain` body and finishes a 200 response.
    ///
    /// A compression failure turns the response into a 500 with body
    /// "Compression error".
    pub fn send_compressed(self, text: &str) -> Response {
        match gzip(text.as_bytes()) {
            Ok(compressed) => self
                .status(StatusCode::OK)
                .header("Content-Encoding", "gzip")
                .header("Content-Type", "text/plain")
                .body(compressed)
                .send(),
            Err(e) => {
                tracing::error!(error = %e, "gzip compression failed");
                Self::new()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body("Compression error")
                    .send()
            }
        }
    }
}

/// Compresses `data` into a gzip stream at the default level.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

impl Response {
    /// Creates a 200 OK response with a plain-text body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new()
            .header("Content-Type", "text/plain")
            .body(body)
            .send()
    }

    /// Creates a 404 Not Found response with no body.
    pub fn not_found() -> Self {
        ResponseBuilder::new().status(StatusCode::NOT_FOUND).send()
    }

    /// Creates a 400 Bad Request response with a plain-text explanation.
    pub fn bad_request(message: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new()
            .status(StatusCode::BAD_REQUEST)
            .header("Content-Type", "text/plain")
            .body(message)
            .send()
    }

    /// Returns a header value, matching the name without regard to case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Wire form: `HTTP/1.1 <code> <reason>`, one line per header in name
    /// order, a blank line, then the body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut wire = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        for (name, value) in &self.headers {
            wire.push_str(&format!("{name}: {value}\r\n"));
        }
        wire.push_str("\r\n");

        let mut buf = wire.into_bytes();
        buf.extend_from_slice(&self.body);
        buf
    }
}
