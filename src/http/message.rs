//! HTTP message model and codec
//!
//! Parsing for the request side and encoding for the response side of
//! the small HTTP/1.1 subset the frontend speaks. Requests arrive as raw
//! bytes; the head (request line plus headers) is ASCII, the body is
//! opaque bytes.

use std::io::Write;

use crate::error::{ImgFsError, Result};

use super::{HEAD_END_DELIM, LINE_DELIM};

// =============================================================================
// Request
// =============================================================================

/// A parsed HTTP request
#[derive(Debug, Clone)]
pub struct Request {
    /// Method verb, e.g. `GET` or `POST`
    pub method: String,

    /// Request target as sent, query string included
    pub target: String,

    /// Header key/value pairs in arrival order
    pub headers: Vec<(String, String)>,

    /// Request body (empty unless Content-Length said otherwise)
    pub body: Vec<u8>,
}

impl Request {
    /// The target path without its query string
    pub fn path(&self) -> &str {
        match self.target.find('?') {
            Some(at) => &self.target[..at],
            None => &self.target,
        }
    }

    /// Value of a query parameter, if present
    ///
    /// Scans the query string for `name=value` pairs separated by `&`.
    /// No percent-decoding is applied.
    pub fn query_var(&self, name: &str) -> Option<&str> {
        let query = &self.target[self.target.find('?')? + 1..];
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
    }

    /// Header value by case-insensitive key
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Declared body length, zero when absent or malformed
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }
}

// =============================================================================
// Response
// =============================================================================

/// An HTTP response under construction
#[derive(Debug, Clone)]
pub struct Response {
    /// Status line without the version prefix, e.g. `200 OK`
    pub status: &'static str,

    /// Extra headers beyond Content-Length
    pub headers: Vec<(String, String)>,

    /// Response body
    pub body: Vec<u8>,
}

impl Response {
    /// A `200 OK` response with the given content type
    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: "200 OK",
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body,
        }
    }

    /// A `302 Found` redirect
    pub fn found(location: &str) -> Self {
        Self {
            status: "302 Found",
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    /// A `500 Internal Server Error` carrying the error message
    pub fn error(err: &ImgFsError) -> Self {
        Self {
            status: "500 Internal Server Error",
            headers: Vec::new(),
            body: format!("Error: {err}\n").into_bytes(),
        }
    }

    /// Serialize and write the response to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut head = format!("HTTP/1.1 {}{}", self.status, LINE_DELIM);
        for (key, value) in &self.headers {
            head.push_str(&format!("{key}: {value}{LINE_DELIM}"));
        }
        head.push_str(&format!("Content-Length: {}{}", self.body.len(), LINE_DELIM));
        head.push_str(LINE_DELIM);

        writer.write_all(head.as_bytes())?;
        writer.write_all(&self.body)?;
        writer.flush()?;
        Ok(())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Byte offset one past the head terminator, if fully received
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_END_DELIM.len())
        .position(|window| window == HEAD_END_DELIM.as_bytes())
        .map(|at| at + HEAD_END_DELIM.len())
}

/// Parse the request head (request line plus headers).
///
/// `head` must span exactly up to and including the blank line. The body
/// is attached by the caller once Content-Length bytes have arrived.
pub fn parse_head(head: &[u8]) -> Result<Request> {
    let head = std::str::from_utf8(head)
        .map_err(|_| ImgFsError::InvalidArgument("non-ASCII request head".to_string()))?;

    let mut lines = head.split(LINE_DELIM);
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split(' ');

    let method = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ImgFsError::InvalidArgument("missing method".to_string()))?;
    let target = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ImgFsError::InvalidArgument("missing request target".to_string()))?;
    let version = parts
        .next()
        .ok_or_else(|| ImgFsError::InvalidArgument("missing HTTP version".to_string()))?;
    if !version.starts_with("HTTP/") {
        return Err(ImgFsError::InvalidArgument(format!(
            "bad HTTP version: {version}"
        )));
    }

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        let (key, value) = line.split_once(':').ok_or_else(|| {
            ImgFsError::InvalidArgument(format!("malformed header line: {line}"))
        })?;
        headers.push((key.trim().to_string(), value.trim().to_string()));
    }

    Ok(Request {
        method: method.to_string(),
        target: target.to_string(),
        headers,
        body: Vec::new(),
    })
}
