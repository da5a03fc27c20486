//! Request parsing.
//!
//! # Responsibilities
//! - Split the request line into method, path and version
//! - Apply the default-document rule (`/` becomes `/index.html`)
//! - Collect headers, cookies and the body
//!
//! # Design Decisions
//! - A request line that is not exactly three tokens is rejected; the caller
//!   drops the connection without answering
//! - Form bodies are split literally on `&` and the first `=`; values are not
//!   percent-decoded
//! - An absent body is an empty form, never "no body"

use std::collections::BTreeMap;

use thiserror::Error;

use crate::http::framer::Frame;
use crate::http::headers::HeaderMap;

/// Path served for a bare `/`.
pub const DEFAULT_DOCUMENT: &str = "/index.html";

/// Error type for request parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),
}

/// Decoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// `key=value` pairs from a form-urlencoded or `text/*` body.
    Form(BTreeMap<String, String>),
    /// Any other content type, kept as received.
    Raw(Vec<u8>),
}

impl Body {
    /// Look up a form field. Raw bodies have no fields.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Body::Form(fields) => fields.get(key).map(String::as_str),
            Body::Raw(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Form(fields) => fields.is_empty(),
            Body::Raw(bytes) => bytes.is_empty(),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Form(BTreeMap::new())
    }
}

/// A parsed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub version: String,
    pub headers: HeaderMap,
    pub cookies: BTreeMap<String, String>,
    pub body: Body,
}

impl Request {
    /// Parse a framed message.
    pub fn parse(frame: &Frame) -> Result<Self, ParseError> {
        Self::from_parts(&frame.head, &frame.body)
    }

    /// Parse a head and its body bytes.
    pub fn from_parts(head: &str, body: &[u8]) -> Result<Self, ParseError> {
        let (method, path, version) = parse_request_line(head)?;
        let headers = HeaderMap::from_head(head);
        let cookies = headers.get("cookie").map(parse_cookies).unwrap_or_default();
        let content_type = headers
            .get("content-type")
            .unwrap_or_default()
            .to_ascii_lowercase();
        let body = parse_body(&content_type, body);

        tracing::debug!(%method, %path, %version, "request parsed");

        Ok(Self {
            method,
            path,
            version,
            headers,
            cookies,
            body,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

fn parse_request_line(head: &str) -> Result<(String, String, String), ParseError> {
    let line = head.lines().next().unwrap_or_default();
    let mut tokens = line.split_whitespace();

    match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(path), Some(version), None) => {
            let path = if path == "/" { DEFAULT_DOCUMENT } else { path };
            Ok((
                method.to_ascii_uppercase(),
                path.to_string(),
                version.to_string(),
            ))
        }
        _ => Err(ParseError::MalformedRequestLine(line.to_string())),
    }
}

/// Split a `Cookie` header into name/value pairs.
///
/// Pairs without `=` are skipped.
pub fn parse_cookies(header: &str) -> BTreeMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn parse_body(content_type: &str, bytes: &[u8]) -> Body {
    if bytes.is_empty() {
        return Body::default();
    }

    let is_form = content_type.contains("application/x-www-form-urlencoded")
        || content_type.starts_with("text/");
    if !is_form {
        return Body::Raw(bytes.to_vec());
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Body::Form(parse_form(text)),
        Err(_) => Body::default(),
    }
}

/// Split `a=1&b=2` into fields. Pairs without `=` are skipped.
pub fn parse_form(text: &str) -> BTreeMap<String, String> {
    text.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
