//! Response building.
//!
//! # Responsibilities
//! - Serialize status line, headers and body to wire bytes
//! - Serve static files through MIME-based content roots
//! - Wrap structured values in a JSON envelope
//! - Provide the canned 401/404/500 replies
//!
//! # Design Decisions
//! - Every built response carries `Date`, `Accept-Ranges`, `Content-Length`,
//!   `Cache-Control` and `Connection: close`
//! - Canned replies are fixed byte literals and skip content resolution
//! - Builders return a `Reply` so callers see the status without re-parsing

use std::io::ErrorKind;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::content::ContentRoots;
use crate::http::request::Request;

pub const UNAUTHORIZED: &[u8] = b"HTTP/1.1 401 Unauthorized\r\n\
Content-Type: text/plain\r\n\
Content-Length: 16\r\n\
Connection: close\r\n\
\r\n\
401 Unauthorized";

pub const NOT_FOUND: &[u8] = b"HTTP/1.1 404 Not Found\r\n\
Content-Type: text/html\r\n\
Content-Length: 13\r\n\
Connection: close\r\n\
\r\n\
404 Not Found";

pub const INTERNAL_ERROR: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\
Content-Type: text/plain\r\n\
Content-Length: 25\r\n\
Connection: close\r\n\
\r\n\
500 Internal Server Error";

/// Wire-ready response bytes and the status they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub bytes: Vec<u8>,
}

impl Reply {
    pub fn unauthorized() -> Self {
        Self { status: 401, bytes: UNAUTHORIZED.to_vec() }
    }

    pub fn not_found() -> Self {
        Self { status: 404, bytes: NOT_FOUND.to_vec() }
    }

    pub fn internal_error() -> Self {
        Self { status: 500, bytes: INTERNAL_ERROR.to_vec() }
    }
}

/// Reason phrase for the statuses this engine emits.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Format a timestamp the way the `Date` header expects.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// An HTTP response under construction.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Set a header, replacing any earlier value of the same name.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn headers(mut self, extra: &[(String, String)]) -> Self {
        for (name, value) in extra {
            self = self.header(name, value.clone());
        }
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// A 200 response carrying `value` as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::ok().header("Content-Type", "application/json").body(body))
    }

    /// Add the standard headers and serialize.
    pub fn into_reply(self) -> Reply {
        self.into_reply_at(Utc::now())
    }

    fn into_reply_at(self, now: DateTime<Utc>) -> Reply {
        let len = self.body.len();
        let response = self
            .header("Date", http_date(now))
            .header("Accept-Ranges", "bytes")
            .header("Content-Length", len.to_string())
            .header("Cache-Control", "max-age=86000")
            .header("Connection", "close");

        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            response.status,
            reason_phrase(response.status)
        );
        for (name, value) in &response.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&response.body);
        Reply {
            status: response.status,
            bytes,
        }
    }
}

/// Builds replies for static content and JSON values.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    roots: ContentRoots,
}

impl ResponseBuilder {
    pub fn new(roots: ContentRoots) -> Self {
        Self { roots }
    }

    /// Serve the file named by the request path.
    pub async fn build(&self, request: &Request) -> Reply {
        self.build_for_path(&request.path, &[]).await
    }

    /// Serve the file for `path`, adding `extra` headers on success.
    pub async fn build_for_path(&self, path: &str, extra: &[(String, String)]) -> Reply {
        let Some(resolved) = self.roots.resolve(path) else {
            tracing::debug!(%path, "no content root for path");
            return Reply::not_found();
        };

        match tokio::fs::read(&resolved.file).await {
            Ok(content) => {
                tracing::debug!(file = %resolved.file.display(), bytes = content.len(), "serving file");
                Response::ok()
                    .headers(extra)
                    .header("Content-Type", resolved.mime)
                    .body(content)
                    .into_reply()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(file = %resolved.file.display(), "file not found");
                Reply::not_found()
            }
            Err(e) => {
                tracing::error!(file = %resolved.file.display(), error = %e, "failed to read file");
                Reply::internal_error()
            }
        }
    }

    /// Serialize `value` into a 200 JSON reply.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T, extra: &[(String, String)]) -> Reply {
        match Response::json(value) {
            Ok(response) => response.headers(extra).into_reply(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize JSON reply");
                Reply::internal_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    fn text(reply: &Reply) -> String {
        String::from_utf8_lossy(&reply.bytes).into_owned()
    }

    #[test]
    fn test_canned_bodies() {
        assert!(UNAUTHORIZED.ends_with(b"\r\n\r\n401 Unauthorized"));
        assert!(NOT_FOUND.ends_with(b"\r\n\r\n404 Not Found"));
        assert!(INTERNAL_ERROR.ends_with(b"\r\n\r\n500 Internal Server Error"));
        assert!(INTERNAL_ERROR.starts_with(b"HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn test_standard_headers() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let reply = Response::ok().body(b"hello".to_vec()).into_reply_at(at);
        let text = text(&reply);

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Date: Tue, 05 Mar 2024 07:08:09 GMT\r\n"));
        assert!(text.contains("Accept-Ranges: bytes\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.contains("Cache-Control: max-age=86000\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_json_reply() {
        let builder = ResponseBuilder::new(ContentRoots::new("unused"));
        let reply = builder.json(&serde_json::json!([["127.0.0.1", 5000]]), &[]);
        let text = text(&reply);

        assert_eq!(reply.status, 200);
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("Content-Length: 20\r\n"));
        assert!(text.ends_with("[[\"127.0.0.1\",5000]]"));
    }

    #[tokio::test]
    async fn test_static_file_served_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("static/images")).unwrap();
        let png: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0, 0xff, 13, 10];
        fs::write(dir.path().join("static/images/logo.png"), &png).unwrap();

        let builder = ResponseBuilder::new(ContentRoots::new(dir.path()));
        let reply = builder.build_for_path("/img/logo.png", &[]).await;

        assert_eq!(reply.status, 200);
        assert!(text(&reply).contains("Content-Type: image/png\r\n"));
        assert!(reply.bytes.ends_with(&png));
    }

    #[tokio::test]
    async fn test_missing_file_and_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ResponseBuilder::new(ContentRoots::new(dir.path()));

        assert_eq!(builder.build_for_path("/absent.html", &[]).await, Reply::not_found());
        assert_eq!(builder.build_for_path("/readme.txt", &[]).await, Reply::not_found());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be fails with something other than NotFound.
        fs::create_dir_all(dir.path().join("www/index.html")).unwrap();

        let builder = ResponseBuilder::new(ContentRoots::new(dir.path()));
        assert_eq!(builder.build_for_path("/index.html", &[]).await, Reply::internal_error());
    }

    #[tokio::test]
    async fn test_extra_headers_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("www")).unwrap();
        fs::write(dir.path().join("www/index.html"), "<h1>hi</h1>").unwrap();

        let builder = ResponseBuilder::new(ContentRoots::new(dir.path()));
        let extra = [("Set-Cookie".to_string(), "auth=true".to_string())];
        let reply = builder.build_for_path("/index.html", &extra).await;

        assert!(text(&reply).contains("Set-Cookie: auth=true\r\n"));
        assert!(text(&reply).ends_with("<h1>hi</h1>"));
    }
}
