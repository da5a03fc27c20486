//! Outbound HTTP/1.1 client.
//!
//! One request per connection: connect, write, read the reply through the
//! framer until the peer closes, parse the status line. Used by the
//! tracker CLI and the integration tests to talk to running roles.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::framer::{read_frame, FrameError, Missing};
use crate::http::headers::HeaderMap;
use crate::routing::gate::SESSION_COOKIE;

/// Error type for outbound requests.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to send request: {0}")]
    Write(#[source] std::io::Error),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("connection closed before a response head arrived")]
    Incomplete,

    #[error("malformed status line {0:?}")]
    MalformedStatusLine(String),

    #[error("response body is not the expected JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A request to send.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: String,
    pub path: String,
    pub host: String,
    pub cookie: Option<String>,
    pub form: Option<BTreeMap<String, String>>,
}

impl OutboundRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            host: "localhost".to_string(),
            cookie: None,
            form: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Add one form field; the body is sent urlencoded-style, unescaped.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.form.as_ref().map(|form| {
            form.iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&")
        });

        let mut head = format!("{} {} HTTP/1.1\r\nHost: {}\r\n", self.method, self.path, self.host);
        if let Some(cookie) = &self.cookie {
            head.push_str(&format!("Cookie: {cookie}\r\n"));
        }
        if let Some(body) = &body {
            head.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
            head.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        if let Some(body) = body {
            bytes.extend_from_slice(body.as_bytes());
        }
        bytes
    }
}

/// A parsed response.
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ClientResponse {
    /// The `name=value` part of `Set-Cookie`, when it is the session cookie.
    pub fn session_cookie(&self) -> Option<&str> {
        let cookie = self.headers.get("set-cookie")?;
        let pair = cookie.split(';').next().unwrap_or(cookie).trim();
        (pair == SESSION_COOKIE).then_some(pair)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Send `request` to `addr` and read the whole reply.
pub async fn send_request(addr: SocketAddr, request: &OutboundRequest) -> Result<ClientResponse, ClientError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect { addr, source })?;

    stream
        .write_all(&request.to_bytes())
        .await
        .map_err(ClientError::Write)?;

    let frame = read_frame(&mut stream, Missing::UntilClose).await?;
    if !frame.complete {
        return Err(ClientError::Incomplete);
    }

    let status = parse_status_line(&frame.head)?;
    tracing::debug!(%addr, method = %request.method, path = %request.path, status, "Response received");

    Ok(ClientResponse {
        status,
        headers: frame.headers(),
        body: frame.body,
    })
}

fn parse_status_line(head: &str) -> Result<u16, ClientError> {
    let line = head.split("\r\n").next().unwrap_or_default();
    let mut parts = line.splitn(3, ' ');

    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse()
            .map_err(|_| ClientError::MalformedStatusLine(line.to_string())),
        _ => Err(ClientError::MalformedStatusLine(line.to_string())),
    }
}
