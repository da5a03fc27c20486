//! Message framing.
//!
//! # Responsibilities
//! - Read a byte stream until the head/body delimiter is seen
//! - Decode the head one byte per character (ISO-8859-1), never failing
//! - Read exactly `Content-Length` body bytes, or to EOF for backend
//!   responses without a length
//!
//! # Design Decisions
//! - A zero-length read is EOF and ends the loop at once; the frame is
//!   returned with whatever arrived (short body, or `complete == false`
//!   when the delimiter never came)
//! - A missing or unparsable `Content-Length` means "no body" for requests
//! - Chunked transfer-encoding is not interpreted
//!
//! The same reader serves inbound connections, proxy forwarding and the
//! outbound client.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::headers::HeaderMap;

/// Separates the head from the body.
pub const HEAD_DELIMITER: &[u8] = b"\r\n\r\n";

const HEAD_CHUNK: usize = 1024;
const BODY_CHUNK: usize = 4096;

/// What to do when the head carries no usable `Content-Length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// Treat the body as empty (requests).
    Empty,
    /// Read until the peer closes (backend responses).
    UntilClose,
}

/// A framed HTTP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Everything before the first `\r\n\r\n`, decoded as ISO-8859-1.
    pub head: String,
    /// Body bytes, at most `Content-Length` long.
    pub body: Vec<u8>,
    /// False when the stream ended before the delimiter was seen.
    pub complete: bool,
}

/// Error type for framing.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("socket read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Frame {
    /// Parse the head's header lines.
    pub fn headers(&self) -> HeaderMap {
        HeaderMap::from_head(&self.head)
    }

    /// Re-encode the message exactly as it was received.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = encode_latin1(&self.head);
        if self.complete {
            bytes.extend_from_slice(HEAD_DELIMITER);
        }
        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// True when nothing at all was received.
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.body.is_empty()
    }
}

/// Read one message from `reader`.
pub async fn read_frame<R>(reader: &mut R, missing: Missing) -> Result<Frame, FrameError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buffer = Vec::with_capacity(HEAD_CHUNK);
    let mut chunk = [0u8; HEAD_CHUNK];
    let mut searched = 0;

    let split = loop {
        if let Some(pos) = find_delimiter(&buffer, searched) {
            break Some(pos);
        }
        searched = buffer.len().saturating_sub(HEAD_DELIMITER.len() - 1);

        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break None;
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let Some(pos) = split else {
        return Ok(Frame {
            head: decode_latin1(&buffer),
            body: Vec::new(),
            complete: false,
        });
    };

    let mut body = buffer.split_off(pos + HEAD_DELIMITER.len());
    buffer.truncate(pos);
    let head = decode_latin1(&buffer);

    match (content_length(&head), missing) {
        (Some(len), _) => read_body(reader, &mut body, len).await?,
        (None, Missing::Empty) => body.clear(),
        (None, Missing::UntilClose) => {
            reader.read_to_end(&mut body).await?;
        }
    }

    Ok(Frame {
        head,
        body,
        complete: true,
    })
}

/// Declared body length, if present and a valid unsigned integer.
pub fn content_length(head: &str) -> Option<usize> {
    HeaderMap::from_head(head)
        .get("content-length")
        .and_then(|v| v.trim().parse().ok())
}

async fn read_body<R>(reader: &mut R, body: &mut Vec<u8>, len: usize) -> Result<(), FrameError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    if body.len() >= len {
        body.truncate(len);
        return Ok(());
    }

    let mut chunk = vec![0u8; BODY_CHUNK];
    while body.len() < len {
        let want = (len - body.len()).min(BODY_CHUNK);
        let n = reader.read(&mut chunk[..want]).await?;
        if n == 0 {
            tracing::debug!(expected = len, received = body.len(), "peer closed before body was complete");
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

fn find_delimiter(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(HEAD_DELIMITER.len())
        .position(|w| w == HEAD_DELIMITER)
        .map(|p| p + from)
}

pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub(crate) fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect()
}
