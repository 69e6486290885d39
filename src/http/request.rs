//! Request parsing.
//!
//! # Responsibilities
//! - Read the request line and split it into method, path and query
//! - Read and discard header lines (no header semantics, no bodies)
//! - Enforce request-line and header size limits
//! - Generate a request ID for tracing
//!
//! # Design Decisions
//! - Query parsing is permissive: split on `&`, then on the first `=`;
//!   values are percent-decoded and the last repeated key wins
//! - A connection that closes before sending anything is not an error

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use uuid::Uuid;

use thiserror::Error;

use crate::config::ListenerConfig;

/// Response header carrying the request ID.
pub const X_REQUEST_ID: &str = "X-Request-Id";

/// Unique identifier attached to every request for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors while reading a request off the wire.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request line: {0:?}")]
    MalformedLine(String),

    #[error("request line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("headers exceed {0} bytes")]
    HeadersTooLarge(usize),

    #[error("request is not valid UTF-8")]
    InvalidEncoding,

    #[error("I/O error reading request: {0}")]
    Io(std::io::Error),
}

impl RequestError {
    /// Whether the client sent something we can answer with 400.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, RequestError::Io(_))
    }
}

impl From<std::io::Error> for RequestError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::InvalidData {
            RequestError::InvalidEncoding
        } else {
            RequestError::Io(e)
        }
    }
}

/// Size limits applied while reading a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_request_line_bytes: usize,
    pub max_header_bytes: usize,
}

impl From<&ListenerConfig> for RequestLimits {
    fn from(config: &ListenerConfig) -> Self {
        Self {
            max_request_line_bytes: config.max_request_line_bytes,
            max_header_bytes: config.max_header_bytes,
        }
    }
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self::from(&ListenerConfig::default())
    }
}

/// Request method. Only `GET` is served; everything else is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Other(method) => method,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request line.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub method: Method,
    /// Target path without the query string.
    pub path: String,
    /// Raw query string after `?`, if any.
    pub query: Option<String>,
}

impl Request {
    /// Parse `METHOD TARGET [VERSION]`.
    pub fn parse_request_line(line: &str) -> Result<Self, RequestError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut parts = line.split(' ').filter(|part| !part.is_empty());
        let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
            return Err(RequestError::MalformedLine(line.to_string()));
        };

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };

        Ok(Self {
            id: RequestId::new(),
            method: Method::parse(method),
            path: path.to_string(),
            query,
        })
    }

    /// Value of a query parameter, percent-decoded. The last occurrence wins.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| key == name)
            .last()
            .map(|(_, value)| value.into_owned())
    }
}

/// Read one request: the request line, then headers up to the blank line.
///
/// The header block is consumed before the request line is parsed, so a
/// malformed request leaves nothing unread on the socket.
///
/// Returns `Ok(None)` when the peer closes without sending a request line.
pub async fn read_request<R>(
    reader: &mut R,
    limits: &RequestLimits,
) -> Result<Option<Request>, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let line = match read_limited_line(reader, limits.max_request_line_bytes).await? {
        LineRead::Line(line) => line,
        LineRead::Eof => return Ok(None),
        LineRead::TooLong => return Err(RequestError::LineTooLong(limits.max_request_line_bytes)),
    };

    let mut header_bytes = 0;
    loop {
        match read_limited_line(reader, limits.max_header_bytes).await? {
            LineRead::Line(line) => {
                if line.trim_end_matches(['\r', '\n']).is_empty() {
                    break;
                }
                header_bytes += line.len();
                if header_bytes > limits.max_header_bytes {
                    return Err(RequestError::HeadersTooLarge(limits.max_header_bytes));
                }
            }
            LineRead::Eof => break,
            LineRead::TooLong => return Err(RequestError::HeadersTooLarge(limits.max_header_bytes)),
        }
    }

    Request::parse_request_line(&line).map(Some)
}

enum LineRead {
    Line(String),
    Eof,
    TooLong,
}

async fn read_limited_line<R>(reader: &mut R, limit: usize) -> Result<LineRead, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = (&mut *reader).take(limit as u64).read_line(&mut line).await?;
    if read == 0 {
        Ok(LineRead::Eof)
    } else if read >= limit && !line.ends_with('\n') {
        Ok(LineRead::TooLong)
    } else {
        Ok(LineRead::Line(line))
    }
}
