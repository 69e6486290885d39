//! Response framing.
//!
//! # Responsibilities
//! - Build complete HTTP/1.1 responses: status line, `Content-Type`,
//!   byte-accurate `Content-Length`, `Connection: close`
//! - Open CORS (`Access-Control-Allow-Origin: *`) on every JSON response
//! - Provide the canned error bodies (404 HTML, 400/500 JSON)

use serde::Serialize;

use crate::http::request::{RequestId, X_REQUEST_ID};

const HTML: &str = "text/html; charset=UTF-8";
const JSON: &str = "application/json; charset=UTF-8";

const NOT_FOUND_PAGE: &str = "<html><body><h1>404 Not Found</h1></body></html>";

/// Status codes this server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

/// `{success, message}` body shared by the mutating endpoints and 400/500 errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
        }
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    content_type: &'static str,
    cors: bool,
    request_id: Option<RequestId>,
    body: Vec<u8>,
}

impl Response {
    /// An HTML response.
    pub fn html(status: Status, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: HTML,
            cors: false,
            request_id: None,
            body: body.into().into_bytes(),
        }
    }

    /// A JSON response. Serialization failures become a 500.
    pub fn json<T: Serialize + ?Sized>(status: Status, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::raw_json(status, body),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Self::internal_error()
            }
        }
    }

    fn raw_json(status: Status, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: JSON,
            cors: true,
            request_id: None,
            body,
        }
    }

    /// 400 with `{"success": false, "message": "Bad request"}`.
    pub fn bad_request() -> Self {
        Self::json(Status::BadRequest, &Outcome::new(false, "Bad request"))
    }

    /// 404 HTML page.
    pub fn not_found() -> Self {
        Self::html(Status::NotFound, NOT_FOUND_PAGE)
    }

    /// 500 with `{"success": false, "message": "Internal server error"}`.
    pub fn internal_error() -> Self {
        let body = br#"{"success":false,"message":"Internal server error"}"#.to_vec();
        Self::raw_json(Status::InternalServerError, body)
    }

    /// Tag the response with the request ID header.
    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serialize head and body into the bytes written to the socket.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type,
            self.body.len(),
        );
        if self.cors {
            head.push_str("Access-Control-Allow-Origin: *\r\n");
        }
        if let Some(id) = self.request_id {
            head.push_str(&format!("{X_REQUEST_ID}: {id}\r\n"));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
