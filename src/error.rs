//! Error types shared by the transport.

use std::fmt;

use thiserror::Error;

/// Ways a response head or body framing can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The status line does not have the `HTTP/x.y <code> [reason]` shape.
    InvalidStatusLine,
    /// The protocol token is not `HTTP/1.0` or `HTTP/1.1`.
    InvalidVersion,
    /// The status code is not a three digit number.
    InvalidStatusCode,
    /// A header line without a colon, or with an empty name.
    InvalidHeader,
    InvalidContentLength,
    InvalidChunkSize,
    /// The response head grew past the configured limit.
    HeadersTooLarge,
    /// The peer closed the connection in the middle of a message.
    UnexpectedEof,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidStatusLine => "invalid status line",
            ParseError::InvalidVersion => "unsupported HTTP version",
            ParseError::InvalidStatusCode => "invalid status code",
            ParseError::InvalidHeader => "invalid header line",
            ParseError::InvalidContentLength => "invalid Content-Length",
            ParseError::InvalidChunkSize => "invalid chunk size",
            ParseError::HeadersTooLarge => "response headers too large",
            ParseError::UnexpectedEof => "connection closed mid-message",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("invalid content-range {0:?}")]
    InvalidContentRange(String),

    #[error("protocol error: {0}")]
    Protocol(ParseError),

    #[error("cannot encode request path: {0}")]
    Encoding(String),

    #[error("invalid method {0:?}")]
    InvalidMethod(String),

    #[error("invalid target host {0:?}")]
    InvalidTarget(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid query string {0:?}")]
    InvalidQuery(String),

    #[error("connection closed")]
    Closed,

    #[error("operation not allowed while {0}")]
    State(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("json body: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Error::Protocol(error)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
