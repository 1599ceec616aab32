//! Response side of a [`Connection`](crate::http::connection::Connection).
//!
//! A `Response` owns the buffered read half of the socket plus a raw handle
//! on the OS socket, which is what [`Response::force_close`] shuts down.

use std::net::Shutdown;
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;

use crate::error::{Error, ParseError, Result};
use crate::http::content_type::{self, ContentType};
use crate::http::headers::HeaderTable;
use crate::http::parser::{self, StatusLine, Version};
use crate::http::range::{self, ContentRange};

pub(crate) type Reader = BufReader<OwnedReadHalf>;

/// Upper bound on one `read(Some(n))` of a body delimited by connection close.
const MAX_READ_CHUNK: usize = 64 * 1024;

/// Where a response is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// No status line read yet.
    AwaitingStatus,
    /// A `100 Continue` was read by [`Response::expect_response`]; the
    /// final status is still to come.
    Continued,
    ReadingBody,
    /// Body fully consumed.
    Done,
    Closed,
    ForceClosed,
}

/// How the body length is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// No body at all (HEAD, 1xx, 204, 304).
    Empty,
    /// `Content-Length`, with the number of bytes still unread.
    Length(u64),
    /// `Transfer-Encoding: chunked`, with the bytes left in the current
    /// chunk, or `None` when a chunk-size line comes next.
    Chunked(Option<u64>),
    /// No length information, the body ends when the peer closes.
    UntilClose,
}

pub struct Response {
    reader: Option<Reader>,
    socket: Option<Arc<std::net::TcpStream>>,
    state: ResponseState,
    head_request: bool,
    max_header_bytes: usize,

    version: Version,
    status: u16,
    reason: String,
    headers: HeaderTable,
    framing: Framing,
}

impl Response {
    pub(crate) fn new(
        reader: Reader,
        socket: Option<Arc<std::net::TcpStream>>,
        head_request: bool,
        max_header_bytes: usize,
    ) -> Self {
        Self {
            reader: Some(reader),
            socket,
            state: ResponseState::AwaitingStatus,
            head_request,
            max_header_bytes,
            version: Version::Http11,
            status: 0,
            reason: String::new(),
            headers: HeaderTable::new(),
            framing: Framing::Empty,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Status code, `0` until a status line has been read.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.as_str())
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn is_done(&self) -> bool {
        self.state == ResponseState::Done
    }

    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length").and_then(|v| parser::parse_content_length(v).ok())
    }

    /// The parsed `Content-Range` header, if the response carries one.
    pub fn content_range(&self) -> Result<Option<ContentRange>> {
        self.header("Content-Range").map(range::parse_content_range).transpose()
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.header("Content-Type").map(content_type::parse)
    }

    /// Reads one status line and decides whether the peer granted
    /// continuation.
    ///
    /// On `100 Continue` the response parks in [`ResponseState::Continued`]
    /// with the interim header block as its headers; the body can be sent
    /// and [`Response::begin`] reads the real status afterwards. Any other
    /// status is final: headers are parsed right away and the body becomes
    /// readable, without a second status read.
    pub async fn expect_response(&mut self) -> Result<()> {
        if self.state != ResponseState::AwaitingStatus {
            return Err(self.state_error());
        }

        let mut budget = self.max_header_bytes;
        let status = self.read_status(&mut budget).await?;
        if status.is_continue() {
            let headers = self.read_header_block(&mut budget).await?;
            self.version = Version::Http11;
            self.status = status.status;
            self.reason = status.reason;
            self.headers = headers;
            self.state = ResponseState::Continued;
            tracing::trace!("peer granted 100-continue");
            return Ok(());
        }

        self.finish_head(status, &mut budget).await
    }

    /// Reads the final status line and header block.
    ///
    /// Interim `100 Continue` responses are read, their headers discarded,
    /// and the following status line becomes the effective one.
    pub async fn begin(&mut self) -> Result<()> {
        match self.state {
            ResponseState::AwaitingStatus | ResponseState::Continued => {}
            _ => return Err(self.state_error()),
        }

        // Each head, interim or final, gets the full header budget.
        let (status, mut budget) = loop {
            let mut budget = self.max_header_bytes;
            let status = self.read_status(&mut budget).await?;
            if !status.is_continue() {
                break (status, budget);
            }
            self.read_header_block(&mut budget).await?;
            tracing::trace!("skipped interim 100 Continue");
        };

        self.finish_head(status, &mut budget).await
    }

    /// Reads up to `amount` body bytes, or the rest of the body with `None`.
    ///
    /// An empty result means the body is exhausted.
    pub async fn read(&mut self, amount: Option<usize>) -> Result<Bytes> {
        match self.state {
            ResponseState::ReadingBody => {}
            ResponseState::Done => return Ok(Bytes::new()),
            ResponseState::Closed | ResponseState::ForceClosed => return Err(Error::Closed),
            _ => return Err(self.state_error()),
        }
        if amount == Some(0) {
            return Ok(Bytes::new());
        }

        let result = match self.framing {
            Framing::Empty => Ok(Vec::new()),
            Framing::Length(left) => self.read_length(left, amount).await,
            Framing::Chunked(_) => self.read_chunked(amount).await,
            Framing::UntilClose => self.read_until_close(amount).await,
        };

        let data = result?;
        if self.framing == Framing::Empty || self.framing == Framing::Length(0) {
            self.state = ResponseState::Done;
        }
        Ok(Bytes::from(data))
    }

    /// Reads whatever is left of the body.
    pub async fn read_to_end(&mut self) -> Result<Bytes> {
        self.read(None).await
    }

    /// Shuts the OS socket down in both directions right away, whatever the
    /// buffered reader still holds, then closes the response.
    pub fn force_close(&mut self) {
        if let Some(socket) = self.socket.take() {
            if let Err(e) = socket.shutdown(Shutdown::Both) {
                tracing::warn!(error = %e, "socket shutdown failed during force close");
            }
            tracing::debug!(status = self.status, "response force closed");
        }
        self.close();
        self.state = ResponseState::ForceClosed;
    }

    /// Drops the read stream and the socket handle. Safe to call repeatedly
    /// and after [`Response::force_close`].
    pub fn close(&mut self) {
        self.reader = None;
        self.socket = None;
        if self.state != ResponseState::ForceClosed {
            self.state = ResponseState::Closed;
        }
    }

    fn state_error(&self) -> Error {
        match self.state {
            ResponseState::Closed | ResponseState::ForceClosed => Error::Closed,
            ResponseState::AwaitingStatus | ResponseState::Continued => {
                Error::State("the response head has not been read")
            }
            ResponseState::ReadingBody | ResponseState::Done => {
                Error::State("the response head has already been read")
            }
        }
    }

    fn reader(&mut self) -> Result<&mut Reader> {
        self.reader.as_mut().ok_or(Error::Closed)
    }

    async fn finish_head(&mut self, status: StatusLine, budget: &mut usize) -> Result<()> {
        let headers = self.read_header_block(budget).await?;
        self.framing = framing_for(&status, &headers, self.head_request)?;
        self.version = status.version;
        self.status = status.status;
        self.reason = status.reason;
        self.headers = headers;
        self.state = match self.framing {
            Framing::Empty | Framing::Length(0) => ResponseState::Done,
            _ => ResponseState::ReadingBody,
        };
        tracing::trace!(status = self.status, framing = ?self.framing, "response head read");
        Ok(())
    }

    async fn read_status(&mut self, budget: &mut usize) -> Result<StatusLine> {
        let line = read_line(self.reader()?, budget).await?;
        Ok(parser::parse_status_line(&line)?)
    }

    async fn read_header_block(&mut self, budget: &mut usize) -> Result<HeaderTable> {
        let mut lines = Vec::new();
        loop {
            let line = read_line(self.reader()?, budget).await?;
            if line == "\r\n" || line == "\n" {
                break;
            }
            lines.push(line);
        }
        Ok(parser::parse_header_lines(&lines[..])?)
    }

    async fn read_length(&mut self, left: u64, amount: Option<usize>) -> Result<Vec<u8>> {
        let want = amount.map_or(left, |n| left.min(n as u64));
        let data = read_exact(self.reader()?, want).await?;
        self.framing = Framing::Length(left - want);
        Ok(data)
    }

    async fn read_chunked(&mut self, amount: Option<usize>) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let want = match amount {
                Some(n) if out.len() >= n => break,
                Some(n) => (n - out.len()) as u64,
                None => u64::MAX,
            };

            let Framing::Chunked(left) = self.framing else { break };
            match left {
                None => {
                    let mut budget = self.max_header_bytes;
                    let line = read_line(self.reader()?, &mut budget).await?;
                    let size = parser::parse_chunk_size(&line)?;
                    if size == 0 {
                        let trailers = self.read_header_block(&mut budget).await?;
                        for (name, value) in trailers.lines() {
                            self.headers.append(name, value);
                        }
                        self.state = ResponseState::Done;
                        break;
                    }
                    self.framing = Framing::Chunked(Some(size));
                }
                Some(left) => {
                    let take = left.min(want);
                    let data = read_exact(self.reader()?, take).await?;
                    out.extend_from_slice(&data);
                    if left == take {
                        let crlf = read_exact(self.reader()?, 2).await?;
                        if crlf != b"\r\n" {
                            return Err(ParseError::InvalidChunkSize.into());
                        }
                        self.framing = Framing::Chunked(None);
                    } else {
                        self.framing = Framing::Chunked(Some(left - take));
                    }
                }
            }
        }
        Ok(out)
    }

    async fn read_until_close(&mut self, amount: Option<usize>) -> Result<Vec<u8>> {
        let reader = self.reader()?;
        let mut out = Vec::new();
        match amount {
            None => {
                reader.read_to_end(&mut out).await?;
            }
            Some(n) => {
                out.resize(n.min(MAX_READ_CHUNK), 0);
                let read = reader.read(&mut out).await?;
                out.truncate(read);
            }
        }
        if amount.is_none() || out.is_empty() {
            self.state = ResponseState::Done;
        }
        Ok(out)
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("version", &self.version)
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .field("framing", &self.framing)
            .field("state", &self.state)
            .finish()
    }
}

fn framing_for(status: &StatusLine, headers: &HeaderTable, head_request: bool) -> Result<Framing> {
    if head_request || status.is_informational() || status.status == 204 || status.status == 304 {
        return Ok(Framing::Empty);
    }

    let chunked = headers.get("Transfer-Encoding").is_some_and(|te| {
        te.values()
            .flat_map(|v| v.split(','))
            .last()
            .is_some_and(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
    });
    if chunked {
        return Ok(Framing::Chunked(None));
    }

    match headers.get("Content-Length") {
        Some(value) => Ok(Framing::Length(parser::parse_content_length(value.as_str())?)),
        None => Ok(Framing::UntilClose),
    }
}

// Reads one line, newline included, charging its length against `budget`.
async fn read_line(reader: &mut Reader, budget: &mut usize) -> Result<String> {
    let mut line = Vec::new();
    let limit = (*budget as u64).saturating_add(1);
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut line).await?;
    if n > *budget {
        return Err(ParseError::HeadersTooLarge.into());
    }
    if n == 0 || !line.ends_with(b"\n") {
        return Err(ParseError::UnexpectedEof.into());
    }
    *budget -= n;
    Ok(String::from_utf8_lossy(&line).into_owned())
}

async fn read_exact(reader: &mut Reader, len: u64) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let n = (&mut *reader).take(len).read_to_end(&mut out).await?;
    if (n as u64) < len {
        return Err(ParseError::UnexpectedEof.into());
    }
    Ok(out)
}
