use std::net::Shutdown;
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::headers::{HeaderTable, is_token};
use crate::http::request::{self, Body, Method, Target};
use crate::http::response::{Reader, Response, ResponseState};
use crate::http::writer;

/// What a [`ResponseHook`] is told about once a response head arrived.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub method: &'a Method,
    pub host: &'a str,
    pub port: u16,
    /// Encoded path, query string included.
    pub path: &'a str,
}

/// Observer invoked by [`Connection::receive`] after each final response head.
pub type ResponseHook = Arc<dyn Fn(&Exchange<'_>) + Send + Sync>;

/// The default hook: one debug line per exchange.
pub fn log_exchange(exchange: &Exchange<'_>) {
    tracing::debug!(
        method = %exchange.method,
        host = exchange.host,
        port = exchange.port,
        path = exchange.path,
        "HTTP {} {}:{} {}",
        exchange.method,
        exchange.host,
        exchange.port,
        exchange.path,
    );
}

/// Outcome of [`Connection::expect_response`].
#[derive(Debug)]
pub enum Expectation {
    /// The peer answered `100 Continue`, with that interim header block.
    /// Send the body, then call [`Connection::receive`].
    Continue(HeaderTable),
    /// The peer answered with a final status before any body was sent.
    Final(Response),
}

/// One TCP connection carrying one request.
///
/// The request head is written by [`Connection::open`]; the body, if any,
/// goes through [`Connection::send`] (or the chunk helpers), and
/// [`Connection::receive`] yields the [`Response`]. No pipelining, no reuse.
pub struct Connection {
    target: Target,
    method: Method,
    path: String,
    headers: HeaderTable,
    max_header_bytes: usize,

    writer: Option<OwnedWriteHalf>,
    reader: Option<Reader>,
    pending: Option<Response>,
    socket: Option<Arc<std::net::TcpStream>>,
    hook: ResponseHook,
}

impl Connection {
    /// Opens a connection with the default [`ClientConfig`].
    pub async fn open(
        host: &str,
        method: Method,
        path: impl AsRef<[u8]>,
        headers: &HeaderTable,
        query_string: Option<&str>,
    ) -> Result<Self> {
        Self::open_with(&ClientConfig::default(), host, method, path, headers, query_string).await
    }

    /// Connects to `host`, disables Nagle, and writes the request head.
    pub async fn open_with(
        config: &ClientConfig,
        host: &str,
        method: Method,
        path: impl AsRef<[u8]>,
        headers: &HeaderTable,
        query_string: Option<&str>,
    ) -> Result<Self> {
        let target = Target::parse(host, config.default_port)?;

        if !is_token(method.as_str()) {
            return Err(Error::InvalidMethod(method.as_str().to_string()));
        }

        let mut path = request::encode_request_path(path.as_ref(), config.strict_path_encoding)?;
        if let Some(query) = query_string.filter(|q| !q.is_empty()) {
            request::validate_query(query)?;
            path.push('?');
            path.push_str(query);
        }

        let mut headers = headers.clone();
        if !headers.contains("Host") {
            headers.insert("Host", target.host_header());
        }
        if !headers.contains("Accept-Encoding") {
            headers.insert("Accept-Encoding", "identity");
        }
        if let Some(agent) = &config.user_agent {
            if !headers.contains("User-Agent") {
                headers.insert("User-Agent", agent.as_str());
            }
        }

        headers.validate()?;

        let stream = TcpStream::connect(target.socket_addr()).await?;
        stream.set_nodelay(true)?;

        // Keep a duplicate of the OS handle so the socket can be shut down
        // regardless of what the tokio halves are doing.
        let std_stream = stream.into_std()?;
        let raw = std_stream.try_clone()?;
        let stream = TcpStream::from_std(std_stream)?;
        tracing::trace!(peer = %target, "connected");

        let (read_half, mut write_half) = stream.into_split();
        let head = writer::serialize_request_head(&method, &path, &headers);
        write_half.write_all(&head).await?;
        write_half.flush().await?;

        Ok(Self {
            target,
            method,
            path,
            headers,
            max_header_bytes: config.max_header_bytes,
            writer: Some(write_half),
            reader: Some(BufReader::new(read_half)),
            pending: None,
            socket: Some(Arc::new(raw)),
            hook: Arc::new(log_exchange),
        })
    }

    /// Replaces the observer called after each response head.
    pub fn set_hook(&mut self, hook: ResponseHook) {
        self.hook = hook;
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The encoded request target as written on the request line.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers as they were sent, implicit ones included.
    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Writes raw body bytes. Framing is the caller's business and must
    /// agree with the headers already sent.
    pub async fn send(&mut self, body: &[u8]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::Closed)?;
        writer.write_all(body).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Writes one chunk of a `Transfer-Encoding: chunked` body. Empty data
    /// is skipped, since a zero-size chunk would end the body.
    pub async fn send_chunk(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.send(&writer::frame_chunk(data)).await
    }

    /// Ends a chunked body, with optional trailers.
    pub async fn finish_chunked(&mut self, trailers: Option<&HeaderTable>) -> Result<()> {
        if let Some(trailers) = trailers {
            trailers.validate()?;
        }
        self.send(&writer::frame_last_chunk(trailers)).await
    }

    /// Waits for the peer's verdict on an `Expect: 100-continue` request
    /// whose body has not been sent yet.
    pub async fn expect_response(&mut self) -> Result<Expectation> {
        if self.pending.is_some() {
            return Err(Error::State("a 100 Continue was already received"));
        }

        let mut response = self.new_response()?;
        response.expect_response().await?;
        if response.state() == ResponseState::Continued {
            let headers = response.headers().clone();
            self.pending = Some(response);
            return Ok(Expectation::Continue(headers));
        }

        self.notify();
        Ok(Expectation::Final(response))
    }

    /// Reads the final response head. Interim `100 Continue` responses are
    /// skipped.
    pub async fn receive(&mut self) -> Result<Response> {
        let mut response = match self.pending.take() {
            Some(response) => response,
            None => self.new_response()?,
        };
        response.begin().await?;
        self.notify();
        Ok(response)
    }

    /// Orderly shutdown: sends FIN and releases the socket. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.shutdown().await {
                tracing::debug!(peer = %self.target, error = %e, "shutdown on close failed");
            }
        }
        self.release();
    }

    /// Shuts the OS socket down in both directions immediately, then
    /// releases everything. Any response still reading from this socket
    /// sees the stream end.
    pub fn force_close(&mut self) {
        if let Some(socket) = self.socket.take() {
            if let Err(e) = socket.shutdown(Shutdown::Both) {
                tracing::warn!(peer = %self.target, error = %e, "socket shutdown failed during force close");
            }
            tracing::debug!(peer = %self.target, "connection force closed");
        }
        if let Some(mut pending) = self.pending.take() {
            pending.force_close();
        }
        self.release();
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    fn release(&mut self) {
        self.writer = None;
        self.reader = None;
        if let Some(mut pending) = self.pending.take() {
            pending.close();
        }
        self.socket = None;
    }

    fn new_response(&mut self) -> Result<Response> {
        let reader = match self.reader.take() {
            Some(reader) => reader,
            None if self.writer.is_none() => return Err(Error::Closed),
            None => return Err(Error::State("a response was already taken from this connection")),
        };
        Ok(Response::new(
            reader,
            self.socket.clone(),
            self.method == Method::HEAD,
            self.max_header_bytes,
        ))
    }

    fn notify(&self) {
        let exchange = Exchange {
            method: &self.method,
            host: &self.target.host,
            port: self.target.port,
            path: &self.path,
        };
        (self.hook)(&exchange);
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// One complete exchange with the default [`ClientConfig`].
pub async fn request(
    host: &str,
    method: Method,
    path: &str,
    headers: Option<HeaderTable>,
    query_string: Option<&str>,
    body: Body,
) -> Result<(Response, Bytes)> {
    request_with(&ClientConfig::default(), host, method, path, headers, query_string, body).await
}

/// Opens a connection, sends `body` with a `Content-Length`, reads the
/// whole response and closes everything.
///
/// JSON bodies are serialized and labelled `application/json`. On any
/// failure after connecting, the connection is force closed.
pub async fn request_with(
    config: &ClientConfig,
    host: &str,
    method: Method,
    path: &str,
    headers: Option<HeaderTable>,
    query_string: Option<&str>,
    body: Body,
) -> Result<(Response, Bytes)> {
    let mut headers = headers.unwrap_or_default();
    let payload = match body {
        Body::Empty => Bytes::new(),
        Body::Raw(bytes) => bytes,
        Body::Json(value) => {
            headers.insert("Content-Type", "application/json");
            Bytes::from(serde_json::to_vec(&value)?)
        }
    };
    headers.insert("Content-Length", payload.len());

    let mut conn = Connection::open_with(config, host, method, path, &headers, query_string).await?;

    let exchange = async {
        if !payload.is_empty() {
            conn.send(&payload).await?;
        }
        let mut response = conn.receive().await?;
        let body = response.read_to_end().await?;
        response.close();
        Ok::<_, Error>((response, body))
    }
    .await;

    match exchange {
        Ok(done) => {
            conn.close().await;
            Ok(done)
        }
        Err(e) => {
            tracing::warn!(peer = %conn.target(), error = %e, "request failed, dropping connection");
            conn.force_close();
            Err(e)
        }
    }
}
