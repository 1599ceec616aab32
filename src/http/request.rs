use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};

use crate::error::{Error, Result};

/// HTTP request methods.
///
/// The storage services mostly speak GET/HEAD/PUT/POST/DELETE; anything
/// else (WebDAV-style `COPY`, vendor extensions) goes through
/// [`Method::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    PUT,
    POST,
    DELETE,
    OPTIONS,
    PATCH,
    COPY,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::PUT => "PUT",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::COPY => "COPY",
            Method::Other(m) => m,
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Case-sensitive, as methods are on the wire.
    ///
    /// ```
    /// # use oio_http::http::request::Method;
    /// assert_eq!("GET".parse::<Method>().unwrap(), Method::GET);
    /// assert_eq!("LINK".parse::<Method>().unwrap(), Method::Other("LINK".into()));
    /// assert!("".parse::<Method>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "PUT" => Method::PUT,
            "POST" => Method::POST,
            "DELETE" => Method::DELETE,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            "COPY" => Method::COPY,
            other if other.is_empty() || other.bytes().any(|b| b <= b' ' || b == 0x7f) => {
                return Err(Error::InvalidMethod(other.to_string()));
            }
            other => Method::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload for [`crate::http::connection::request`].
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Raw(Bytes),
    /// Serialized to JSON, with `Content-Type: application/json`.
    Json(serde_json::Value),
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Raw(b)
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self {
        Body::Raw(Bytes::from(b))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Raw(Bytes::from_static(s.as_bytes()))
    }
}

impl From<serde_json::Value> for Body {
    fn from(v: serde_json::Value) -> Self {
        Body::Json(v)
    }
}

/// Where a connection goes: `host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    /// Parses `host`, `host:port`, `[v6]` or `[v6]:port`.
    pub fn parse(raw: &str, default_port: u16) -> Result<Self> {
        let invalid = || Error::InvalidTarget(raw.to_string());
        if raw.is_empty() || raw.contains('/') {
            return Err(invalid());
        }

        let url = url::Url::parse(&format!("http://{raw}/")).map_err(|_| invalid())?;
        let host = match url.host().ok_or_else(invalid)? {
            url::Host::Domain(d) => d.to_string(),
            url::Host::Ipv4(ip) => ip.to_string(),
            url::Host::Ipv6(ip) => ip.to_string(),
        };
        // `url` drops the port when it equals the scheme default.
        let port = match url.port() {
            Some(port) => port,
            None if has_explicit_port(raw) => 80,
            None => default_port,
        };
        Ok(Self { host, port })
    }

    /// Value for the `Host` header; the port is left out when it is 80.
    pub fn host_header(&self) -> String {
        let host: Cow<'_, str> = if self.host.contains(':') {
            Cow::Owned(format!("[{}]", self.host))
        } else {
            Cow::Borrowed(&self.host)
        };
        if self.port == 80 { host.into_owned() } else { format!("{host}:{}", self.port) }
    }

    pub fn socket_addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

fn has_explicit_port(raw: &str) -> bool {
    match raw.rfind(':') {
        Some(i) => !raw[i..].contains(']'),
        None => false,
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Bytes that stay literal in a request path: unreserved characters and `/`.
const PATH: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~').remove(b'/');

/// Percent-encodes `path` for the request line, prefixing `/` when missing.
pub fn encode_path(path: &str) -> String {
    encode_path_bytes(path.as_bytes())
}

/// Byte-path variant of [`encode_path`]. Non UTF-8 input is encoded byte
/// by byte; only strict mode turns that into an error.
pub fn encode_path_bytes(path: &[u8]) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    if path.first() != Some(&b'/') {
        out.push('/');
    }
    out.extend(percent_encode(path, PATH));
    out
}

/// Encodes `path`, applying the lenient or strict policy to invalid UTF-8.
pub fn encode_request_path(path: &[u8], strict: bool) -> Result<String> {
    if let Err(e) = std::str::from_utf8(path) {
        if strict {
            return Err(Error::Encoding(e.to_string()));
        }
        tracing::error!(error = %e, "request path is not valid UTF-8, encoding raw bytes");
    }
    Ok(encode_path_bytes(path))
}

/// A query string goes on the request line verbatim, so it must not carry
/// spaces or control characters.
pub fn validate_query(query: &str) -> Result<()> {
    if query.bytes().any(|b| b == b' ' || b.is_ascii_control()) {
        return Err(Error::InvalidQuery(query.to_string()));
    }
    Ok(())
}
