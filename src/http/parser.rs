use std::fmt;

use crate::error::ParseError;
use crate::http::headers::HeaderTable;

/// Protocol version of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: Version,
    pub status: u16,
    pub reason: String,
}

impl StatusLine {
    pub fn is_continue(&self) -> bool {
        self.status == 100
    }

    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.status)
    }
}

/// Parses `HTTP/1.x <code>[ <reason>]`, with or without its line ending.
pub fn parse_status_line(line: &str) -> Result<StatusLine, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(ParseError::UnexpectedEof);
    }

    let mut parts = line.splitn(3, ' ');
    let version = parts.next().ok_or(ParseError::InvalidStatusLine)?;
    let code = parts.next().ok_or(ParseError::InvalidStatusLine)?;
    let reason = parts.next().unwrap_or("").trim();

    let version = match version {
        "HTTP/1.0" => Version::Http10,
        v if v.starts_with("HTTP/1.") => Version::Http11,
        v if v.starts_with("HTTP/") => return Err(ParseError::InvalidVersion),
        _ => return Err(ParseError::InvalidStatusLine),
    };

    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidStatusCode);
    }
    let status: u16 = code.parse().map_err(|_| ParseError::InvalidStatusCode)?;
    if status < 100 {
        return Err(ParseError::InvalidStatusCode);
    }

    Ok(StatusLine { version, status, reason: reason.to_string() })
}

/// Parses the header lines of a response head (status line excluded).
///
/// Repeated names are folded into a multi-value entry in arrival order.
/// Lines starting with whitespace continue the previous header value.
pub fn parse_header_lines<S: AsRef<str>>(lines: &[S]) -> Result<HeaderTable, ParseError> {
    let mut parsed: Vec<(String, String)> = Vec::new();

    for line in lines {
        let line = line.as_ref().trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            let (_, value) = parsed.last_mut().ok_or(ParseError::InvalidHeader)?;
            value.push(' ');
            value.push_str(line.trim());
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let key = key.trim();
        if key.is_empty() || key.contains([' ', '\t']) {
            return Err(ParseError::InvalidHeader);
        }
        parsed.push((key.to_string(), value.trim().to_string()));
    }

    let mut headers = HeaderTable::new();
    for (key, value) in parsed {
        headers.append(&key, value);
    }
    Ok(headers)
}

/// Parses a chunk-size line, ignoring chunk extensions.
pub fn parse_chunk_size(line: &str) -> Result<u64, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let size = line.split(';').next().unwrap_or("").trim();
    if size.is_empty() || !size.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidChunkSize);
    }
    u64::from_str_radix(size, 16).map_err(|_| ParseError::InvalidChunkSize)
}

pub fn parse_content_length(value: &str) -> Result<u64, ParseError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidContentLength);
    }
    value.parse().map_err(|_| ParseError::InvalidContentLength)
}
