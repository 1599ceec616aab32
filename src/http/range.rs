//! `Range` and `Content-Range` header codec.

use std::fmt;

use crate::error::{Error, Result};

/// An inclusive byte range. Either bound may be open, not both.
///
/// `end` is signed so that values coming from callers can be validated
/// rather than silently wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: Option<u64>,
    pub end: Option<i64>,
}

impl ByteRange {
    pub fn new(start: Option<u64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    /// `start-end`, both bounds known.
    pub fn closed(start: u64, end: i64) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// `start-`, up to the end of the object.
    pub fn from_offset(start: u64) -> Self {
        Self::new(Some(start), None)
    }

    /// `-len`, the last `len` bytes.
    pub fn suffix(len: i64) -> Self {
        Self::new(None, Some(len))
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match (self.start, self.end) {
            (None, None) => Err(format!("{self:?} has no bound")),
            (_, Some(end)) if end < 0 => Err(format!("{self:?} has a negative end")),
            (Some(start), Some(end)) if (end as u64) < start => {
                Err(format!("{self:?} ends before it starts"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str("-")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

/// A parsed `Content-Range: bytes <start>-<end>/<total>` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

/// Renders ranges as a `Range` request header value.
///
/// ```
/// # use oio_http::http::range::{encode, ByteRange};
/// let value = encode(&[ByteRange::closed(0, 499), ByteRange::from_offset(1000)]).unwrap();
/// assert_eq!(value, "bytes=0-499,1000-");
/// ```
pub fn encode(ranges: &[ByteRange]) -> Result<String> {
    let mut value = String::from("bytes=");
    for (i, range) in ranges.iter().enumerate() {
        range.validate().map_err(Error::InvalidRange)?;
        if i > 0 {
            value.push(',');
        }
        value.push_str(&range.to_string());
    }
    Ok(value)
}

/// Parses a `Range` header value back into its ranges, in order.
/// Whitespace around each bound is allowed (`bytes=0-499, 500-999`).
pub fn decode(value: &str) -> Result<Vec<ByteRange>> {
    let Some(spec) = value.strip_prefix("bytes=") else {
        return Err(Error::InvalidRange(format!("{value:?} is not a bytes range")));
    };

    let invalid = || Error::InvalidRange(format!("invalid byterange value {value:?}"));
    let mut ranges = Vec::new();
    for part in spec.split(',') {
        let (start, end) = part.split_once('-').ok_or_else(invalid)?;
        let (start, end) = (start.trim(), end.trim());
        let start = match start {
            "" => None,
            s => Some(s.parse::<u64>().map_err(|_| invalid())?),
        };
        let end = match end {
            "" => None,
            e => Some(e.parse::<i64>().map_err(|_| invalid())?),
        };
        let range = ByteRange { start, end };
        range.validate().map_err(|_| invalid())?;
        ranges.push(range);
    }
    Ok(ranges)
}

/// Parses a `Content-Range` value of exactly `bytes <start>-<end>/<total>`.
///
/// ```
/// # use oio_http::http::range::{parse_content_range, ContentRange};
/// assert_eq!(
///     parse_content_range("bytes 0-499/1234").unwrap(),
///     ContentRange { start: 0, end: 499, total: 1234 },
/// );
/// assert!(parse_content_range("bytes 0-499").is_err());
/// ```
pub fn parse_content_range(value: &str) -> Result<ContentRange> {
    let invalid = || Error::InvalidContentRange(value.to_string());

    let rest = value.strip_prefix("bytes ").ok_or_else(invalid)?;
    let (span, total) = rest.split_once('/').ok_or_else(invalid)?;
    let (start, end) = span.split_once('-').ok_or_else(invalid)?;

    Ok(ContentRange {
        start: parse_digits(start).ok_or_else(invalid)?,
        end: parse_digits(end).ok_or_else(invalid)?,
        total: parse_digits(total).ok_or_else(invalid)?,
    })
}

// `u64::from_str` tolerates a leading `+`; the grammar here is digits only.
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_rejects_unbounded_and_reversed() {
        assert!(matches!(encode(&[ByteRange::new(None, None)]), Err(Error::InvalidRange(_))));
        assert!(matches!(encode(&[ByteRange::closed(5, 2)]), Err(Error::InvalidRange(_))));
        assert!(matches!(encode(&[ByteRange::suffix(-1)]), Err(Error::InvalidRange(_))));
    }

    #[test]
    fn encode_keeps_dash_for_open_bounds() {
        let value = encode(&[ByteRange::suffix(500), ByteRange::from_offset(9500)]).unwrap();
        assert_eq!(value, "bytes=-500,9500-");
    }

    #[test]
    fn encode_empty_list() {
        assert_eq!(encode(&[]).unwrap(), "bytes=");
    }

    #[test]
    fn decode_single_forms() {
        assert_eq!(decode("bytes=0-499").unwrap(), vec![ByteRange::closed(0, 499)]);
        assert_eq!(decode("bytes=500-").unwrap(), vec![ByteRange::from_offset(500)]);
        assert_eq!(decode("bytes=-500").unwrap(), vec![ByteRange::suffix(500)]);
    }

    #[test]
    fn decode_rejects_bad_values() {
        assert!(decode("notbytes=0-1").is_err());
        assert!(decode("bytes=-").is_err());
        assert!(decode("bytes=10-2").is_err());
        assert!(decode("bytes=abc-2").is_err());
        assert!(decode("bytes=12").is_err());
    }

    #[test]
    fn content_range_requires_exact_grammar() {
        assert!(parse_content_range("bytes 0-499/1234 ").is_err());
        assert!(parse_content_range("bytes=0-499/1234").is_err());
        assert!(parse_content_range("bytes 0-499/*").is_err());
        assert!(parse_content_range("bytes +0-499/1234").is_err());
    }
}
