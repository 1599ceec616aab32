//! Case-insensitive header table.
//!
//! Names are canonicalized to Title-Case at every `-` boundary on both
//! write and read, so `content-length`, `CONTENT-LENGTH` and
//! `Content-Length` all address the same entry. Values are either a single
//! string or a list rendered as repeated header lines.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// A single or repeated header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    One(String),
    Many(Vec<String>),
}

impl HeaderValue {
    /// First value, which is the whole value for single-valued headers.
    pub fn as_str(&self) -> &str {
        match self {
            HeaderValue::One(v) => v,
            HeaderValue::Many(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Every value, in the order they will appear on the wire.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            HeaderValue::One(v) => std::slice::from_ref(v),
            HeaderValue::Many(vs) => vs,
        };
        slice.iter().map(String::as_str)
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::One(first) => {
                let first = std::mem::take(first);
                *self = HeaderValue::Many(vec![first, value]);
            }
            HeaderValue::Many(vs) => vs.push(value),
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::One(v) => f.write_str(v),
            HeaderValue::Many(vs) => f.write_str(&vs.join(", ")),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        HeaderValue::One(v.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(v: String) -> Self {
        HeaderValue::One(v)
    }
}

impl<T: ToString> From<Vec<T>> for HeaderValue {
    fn from(vs: Vec<T>) -> Self {
        HeaderValue::Many(vs.iter().map(ToString::to_string).collect())
    }
}

macro_rules! header_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for HeaderValue {
            fn from(v: $t) -> Self {
                HeaderValue::One(v.to_string())
            }
        })*
    };
}

header_value_from_int!(u16, u32, u64, usize, i32, i64);

/// Canonical Title-Case form of a header name.
///
/// ```
/// # use oio_http::http::headers::canonical_name;
/// assert_eq!(canonical_name("content-type"), "Content-Type");
/// assert_eq!(canonical_name("X-OIO-CHUNK-META"), "X-Oio-Chunk-Meta");
/// ```
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut word_start = true;
    for c in name.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        word_start = c == '-';
    }
    out
}

/// RFC 7230 `tchar`: what a header name or method may be made of.
pub fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Checks that a name/value pair can be written as exactly one header line.
pub fn validate_field(name: &str, value: &str) -> Result<()> {
    if !is_token(name) {
        return Err(Error::InvalidHeader(format!("illegal header name {name:?}")));
    }
    if value.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0')) {
        return Err(Error::InvalidHeader(format!("illegal value for header {name}: {value:?}")));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    entries: BTreeMap<String, HeaderValue>,
}

impl HeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from an existing header source, then applies
    /// `overrides`, which win on conflict. `None` values remove the key.
    pub fn from_parts<I, O, K, V>(initial: I, overrides: O) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        O: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: Into<HeaderValue>,
    {
        let mut table = Self::new();
        table.update(initial);
        table.update(overrides);
        table
    }

    pub fn update<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: Into<HeaderValue>,
    {
        for (name, value) in pairs {
            self.set(name.as_ref(), value);
        }
    }

    /// Stores `value` under the canonical form of `name`, replacing any
    /// previous value. A `None` value deletes the entry.
    pub fn set<V: Into<HeaderValue>>(&mut self, name: &str, value: Option<V>) {
        let key = canonical_name(name);
        match value {
            Some(value) => {
                self.entries.insert(key, value.into());
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }

    /// Shorthand for `set(name, Some(value))`.
    pub fn insert<V: Into<HeaderValue>>(&mut self, name: &str, value: V) {
        self.set(name, Some(value));
    }

    /// Adds one more value for `name`, turning it into a multi-value
    /// header if it already exists.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let key = canonical_name(name);
        let value = value.into();
        match self.entries.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                self.entries.insert(key, HeaderValue::One(value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries.get(&canonical_name(name))
    }

    /// Single-string lookup with a fallback.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).map(HeaderValue::as_str).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&canonical_name(name))
    }

    /// Removes `name` and returns its value. Absent names are not an error.
    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.entries.remove(&canonical_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// One `(name, value)` pair per wire line; multi-value headers repeat
    /// their name.
    pub fn lines(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, v)| v.values().map(move |v| (k.as_str(), v)))
    }

    /// Fails on the first entry that would not serialize to a single,
    /// well-formed header line.
    pub fn validate(&self) -> Result<()> {
        self.lines().try_for_each(|(name, value)| validate_field(name, value))
    }
}

impl<K: AsRef<str>, V: Into<HeaderValue>> FromIterator<(K, V)> for HeaderTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k.as_ref(), v);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_each_dash_separated_word() {
        assert_eq!(canonical_name("x-oio-chunk-meta-chunk-id"), "X-Oio-Chunk-Meta-Chunk-Id");
        assert_eq!(canonical_name("HOST"), "Host");
        assert_eq!(canonical_name(""), "");
    }

    #[test]
    fn append_promotes_to_many() {
        let mut table = HeaderTable::new();
        table.append("set-cookie", "a=1");
        table.append("Set-Cookie", "b=2");

        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines, vec![("Set-Cookie", "a=1"), ("Set-Cookie", "b=2")]);
    }

    #[test]
    fn validate_rejects_line_breaks_and_bad_names() {
        let mut table = HeaderTable::new();
        table.insert("x-oio-meta", "a; b=\"c d\"");
        assert!(table.validate().is_ok());

        table.insert("x-oio-meta", "a\r\nX-Injected: yes");
        assert!(matches!(table.validate(), Err(Error::InvalidHeader(_))));

        table.insert("x-oio-meta", vec!["ok", "nul\0"]);
        assert!(matches!(table.validate(), Err(Error::InvalidHeader(_))));

        let mut table = HeaderTable::new();
        table.insert("bad name", "v");
        assert!(matches!(table.validate(), Err(Error::InvalidHeader(_))));
        assert!(validate_field("X:Y", "v").is_err());
        assert!(validate_field("", "v").is_err());
    }
}
