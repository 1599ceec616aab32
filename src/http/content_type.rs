//! `Content-Type` parameter parsing.
//!
//! Parameters follow the grammar
//!
//! ```text
//! param = *WS ";" *WS token *WS [ "=" *WS ( token / quoted-string ) ]
//! ```
//!
//! Fragments that do not fit are skipped, never reported.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub base: String,
    /// `(name, value)` pairs in header order, duplicates kept. Quoted values
    /// keep their quotes; a parameter without `=` has an empty value.
    pub params: Vec<(String, String)>,
}

impl ContentType {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Splits a raw `Content-Type` value into its media type and parameters.
///
/// ```
/// # use oio_http::http::content_type::parse;
/// let ct = parse("text/plain; charset=utf-8");
/// assert_eq!(ct.base, "text/plain");
/// assert_eq!(ct.params, vec![("charset".to_string(), "utf-8".to_string())]);
/// ```
pub fn parse(raw: &str) -> ContentType {
    let Some((base, tail)) = raw.split_once(';') else {
        return ContentType { base: raw.trim().to_string(), params: Vec::new() };
    };

    let chars: Vec<char> = std::iter::once(';').chain(tail.chars()).collect();
    let mut params = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        match match_param(&chars, pos) {
            Some((name, value, next)) => {
                params.push((name, value));
                pos = next;
            }
            None => pos += 1,
        }
    }

    ContentType { base: base.trim().to_string(), params }
}

fn is_separator(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '='
            | '{' | '}'
    )
}

fn is_token_char(c: char) -> bool {
    !(c <= '\x20' || c == '\x7f' || is_separator(c))
}

fn skip_ws(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }
    pos
}

fn take_token(chars: &[char], start: usize) -> Option<usize> {
    let mut end = start;
    while end < chars.len() && is_token_char(chars[end]) {
        end += 1;
    }
    (end > start).then_some(end)
}

fn take_quoted(chars: &[char], start: usize) -> Option<usize> {
    if chars.get(start) != Some(&'"') {
        return None;
    }
    let mut pos = start + 1;
    while pos < chars.len() {
        match chars[pos] {
            '"' => return Some(pos + 1),
            '\\' if pos + 1 < chars.len() && chars[pos + 1] != '\n' => pos += 2,
            '\\' => return None,
            _ => pos += 1,
        }
    }
    None
}

// Attempts one parameter match at `pos`, returning it and where it ends.
fn match_param(chars: &[char], pos: usize) -> Option<(String, String, usize)> {
    let pos = skip_ws(chars, pos);
    if chars.get(pos) != Some(&';') {
        return None;
    }
    let name_start = skip_ws(chars, pos + 1);
    let name_end = take_token(chars, name_start)?;
    let name: String = chars[name_start..name_end].iter().collect();

    let after_name = skip_ws(chars, name_end);
    if chars.get(after_name) == Some(&'=') {
        let value_start = skip_ws(chars, after_name + 1);
        let value_end = take_token(chars, value_start).or_else(|| take_quoted(chars, value_start));
        if let Some(value_end) = value_end {
            let value: String = chars[value_start..value_end].iter().collect();
            return Some((name.trim().to_string(), value.trim().to_string(), value_end));
        }
    }
    Some((name.trim().to_string(), String::new(), after_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(ct: &ContentType) -> Vec<(&str, &str)> {
        ct.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn no_params() {
        let ct = parse("text/plain");
        assert_eq!(ct.base, "text/plain");
        assert!(ct.params.is_empty());
    }

    #[test]
    fn empty_value() {
        let ct = parse("");
        assert_eq!(ct.base, "");
        assert!(ct.params.is_empty());
    }

    #[test]
    fn quoted_values_keep_quotes_and_escapes() {
        let ct = parse(r#"multipart/byteranges; boundary="a \"b\" c""#);
        assert_eq!(pairs(&ct), vec![("boundary", r#""a \"b\" c""#)]);
    }

    #[test]
    fn flag_parameter_without_value() {
        let ct = parse("application/x; flag; level=1");
        assert_eq!(pairs(&ct), vec![("flag", ""), ("level", "1")]);
    }

    #[test]
    fn garbage_is_skipped() {
        let ct = parse("text/html; ;; =oops; charset = latin1 ; @@");
        assert_eq!(pairs(&ct), vec![("charset", "latin1")]);
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let ct = parse("a/b; x=1; y=2; x=3");
        assert_eq!(pairs(&ct), vec![("x", "1"), ("y", "2"), ("x", "3")]);
        assert_eq!(ct.param("X"), Some("1"));
    }
}
