use bytes::{BufMut, Bytes, BytesMut};

use crate::http::headers::HeaderTable;
use crate::http::request::Method;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes a request line and header block, terminated by the empty line.
///
/// `target` must already be percent-encoded (and carry its query string).
/// Multi-value headers produce one line per value.
pub fn serialize_request_head(method: &Method, target: &str, headers: &HeaderTable) -> Bytes {
    let mut buf = BytesMut::with_capacity(256);

    // Request line
    buf.put_slice(method.as_str().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(target.as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(HTTP_VERSION.as_bytes());
    buf.put_slice(b"\r\n");

    // Headers
    for (name, value) in headers.lines() {
        buf.put_slice(name.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(b"\r\n");
    }

    // Header/body separator
    buf.put_slice(b"\r\n");

    buf.freeze()
}

/// Frames `data` as one chunk of a chunked body.
pub fn frame_chunk(data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(data.len() + 12);
    buf.put_slice(format!("{:x}\r\n", data.len()).as_bytes());
    buf.put_slice(data);
    buf.put_slice(b"\r\n");
    buf.freeze()
}

/// The zero-size chunk, optional trailers, and the closing empty line.
pub fn frame_last_chunk(trailers: Option<&HeaderTable>) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);
    buf.put_slice(b"0\r\n");
    for (name, value) in trailers.into_iter().flat_map(|t| t.lines()) {
        buf.put_slice(name.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(b"\r\n");
    }
    buf.put_slice(b"\r\n");
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_head_layout() {
        let mut headers = HeaderTable::new();
        headers.insert("content-length", 0u64);
        headers.insert("x-oio-req-id", vec!["a", "b"]);

        let head = serialize_request_head(&Method::PUT, "/c/x?p=1", &headers);
        assert_eq!(
            &head[..],
            &b"PUT /c/x?p=1 HTTP/1.1\r\nContent-Length: 0\r\nX-Oio-Req-Id: a\r\nX-Oio-Req-Id: b\r\n\r\n"[..]
        );
    }

    #[test]
    fn chunk_framing() {
        assert_eq!(&frame_chunk(b"0123456789")[..], b"a\r\n0123456789\r\n");

        let mut trailers = HeaderTable::new();
        trailers.insert("x-oio-chunk-meta-chunk-hash", "00ff");
        assert_eq!(
            &frame_last_chunk(Some(&trailers))[..],
            b"0\r\nX-Oio-Chunk-Meta-Chunk-Hash: 00ff\r\n\r\n"
        );
        assert_eq!(&frame_last_chunk(None)[..], b"0\r\n\r\n");
    }
}
