//! In-process peer for transport tests.

#![allow(dead_code)]

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

/// Binds an ephemeral port on loopback and returns it with its address.
pub async fn listen() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

/// Reads a request head, up to and including the empty line.
pub async fn read_head(stream: &mut TcpStream) -> String {
    read_until_suffix(stream, b"\r\n\r\n").await
}

/// Reads byte by byte until the data ends with `suffix` or the peer closes.
pub async fn read_until_suffix(stream: &mut TcpStream, suffix: &[u8]) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(suffix) {
        let n = stream.read(&mut byte).await.unwrap();
        if n == 0 {
            break;
        }
        buf.push(byte[0]);
    }
    String::from_utf8(buf).unwrap()
}

pub async fn read_body(stream: &mut TcpStream, len: usize) -> Vec<u8> {
    let mut body = vec![0u8; len];
    stream.read_exact(&mut body).await.unwrap();
    body
}

/// `Content-Length` announced by a request head, 0 when absent.
pub fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .map(|v| v.trim().parse().unwrap())
        .unwrap_or(0)
}
