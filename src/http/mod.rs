//! HTTP/1.1 client transport.
//!
//! One [`Connection`](connection::Connection) carries one request over a
//! dedicated TCP socket (Nagle disabled). The request head is written when
//! the connection opens; the body follows through `send`, possibly after
//! waiting for the peer's `100 Continue`.
//!
//! - **`connection`**: socket ownership, request head, body writes, `request()` helper
//! - **`response`**: status/header parsing, body framing, force close
//! - **`parser`**: status lines, header blocks, chunk sizes
//! - **`writer`**: request head and chunk serialization
//! - **`request`**: methods, bodies, targets, path encoding
//! - **`headers`**: case-insensitive header table
//! - **`range`**: `Range` / `Content-Range` codec
//! - **`content_type`**: `Content-Type` parameter parsing
//!
//! # Response state machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │  AwaitingStatus  │ ← nothing read yet
//!        └──┬────────────┬──┘
//!           │            │ expect_response() reads "100 Continue"
//!           │            ▼
//!           │     ┌──────────────┐
//!           │     │  Continued   │ ← caller sends the body now
//!           │     └──────┬───────┘
//!           │            │ begin() / Connection::receive()
//!           ▼            ▼
//!        ┌──────────────────┐
//!        │   ReadingBody    │ ← any interim 100 skipped, final head read
//!        └────────┬─────────┘
//!                 │ body consumed
//!                 ▼
//!        ┌──────────────────┐
//!        │       Done       │
//!        └──────────────────┘
//!
//!  close()        → Closed       (from any state)
//!  force_close()  → ForceClosed  (from any state, socket shut down)
//! ```
//!
//! `expect_response()` reading a final status (e.g. `413`) goes straight to
//! `ReadingBody`, so a rejected upload never has to send its body.
//!
//! # Example
//!
//! ```ignore
//! use oio_http::http::connection::{Connection, Expectation};
//! use oio_http::http::headers::HeaderTable;
//! use oio_http::http::request::Method;
//!
//! let mut headers = HeaderTable::new();
//! headers.insert("Content-Length", data.len());
//! headers.insert("Expect", "100-continue");
//!
//! let mut conn = Connection::open("rawx-1:6201", Method::PUT, "/chunk/0A1B", &headers, None).await?;
//! let response = match conn.expect_response().await? {
//!     Expectation::Continue(_) => {
//!         conn.send(&data).await?;
//!         conn.receive().await?
//!     }
//!     Expectation::Final(rejected) => rejected,
//! };
//! ```

pub mod connection;
pub mod content_type;
pub mod headers;
pub mod parser;
pub mod range;
pub mod request;
pub mod response;
pub mod writer;
