//! oio-http - HTTP/1.1 transport for storage services
//!
//! Explicit connections with `Expect: 100-continue` support, abrupt socket
//! teardown, and the header codecs the services share.

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{Error, ParseError, Result};
pub use http::connection::{Connection, Expectation, request};
pub use http::headers::{HeaderTable, HeaderValue};
pub use http::request::{Body, Method};
pub use http::response::Response;
