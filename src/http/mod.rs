//! HTTP Module
//!
//! Minimal HTTP/1.1 frontend for the engine.
//!
//! ## Architecture
//! - Single acceptor thread on a non-blocking listener
//! - One detached worker thread per accepted connection
//! - One request per connection: read head, read body, dispatch, reply, close
//! - A typed service routes requests to engine operations
//!
//! ## Wire handling
//! ```text
//! ┌───────────────────────┬──────┬───────────────────┐
//! │ request line + headers│ CRLF │       body        │
//! │  (up to 2 KiB)        │ CRLF │ (Content-Length)  │
//! └───────────────────────┴──────┴───────────────────┘
//! ```

mod message;
mod connection;
mod server;
mod service;

pub use message::{Request, Response};
pub use connection::Connection;
pub use server::HttpServer;
pub use service::{ImgFsService, BASE_FILE};

/// CRLF line delimiter
pub const LINE_DELIM: &str = "\r\n";

/// Blank line terminating the request head
pub const HEAD_END_DELIM: &str = "\r\n\r\n";

/// Largest accepted request head, in bytes
pub const MAX_HEADER_SIZE: usize = 2048;
