//! Connection Handler
//!
//! One worker handles one accepted socket: grow a buffer until the head
//! terminator arrives, parse, keep reading until Content-Length bytes of
//! body are in, then invoke the service exactly once and write whatever
//! it returns. A head that cannot be parsed still gets one error
//! response. The connection closes when the worker returns.

use std::io::Read;
use std::net::TcpStream;
use std::sync::Arc;

use crate::error::{ImgFsError, Result};

use super::message::{find_head_end, parse_head};
use super::{ImgFsService, Response, MAX_HEADER_SIZE};

/// Handles a single client connection
pub struct Connection {
    stream: TcpStream,
    service: Arc<ImgFsService>,
}

impl Connection {
    /// Wrap an accepted socket
    pub fn new(stream: TcpStream, service: Arc<ImgFsService>) -> Self {
        Self { stream, service }
    }

    /// Peer address for logging, best effort
    pub fn peer_addr(&self) -> String {
        self.stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string())
    }

    /// Serve one request and close
    pub fn handle(mut self) -> Result<()> {
        let response = match self.read_request() {
            Ok(Some(request)) => self.service.handle(&request),
            Ok(None) => return Ok(()), // peer closed before sending anything
            Err(err) => {
                tracing::debug!("request parse failed: {err}");
                Response::error(&err)
            }
        };

        response.write_to(&mut self.stream)
    }

    /// Read one full request from the socket
    ///
    /// Returns `None` when the peer closes the connection cleanly before
    /// any byte arrives.
    fn read_request(&mut self) -> Result<Option<super::Request>> {
        let mut buf = Vec::with_capacity(MAX_HEADER_SIZE);
        let mut chunk = [0u8; 1024];

        // read until the blank line that ends the head
        let head_end = loop {
            if let Some(end) = find_head_end(&buf) {
                break end;
            }
            if buf.len() >= MAX_HEADER_SIZE {
                return Err(ImgFsError::InvalidArgument(
                    "request head too large".to_string(),
                ));
            }
            let received = self.stream.read(&mut chunk)?;
            if received == 0 {
                if buf.is_empty() {
                    return Ok(None);
                }
                return Err(ImgFsError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-request",
                )));
            }
            buf.extend_from_slice(&chunk[..received]);
        };

        let mut request = parse_head(&buf[..head_end])?;

        // drain the body: whatever followed the head plus the remainder
        let content_len = request.content_length();
        let mut body = buf[head_end..].to_vec();
        while body.len() < content_len {
            let received = self.stream.read(&mut chunk)?;
            if received == 0 {
                return Err(ImgFsError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-body",
                )));
            }
            body.extend_from_slice(&chunk[..received]);
        }
        body.truncate(content_len);
        request.body = body;

        Ok(Some(request))
    }
}
