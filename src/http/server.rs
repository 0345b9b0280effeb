//! HTTP Server
//!
//! Accept loop and worker spawning.
//!
//! ## Architecture
//! - The calling thread runs the accept loop
//! - Every accepted socket gets its own detached worker thread
//! - Workers share the engine through the service; the engine gate
//!   serializes container access

use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::error::{ImgFsError, Result};

use super::{Connection, ImgFsService};

/// HTTP frontend for an ImgFS engine
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,

    /// Shared request router
    service: Arc<ImgFsService>,

    /// TCP listener (created on run)
    listener: Option<TcpListener>,

    /// Shutdown flag
    shutdown: Arc<AtomicBool>,

    /// Worker counter, used for thread names
    next_worker: AtomicUsize,
}

impl HttpServer {
    /// Create a new server with the given config and service
    pub fn new(config: ServerConfig, service: Arc<ImgFsService>) -> Self {
        Self {
            config,
            service,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            next_worker: AtomicUsize::new(0),
        }
    }

    /// Bind the listening socket without serving yet
    ///
    /// Separate from [`run`](Self::run) so callers can learn the bound
    /// address (port 0 binds an ephemeral port) before blocking.
    pub fn bind(&mut self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            ImgFsError::Runtime(format!(
                "failed to bind to {}: {e}",
                self.config.listen_addr
            ))
        })?;

        // non-blocking accept so the loop can poll the shutdown flag
        listener.set_nonblocking(true)?;

        tracing::info!("server listening on {}", self.config.listen_addr);
        self.listener = Some(listener);
        Ok(())
    }

    /// Serve until shutdown is signaled (blocking)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = self.listener.as_ref().expect("listener bound above");

        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    tracing::debug!("accepted connection from {addr}");

                    let worker_id = self.next_worker.fetch_add(1, Ordering::Relaxed);
                    let service = Arc::clone(&self.service);
                    let spawned = thread::Builder::new()
                        .name(format!("imgfs-worker-{worker_id}"))
                        .spawn(move || {
                            let connection = Connection::new(stream, service);
                            let peer = connection.peer_addr();
                            if let Err(err) = connection.handle() {
                                tracing::debug!("connection {peer} ended with error: {err}");
                            }
                        });

                    // detached: the worker releases its own resources on exit
                    if let Err(err) = spawned {
                        tracing::error!("failed to spawn worker: {err}");
                    }
                }
                Err(ref err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(err) => {
                    if !self.shutdown.load(Ordering::Relaxed) {
                        tracing::error!("accept error: {err}");
                    }
                }
            }
        }

        tracing::info!("server stopped accepting connections");
        self.listener = None;
        Ok(())
    }

    /// Handle for signaling shutdown from another thread
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the accept loop to stop
    pub fn shutdown(&self) {
        tracing::info!("shutdown signal received");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Check whether the server is still accepting
    pub fn is_running(&self) -> bool {
        !self.shutdown.load(Ordering::Relaxed)
    }

    /// The bound address, once [`bind`](Self::bind) has succeeded
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }
}
