//! TCP Server
//!
//! Accepts connections and dispatches them to the worker pool.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::router::Router;

use super::connection::{reject, Connection, ConnectionLimits};
use super::pool::WorkerPool;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for the contest
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    limits: ConnectionLimits,
    workers: usize,
    queue_capacity: usize,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listening socket
    ///
    /// Binding happens here rather than in `run` so callers can learn the
    /// actual address (port 0) before serving.
    pub fn bind(config: &Config, router: Router) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            listener,
            router: Arc::new(router),
            limits: ConnectionLimits {
                read_timeout_ms: config.read_timeout_ms,
                write_timeout_ms: config.write_timeout_ms,
                max_body_bytes: config.max_body_bytes,
            },
            workers: config.workers,
            queue_capacity: config.queue_capacity,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Flag that stops `run` when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to stop accepting
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Serve until shutdown is signalled (blocking)
    ///
    /// Connections beyond `workers + queue_capacity` in flight are answered
    /// with 503 on this thread and closed. In-flight connections finish before
    /// this returns.
    pub fn run(&self) -> Result<()> {
        let router = Arc::clone(&self.router);
        let limits = self.limits;
        let pool = WorkerPool::new(self.workers, self.queue_capacity, move |stream: TcpStream| {
            match Connection::new(stream, limits) {
                Ok(conn) => conn.handle(&router),
                Err(e) => tracing::warn!("Failed to set up connection: {}", e),
            }
        })?;

        tracing::info!(
            "Listening on {} ({} workers, queue {})",
            self.local_addr()?,
            pool.worker_count(),
            pool.queue_capacity()
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    // Accepted sockets may inherit non-blocking mode on some platforms
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    if let Err(stream) = pool.try_submit(stream) {
                        tracing::warn!("Worker pool saturated, rejecting {}", peer);
                        reject(stream, self.limits.write_timeout_ms);
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    // A failed accept concerns one peer, not the listener
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Shutting down, waiting for in-flight connections");
        drop(pool);
        Ok(())
    }
}
