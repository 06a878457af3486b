//! Connection Handler
//!
//! Serves exactly one request per connection.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::error::{ContestError, Result};
use crate::protocol::{read_request, write_response, Response};
use crate::router::Router;

/// How long close waits for each chunk of unread input
const CLOSE_LINGER: Duration = Duration::from_millis(250);

/// Per-connection limits
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub max_body_bytes: usize,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for the byte-wise line reads)
    reader: BufReader<TcpStream>,

    /// TCP stream writer
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    limits: ConnectionLimits,
}

impl Connection {
    /// Wrap an accepted stream and apply the timeouts
    pub fn new(stream: TcpStream, limits: ConnectionLimits) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        if limits.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(limits.read_timeout_ms)))?;
        }
        if limits.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(limits.write_timeout_ms)))?;
        }

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            peer_addr,
            limits,
        })
    }

    /// Read one request, dispatch it, write the response, close
    ///
    /// Every exit path writes a response if the socket still allows it and
    /// then shuts the connection down. Malformed requests get 400; read
    /// failures, timeouts and handler panics get 500.
    pub fn handle(mut self, router: &Router) {
        let response = match read_request(&mut self.reader, self.limits.max_body_bytes) {
            Ok(request) => {
                tracing::debug!(
                    "{} {} {} from {}",
                    request.method(),
                    request.path(),
                    request.version(),
                    self.peer_addr
                );
                let dispatched =
                    panic::catch_unwind(AssertUnwindSafe(|| router.dispatch(&request)));
                match dispatched {
                    Ok(response) => response,
                    Err(_) => {
                        tracing::error!(
                            "Handler for {} {} panicked",
                            request.method(),
                            request.path()
                        );
                        Response::internal_error()
                    }
                }
            }
            Err(ContestError::Protocol(msg)) => {
                tracing::warn!("Malformed request from {}: {}", self.peer_addr, msg);
                Response::error(400, &msg)
            }
            Err(e) => {
                if let ContestError::Io(ref io) = e {
                    if matches!(io.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) {
                        tracing::debug!("Read timeout for client {}", self.peer_addr);
                    } else {
                        tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    }
                }
                Response::internal_error()
            }
        };

        tracing::debug!("{} -> {}", self.peer_addr, response.status());
        if let Err(e) = self.send(&response) {
            tracing::debug!(
                "Client {} gone before response could be sent: {}",
                self.peer_addr,
                e
            );
        }
        self.close();
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn send(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.writer, response)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Send FIN, then discard what the peer is still sending
    ///
    /// A request rejected before its body was read (too large, bad framing)
    /// leaves input pending, and closing over it sends RST instead of FIN.
    fn close(self) {
        let stream = self.writer.get_ref();
        let _ = stream.shutdown(Shutdown::Write);
        if stream.set_read_timeout(Some(CLOSE_LINGER)).is_ok() {
            discard_input(stream, self.limits.max_body_bytes);
        }
    }
}

/// Refuse a connection the pool has no room for: 503, then close
///
/// Runs on the accept thread, so it never waits on the peer: whatever request
/// bytes already arrived are discarded without blocking.
pub fn reject(mut stream: TcpStream, write_timeout_ms: u64) {
    if write_timeout_ms > 0 {
        let _ = stream.set_write_timeout(Some(Duration::from_millis(write_timeout_ms)));
    }
    let _ = write_response(&mut stream, &Response::service_unavailable());
    let _ = stream.flush();
    let _ = stream.shutdown(Shutdown::Write);

    // Unread input makes close() send RST, which can swallow the 503
    if stream.set_nonblocking(true).is_ok() {
        discard_input(&stream, usize::MAX);
    }
}

/// Read and drop input until end of stream, an error, or `limit` bytes
///
/// The caller picks how long a read may wait: non-blocking, or a timeout.
fn discard_input(mut stream: &TcpStream, limit: usize) {
    let mut scratch = [0u8; 4096];
    let mut discarded = 0usize;
    while discarded < limit {
        match stream.read(&mut scratch) {
            Ok(0) | Err(_) => break,
            Ok(n) => discarded += n,
        }
    }
}
