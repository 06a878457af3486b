//! Blocking client
//!
//! One connection per request, mirroring the server.

use std::io::BufReader;
use std::net::TcpStream;
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{read_response, write_request, ClientResponse, Request};

/// Send `request` to `addr` and read the whole response
pub fn send(addr: &str, request: &Request, timeout: Option<Duration>) -> Result<ClientResponse> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;

    write_request(&mut stream, request)?;
    let mut reader = BufReader::new(stream);
    read_response(&mut reader)
}
