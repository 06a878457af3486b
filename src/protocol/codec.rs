//! Protocol codec
//!
//! Reading and writing requests and responses on byte streams.
//!
//! Lines are read one byte at a time until CRLF, so callers should hand in a
//! buffered reader. Bodies are read in a loop until exactly `Content-Length`
//! bytes arrived; the peer may deliver them in any number of segments.

use std::io::{ErrorKind, Read, Write};

use bytes::Bytes;

use crate::error::{ContestError, Result};
use super::{reason_phrase, Headers, Request, Response};

/// Maximum start line length (8 KiB)
pub const MAX_START_LINE: usize = 8 * 1024;

/// Maximum header line length (32 KiB)
pub const MAX_HEADER_LINE: usize = 32 * 1024;

// =============================================================================
// Request Decoding (server side)
// =============================================================================

/// Read a complete request from a stream
///
/// Blocks until the request is complete, the stream ends, or the stream's read
/// timeout fires (surfaced as `ContestError::Io`).
pub fn read_request<R: Read>(reader: &mut R, max_body: usize) -> Result<Request> {
    let start = match read_line(reader, MAX_START_LINE)? {
        Some(line) if !line.is_empty() => String::from_utf8_lossy(&line).into_owned(),
        _ => return Err(ContestError::Protocol("empty request".to_string())),
    };

    let mut parts = start.splitn(3, ' ');
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("/").to_string();
    let version = parts.next().unwrap_or("HTTP/1.1").to_string();

    let headers = read_headers(reader)?;
    let body = read_body(reader, content_length(&headers), max_body)?;

    Ok(Request::from_parts(method, path, version, headers, body))
}

/// Read header lines up to the empty line
fn read_headers<R: Read>(reader: &mut R) -> Result<Headers> {
    let mut headers = Headers::new();
    loop {
        let line = read_line(reader, MAX_HEADER_LINE)?.ok_or_else(|| {
            ContestError::Protocol("stream ended before end of headers".to_string())
        })?;
        if line.is_empty() {
            return Ok(headers);
        }

        let line = String::from_utf8_lossy(&line);
        match line.find(':') {
            Some(idx) if idx > 0 => {
                headers.insert(&line[..idx], line[idx + 1..].trim());
            }
            _ => tracing::trace!("Skipping malformed header line: {:?}", line),
        }
    }
}

/// `Content-Length` as a non-negative integer; absent or unparsable is 0
fn content_length(headers: &Headers) -> usize {
    headers
        .get("content-length")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Read exactly `len` body bytes
fn read_body<R: Read>(reader: &mut R, len: usize, max_body: usize) -> Result<Bytes> {
    if len > max_body {
        return Err(ContestError::Protocol(format!(
            "body too large: {} bytes (max {})",
            len, max_body
        )));
    }

    let mut body = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match reader.read(&mut body[filled..]) {
            Ok(0) => {
                return Err(ContestError::Protocol(format!(
                    "stream ended after {} of {} body bytes",
                    filled, len
                )))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Bytes::from(body))
}

/// Read one CRLF-terminated line, without the terminator
///
/// Returns `Ok(None)` if the stream ended before any byte of the line.
/// A stream ending mid-line, or a line longer than `max`, is a protocol error.
fn read_line<R: Read>(reader: &mut R, max: usize) -> Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    loop {
        let byte = match read_byte(reader)? {
            Some(b) => b,
            None if line.is_empty() => return Ok(None),
            None => {
                return Err(ContestError::Protocol(
                    "stream ended inside a line".to_string(),
                ))
            }
        };

        if byte == b'\n' && line.last() == Some(&b'\r') {
            line.pop();
            return Ok(Some(line));
        }

        line.push(byte);
        // A trailing '\r' may still turn out to be the terminator
        let content_len = if byte == b'\r' { line.len() - 1 } else { line.len() };
        if content_len > max {
            return Err(ContestError::Protocol(format!(
                "line too long (max {} bytes)",
                max
            )));
        }
    }
}

fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

// =============================================================================
// Response Encoding (server side)
// =============================================================================

/// Encode a response to bytes
///
/// `Content-Length` is always computed from the body actually written.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let code = response.status();
    let body = response.body();

    let mut head = format!("HTTP/1.1 {} {}\r\n", code, reason_phrase(code));
    head.push_str(&format!("Content-Type: {}\r\n", response.content_type()));
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    head.push_str("Connection: close\r\n");
    for (name, value) in response.headers() {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    let mut message = Vec::with_capacity(head.len() + body.len());
    message.extend_from_slice(head.as_bytes());
    message.extend_from_slice(body);
    message
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Client side helpers
// =============================================================================

/// A response as seen by a client
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl ClientResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Body parsed as JSON
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Encode a request to bytes
///
/// `Content-Length` is derived from the body; any caller-supplied value is
/// ignored.
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut head = format!(
        "{} {} {}\r\n",
        request.method(),
        request.path(),
        request.version()
    );
    for (name, value) in request.headers().iter() {
        if name == "content-length" {
            continue;
        }
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str(&format!("Content-Length: {}\r\n\r\n", request.body().len()));

    let mut message = Vec::with_capacity(head.len() + request.body().len());
    message.extend_from_slice(head.as_bytes());
    message.extend_from_slice(request.body());
    message
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    writer.write_all(&encode_request(request))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<ClientResponse> {
    let status_line = match read_line(reader, MAX_START_LINE)? {
        Some(line) if !line.is_empty() => String::from_utf8_lossy(&line).into_owned(),
        _ => return Err(ContestError::Protocol("empty response".to_string())),
    };

    let mut parts = status_line.splitn(3, ' ');
    let _version = parts.next();
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            ContestError::Protocol(format!("bad status line: {:?}", status_line))
        })?;
    let reason = parts.next().unwrap_or("").to_string();

    let headers = read_headers(reader)?;
    let body = read_body(reader, content_length(&headers), usize::MAX)?;

    Ok(ClientResponse {
        status,
        reason,
        headers,
        body,
    })
}
