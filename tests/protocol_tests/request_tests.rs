//! Request Parser Tests
//!
//! Tests for reading requests off a byte stream.

use std::io::{self, Cursor, Read};

use litcontest::error::ContestError;
use litcontest::protocol::{encode_request, read_request, Request, MAX_HEADER_LINE, MAX_START_LINE};

const MAX_BODY: usize = 1024 * 1024;

/// Reader that hands out at most `chunk` bytes per call, like a socket
/// delivering small TCP segments
struct Trickle {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl Trickle {
    fn new(data: &[u8], chunk: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            chunk,
        }
    }
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        let n = remaining.min(self.chunk).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn parse(raw: &[u8]) -> litcontest::Result<Request> {
    read_request(&mut Cursor::new(raw.to_vec()), MAX_BODY)
}

// =============================================================================
// Start Line Tests
// =============================================================================

#[test]
fn test_parse_minimal_get() {
    let req = parse(b"GET /status HTTP/1.1\r\n\r\n").unwrap();

    assert_eq!(req.method(), "GET");
    assert_eq!(req.path(), "/status");
    assert_eq!(req.version(), "HTTP/1.1");
    assert!(req.headers().is_empty());
    assert!(req.body().is_empty());
}

#[test]
fn test_path_is_not_decoded() {
    let req = parse(b"GET /assignments?x=%20y HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(req.path(), "/assignments?x=%20y");
}

#[test]
fn test_empty_stream_is_protocol_error() {
    let err = parse(b"").unwrap_err();
    assert!(matches!(err, ContestError::Protocol(_)));
}

#[test]
fn test_start_line_too_long() {
    let mut raw = b"GET /".to_vec();
    raw.extend(std::iter::repeat(b'a').take(MAX_START_LINE + 10));
    raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");

    let err = parse(&raw).unwrap_err();
    assert!(matches!(err, ContestError::Protocol(_)));
}

#[test]
fn test_start_line_at_limit_is_accepted() {
    let prefix = b"GET /".len();
    let suffix = b" HTTP/1.1".len();
    let mut raw = b"GET /".to_vec();
    raw.extend(std::iter::repeat(b'a').take(MAX_START_LINE - prefix - suffix));
    raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");

    let req = parse(&raw).unwrap();
    assert_eq!(req.path().len(), MAX_START_LINE - prefix - suffix + 1);
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_keys_are_case_insensitive() {
    let req = parse(b"GET / HTTP/1.1\r\nX-Client-Id: alice\r\n\r\n").unwrap();

    assert_eq!(req.header("x-client-id"), Some("alice"));
    assert_eq!(req.header("X-CLIENT-ID"), Some("alice"));
    assert_eq!(req.client_id(), Some("alice"));
}

#[test]
fn test_duplicate_header_last_wins() {
    let req = parse(b"GET / HTTP/1.1\r\nX-Client-Id: first\r\nx-client-id: second\r\n\r\n").unwrap();
    assert_eq!(req.header("x-client-id"), Some("second"));
    assert_eq!(req.headers().len(), 1);
}

#[test]
fn test_header_split_on_first_colon() {
    let req = parse(b"GET / HTTP/1.1\r\nX-Story-Title: Part 1: Dawn\r\n\r\n").unwrap();
    assert_eq!(req.header("x-story-title"), Some("Part 1: Dawn"));
}

#[test]
fn test_blank_client_id_is_absent() {
    let req = parse(b"GET / HTTP/1.1\r\nX-Client-Id:    \r\n\r\n").unwrap();
    assert_eq!(req.client_id(), None);
}

#[test]
fn test_header_line_too_long() {
    let mut raw = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
    raw.extend(std::iter::repeat(b'v').take(MAX_HEADER_LINE));
    raw.extend_from_slice(b"\r\n\r\n");

    let err = parse(&raw).unwrap_err();
    assert!(matches!(err, ContestError::Protocol(_)));
}

#[test]
fn test_stream_ends_inside_headers() {
    let err = parse(b"GET / HTTP/1.1\r\nHost: x\r\n").unwrap_err();
    assert!(matches!(err, ContestError::Protocol(_)));
}

// =============================================================================
// Body Tests
// =============================================================================

#[test]
fn test_body_read_by_content_length() {
    let req = parse(b"PUT /reviews HTTP/1.1\r\nContent-Length: 5\r\n\r\nabcdeXYZ").unwrap();
    assert_eq!(req.body(), b"abcde");
}

#[test]
fn test_missing_content_length_means_empty_body() {
    let req = parse(b"POST /submit HTTP/1.1\r\n\r\nignored").unwrap();
    assert!(req.body().is_empty());
}

#[test]
fn test_unparsable_content_length_means_empty_body() {
    let req = parse(b"POST /submit HTTP/1.1\r\nContent-Length: lots\r\n\r\nignored").unwrap();
    assert!(req.body().is_empty());

    let req = parse(b"POST /submit HTTP/1.1\r\nContent-Length: -3\r\n\r\nignored").unwrap();
    assert!(req.body().is_empty());
}

#[test]
fn test_body_shorter_than_declared() {
    let err = parse(b"POST /submit HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").unwrap_err();
    assert!(matches!(err, ContestError::Protocol(_)));
}

#[test]
fn test_body_over_limit_is_rejected() {
    let raw = b"POST /submit HTTP/1.1\r\nContent-Length: 100\r\n\r\n";
    let err = read_request(&mut Cursor::new(raw.to_vec()), 10).unwrap_err();
    assert!(matches!(err, ContestError::Protocol(_)));
}

#[test]
fn test_body_arrives_in_small_segments() {
    let body = "7f1c,9\n8a2d,4\n".repeat(50);
    let raw = format!(
        "PUT /reviews HTTP/1.1\r\nContent-Type: text/csv\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );

    for chunk in [1, 2, 3, 7, 64] {
        let mut reader = Trickle::new(raw.as_bytes(), chunk);
        let req = read_request(&mut reader, MAX_BODY).unwrap();
        assert_eq!(req.body(), body.as_bytes(), "chunk size {}", chunk);
        assert_eq!(req.content_type(), "text/csv");
    }
}

// =============================================================================
// Client Encoding Tests
// =============================================================================

#[test]
fn test_encoded_request_parses_back() {
    let original = Request::new("PUT", "/submission")
        .with_header("X-Client-Id", "bob")
        .with_header("Content-Type", "text/plain")
        .with_body("once upon a time");

    let parsed = parse(&encode_request(&original)).unwrap();

    assert_eq!(parsed.method(), "PUT");
    assert_eq!(parsed.path(), "/submission");
    assert_eq!(parsed.client_id(), Some("bob"));
    assert_eq!(parsed.body(), b"once upon a time");
    assert_eq!(parsed.header("content-length"), Some("16"));
}
