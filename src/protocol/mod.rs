//! Protocol Module
//!
//! HTTP/1.1-shaped wire protocol, parsed by hand from the byte stream.
//!
//! ## Request Format
//! ```text
//! METHOD SP PATH SP VERSION CRLF      (start line, max 8 KiB)
//! Name: value CRLF                    (header lines, max 32 KiB each)
//! ...
//! CRLF                                (end of headers)
//! <Content-Length bytes of body>
//! ```
//!
//! ## Response Format
//! ```text
//! HTTP/1.1 SP CODE SP REASON CRLF
//! Content-Type: ... CRLF
//! Content-Length: N CRLF
//! Connection: close CRLF
//! <extra headers> CRLF
//! CRLF
//! <N bytes of body>
//! ```
//!
//! One request per connection: no keep-alive, no chunked encoding.

mod request;
mod response;
mod codec;

pub use request::{Headers, Request};
pub use response::{reason_phrase, Response};
pub use codec::{
    encode_request, encode_response, read_request, read_response, write_request,
    write_response, ClientResponse, MAX_HEADER_LINE, MAX_START_LINE,
};
