//! Canned HTTP/1.1 error responses.
//!
//! Every error this adapter can detect while decoding a request happens
//! before any bytes have been forwarded downstream, so the response is
//! always the same shape: a status line, no headers, no body, connection
//! closed by the peer that reads it.

use bytes::Bytes;

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        404 => "Not Found",
        431 => "Request Header Fields Too Large",
        505 => "HTTP Version Not Supported",
        _ => "Error",
    }
}

/// Renders the canned response for `status` as a complete HTTP/1.1
/// response with no body.
pub(crate) fn response_bytes(status: u16) -> Bytes {
    Bytes::from(format!("HTTP/1.1 {} {}\r\n\r\n", status, reason_phrase(status)))
}
