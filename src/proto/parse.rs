//! Request-line and header parsing, via `httparse`.
//!
//! `httparse::Request::parse` already encodes the exact rule the
//! specification describes as "scan for the first CRLF CRLF": it returns
//! `Partial` until the header block's terminating blank line has arrived,
//! and `Complete(n)` with `n` the number of bytes — including that blank
//! line — once it has. There is no separate hand-rolled scan here.

use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

use crate::error::{Error, Result};
use crate::fabric::RequestHead;

/// A successfully parsed request line and header block, not yet matched
/// against a route.
pub(crate) struct ParsedRequest {
    pub head: RequestHead,
    pub content_length: u64,
    pub has_upgrade: bool,
}

/// Attempts to parse one HTTP/1.1 request from the front of `buf`.
///
/// Returns `Ok(None)` if `buf` does not yet contain a complete header
/// block. Returns `Ok(Some((parsed, consumed)))` on success, where
/// `consumed` is the number of bytes — request line through the blank
/// line inclusive — the caller should advance past.
pub(crate) fn parse_request(buf: &[u8], max_headers: usize) -> Result<Option<(ParsedRequest, usize)>> {
    let mut raw_headers = vec![httparse::EMPTY_HEADER; max_headers];
    let mut req = httparse::Request::new(&mut raw_headers);
    let consumed = match req.parse(buf).map_err(map_httparse_error)? {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial => return Ok(None),
    };

    let method_token = req.method.ok_or_else(Error::new_request_line)?;
    let method = Method::from_bytes(method_token.as_bytes()).map_err(|_| Error::new_request_line())?;

    let raw_path = req.path.ok_or_else(Error::new_request_line)?;
    let uri: Uri = raw_path.parse().map_err(|_| Error::new_request_line())?;

    if let Some(authority) = uri.authority() {
        if authority.as_str().contains('@') {
            return Err(Error::new_missing_authority());
        }
    }

    let mut headers = HeaderMap::new();
    let mut host_header: Option<HeaderValue> = None;
    for h in req.headers.iter() {
        if h.name.is_empty() {
            break;
        }
        let name = HeaderName::from_bytes(h.name.as_bytes()).map_err(|_| Error::new_header())?;
        let value = HeaderValue::from_bytes(h.value).map_err(|_| Error::new_header())?;
        if name == http::header::HOST {
            host_header = Some(value.clone());
        }
        headers.append(name, value);
    }

    // RFC 7230 §5.5: an absolute-form request-URI's authority wins over the
    // Host header; origin-form requests fall back to Host.
    let authority = match uri.authority() {
        Some(authority) => Some(authority.as_str().to_string()),
        None => host_header
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
    };
    let authority = authority.ok_or_else(Error::new_missing_authority)?;

    let content_length = match headers.get(http::header::CONTENT_LENGTH) {
        Some(v) => v
            .to_str()
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(Error::new_header)?,
        None => 0,
    };

    let has_upgrade = headers.contains_key(http::header::UPGRADE);

    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    Ok(Some((
        ParsedRequest {
            head: RequestHead {
                scheme: "http",
                method,
                path,
                authority,
                headers,
            },
            content_length,
            has_upgrade,
        },
        consumed,
    )))
}

fn map_httparse_error(err: httparse::Error) -> Error {
    match err {
        httparse::Error::Version => Error::new_version().with(err),
        httparse::Error::Token | httparse::Error::Status => Error::new_request_line().with(err),
        _ => Error::new_header().with(err),
    }
}
