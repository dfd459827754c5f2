//! Error and Result module.

use std::error::Error as StdError;
use std::fmt;

/// Result type returned from methods that can fail while decoding or
/// dispatching a source-input stream.
pub type Result<T> = std::result::Result<T, Error>;

type Cause = Box<dyn StdError + Send + Sync>;

/// Represents errors that can occur while decoding HTTP/1.1 request streams
/// or dispatching frames for a source-input stream.
pub struct Error {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: Kind,
    cause: Option<Cause>,
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// The request line, a header line, or the HTTP version was malformed.
    Parse(Parse),
    /// Headers exceeded the configured slab slot capacity.
    TooLarge,
    /// No route in the table matched the request's headers.
    NoRoute,
    /// An incoming DATA frame would have driven `window` negative.
    WindowUnderrun,
    /// A frame arrived that the current stream state does not accept.
    UnexpectedFrame,
    /// The slab had no free slot to satisfy an `acquire`.
    SlabExhausted,
}

#[derive(Debug)]
pub(crate) enum Parse {
    /// The request line did not split into exactly three whitespace
    /// separated tokens.
    RequestLine,
    /// The HTTP version token did not match `HTTP/1.(digit)`.
    Version,
    /// A header line had no `:` separator, or otherwise violated syntax.
    Header,
    /// Neither an absolute-form request-URI authority nor a `Host` header
    /// was present, or the request-URI contained userinfo.
    MissingAuthority,
}

impl Error {
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(ErrorImpl { kind, cause: None }),
        }
    }

    pub(crate) fn with<C: Into<Cause>>(mut self, cause: C) -> Error {
        self.inner.cause = Some(cause.into());
        self
    }

    pub(crate) fn new_request_line() -> Error {
        Error::new(Kind::Parse(Parse::RequestLine))
    }

    pub(crate) fn new_version() -> Error {
        Error::new(Kind::Parse(Parse::Version))
    }

    pub(crate) fn new_header() -> Error {
        Error::new(Kind::Parse(Parse::Header))
    }

    pub(crate) fn new_missing_authority() -> Error {
        Error::new(Kind::Parse(Parse::MissingAuthority))
    }

    pub(crate) fn new_too_large() -> Error {
        Error::new(Kind::TooLarge)
    }

    pub(crate) fn new_no_route() -> Error {
        Error::new(Kind::NoRoute)
    }

    pub(crate) fn new_window_underrun() -> Error {
        Error::new(Kind::WindowUnderrun)
    }

    pub(crate) fn new_unexpected_frame() -> Error {
        Error::new(Kind::UnexpectedFrame)
    }

    pub(crate) fn new_slab_exhausted() -> Error {
        Error::new(Kind::SlabExhausted)
    }

    /// Returns true if this error originated while parsing the request
    /// line, a header line, or the HTTP version.
    pub fn is_parse(&self) -> bool {
        matches!(self.inner.kind, Kind::Parse(_))
    }

    /// Returns true if the request's headers exceeded the configured slot
    /// capacity.
    pub fn is_too_large(&self) -> bool {
        matches!(self.inner.kind, Kind::TooLarge)
    }

    /// Returns true if no route matched the request.
    pub fn is_no_route(&self) -> bool {
        matches!(self.inner.kind, Kind::NoRoute)
    }

    /// The canned HTTP status code a server should send back to the source
    /// for this error, if any. `WindowUnderrun`, `UnexpectedFrame`, and
    /// `SlabExhausted` have no canned response: the source misbehaved at
    /// the framing layer, not the HTTP layer, so the stream is simply
    /// reset.
    pub fn canned_status(&self) -> Option<u16> {
        match self.inner.kind {
            Kind::Parse(Parse::RequestLine) | Kind::Parse(Parse::Header) => Some(400),
            Kind::Parse(Parse::MissingAuthority) => Some(400),
            Kind::Parse(Parse::Version) => Some(505),
            Kind::TooLarge => Some(431),
            Kind::NoRoute => Some(404),
            Kind::WindowUnderrun | Kind::UnexpectedFrame | Kind::SlabExhausted => None,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("Error");
        builder.field("kind", &self.inner.kind);
        if let Some(ref cause) = self.inner.cause {
            builder.field("cause", cause);
        }
        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Parse(Parse::RequestLine) => f.write_str("invalid request line"),
            Kind::Parse(Parse::Version) => f.write_str("unsupported HTTP version"),
            Kind::Parse(Parse::Header) => f.write_str("malformed header line"),
            Kind::Parse(Parse::MissingAuthority) => {
                f.write_str("missing authority or userinfo present in request-target")
            }
            Kind::TooLarge => f.write_str("request headers exceed slot capacity"),
            Kind::NoRoute => f.write_str("no route matched source reference"),
            Kind::WindowUnderrun => f.write_str("incoming data exceeded granted window"),
            Kind::UnexpectedFrame => f.write_str("frame not valid for current stream state"),
            Kind::SlabExhausted => f.write_str("no free slab slot available"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.cause.as_ref().map(|cause| &**cause as _)
    }
}
