//! HTTP status codes as a typed enum.
//!
//! Anything that accepts a status takes `impl Into<u16>`, so both spellings
//! work:
//!
//! ```rust
//! use strand::{ResponseWriter, Status};
//!
//! let mut rw = ResponseWriter::new();
//! rw.write_header(Status::NoContent);
//!
//! let mut rw = ResponseWriter::new();
//! rw.write_header(204u16);
//! ```

/// The IANA-registered HTTP status codes handlers commonly send.
#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u16)]
pub enum Status {
    // ── 1xx Informational ─────────────────────────────────────────────────────
    Continue                      = 100,
    SwitchingProtocols            = 101,

    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok                            = 200,
    Created                       = 201,
    Accepted                      = 202,
    NoContent                     = 204,
    PartialContent                = 206,

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    MovedPermanently              = 301,
    Found                         = 302,
    SeeOther                      = 303,
    NotModified                   = 304,
    TemporaryRedirect             = 307,
    PermanentRedirect             = 308,

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest                    = 400,
    Unauthorized                  = 401,
    Forbidden                     = 403,
    NotFound                      = 404,
    MethodNotAllowed              = 405,
    NotAcceptable                 = 406,
    RequestTimeout                = 408,
    Conflict                      = 409,
    Gone                          = 410,
    PreconditionFailed            = 412,
    ContentTooLarge               = 413,
    UnsupportedMediaType          = 415,
    UnprocessableContent          = 422,
    TooManyRequests               = 429,

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError           = 500,
    NotImplemented                = 501,
    BadGateway                    = 502,
    ServiceUnavailable            = 503,
    GatewayTimeout                = 504,
}

impl Status {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// The canonical reason phrase, e.g. `"Not Found"`.
    pub fn reason(self) -> &'static str {
        reason_phrase(self.code())
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code()
    }
}

/// Reason phrase for any status code; empty for unregistered codes.
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Content Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        418 => "I'm a Teapot",
        422 => "Unprocessable Content",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _   => "",
    }
}
