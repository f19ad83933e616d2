//! The response sink handed to every handler.
//!
//! Handlers write into a [`ResponseWriter`]; the server turns it into a
//! hyper response once the chain returns. The body is buffered, so nothing
//! reaches the wire until dispatch has finished.

use std::fmt;
use std::mem;

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::warn;

use crate::status::Status;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseWriter::send`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Css,          // text/css; charset=utf-8
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    Gif,          // image/gif
    Html,         // text/html; charset=utf-8
    Icon,         // image/x-icon
    JavaScript,   // text/javascript; charset=utf-8
    Jpeg,         // image/jpeg
    Json,         // application/json
    OctetStream,  // application/octet-stream  (binary / unknown)
    Pdf,          // application/pdf
    Png,          // image/png
    Svg,          // image/svg+xml
    Text,         // text/plain; charset=utf-8
    Wasm,         // application/wasm
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Css         => "text/css; charset=utf-8",
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::Gif         => "image/gif",
            Self::Html        => "text/html; charset=utf-8",
            Self::Icon        => "image/x-icon",
            Self::JavaScript  => "text/javascript; charset=utf-8",
            Self::Jpeg        => "image/jpeg",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Png         => "image/png",
            Self::Svg         => "image/svg+xml",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Wasm        => "application/wasm",
            Self::Xml         => "application/xml",
        }
    }

    /// Guesses the content type from a file extension (case-insensitive).
    /// Unknown extensions map to `OctetStream`.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "css"          => Self::Css,
            "csv"          => Self::Csv,
            "gif"          => Self::Gif,
            "htm" | "html" => Self::Html,
            "ico"          => Self::Icon,
            "js" | "mjs"   => Self::JavaScript,
            "jpg" | "jpeg" => Self::Jpeg,
            "json" | "map" => Self::Json,
            "pdf"          => Self::Pdf,
            "png"          => Self::Png,
            "svg"          => Self::Svg,
            "txt"          => Self::Text,
            "wasm"         => Self::Wasm,
            "xml"          => Self::Xml,
            _              => Self::OctetStream,
        }
    }

    pub fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

type BeforeHook = Box<dyn FnOnce(&mut ResponseWriter) + Send>;

/// An in-progress HTTP response.
///
/// The status is committed by the first call to [`write_header`] or
/// [`write`]; later attempts to change it are ignored. Until then
/// [`status`](ResponseWriter::status) reports `200`, which is also what an
/// untouched writer sends.
///
/// ```rust
/// use strand::{ContentType, ResponseWriter, Status};
///
/// let mut rw = ResponseWriter::new();
/// rw.write_header(Status::Created);
/// rw.send(ContentType::Json, br#"{"id":42}"#);
///
/// assert_eq!(rw.status(), 201);
/// assert_eq!(rw.size(), 9);
/// ```
///
/// [`write_header`]: ResponseWriter::write_header
/// [`write`]: ResponseWriter::write
pub struct ResponseWriter {
    status: Option<u16>,
    headers: HeaderMap,
    body: BytesMut,
    before: Vec<BeforeHook>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self { status: None, headers: HeaderMap::new(), body: BytesMut::new(), before: Vec::new() }
    }

    /// The committed status, or `200` if nothing has been written yet.
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    /// `true` once the status has been committed.
    pub fn written(&self) -> bool {
        self.status.is_some()
    }

    /// Number of body bytes written so far.
    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Sets a header, replacing any previous values for `name`.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Registers a hook that runs just before the status is committed.
    /// Hooks run last-registered first, so outer middleware gets the final say.
    pub fn before(&mut self, hook: impl FnOnce(&mut ResponseWriter) + Send + 'static) {
        self.before.push(Box::new(hook));
    }

    /// Commits the status code. Only the first call has any effect.
    ///
    /// # Panics
    ///
    /// Panics if `status` is outside `100..=999`.
    pub fn write_header(&mut self, status: impl Into<u16>) {
        let code = status.into();
        assert!((100..=999).contains(&code), "invalid status code {code}");

        if let Some(committed) = self.status {
            warn!(committed, ignored = code, "superfluous write_header call");
            return;
        }

        for hook in mem::take(&mut self.before).into_iter().rev() {
            hook(self);
        }
        // A hook may itself have committed a status.
        self.status.get_or_insert(code);
    }

    /// Appends to the body, committing `200 OK` first if needed.
    /// Returns the number of bytes written.
    pub fn write(&mut self, data: &[u8]) -> usize {
        if !self.written() {
            self.write_header(Status::Ok);
        }
        self.body.extend_from_slice(data);
        data.len()
    }

    /// Sets `content-type` and appends `body`.
    pub fn send(&mut self, content_type: ContentType, body: impl AsRef<[u8]>) {
        self.set_header(CONTENT_TYPE, content_type.header_value());
        self.write(body.as_ref());
    }

    pub(crate) fn into_http(mut self) -> http::Response<Full<Bytes>> {
        if !self.written() {
            self.write_header(Status::Ok);
        }

        let status = self.status();
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for ResponseWriter {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("size", &self.body.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::header::SERVER;

    use super::*;

    #[test]
    fn defaults_to_ok_until_written() {
        let rw = ResponseWriter::new();
        assert_eq!(rw.status(), 200);
        assert!(!rw.written());
    }

    #[test]
    fn first_write_header_wins() {
        let mut rw = ResponseWriter::new();
        rw.write_header(Status::BadRequest);
        rw.write_header(Status::Ok);
        assert_eq!(rw.status(), 400);
    }

    #[test]
    fn write_commits_ok() {
        let mut rw = ResponseWriter::new();
        assert_eq!(rw.write(b"hello"), 5);
        rw.write_header(Status::NotFound);

        assert_eq!(rw.status(), 200);
        assert_eq!(rw.body(), b"hello");
        assert_eq!(rw.size(), 5);
    }

    #[test]
    #[should_panic(expected = "invalid status code")]
    fn rejects_out_of_range_status() {
        ResponseWriter::new().write_header(42u16);
    }

    #[test]
    fn before_hooks_run_in_reverse_once() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut rw = ResponseWriter::new();

        let log = Arc::clone(&order);
        rw.before(move |_| log.lock().unwrap().push(1));
        let log = Arc::clone(&order);
        rw.before(move |rw| {
            log.lock().unwrap().push(2);
            rw.set_header(SERVER, HeaderValue::from_static("strand"));
        });

        rw.write(b"a");
        rw.write(b"b");

        assert_eq!(*order.lock().unwrap(), [2, 1]);
        assert_eq!(rw.headers()[SERVER], "strand");
    }

    #[test]
    fn hook_may_override_status() {
        let mut rw = ResponseWriter::new();
        rw.before(|rw| rw.write_header(Status::ServiceUnavailable));
        rw.write_header(Status::Ok);
        assert_eq!(rw.status(), 503);
    }

    #[test]
    fn into_http_carries_everything() {
        let mut rw = ResponseWriter::new();
        rw.write_header(Status::Created);
        rw.send(ContentType::Json, b"{}");

        let response = rw.into_http();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn untouched_writer_becomes_empty_ok() {
        let response = ResponseWriter::new().into_http();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(ContentType::from_extension("HTML"), ContentType::Html);
        assert_eq!(ContentType::from_extension("js"), ContentType::JavaScript);
        assert_eq!(ContentType::from_extension("bin"), ContentType::OctetStream);
    }
}
