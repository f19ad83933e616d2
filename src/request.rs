//! Incoming HTTP request type.

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::HeaderName;
use http::{Extensions, HeaderMap, HeaderValue};

use crate::method::Method;

/// An incoming HTTP request with its body fully read.
///
/// Handlers receive it as `&mut Request`: they may rewrite the path, adjust
/// headers, or stash request-scoped values in [`extensions_mut`] for handlers
/// further down the chain.
///
/// [`extensions_mut`]: Request::extensions_mut
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    peer: Option<SocketAddr>,
    extensions: Extensions,
}

impl Request {
    /// A request with no headers, no body, and no peer address.
    ///
    /// The server builds requests from the wire; this constructor is for tests
    /// and for dispatching a chain outside of the bundled server.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            peer: None,
            extensions: Extensions::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn from_parts(
        parts: http::request::Parts,
        method: Method,
        body: Bytes,
        peer: SocketAddr,
    ) -> Self {
        Self {
            method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            peer: Some(peer),
            extensions: parts.extensions,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn peer_addr(&self) -> Option<SocketAddr> { self.peer }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Case-insensitive header lookup. Returns `None` for values that are not
    /// visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Request-scoped values shared between handlers of one dispatch.
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}
