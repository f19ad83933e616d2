//! The middleware chain.
//!
//! A [`Chain`] is an ordered list of [`Handler`]s. Registration order is
//! invocation order. Build chains up front, then share them (behind an `Arc`)
//! across every request; dispatching only ever reads the list.
//!
//! # Deriving chains
//!
//! [`Chain::with`] branches a chain: the child starts from the parent's
//! current handlers plus extras and grows independently from then on.
//!
//! ```rust
//! use strand::Chain;
//! use strand::middleware::{Logger, Recovery};
//! use strand::Handler;
//!
//! let mut base = Chain::new();
//! base.add(Logger::new());
//!
//! let mut api   = base.with([Recovery::new().into_boxed_handler()]);
//! let mut admin = base.with([Recovery::new().into_boxed_handler()]);
//! api.add_terminal_fn(|rw, _| { rw.write(b"api"); });
//! admin.add_terminal_fn(|rw, _| { rw.write(b"admin"); });
//!
//! assert_eq!(base.len(), 1);
//! assert_eq!(api.len(), 3);
//! assert_eq!(admin.len(), 3);
//! ```

use std::fmt;

use tracing::info;

use crate::config::detect_address;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler, Next, Terminal, handler_fn, wrap_fn};
use crate::middleware::{Logger, Recovery, Static};
use crate::request::Request;
use crate::response::ResponseWriter;
use crate::server::Server;

/// An ordered, derivable sequence of handlers that is itself a handler.
#[derive(Clone, Default)]
pub struct Chain {
    handlers: Vec<BoxedHandler>,
}

impl Chain {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// A chain pre-loaded with the default middleware stack:
    ///
    /// - [`Recovery`]: turns handler panics into `500 Internal Server Error`
    /// - [`Logger`]: one span per request, `started` / `completed` events
    /// - [`Static`]: serves files from `./public`
    pub fn classic() -> Self {
        let mut chain = Self::new();
        chain.add(Recovery::new()).add(Logger::new()).add(Static::new("public"));
        chain
    }

    /// Builds a chain from a batch of handlers. See [`add_all`](Chain::add_all).
    ///
    /// # Panics
    ///
    /// Panics if any item is `None`.
    pub fn from_handlers<I>(handlers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<BoxedHandler>>,
    {
        Self { handlers: present(handlers) }
    }

    /// Appends one handler.
    pub fn add<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.handlers.push(handler.into_boxed_handler());
        self
    }

    /// Appends a batch of handlers in the order given.
    ///
    /// Items may be plain [`BoxedHandler`]s or `Option<BoxedHandler>`s, which
    /// is convenient when a middleware is enabled by configuration.
    ///
    /// # Panics
    ///
    /// Panics if any item is `None`. Every item is checked before anything is
    /// appended, so a failed batch leaves the chain untouched.
    pub fn add_all<I>(&mut self, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Option<BoxedHandler>>,
    {
        let batch = present(handlers);
        self.handlers.extend(batch);
        self
    }

    /// Appends a closure with the full handler signature.
    pub fn add_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut ResponseWriter, &mut Request, Next<'_>) + Send + Sync + 'static,
    {
        self.add(handler_fn(f))
    }

    /// Appends a terminal closure that always falls through to the rest of
    /// the chain (see [`wrap_fn`](crate::wrap_fn)).
    pub fn add_terminal_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut ResponseWriter, &mut Request) + Send + Sync + 'static,
    {
        self.add(wrap_fn(f))
    }

    /// Returns a new chain holding this chain's handlers followed by
    /// `handlers`. `self` is left untouched.
    ///
    /// The child's list is a fresh allocation sized for exactly its contents,
    /// so later appends to the parent, the child, or any sibling never land in
    /// storage another chain can see.
    ///
    /// # Panics
    ///
    /// Panics if any item is `None`.
    pub fn with<I>(&self, handlers: I) -> Chain
    where
        I: IntoIterator,
        I::Item: Into<Option<BoxedHandler>>,
    {
        let extra = present(handlers);
        let mut derived = Vec::with_capacity(self.handlers.len() + extra.len());
        derived.extend(self.handlers.iter().cloned());
        derived.extend(extra);
        Chain { handlers: derived }
    }

    /// A snapshot of the registered handlers, in order.
    pub fn handlers(&self) -> Vec<BoxedHandler> {
        self.handlers.clone()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the chain for one request. Returns once every handler has
    /// finished or one of them short-circuited.
    pub fn dispatch(&self, rw: &mut ResponseWriter, req: &mut Request) {
        Next::over(&self.handlers).run(rw, req);
    }

    /// Like [`dispatch`](Chain::dispatch), but when the last handler continues,
    /// `last` runs instead of nothing.
    pub fn dispatch_with_next(&self, rw: &mut ResponseWriter, req: &mut Request, last: &dyn Terminal) {
        Next::ending_in(&self.handlers, last).run(rw, req);
    }

    /// Serves this chain on `addr`, or on the address picked by
    /// [`detect_address`] when `addr` is `None`.
    ///
    /// Returns after a graceful shutdown (SIGTERM or Ctrl-C).
    pub async fn run(self, addr: Option<&str>) -> Result<(), Error> {
        let addr = detect_address(addr);
        info!(%addr, handlers = self.len(), "starting chain");
        Server::bind(&addr)?.serve(self).await
    }
}

/// Unwraps every item of a registration batch, failing before any is kept.
fn present<I>(handlers: I) -> Vec<BoxedHandler>
where
    I: IntoIterator,
    I::Item: Into<Option<BoxedHandler>>,
{
    handlers
        .into_iter()
        .enumerate()
        .map(|(position, handler)| {
            handler
                .into()
                .unwrap_or_else(|| panic!("missing handler at position {position} of registration batch"))
        })
        .collect()
}

impl Terminal for Chain {
    fn serve(&self, rw: &mut ResponseWriter, req: &mut Request) {
        self.dispatch(rw, req);
    }
}

/// A chain nested inside another chain continues into the outer chain once
/// its own handlers have all continued.
impl Handler for Chain {
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        Next::resuming(&self.handlers, next).run(rw, req);
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("handlers", &self.handlers.len()).finish()
    }
}
