//! The handler protocol and the continuation threaded through a chain.
//!
//! # How a dispatch unwinds
//!
//! A chain never builds closures or boxes per step. [`Next`] is a small stack
//! value holding the handlers still to run and what happens after the last
//! one. Running it pops the first handler and hands that handler a `Next`
//! over the remainder:
//!
//! ```text
//! chain.dispatch(rw, req)
//!        ↓ Next { rest: [a, b, c], tail: Noop }
//! a.handle(rw, req, next)         ← a decides whether to call next.run()
//!        ↓ Next { rest: [b, c], tail: Noop }
//! b.handle(rw, req, next)
//!        ↓ Next { rest: [c], tail: Noop }
//! c.handle(rw, req, next)
//!        ↓ Next { rest: [], tail: Noop }
//! (tail) nothing, or the terminal passed to dispatch_with_next
//! ```
//!
//! Whatever a handler does after `next.run()` returns happens after every
//! downstream handler has finished, so post-processing unwinds in reverse
//! registration order.

use std::fmt;
use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseWriter;

/// A shared, type-erased handler as stored inside a [`Chain`](crate::Chain).
///
/// `Arc` lets several chains (a parent and everything derived from it) hold
/// the same handler instance without copying it.
pub type BoxedHandler = Arc<dyn Handler>;

// ── Handler ───────────────────────────────────────────────────────────────────

/// A request interceptor.
///
/// Implement this on your own types to plug them into a chain directly, or
/// use [`HandlerFn`] / [`Chain::add_fn`](crate::Chain::add_fn) for closures.
///
/// ```rust
/// use strand::{Handler, Next, Request, ResponseWriter};
///
/// struct PoweredBy;
///
/// impl Handler for PoweredBy {
///     fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
///         rw.set_header(
///             http::header::SERVER,
///             http::HeaderValue::from_static("strand"),
///         );
///         next.run(rw, req);
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Processes the request. Call `next.run(rw, req)` to continue down the
    /// chain; return without calling it to short-circuit.
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>);

    /// Moves the handler behind an `Arc` so it can be stored in a chain.
    fn into_boxed_handler(self) -> BoxedHandler
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

// ── Terminal ──────────────────────────────────────────────────────────────────

/// A handler with no continuation: it produces the final effect for a request.
///
/// Every `Fn(&mut ResponseWriter, &mut Request)` closure is a `Terminal`, and
/// so is a [`Chain`](crate::Chain).
pub trait Terminal {
    fn serve(&self, rw: &mut ResponseWriter, req: &mut Request);
}

impl<F> Terminal for F
where
    F: Fn(&mut ResponseWriter, &mut Request),
{
    fn serve(&self, rw: &mut ResponseWriter, req: &mut Request) {
        self(rw, req)
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the chain, handed to each handler.
///
/// Consumed by [`run`](Next::run), so a handler can continue at most once.
pub struct Next<'a> {
    rest: &'a [BoxedHandler],
    tail: Tail<'a>,
}

enum Tail<'a> {
    Noop,
    Terminal(&'a dyn Terminal),
    // A chain used as a handler inside another chain resumes the outer one.
    Outer(Box<Next<'a>>),
}

impl<'a> Next<'a> {
    /// A continuation that does nothing. Useful for calling a single handler
    /// outside of any chain.
    pub fn noop() -> Next<'static> {
        Next { rest: &[], tail: Tail::Noop }
    }

    pub(crate) fn over(rest: &'a [BoxedHandler]) -> Self {
        Self { rest, tail: Tail::Noop }
    }

    pub(crate) fn ending_in(rest: &'a [BoxedHandler], last: &'a dyn Terminal) -> Self {
        Self { rest, tail: Tail::Terminal(last) }
    }

    pub(crate) fn resuming(rest: &'a [BoxedHandler], outer: Next<'a>) -> Self {
        Self { rest, tail: Tail::Outer(Box::new(outer)) }
    }

    /// Runs the next handler, or the tail once no handlers remain.
    pub fn run(self, rw: &mut ResponseWriter, req: &mut Request) {
        match self.rest.split_first() {
            Some((first, rest)) => first.handle(rw, req, Next { rest, tail: self.tail }),
            None => match self.tail {
                Tail::Noop => {}
                Tail::Terminal(last) => last.serve(rw, req),
                Tail::Outer(outer) => outer.run(rw, req),
            },
        }
    }

    /// Number of handlers still ahead of this continuation.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("remaining", &self.rest.len()).finish_non_exhaustive()
    }
}

// ── Variants ──────────────────────────────────────────────────────────────────

/// A closure with the full handler signature.
pub struct HandlerFn<F>(pub F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut ResponseWriter, &mut Request, Next<'_>) + Send + Sync + 'static,
{
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        (self.0)(rw, req, next)
    }
}

/// Builds a [`HandlerFn`]. The explicit signature lets the compiler infer the
/// closure's argument types.
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut ResponseWriter, &mut Request, Next<'_>) + Send + Sync + 'static,
{
    HandlerFn(f)
}

/// Adapts a [`Terminal`] into a handler that always falls through.
///
/// Built by [`wrap`] and [`wrap_fn`].
pub struct Wrap<T>(T);

impl<T> Handler for Wrap<T>
where
    T: Terminal + Send + Sync + 'static,
{
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        self.0.serve(rw, req);
        next.run(rw, req);
    }
}

/// Turns a terminal into a handler that runs it, then continues the chain.
pub fn wrap<T>(terminal: T) -> Wrap<T>
where
    T: Terminal + Send + Sync + 'static,
{
    Wrap(terminal)
}

/// [`wrap`] for a bare closure. The explicit signature lets the compiler infer
/// the closure's argument types.
pub fn wrap_fn<F>(f: F) -> Wrap<F>
where
    F: Fn(&mut ResponseWriter, &mut Request) + Send + Sync + 'static,
{
    Wrap(f)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{Method, Status};

    fn request() -> Request {
        Request::new(Method::Get, "/")
    }

    #[test]
    fn wrap_runs_terminal_then_continues() {
        let served = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&served);
        let handler = wrap_fn(move |rw, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            rw.write_header(Status::Ok);
        })
        .into_boxed_handler();

        let continued = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&continued);
        let last = move |rw: &mut ResponseWriter, _: &mut Request| {
            assert_eq!(rw.status(), 200);
            seen.fetch_add(1, Ordering::SeqCst);
        };

        let handlers = [handler];
        let mut rw = ResponseWriter::new();
        Next::ending_in(&handlers, &last).run(&mut rw, &mut request());

        assert_eq!(served.load(Ordering::SeqCst), 1);
        assert_eq!(continued.load(Ordering::SeqCst), 1);
        assert_eq!(rw.status(), 200);
    }

    #[test]
    fn wrap_accepts_any_terminal() {
        let handler = wrap(|rw: &mut ResponseWriter, _: &mut Request| {
            rw.write_header(Status::Accepted);
        });

        let mut rw = ResponseWriter::new();
        handler.handle(&mut rw, &mut request(), Next::noop());
        assert_eq!(rw.status(), 202);
    }

    #[test]
    fn handler_fn_calls_closure() {
        let handler = handler_fn(|rw, _, next| {
            rw.write(b"hi");
            assert_eq!(next.remaining(), 0);
        });

        let mut rw = ResponseWriter::new();
        handler.handle(&mut rw, &mut request(), Next::noop());
        assert_eq!(rw.body(), b"hi");
    }

    #[test]
    fn noop_continuation_does_nothing() {
        let mut rw = ResponseWriter::new();
        Next::noop().run(&mut rw, &mut request());
        assert!(!rw.written());
    }

    #[test]
    fn resuming_runs_outer_after_inner() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let log = Arc::clone(&order);
        let inner: [BoxedHandler; 1] = [handler_fn(move |rw, req, next| {
            log.lock().unwrap().push("inner");
            next.run(rw, req);
        })
        .into_boxed_handler()];

        let log = Arc::clone(&order);
        let outer: [BoxedHandler; 1] = [handler_fn(move |rw, req, next| {
            log.lock().unwrap().push("outer");
            next.run(rw, req);
        })
        .into_boxed_handler()];

        let mut rw = ResponseWriter::new();
        Next::resuming(&inner, Next::over(&outer)).run(&mut rw, &mut request());

        assert_eq!(*order.lock().unwrap(), ["inner", "outer"]);
    }
}
