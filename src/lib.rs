//! # strand
//!
//! Ordered middleware chains for HTTP services. Register handlers, get one
//! handler back.
//!
//! ## The contract
//!
//! A [`Chain`] is a list of [`Handler`]s run in registration order. Each
//! handler gets the response sink, the request, and a [`Next`]: the rest of
//! the chain. Calling `next.run(rw, req)` continues; returning without calling
//! it short-circuits. Code after `next.run` runs once everything downstream
//! has finished, so wrap-around middleware (timers, recovery, header
//! rewriting) needs nothing special.
//!
//! What strand intentionally ignores:
//!
//! - **Routing**: put a router behind the chain as its last handler
//! - **Content negotiation**: a handler concern
//! - **Connection management**: hyper's job
//!
//! Chains are synchronous. The bundled [`Server`] runs each request's
//! dispatch on tokio's blocking pool; concurrency comes from there, not from
//! the chain.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strand::{Chain, ContentType, Status};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strand::Error> {
//!     let mut app = Chain::classic();
//!
//!     app.add_fn(|rw, req, next| {
//!         if req.header("authorization").is_none() {
//!             rw.write_header(Status::Unauthorized);
//!             return;
//!         }
//!         next.run(rw, req);
//!     });
//!
//!     app.add_terminal_fn(|rw, req| {
//!         rw.send(ContentType::Text, format!("hello from {}", req.path()));
//!     });
//!
//!     app.run(Some("0.0.0.0:3000")).await
//! }
//! ```
//!
//! ## Branching
//!
//! [`Chain::with`] derives a child chain without touching the parent, so a
//! shared base stack can be specialised per mount point:
//!
//! ```rust
//! use strand::{Chain, Handler};
//! use strand::middleware::{Logger, Recovery};
//!
//! let mut base = Chain::new();
//! base.add(Recovery::new());
//!
//! let api = base.with([Logger::new().into_boxed_handler()]);
//! assert_eq!((base.len(), api.len()), (1, 2));
//! ```

mod chain;
mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod server;
mod status;

pub mod middleware;

pub use chain::Chain;
pub use config::{DEFAULT_ADDRESS, detect_address, resolve_address};
pub use error::Error;
pub use handler::{BoxedHandler, Handler, HandlerFn, Next, Terminal, Wrap, handler_fn, wrap, wrap_fn};
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ContentType, ResponseWriter};
pub use server::Server;
pub use status::{Status, reason_phrase};
