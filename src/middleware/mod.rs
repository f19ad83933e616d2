//! Built-in middleware.
//!
//! Each type here is an ordinary [`Handler`](crate::Handler); nothing in the
//! chain treats them specially. [`Chain::classic`](crate::Chain::classic)
//! stacks all three in the recommended order.
//!
//! - [`Recovery`]: catches panics from downstream handlers, answers `500`
//! - [`Logger`]: per-request span with method, path, status, latency
//! - [`Static`]: serves files from a directory, falls through otherwise

mod logger;
mod recovery;
mod static_files;

pub use logger::Logger;
pub use recovery::Recovery;
pub use static_files::Static;
