use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::handler::{Handler, Next};
use crate::request::Request;
use crate::response::{ContentType, ResponseWriter};
use crate::status::Status;

/// Turns a panic anywhere downstream into `500 Internal Server Error`.
///
/// The panic is logged at error level and stops here. If a downstream handler
/// already committed a status before panicking, that status is kept.
///
/// Requires `panic = "unwind"` (the default profile setting).
#[derive(Clone, Copy, Debug, Default)]
pub struct Recovery {
    panic_body: bool,
}

impl Recovery {
    pub fn new() -> Self {
        Self { panic_body: false }
    }

    /// Include the panic message in the response body. Handy in development;
    /// leaks internals in production.
    pub fn with_panic_body(mut self, enabled: bool) -> Self {
        self.panic_body = enabled;
        self
    }
}

impl Handler for Recovery {
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| next.run(rw, req)));
        let Err(payload) = outcome else { return };

        let message = panic_message(payload.as_ref());
        error!(method = %req.method(), path = %req.path(), "handler panicked: {message}");

        if rw.written() {
            return;
        }
        rw.write_header(Status::InternalServerError);
        if self.panic_body {
            rw.send(ContentType::Text, format!("panic: {message}"));
        } else {
            rw.send(ContentType::Text, Status::InternalServerError.reason());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
