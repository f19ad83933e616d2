use std::time::Instant;

use tracing::{info, info_span};

use crate::handler::{Handler, Next};
use crate::request::Request;
use crate::response::ResponseWriter;
use crate::status::reason_phrase;

/// Logs every request through `tracing`.
///
/// Opens a `request` span carrying `method` and `path`, emits `started`
/// before the rest of the chain runs and `completed` (with `status`, `reason`
/// and `elapsed`) after it returns. Events from downstream handlers are
/// recorded inside the span.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for Logger {
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        let span = info_span!("request", method = %req.method(), path = %req.path());
        let _entered = span.enter();

        let start = Instant::now();
        info!("started");

        next.run(rw, req);

        let status = rw.status();
        info!(
            status,
            reason = reason_phrase(status),
            elapsed = ?start.elapsed(),
            "completed"
        );
    }
}
