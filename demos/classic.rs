//! Classic strand stack with a couple of application handlers.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example classic
//!   PORT=3000 RUST_LOG=debug cargo run --example classic
//!
//! Try:
//!   curl -i http://localhost:8080/                       → served from ./public if present
//!   curl -i http://localhost:8080/hello
//!   curl -i -H 'x-api-key: secret' http://localhost:8080/admin/stats
//!   curl -i http://localhost:8080/admin/stats           → 401, admin chain short-circuits

use http::HeaderValue;
use http::header::SERVER;
use strand::{Chain, ContentType, Handler, Next, Request, ResponseWriter, Status};
use tracing_subscriber::EnvFilter;

/// Rejects requests without the expected API key.
struct ApiKey(&'static str);

impl Handler for ApiKey {
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        if req.header("x-api-key") != Some(self.0) {
            rw.write_header(Status::Unauthorized);
            return;
        }
        next.run(rw, req);
    }
}

#[tokio::main]
async fn main() -> Result<(), strand::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut base = Chain::classic();
    base.add_fn(|rw, req, next| {
        rw.before(|rw| rw.set_header(SERVER, HeaderValue::from_static("strand")));
        next.run(rw, req);
    });

    // Runs inside `app`, after the classic stack has already handled the request.
    let mut admin = Chain::new();
    admin.add(ApiKey("secret"));
    admin.add_terminal_fn(|rw, _| {
        rw.send(ContentType::Json, br#"{"requests":42}"#);
    });

    let mut app = base;
    app.add_fn(move |rw, req, next| {
        if req.path().starts_with("/admin") {
            admin.dispatch(rw, req);
            return;
        }
        next.run(rw, req);
    });
    app.add_fn(|rw, req, _| match req.path() {
        "/hello" => rw.send(ContentType::Text, "hello, world"),
        _ => rw.write_header(Status::NotFound),
    });

    app.run(None).await
}
