//! Listen-address resolution.
//!
//! Precedence, highest first:
//!
//! 1. the address passed to [`Chain::run`](crate::Chain::run)
//! 2. the `PORT` environment variable (PaaS convention), bound on all interfaces
//! 3. [`DEFAULT_ADDRESS`]

use std::env;

/// Used when neither an explicit address nor `PORT` is given.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";

const PORT_VAR: &str = "PORT";

/// Picks the listen address, consulting `PORT` when `explicit` is `None`.
pub fn detect_address(explicit: Option<&str>) -> String {
    let port = env::var(PORT_VAR).ok();
    resolve_address(explicit, port.as_deref())
}

/// The environment-free core of [`detect_address`].
///
/// A bare `":port"` (explicit or from `PORT` prefixed with `:`) binds on all
/// interfaces. Empty values count as absent.
pub fn resolve_address(explicit: Option<&str>, port: Option<&str>) -> String {
    if let Some(addr) = explicit.filter(|a| !a.is_empty()) {
        return all_interfaces(addr);
    }
    match port.map(str::trim).filter(|p| !p.is_empty()) {
        Some(port) => format!("0.0.0.0:{}", port.trim_start_matches(':')),
        None => DEFAULT_ADDRESS.to_owned(),
    }
}

fn all_interfaces(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_owned(),
    }
}
