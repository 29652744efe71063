use tracing::info;

use crate::request::Request;

/// Logs the request line. Does not touch the request.
pub fn log(req: &Request) {
    info!(method = %req.method(), path = req.path(), "request");
}
