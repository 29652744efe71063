//! Pipeline stages.
//!
//! Every request passes through the same fixed chain, driven by
//! [`App::handle`](crate::App::handle):
//!
//! 1. [`log`] — record method and path.
//! 2. [`session`] — resolve the session cookie into [`Context::user`](crate::Context).
//! 3. dispatch — the router calls the matching handler.
//! 4. negotiation — [`negotiate`](crate::negotiate::negotiate) builds the wire response.
//!
//! Stages run strictly in this order and none is skipped, including for
//! anonymous callers and unmatched routes.

mod logger;
mod session;

pub use logger::log;
pub use session::session;
