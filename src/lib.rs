//! # awesome
//!
//! The web core of a small blog: a fixed request pipeline, a response
//! negotiator that accepts whatever shape a handler returns, and stateless
//! signed-cookie sessions.
//!
//! ## The pipeline
//!
//! Every request runs through the same four stages, in order:
//!
//! 1. **log** — method and path go to `tracing`.
//! 2. **session** — the session cookie is verified and the user, if any, is
//!    attached to the request's [`Context`].
//! 3. **dispatch** — radix-tree routing via [`matchit`] to your handler.
//! 4. **negotiation** — the handler's [`ResponseValue`] becomes a [`Response`].
//!
//! ## Sessions
//!
//! There is no session table. The cookie carries
//! `"{user_id}-{expires}-{sha1}"`, signed with the server secret over the
//! user's password digest, so a password change revokes every session.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use awesome::{App, Authenticator, Config, MemoryStore, Request, ResponseValue, Router, Server, Templates};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), awesome::Error> {
//!     let config = Arc::new(Config::from_env()?);
//!     let auth = Authenticator::new(config, Arc::new(MemoryStore::new()));
//!
//!     let router = Router::new()
//!         .get("/", |_req: Request| async { "<h1>Awesome</h1>" })
//!         .get("/me", |req: Request| async move {
//!             match req.user() {
//!                 Some(user) => ResponseValue::template("me.html", json!({ "name": user.name })),
//!                 None => ResponseValue::redirect("/signin"),
//!             }
//!         });
//!
//!     let app = App::new(router, auth, Arc::new(Templates::from_dir("templates")));
//!     Server::bind("127.0.0.1:9000")?.serve(app).await
//! }
//! ```

mod app;
mod auth;
mod config;
mod error;
mod handler;
mod model;
mod request;
mod response;
mod router;
mod server;
mod template;
mod value;

pub mod api;
pub mod digest;
pub mod middleware;
pub mod negotiate;

pub use api::{ApiError, check_admin};
pub use app::App;
pub use auth::Authenticator;
pub use config::{Config, DEFAULT_COOKIE_NAME, DEFAULT_SESSION_TTL};
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use model::{MASKED_PASSWORD, MemoryStore, User, UserStore, next_id};
pub use request::{Context, Request};
pub use response::{ContentType, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use template::{TemplateRenderer, Templates};
pub use value::{REDIRECT_PREFIX, ResponseValue, TEMPLATE_KEY, USER_KEY};
