//! The request pipeline.

use std::sync::Arc;

use http::StatusCode;
use tracing::error;

use crate::auth::Authenticator;
use crate::middleware;
use crate::negotiate::negotiate;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::template::TemplateRenderer;

/// Everything a request needs: routes, session verification, templates.
///
/// Immutable once built. [`Server::serve`](crate::Server::serve) shares it
/// across connections behind an `Arc`.
pub struct App {
    router: Router,
    auth: Authenticator,
    renderer: Arc<dyn TemplateRenderer>,
}

impl App {
    pub fn new(router: Router, auth: Authenticator, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { router, auth, renderer }
    }

    pub fn auth(&self) -> &Authenticator { &self.auth }

    /// Runs one request through log → session → dispatch → negotiation.
    ///
    /// Never fails: a store or template failure during negotiation becomes a
    /// `500` for this request only.
    pub async fn handle(&self, mut req: Request) -> Response {
        middleware::log(&req);
        middleware::session(&self.auth, &mut req).await;

        let method = req.method.clone();
        let path = req.path.clone();
        let user = req.context.user.clone();

        let value = self.router.dispatch(req).await;

        match negotiate(value, self.renderer.as_ref(), user.as_ref()) {
            Ok(response) => response,
            Err(e) => {
                error!(%method, %path, "failed to build response: {e}");
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .text("Internal Server Error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::config::Config;
    use crate::model::tests::user;
    use crate::model::{MemoryStore, UserStore};
    use crate::template::Templates;
    use crate::value::ResponseValue;

    async fn app() -> App {
        let store = MemoryStore::new();
        store.save(user("alice", false)).await.unwrap();
        let auth = Authenticator::new(Arc::new(Config::new("secret")), Arc::new(store));

        let templates = Templates::empty()
            .with_template(
                "all_users.html",
                "{% if __user__ %}{{ __user__.name }}{% else %}guest{% endif %}:{{ users | length }}",
            )
            .unwrap();

        let router = Router::new()
            .get("/whoami", |req: Request| async move {
                match req.user() {
                    Some(u) => u.name.clone(),
                    None => "anonymous".to_owned(),
                }
            })
            .get("/show_all_users", |_req: Request| async {
                ResponseValue::template("all_users.html", json!({ "users": [1, 2, 3] }))
            })
            .get("/broken", |_req: Request| async {
                ResponseValue::template("missing.html", json!({}))
            })
            .get("/manage", |req: Request| async move {
                if req.user().is_none() {
                    return ResponseValue::redirect("/signin");
                }
                ResponseValue::from("<h1>manage</h1>")
            });

        App::new(router, auth, Arc::new(templates))
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header("cookie", format!("awesession={c}"));
        }
        Request::from_http(builder.body(Bytes::new()).unwrap())
    }

    #[tokio::test]
    async fn no_cookie_completes_as_anonymous() {
        let app = app().await;
        let res = app.handle(get("/whoami", None)).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"anonymous");
        assert_eq!(res.content_type(), Some("text/html;charset=utf-8"));
    }

    #[tokio::test]
    async fn session_cookie_identifies_caller() {
        let app = app().await;
        let token = app.auth().issue(&user("alice", false), 60);
        let res = app.handle(get("/whoami", Some(&token))).await;
        assert_eq!(res.body(), b"alice");
    }

    #[tokio::test]
    async fn garbage_cookie_degrades_to_anonymous() {
        let app = app().await;
        let res = app.handle(get("/whoami", Some("not-a-token"))).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"anonymous");
    }

    #[tokio::test]
    async fn templates_see_resolved_user() {
        let app = app().await;
        let res = app.handle(get("/show_all_users", None)).await;
        assert_eq!(res.body(), b"guest:3");

        let token = app.auth().issue(&user("alice", false), 60);
        let res = app.handle(get("/show_all_users", Some(&token))).await;
        assert_eq!(res.body(), b"alice:3");
        assert_eq!(res.content_type(), Some("text/html;charset=utf-8"));
    }

    #[tokio::test]
    async fn anonymous_access_is_redirected() {
        let app = app().await;
        let res = app.handle(get("/manage", None)).await;
        assert_eq!(res.status_code(), StatusCode::FOUND);
        assert_eq!(res.header("location"), Some("/signin"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = app().await;
        let res = app.handle(get("/nope", None)).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn render_failure_is_500() {
        let app = app().await;
        let res = app.handle(get("/broken", None)).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.content_type(), Some("text/plain;charset=utf-8"));
    }

    #[tokio::test]
    async fn concurrent_requests_are_isolated() {
        let app = Arc::new(app().await);
        let token = app.auth().issue(&user("alice", false), 60);

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..16 {
            let app = Arc::clone(&app);
            let cookie = (i % 2 == 0).then(|| token.clone());
            tasks.spawn(async move {
                let res = app.handle(get("/whoami", cookie.as_deref())).await;
                (cookie.is_some(), res.body().to_vec())
            });
        }
        while let Some(joined) = tasks.join_next().await {
            let (signed_in, body) = joined.unwrap();
            let expected: &[u8] = if signed_in { b"alice" } else { b"anonymous" };
            assert_eq!(body, expected);
        }
    }
}
