//! Blog demo — registration, sign-in, sign-out and a templated user list.
//!
//! Run with:
//!   AWESOME_SECRET=change-me RUST_LOG=info cargo run --example blog
//!
//! Try:
//!   curl -i -X POST http://127.0.0.1:9000/api/users \
//!        -d '{"email":"a@example.com","name":"alice","passwd":"7c4a8d09ca3762af61e59520943dc26494f8941b"}'
//!   curl -i -X POST http://127.0.0.1:9000/api/authenticate \
//!        -d '{"email":"a@example.com","passwd":"7c4a8d09ca3762af61e59520943dc26494f8941b"}'
//!   curl -i http://127.0.0.1:9000/show_all_users -H 'cookie: awesession=...'

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use awesome::digest::password_digest;
use awesome::{
    ApiError, App, Authenticator, Config, MemoryStore, Request, Response, ResponseValue, Router,
    Server, Templates, User, check_admin, next_id,
};
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

const ALL_USERS: &str = r#"<!DOCTYPE html>
<h1>Users</h1>
{% if __user__ %}<p>Signed in as {{ __user__.name }}</p>{% else %}<p><a href="/signin">Sign in</a></p>{% endif %}
<ul>{% for u in users %}<li>{{ u.name }} &lt;{{ u.email }}&gt;</li>{% endfor %}</ul>
"#;

#[tokio::main]
async fn main() -> Result<(), awesome::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Arc::new(Config::from_env()?);
    let auth = Authenticator::new(config, Arc::new(MemoryStore::new()));
    let templates = Templates::empty().with_template("all_users.html", ALL_USERS)?;

    let router = Router::new()
        .get("/", |_req: Request| async { "<h1>Awesome</h1>" })
        .get("/show_all_users", {
            let auth = auth.clone();
            move |_req: Request| show_all_users(auth.clone())
        })
        .get("/manage/users", |req: Request| async move {
            check_admin(&req).map(|()| ResponseValue::redirect("/show_all_users"))
        })
        .post("/api/users", {
            let auth = auth.clone();
            move |req: Request| register(auth.clone(), req)
        })
        .post("/api/authenticate", {
            let auth = auth.clone();
            move |req: Request| authenticate(auth.clone(), req)
        })
        .get("/signout", {
            let auth = auth.clone();
            move |req: Request| signout(auth.clone(), req)
        });

    let app = App::new(router, auth, Arc::new(templates));
    Server::bind("127.0.0.1:9000")?.serve(app).await
}

// GET /show_all_users
async fn show_all_users(auth: Authenticator) -> ResponseValue {
    match auth.store().find_all().await {
        Ok(users) => {
            let users: Vec<User> = users.into_iter().map(User::masked).collect();
            ResponseValue::template("all_users.html", json!({ "users": users }))
        }
        Err(e) => {
            tracing::error!("listing users failed: {e}");
            ResponseValue::from(500u16)
        }
    }
}

#[derive(Deserialize)]
struct Registration {
    email: String,
    name: String,
    /// SHA-1 of `email:password`, computed client-side.
    passwd: String,
}

// POST /api/users
async fn register(auth: Authenticator, req: Request) -> Result<Response, ApiError> {
    let form: Registration = serde_json::from_slice(req.body())
        .map_err(|_| ApiError::value("body", "Expected a JSON object."))?;

    let name = form.name.trim();
    if name.is_empty() {
        return Err(ApiError::value("name", "Name cannot be empty."));
    }
    if !form.email.contains('@') {
        return Err(ApiError::value("email", "Invalid email."));
    }
    if form.passwd.len() != 40 || !form.passwd.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ApiError::value("passwd", "Invalid password."));
    }

    let store = auth.store();
    if store.find_by_email(&form.email).await.map_err(internal)?.is_some() {
        return Err(ApiError::value("email", "Email is already in use."));
    }

    let id = next_id();
    let user = User {
        passwd: password_digest(&id, &form.passwd),
        email: form.email,
        name: name.to_owned(),
        admin: false,
        image: "about:blank".to_owned(),
        created_at: unix_now(),
        id,
    };
    store.save(user.clone()).await.map_err(internal)?;

    signed_in(&auth, user)
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    passwd: String,
}

// POST /api/authenticate
async fn authenticate(auth: Authenticator, req: Request) -> Result<Response, ApiError> {
    let form: Credentials = serde_json::from_slice(req.body())
        .map_err(|_| ApiError::value("body", "Expected a JSON object."))?;

    let user = auth
        .store()
        .find_by_email(&form.email)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::value("email", "Email not exist."))?;

    if password_digest(&user.id, &form.passwd) != user.passwd {
        return Err(ApiError::value("passwd", "Invalid password."));
    }

    signed_in(&auth, user)
}

// GET /signout
async fn signout(auth: Authenticator, req: Request) -> Response {
    let back = req.header("referer").unwrap_or("/").to_owned();
    tracing::info!(user = req.user().map(|u| u.id.as_str()), "signed out");
    Response::redirect(&back).with_cookie(auth.clear_cookie())
}

fn signed_in(auth: &Authenticator, user: User) -> Result<Response, ApiError> {
    let cookie = auth.session_cookie(&user);
    let body = serde_json::to_vec(&user.masked()).map_err(|e| internal(e.into()))?;
    Ok(Response::json(body).with_cookie(cookie))
}

fn internal(e: awesome::Error) -> ApiError {
    tracing::error!("{e}");
    ApiError::value("server", "Internal error.")
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
