use crate::auth::Authenticator;
use crate::request::Request;

/// Resolves the session cookie and attaches the user (or `None`) to the
/// request context.
pub async fn session(auth: &Authenticator, req: &mut Request) {
    let user = auth.resolve(req.cookie(auth.config().get_cookie_name())).await;
    req.context.user = user;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::config::Config;
    use crate::model::tests::user;
    use crate::model::{MASKED_PASSWORD, MemoryStore, UserStore};

    async fn auth() -> Authenticator {
        let store = MemoryStore::new();
        store.save(user("alice", false)).await.unwrap();
        Authenticator::new(Arc::new(Config::new("secret")), Arc::new(store))
    }

    fn request(cookie: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/");
        if let Some(c) = cookie {
            builder = builder.header("cookie", c);
        }
        Request::from_http(builder.body(Bytes::new()).unwrap())
    }

    #[tokio::test]
    async fn no_cookie_is_anonymous() {
        let auth = auth().await;
        let mut req = request(None);
        session(&auth, &mut req).await;
        assert!(req.user().is_none());
    }

    #[tokio::test]
    async fn valid_cookie_attaches_masked_user() {
        let auth = auth().await;
        let token = auth.issue(&user("alice", false), 60);
        let mut req = request(Some(&format!("theme=dark; awesession={token}")));
        session(&auth, &mut req).await;

        let current = req.user().unwrap();
        assert_eq!(current.id, "alice");
        assert_eq!(current.passwd, MASKED_PASSWORD);
    }

    #[tokio::test]
    async fn cookie_under_other_name_is_ignored() {
        let auth = auth().await;
        let token = auth.issue(&user("alice", false), 60);
        let mut req = request(Some(&format!("session={token}")));
        session(&auth, &mut req).await;
        assert!(req.user().is_none());
    }
}
