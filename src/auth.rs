//! Stateless cookie sessions.
//!
//! The server keeps no session table. A signed token in the session cookie is
//! the whole session: [`Authenticator::issue`] creates one at sign-in, and
//! [`Authenticator::resolve`] checks it on every request. Because nothing is
//! shared but the read-only [`Config`] and the user store, any number of
//! concurrent requests can resolve sessions without coordinating.
//!
//! Resolution never fails. A missing, malformed, expired, unknown or forged
//! cookie, or a store error while looking the user up, all make the caller
//! anonymous.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::config::Config;
use crate::digest::{self, SessionToken};
use crate::model::{User, UserStore};

/// Value written over the session cookie at sign-out.
const DELETED: &str = "-deleted-";

/// Verifies and issues session tokens.
#[derive(Clone)]
pub struct Authenticator {
    config: Arc<Config>,
    store: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(config: Arc<Config>, store: Arc<dyn UserStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn store(&self) -> &Arc<dyn UserStore> { &self.store }

    /// Resolves a session cookie value to its user, with the password digest
    /// masked. `None` means anonymous.
    pub async fn resolve(&self, cookie: Option<&str>) -> Option<User> {
        self.resolve_at(cookie, unix_now()).await
    }

    /// [`resolve`](Self::resolve) against an explicit clock.
    pub async fn resolve_at(&self, cookie: Option<&str>, now: u64) -> Option<User> {
        let cookie = cookie?;

        let SessionToken { user_id, expires, digest: presented } = match digest::parse_token(cookie) {
            Ok(token) => token,
            Err(e) => {
                debug!("{e}");
                return None;
            }
        };

        if expires <= now {
            debug!(user_id = %user_id, expires, "session expired");
            return None;
        }

        let user = match self.store.find(&user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(user_id = %user_id, "session for unknown user");
                return None;
            }
            Err(e) => {
                warn!(user_id = %user_id, "session lookup failed: {e}");
                return None;
            }
        };

        let expected = digest::sign(&user.id, &user.passwd, expires, self.config.secret());
        if !bool::from(expected.as_bytes().ct_eq(presented.as_bytes())) {
            debug!(user_id = %user_id, "session digest mismatch");
            return None;
        }

        Some(user.masked())
    }

    /// A token for `user` valid for `ttl` seconds from now.
    pub fn issue(&self, user: &User, ttl: u64) -> String {
        self.issue_at(user, ttl, unix_now())
    }

    /// [`issue`](Self::issue) against an explicit clock.
    pub fn issue_at(&self, user: &User, ttl: u64, now: u64) -> String {
        digest::build_token(&user.id, &user.passwd, now.saturating_add(ttl), self.config.secret())
    }

    /// `Set-Cookie` value starting a session for `user` with the configured
    /// lifetime. Not readable from page scripts.
    pub fn session_cookie(&self, user: &User) -> String {
        let ttl = self.config.get_session_ttl();
        let token = self.issue(user, ttl);
        format!("{}={token}; Max-Age={ttl}; Path=/; HttpOnly", self.config.get_cookie_name())
    }

    /// `Set-Cookie` value ending the current session.
    pub fn clear_cookie(&self) -> String {
        format!("{}={DELETED}; Max-Age=0; Path=/; HttpOnly", self.config.get_cookie_name())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::handler::BoxFuture;
    use crate::model::tests::user;
    use crate::model::{MASKED_PASSWORD, MemoryStore};

    const NOW: u64 = 1_700_000_000;
    const TTL: u64 = 3600;

    async fn fixture() -> (Authenticator, User) {
        let store = MemoryStore::new();
        let alice = user("alice", false);
        store.save(alice.clone()).await.unwrap();
        let auth = Authenticator::new(Arc::new(Config::new("secret")), Arc::new(store));
        (auth, alice)
    }

    #[tokio::test]
    async fn issued_token_resolves_until_expiry() {
        let (auth, alice) = fixture().await;
        let token = auth.issue_at(&alice, TTL, NOW);

        let resolved = auth.resolve_at(Some(&token), NOW).await.unwrap();
        assert_eq!(resolved.id, "alice");
        assert_eq!(resolved.passwd, MASKED_PASSWORD);

        assert!(auth.resolve_at(Some(&token), NOW + TTL - 1).await.is_some());
        assert!(auth.resolve_at(Some(&token), NOW + TTL).await.is_none());
        assert!(auth.resolve_at(Some(&token), NOW + TTL + 1).await.is_none());
    }

    #[tokio::test]
    async fn real_clock_round_trip() {
        let (auth, alice) = fixture().await;
        let token = auth.issue(&alice, TTL);
        assert_eq!(auth.resolve(Some(&token)).await.map(|u| u.id), Some("alice".to_owned()));
    }

    #[tokio::test]
    async fn missing_or_malformed_cookie_is_anonymous() {
        let (auth, _) = fixture().await;
        assert!(auth.resolve_at(None, NOW).await.is_none());
        for cookie in ["", "alice", "alice-1", "alice-x-y", "a-1-2-3", "-deleted-"] {
            assert!(auth.resolve_at(Some(cookie), NOW).await.is_none(), "{cookie:?}");
        }
    }

    #[tokio::test]
    async fn unknown_user_is_anonymous() {
        let (auth, _) = fixture().await;
        let stranger = user("bob", false);
        let token = auth.issue_at(&stranger, TTL, NOW);
        assert!(auth.resolve_at(Some(&token), NOW).await.is_none());
    }

    #[tokio::test]
    async fn any_digest_tampering_is_rejected() {
        let (auth, alice) = fixture().await;
        let token = auth.issue_at(&alice, TTL, NOW);
        let digest_start = token.rfind('-').unwrap() + 1;

        for i in digest_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let forged = String::from_utf8(bytes).unwrap();
            assert!(auth.resolve_at(Some(&forged), NOW).await.is_none(), "position {i}");
        }
    }

    #[tokio::test]
    async fn extending_expiry_breaks_the_digest() {
        let (auth, alice) = fixture().await;
        let token = auth.issue_at(&alice, TTL, NOW);
        let forged = token.replacen(&(NOW + TTL).to_string(), &(NOW + 10 * TTL).to_string(), 1);
        assert!(auth.resolve_at(Some(&forged), NOW).await.is_none());
    }

    #[tokio::test]
    async fn other_secret_is_rejected() {
        let (auth, alice) = fixture().await;
        let other = Authenticator::new(Arc::new(Config::new("other")), Arc::clone(auth.store()));
        let token = other.issue_at(&alice, TTL, NOW);
        assert!(auth.resolve_at(Some(&token), NOW).await.is_none());
    }

    #[tokio::test]
    async fn password_change_revokes_sessions() {
        let (auth, mut alice) = fixture().await;
        let token = auth.issue_at(&alice, TTL, NOW);
        alice.passwd = crate::digest::password_digest("alice", "changed");
        auth.store().save(alice).await.unwrap();
        assert!(auth.resolve_at(Some(&token), NOW).await.is_none());
    }

    struct BrokenStore;

    impl UserStore for BrokenStore {
        fn find<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<Option<User>, Error>> {
            Box::pin(async { Err(Error::Store("connection refused".to_owned())) })
        }
        fn find_all(&self) -> BoxFuture<'_, Result<Vec<User>, Error>> {
            Box::pin(async { Err(Error::Store("connection refused".to_owned())) })
        }
        fn save(&self, _: User) -> BoxFuture<'_, Result<(), Error>> {
            Box::pin(async { Err(Error::Store("connection refused".to_owned())) })
        }
    }

    #[tokio::test]
    async fn store_failure_is_anonymous() {
        let auth = Authenticator::new(Arc::new(Config::new("secret")), Arc::new(BrokenStore));
        let token = auth.issue_at(&user("alice", false), TTL, NOW);
        assert!(auth.resolve_at(Some(&token), NOW).await.is_none());
    }

    #[tokio::test]
    async fn cookies_carry_name_and_flags() {
        let (auth, alice) = fixture().await;
        let set = auth.session_cookie(&alice);
        assert!(set.starts_with("awesession=alice-"));
        assert!(set.contains("Max-Age=86400"));
        assert!(set.contains("HttpOnly"));

        let value = set.split(';').next().unwrap().trim_start_matches("awesession=");
        assert!(auth.resolve(Some(value)).await.is_some());

        assert_eq!(auth.clear_cookie(), "awesession=-deleted-; Max-Age=0; Path=/; HttpOnly");
    }
}
