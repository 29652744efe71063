//! The user record and the store it lives in.
//!
//! Persistence is not this crate's concern: the pipeline only needs to look a
//! user up by id. [`UserStore`] is that seam; [`MemoryStore`] backs tests and
//! the demo.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Error;
use crate::handler::BoxFuture;

/// Replaces the password digest on every user that leaves the authenticator.
pub const MASKED_PASSWORD: &str = "******";

/// A registered blog user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Password digest, see [`password_digest`](crate::digest::password_digest).
    pub passwd: String,
    pub admin: bool,
    pub image: String,
    /// Unix seconds, fractional.
    pub created_at: f64,
}

impl User {
    /// Returns the user with its password digest replaced by [`MASKED_PASSWORD`].
    pub fn masked(mut self) -> Self {
        self.passwd = MASKED_PASSWORD.to_owned();
        self
    }
}

/// Generates a new 50-character record id: a zero-padded millisecond
/// timestamp, a random UUID in hex, and a `000` suffix. Ids sort by creation
/// time and never contain `-`.
pub fn next_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{millis:015}{}000", uuid::Uuid::new_v4().simple())
}

/// Lookup and persistence for [`User`]s.
///
/// Every method may suspend. Implementations are shared across concurrent
/// requests, hence `Send + Sync`.
pub trait UserStore: Send + Sync + 'static {
    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<User>, Error>>;

    fn find_all(&self) -> BoxFuture<'_, Result<Vec<User>, Error>>;

    fn save(&self, user: User) -> BoxFuture<'_, Result<(), Error>>;

    /// Lookup by email. The default scans [`find_all`](UserStore::find_all).
    fn find_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<User>, Error>> {
        Box::pin(async move {
            let users = self.find_all().await?;
            Ok(users.into_iter().find(|u| u.email == email))
        })
    }
}

/// In-process [`UserStore`].
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl UserStore for MemoryStore {
    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<User>, Error>> {
        Box::pin(async move { Ok(self.users.read().await.get(id).cloned()) })
    }

    fn find_all(&self) -> BoxFuture<'_, Result<Vec<User>, Error>> {
        Box::pin(async move {
            let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
            users.sort_by(|a, b| b.created_at.total_cmp(&a.created_at));
            Ok(users)
        })
    }

    fn save(&self, user: User) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async move {
            self.users.write().await.insert(user.id.clone(), user);
            Ok(())
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn user(id: &str, admin: bool) -> User {
        User {
            id: id.to_owned(),
            email: format!("{id}@example.com"),
            name: id.to_owned(),
            passwd: crate::digest::password_digest(id, "password"),
            admin,
            image: "about:blank".to_owned(),
            created_at: 1_700_000_000.0,
        }
    }

    #[test]
    fn next_id_is_unique_and_dashless() {
        let a = next_id();
        let b = next_id();
        assert_eq!(a.len(), 50);
        assert_ne!(a, b);
        assert!(!a.contains('-'));
        assert!(a.ends_with("000"));
    }

    #[test]
    fn masked_hides_digest() {
        let masked = user("u1", false).masked();
        assert_eq!(masked.passwd, MASKED_PASSWORD);
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.find("u1").await.unwrap(), None);

        store.save(user("u1", false)).await.unwrap();
        let mut newer = user("u2", true);
        newer.created_at += 10.0;
        store.save(newer).await.unwrap();

        assert_eq!(store.find("u1").await.unwrap().map(|u| u.id), Some("u1".to_owned()));
        let ids: Vec<_> = store.find_all().await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, ["u2", "u1"]);
        assert_eq!(
            store.find_by_email("u2@example.com").await.unwrap().map(|u| u.admin),
            Some(true)
        );
    }
}
