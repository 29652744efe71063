//! Application configuration.
//!
//! Built once at startup and shared read-only afterwards. Nothing in the crate
//! reads the secret or the cookie name from global state; every component that
//! needs them receives a [`Config`] at construction.

use std::fmt;

use crate::error::Error;

/// Cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "awesession";

/// Session lifetime used when none is configured: 24 hours.
pub const DEFAULT_SESSION_TTL: u64 = 86_400;

/// Immutable configuration for the session layer.
///
/// ```rust
/// use awesome::Config;
///
/// let config = Config::new("s3cr3t")
///     .cookie_name("blogsession")
///     .session_ttl(3600);
///
/// assert_eq!(config.get_cookie_name(), "blogsession");
/// ```
#[derive(Clone)]
pub struct Config {
    secret: String,
    cookie_name: String,
    session_ttl: u64,
}

impl Config {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Reads configuration from the environment.
    ///
    /// | Variable | Required | Default |
    /// |---|---|---|
    /// | `AWESOME_SECRET` | yes | — |
    /// | `AWESOME_COOKIE_NAME` | no | `awesession` |
    /// | `AWESOME_SESSION_TTL` | no | `86400` |
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let secret = lookup("AWESOME_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("AWESOME_SECRET is not set".to_owned()))?;

        let mut config = Self::new(secret);

        if let Some(name) = lookup("AWESOME_COOKIE_NAME") {
            config = config.cookie_name(name);
        }
        if let Some(ttl) = lookup("AWESOME_SESSION_TTL") {
            let ttl = ttl
                .parse()
                .map_err(|_| Error::Config(format!("AWESOME_SESSION_TTL is not a number: `{ttl}`")))?;
            config = config.session_ttl(ttl);
        }

        Ok(config)
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Session lifetime in seconds. Used both as the token expiry offset and
    /// as the cookie `Max-Age`.
    pub fn session_ttl(mut self, seconds: u64) -> Self {
        self.session_ttl = seconds;
        self
    }

    pub fn get_cookie_name(&self) -> &str { &self.cookie_name }
    pub fn get_session_ttl(&self) -> u64 { self.session_ttl }
    pub(crate) fn secret(&self) -> &str { &self.secret }
}

// Keeps the secret out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}
