//! One-way digests and the session token wire format.
//!
//! A session token is the string `"{user_id}-{expires}-{digest}"` where
//! `digest` is the SHA-1 of `"{user_id}-{password_digest}-{expires}-{secret}"`.
//! Without the secret the digest cannot be forged, and it never reveals the
//! password digest it was computed from.
//!
//! Everything here is pure. [`parse_token`] accepts arbitrary client input and
//! reports malformed strings as an error value; it never panics.

use std::fmt;

use sha1::{Digest, Sha1};

const SEPARATOR: char = '-';

/// SHA-1 of `input` as 40 lowercase hex characters.
pub fn digest(input: &[u8]) -> String {
    hex::encode(Sha1::digest(input))
}

/// Stored form of a password: `digest("{user_id}:{raw_password}")`.
pub fn password_digest(user_id: &str, raw_password: &str) -> String {
    digest(format!("{user_id}:{raw_password}").as_bytes())
}

/// Builds the cookie value for `user_id`, valid until `expires` (unix seconds).
pub fn build_token(user_id: &str, password_digest: &str, expires: u64, secret: &str) -> String {
    let signature = sign(user_id, password_digest, expires, secret);
    format!("{user_id}{SEPARATOR}{expires}{SEPARATOR}{signature}")
}

/// The integrity digest embedded in a token.
pub(crate) fn sign(user_id: &str, password_digest: &str, expires: u64, secret: &str) -> String {
    digest(format!("{user_id}{SEPARATOR}{password_digest}{SEPARATOR}{expires}{SEPARATOR}{secret}").as_bytes())
}

/// A parsed, not yet verified, session token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
    pub user_id: String,
    pub expires: u64,
    pub digest: String,
}

/// Returned by [`parse_token`] when a cookie value does not have the token shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MalformedToken;

impl fmt::Display for MalformedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("malformed session token")
    }
}

impl std::error::Error for MalformedToken {}

/// Splits a cookie value into its three fields.
///
/// Fails unless there are exactly three non-empty `-`-separated fields and the
/// middle one is an unsigned integer.
pub fn parse_token(token: &str) -> Result<SessionToken, MalformedToken> {
    let mut fields = token.split(SEPARATOR);
    let (Some(user_id), Some(expires), Some(digest), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(MalformedToken);
    };

    if user_id.is_empty() || digest.is_empty() {
        return Err(MalformedToken);
    }
    let expires = expires.parse::<u64>().map_err(|_| MalformedToken)?;

    Ok(SessionToken {
        user_id: user_id.to_owned(),
        expires,
        digest: digest.to_owned(),
    })
}
