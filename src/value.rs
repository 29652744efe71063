//! What a handler returns.
//!
//! Handlers hand back a [`ResponseValue`]: one case per supported return
//! shape. The shape is decided where the handler returns (through the `From`
//! impls below), and [`negotiate`](crate::negotiate::negotiate) turns it into
//! a wire [`Response`] with an exhaustive match.
//!
//! ```rust
//! use awesome::ResponseValue;
//! use serde_json::json;
//!
//! let page   = ResponseValue::template("all_users.html", json!({ "users": [] }));
//! let api    = ResponseValue::from(json!({ "id": "42" }));
//! let moved  = ResponseValue::redirect("/signin");
//! let gone   = ResponseValue::from(404u16);
//! let failed = ResponseValue::from((400u16, "Invalid email."));
//! # let _ = (page, api, moved, gone, failed);
//! ```

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::response::Response;

/// Key naming the template in a [`ResponseValue::Map`].
pub const TEMPLATE_KEY: &str = "__template__";

/// Key the current user is injected under before a template is rendered.
pub const USER_KEY: &str = "__user__";

/// Prefix marking a [`ResponseValue::Text`] as a redirect.
pub const REDIRECT_PREFIX: &str = "redirect:";

/// A handler's result, before negotiation.
#[derive(Debug)]
pub enum ResponseValue {
    /// A finished response, passed through unchanged.
    Response(Response),
    /// Raw bytes, sent as `application/octet-stream`.
    Bytes(Bytes),
    /// HTML text, or a redirect when prefixed with `redirect:`.
    Text(String),
    /// JSON, or template variables when [`TEMPLATE_KEY`] names a template.
    Map(Map<String, Value>),
    /// A bare status code when in `100..600`.
    Int(i64),
    /// A status code and a plain-text description.
    Pair(i64, String),
    /// Anything else; sent as its string form.
    Other(Value),
}

impl ResponseValue {
    /// A page rendered from `name` with `vars` (a JSON object) as variables.
    ///
    /// Non-object `vars` are exposed to the template as `value`.
    pub fn template(name: impl Into<String>, vars: Value) -> Self {
        let mut map = match vars {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => Map::from_iter([("value".to_owned(), other)]),
        };
        map.insert(TEMPLATE_KEY.to_owned(), Value::String(name.into()));
        Self::Map(map)
    }

    /// A `302 Found` to `location`.
    pub fn redirect(location: &str) -> Self {
        Self::Text(format!("{REDIRECT_PREFIX}{location}"))
    }

    /// Serializes `value` through serde, then classifies it the same way as
    /// a [`serde_json::Value`].
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(serde_json::to_value(value)?.into())
    }
}

impl From<Response> for ResponseValue {
    fn from(r: Response) -> Self { Self::Response(r) }
}

impl From<Bytes> for ResponseValue {
    fn from(b: Bytes) -> Self { Self::Bytes(b) }
}

impl From<Vec<u8>> for ResponseValue {
    fn from(b: Vec<u8>) -> Self { Self::Bytes(b.into()) }
}

impl From<&'static [u8]> for ResponseValue {
    fn from(b: &'static [u8]) -> Self { Self::Bytes(Bytes::from_static(b)) }
}

impl From<String> for ResponseValue {
    fn from(s: String) -> Self { Self::Text(s) }
}

impl From<&'static str> for ResponseValue {
    fn from(s: &'static str) -> Self { Self::Text(s.to_owned()) }
}

impl From<Map<String, Value>> for ResponseValue {
    fn from(m: Map<String, Value>) -> Self { Self::Map(m) }
}

impl From<i64> for ResponseValue {
    fn from(code: i64) -> Self { Self::Int(code) }
}

impl From<u16> for ResponseValue {
    fn from(code: u16) -> Self { Self::Int(code.into()) }
}

impl From<http::StatusCode> for ResponseValue {
    fn from(code: http::StatusCode) -> Self { Self::Int(code.as_u16().into()) }
}

impl<S: Into<String>> From<(u16, S)> for ResponseValue {
    fn from((code, description): (u16, S)) -> Self {
        Self::Pair(code.into(), description.into())
    }
}

/// Objects become [`Map`](ResponseValue::Map), strings
/// [`Text`](ResponseValue::Text), integers [`Int`](ResponseValue::Int);
/// everything else is [`Other`](ResponseValue::Other).
impl From<Value> for ResponseValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Object(map) => Self::Map(map),
            Value::String(s) => Self::Text(s),
            Value::Number(n) if n.is_i64() => Self::Int(n.as_i64().unwrap_or_default()),
            other => Self::Other(other),
        }
    }
}

/// Lets handlers use `?` and still return business errors as data.
impl<T, E> From<Result<T, E>> for ResponseValue
where
    T: Into<ResponseValue>,
    E: Into<ResponseValue>,
{
    fn from(r: Result<T, E>) -> Self {
        match r {
            Ok(v) => v.into(),
            Err(e) => e.into(),
        }
    }
}
