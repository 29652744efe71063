//! Turning a handler's [`ResponseValue`] into a wire [`Response`].
//!
//! Rules, first match wins:
//!
//! | Value | Response |
//! |---|---|
//! | `Response` | unchanged |
//! | `Bytes` | body, `application/octet-stream` |
//! | `Text("redirect:/x")` | `302 Found`, `Location: /x` |
//! | `Text` | body, `text/html;charset=utf-8` |
//! | `Map` without `__template__` | JSON, `application/json;charset=utf-8` |
//! | `Map` with `__template__` | rendered template, `text/html;charset=utf-8` |
//! | `Int` in `100..600` | that status, empty body |
//! | `Pair` with status in `100..600` | that status, description as plain text |
//! | anything else | its string form, `text/plain;charset=utf-8` |
//!
//! Only rendering can fail. `serde_json::Value` is an owned tree, so the JSON
//! branch cannot meet a reference cycle.

use http::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::model::User;
use crate::response::{ContentType, Response};
use crate::template::TemplateRenderer;
use crate::value::{REDIRECT_PREFIX, ResponseValue, TEMPLATE_KEY, USER_KEY};

/// Maps `value` to a response. `user` is injected into template variables
/// as `__user__` (or `null` when anonymous).
pub fn negotiate(
    value: ResponseValue,
    renderer: &dyn TemplateRenderer,
    user: Option<&User>,
) -> Result<Response, Error> {
    let response = match value {
        ResponseValue::Response(r) => r,

        ResponseValue::Bytes(b) => Response::builder().bytes(ContentType::OctetStream, b),

        ResponseValue::Text(s) if s.starts_with(REDIRECT_PREFIX) => {
            Response::redirect(&s[REDIRECT_PREFIX.len()..])
        }
        ResponseValue::Text(s) => Response::html(s),

        ResponseValue::Map(mut map) => {
            let template = match map.get(TEMPLATE_KEY) {
                Some(Value::String(name)) => Some(name.clone()),
                _ => None,
            };
            match template {
                None => Response::json(serde_json::to_vec(&map)?),
                Some(name) => {
                    let user = match user {
                        Some(u) => serde_json::to_value(u)?,
                        None => Value::Null,
                    };
                    map.insert(USER_KEY.to_owned(), user);
                    Response::html(renderer.render(&name, &map)?)
                }
            }
        }

        ResponseValue::Int(code) => match status(code) {
            Some(code) => Response::status(code),
            None => Response::text(code.to_string()),
        },

        ResponseValue::Pair(code, description) => match status(code) {
            Some(code) => Response::builder().status(code).text(description),
            None => Response::text(format!("({code}, {description:?})")),
        },

        ResponseValue::Other(Value::String(s)) => Response::text(s),
        ResponseValue::Other(v) => Response::text(v.to_string()),
    };

    debug!(status = response.status.as_u16(), "response negotiated");
    Ok(response)
}

/// `Some` for codes in `100..600`.
fn status(code: i64) -> Option<StatusCode> {
    if !(100..600).contains(&code) {
        return None;
    }
    u16::try_from(code).ok().and_then(|c| StatusCode::from_u16(c).ok())
}
