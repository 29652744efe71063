//! Outgoing HTTP response type.
//!
//! Handlers rarely build a [`Response`] directly: they return a
//! [`ResponseValue`](crate::ResponseValue) and let negotiation pick the wire
//! shape. Build one yourself when you need extra headers, e.g. `Set-Cookie`
//! on sign-in.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use http::{HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// The content types negotiation emits. The header values are exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    Html,        // text/html;charset=utf-8
    Json,        // application/json;charset=utf-8
    OctetStream, // application/octet-stream
    Text,        // text/plain;charset=utf-8
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html        => "text/html;charset=utf-8",
            Self::Json        => "application/json;charset=utf-8",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain;charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK)
///
/// ```rust
/// use awesome::Response;
///
/// Response::html("<h1>Awesome</h1>");
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use awesome::Response;
/// use http::StatusCode;
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("set-cookie", "awesession=...; Max-Age=86400; Path=/; HttpOnly")
///     .json(br#"{"id":"42"}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Bytes,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: StatusCode,
}

impl Response {
    /// `200 OK` — `text/html;charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::builder().html(body)
    }

    /// `200 OK` — `application/json;charset=utf-8`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK` — `text/plain;charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body. Still labelled `text/plain;charset=utf-8`.
    pub fn status(code: StatusCode) -> Self {
        Self::builder().status(code).text(String::new())
    }

    /// `302 Found` pointing at `location`.
    pub fn redirect(location: &str) -> Self {
        Self::builder()
            .status(StatusCode::FOUND)
            .header(LOCATION.as_str(), location)
            .text(String::new())
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Appends a `Set-Cookie` header.
    pub fn with_cookie(mut self, set_cookie: String) -> Self {
        self.headers.push((SET_COOKIE.as_str().to_owned(), set_cookie));
        self
    }

    /// Converts into the hyper response.
    ///
    /// Headers that are not valid HTTP are dropped with a warning rather than
    /// failing the whole response.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;

        let headers = res.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(n), Ok(v)) => {
                    headers.append(n, v);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`. Terminated by a
/// typed body method, so every response carries a content type.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn html(self, body: impl Into<String>) -> Response {
        self.bytes(ContentType::Html, body.into())
    }

    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.bytes(ContentType::Json, body)
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        self.bytes(ContentType::Text, body.into())
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        let mut headers = vec![(CONTENT_TYPE.as_str().to_owned(), content_type.as_str().to_owned())];
        headers.extend(self.headers);
        Response { body: body.into(), headers, status: self.status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts_set_content_type() {
        assert_eq!(Response::html("x").content_type(), Some("text/html;charset=utf-8"));
        assert_eq!(Response::json("{}").content_type(), Some("application/json;charset=utf-8"));
        assert_eq!(Response::text("x").content_type(), Some("text/plain;charset=utf-8"));
    }

    #[test]
    fn redirect_sets_location() {
        let res = Response::redirect("/signin");
        assert_eq!(res.status_code(), StatusCode::FOUND);
        assert_eq!(res.header("Location"), Some("/signin"));
        assert!(res.body().is_empty());
    }

    #[test]
    fn into_inner_keeps_repeated_headers_and_drops_invalid() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header("set-cookie", "a=1")
            .header("set-cookie", "b=2")
            .header("bad header", "x")
            .text("ok")
            .into_inner();

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers().get_all(SET_COOKIE).iter().count(), 2);
        assert_eq!(res.headers().len(), 3);
    }
}
