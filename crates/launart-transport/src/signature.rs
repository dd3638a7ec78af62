//! Transport signatures: typed tokens identifying a handler slot or a
//! callback event on a `Transport`.
//!
//! Handler/callback tables are keyed by the object identity of
//! sentinel values. Here each signature is a variant of a closed enum, and
//! data-carrying signatures (`HttpEndpoint`, `WebsocketEndpoint`) compare
//! structurally via their derived `Eq`/`Hash` rather than by identity.

use std::fmt;

/// An HTTP method an `HttpEndpoint` accepts. Defaults to `GET` alone when a
/// `Transport` declares an endpoint without naming methods explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        };
        f.write_str(s)
    }
}

/// A declared HTTP route. Structural identity: two endpoints with the same
/// path and methods are the same signature even if constructed separately.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpEndpoint {
    pub path: String,
    pub methods: Vec<HttpMethod>,
}

impl HttpEndpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), methods: vec![HttpMethod::Get] }
    }

    pub fn with_methods(path: impl Into<String>, methods: Vec<HttpMethod>) -> Self {
        Self { path: path.into(), methods }
    }
}

/// A declared WebSocket route.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WebsocketEndpoint {
    pub path: String,
}

impl WebsocketEndpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}
