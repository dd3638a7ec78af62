//! The HTTP half of the client adapter contract: a one-shot `request()`
//! returning a `Rider<ResponseIO>`.
//! Unlike the WebSocket rider, an HTTP response has no reconnect
//! lifecycle, so the rider here is just an `io()` accessor over the
//! completed response.

use crate::error::TransportError;
use crate::io::{ClientResponseIO, HttpResponseInfo};
use crate::signature::HttpMethod;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::Request;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::collections::HashMap;
use std::sync::Arc;

pub struct HttpClientRider {
    io: Arc<dyn ClientResponseIO>,
}

impl HttpClientRider {
    pub fn io(&self) -> Arc<dyn ClientResponseIO> {
        self.io.clone()
    }
}

struct BufferedResponseIO {
    info: HttpResponseInfo,
    body: Bytes,
}

#[async_trait]
impl ClientResponseIO for BufferedResponseIO {
    async fn read(&self) -> Result<Bytes, TransportError> {
        Ok(self.body.clone())
    }

    fn response(&self) -> &HttpResponseInfo {
        &self.info
    }
}

fn to_hyper_method(method: HttpMethod) -> hyper::Method {
    match method {
        HttpMethod::Get => hyper::Method::GET,
        HttpMethod::Post => hyper::Method::POST,
        HttpMethod::Put => hyper::Method::PUT,
        HttpMethod::Patch => hyper::Method::PATCH,
        HttpMethod::Delete => hyper::Method::DELETE,
        HttpMethod::Head => hyper::Method::HEAD,
        HttpMethod::Options => hyper::Method::OPTIONS,
    }
}

/// Parses the leading `name=value` pair out of a `Set-Cookie` header,
/// ignoring the attribute list (`Path=`, `HttpOnly`, ...) that follows.
fn parse_set_cookie(value: &str) -> Option<(String, String)> {
    let pair = value.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    Some((name.trim().to_string(), value.trim().to_string()))
}

/// `request(method, url, headers, body, json=None, ...)`.
/// `json` support is left to the caller: pass pre-serialized `body` bytes
/// and a `Content-Type: application/json` header.
pub async fn request(
    method: HttpMethod,
    url: &str,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
) -> Result<HttpClientRider, TransportError> {
    let client: Client<HttpConnector, Full<Bytes>> =
        Client::builder(TokioExecutor::new()).build(HttpConnector::new());

    let uri: hyper::Uri = url.parse().map_err(|e| TransportError::InvalidUrl(format!("{e}")))?;

    let mut builder = Request::builder().method(to_hyper_method(method)).uri(uri);
    for (key, value) in &headers {
        builder = builder.header(key, value);
    }
    let request = builder
        .body(Full::new(body.unwrap_or_default()))
        .map_err(|err| TransportError::ConnectionFailed(err.to_string()))?;

    let response = client
        .request(request)
        .await
        .map_err(|err| TransportError::ConnectionFailed(err.to_string()))?;

    let status = response.status().as_u16();
    let mut resp_headers = HashMap::new();
    let mut cookies = HashMap::new();
    for (key, value) in response.headers() {
        let value_str = value.to_str().unwrap_or_default().to_string();
        if key.as_str().eq_ignore_ascii_case("set-cookie") {
            if let Some((name, val)) = parse_set_cookie(&value_str) {
                cookies.insert(name, val);
            }
        }
        resp_headers.insert(key.to_string(), value_str);
    }

    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|err| TransportError::ConnectionFailed(err.to_string()))?
        .to_bytes();

    let info = HttpResponseInfo { status, url: url.to_string(), headers: resp_headers, cookies };
    Ok(HttpClientRider { io: Arc::new(BufferedResponseIO { info, body }) })
}
