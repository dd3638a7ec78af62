//! Bridges `launart_transport::ServerRouter` into a concrete
//! `axum::Router`.

use crate::io::{AxumServerRequestIO, AxumWebsocketIO};
use axum::body::Body;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{on, get, MethodFilter};
use launart_transport::{
    HttpMethod, HttpRequestInfo, HttpResponse, ResponseBody, ServerRouter, TransportError,
};
use std::collections::HashMap;
use std::sync::Arc;

fn method_filter(methods: &[HttpMethod]) -> MethodFilter {
    methods.iter().fold(MethodFilter::empty(), |acc, method| {
        acc | match method {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Patch => MethodFilter::PATCH,
            HttpMethod::Delete => MethodFilter::DELETE,
            HttpMethod::Head => MethodFilter::HEAD,
            HttpMethod::Options => MethodFilter::OPTIONS,
        }
    })
}

fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

fn parse_cookie_header(header: Option<&String>) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    let Some(header) = header else { return cookies };
    for pair in header.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            cookies.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    cookies
}

/// Builds the `axum::Router` for every HTTP and WebSocket endpoint the
/// given `ServerRouter`'s transports declare. Each
/// `HttpEndpoint` routes to its handler via a `ServerRequestIO`; each
/// `WebsocketEndpoint` routes the upgraded socket through
/// `ServerRouter::drive_websocket`.
pub fn build_router(router: Arc<ServerRouter>) -> Result<axum::Router, TransportError> {
    let mut app = axum::Router::new();

    for endpoint in router.http_routes()? {
        let handler = router
            .transports()
            .iter()
            .find_map(|transport| transport.get_handler(&endpoint))
            .expect("route was collected from a transport that declares this handler")
            .clone();

        let method_router = on(method_filter(&endpoint.methods), move |request: Request| {
            let handler = handler.clone();
            async move { serve_http(handler, request).await }
        });
        app = app.route(&endpoint.path, method_router);
    }

    for endpoint in router.websocket_routes()? {
        let router = router.clone();
        app = app.route(
            &endpoint.path,
            get(move |ws: WebSocketUpgrade, headers: HeaderMap, uri: axum::http::Uri| {
                let router = router.clone();
                async move {
                    let info = request_info_from_parts(&headers, &uri, "GET");
                    ws.on_upgrade(move |socket| async move {
                        let io = Arc::new(AxumWebsocketIO::new(socket, info));
                        router.drive_websocket(io).await;
                    })
                }
            }),
        );
    }

    Ok(app)
}

fn request_info_from_parts(headers: &HeaderMap, uri: &axum::http::Uri, method: &str) -> HttpRequestInfo {
    let mut header_map = HashMap::new();
    for (name, value) in headers.iter() {
        header_map.insert(name.to_string(), value.to_str().unwrap_or_default().to_string());
    }
    let cookies = parse_cookie_header(header_map.get("cookie"));
    let query = uri.query().map(parse_query).unwrap_or_default();
    HttpRequestInfo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers: header_map,
        cookies,
        remote_addr: None,
    }
}

async fn serve_http(handler: launart_transport::HttpHandler, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return (StatusCode::BAD_REQUEST, "could not read request body").into_response(),
    };
    let info = request_info_from_parts(&parts.headers, &parts.uri, parts.method.as_str());
    let io = Arc::new(AxumServerRequestIO::new(info, bytes));

    let response = handler(io).await;
    normalize_response(response).await
}

/// Body normalization: str/bytes -> raw response,
/// mapping/list -> JSON, path -> file response, anything unrecognized in
/// `Custom` -> *unsupported-response*.
async fn normalize_response(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.descriptor.status.unwrap_or(200))
        .unwrap_or(StatusCode::OK);

    let mut headers = HeaderMap::new();
    for (key, value) in &response.descriptor.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
            headers.insert(name, value);
        }
    }

    let body = match response.body {
        ResponseBody::Bytes(bytes) => Body::from(bytes),
        ResponseBody::Text(text) => {
            headers
                .entry(axum::http::header::CONTENT_TYPE)
                .or_insert(HeaderValue::from_static("text/plain; charset=utf-8"));
            Body::from(text)
        }
        ResponseBody::Json(value) => {
            headers
                .entry(axum::http::header::CONTENT_TYPE)
                .or_insert(HeaderValue::from_static("application/json"));
            Body::from(value.to_string())
        }
        ResponseBody::File(path) => match tokio::fs::read(&path).await {
            Ok(bytes) => Body::from(bytes),
            Err(_) => return (StatusCode::NOT_FOUND, "file not found").into_response(),
        },
        ResponseBody::Custom(_) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "unsupported response type").into_response();
        }
    };

    let mut http_response = Response::new(body);
    *http_response.status_mut() = status;
    *http_response.headers_mut() = headers;

    for (key, value) in &response.descriptor.cookies {
        let mut cookie = format!("{key}={value}");
        if let Some(expires) = response.descriptor.cookie_expires {
            cookie.push_str(&format!("; Max-Age={expires}"));
        }
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            http_response.headers_mut().append(axum::http::header::SET_COOKIE, value);
        }
    }

    http_response
}
