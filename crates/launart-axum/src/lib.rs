//! # launart-axum
//!
//! The concrete HTTP/WS router adapter: bridges `launart_transport`'s
//! `ServerRouter` into an `axum::Router`, wrapping each request/socket in
//! a `ServerRequestIO`/`WebsocketIO` and normalizing handler responses.

mod io;
mod router;

pub use io::{AxumServerRequestIO, AxumWebsocketIO};
pub use router::build_router;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use launart_transport::{HttpEndpoint, HttpResponse, Registrar, ServerRouter, WebsocketEndpoint};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn http_endpoint_round_trips_json_response_with_status_and_cookie() {
        let transport = Registrar::new()
            .http(
                HttpEndpoint::new("/widgets"),
                Arc::new(|_io| {
                    Box::pin(async {
                        HttpResponse::json(json!({"k": "v"}))
                            .with_status(201)
                            .with_header("X-A", "1")
                            .with_cookie("c", "1")
                    })
                }),
            )
            .build();

        let router = Arc::new(ServerRouter::new(vec![transport]));
        let app = build_router(router).unwrap();

        let request = axum::http::Request::builder()
            .uri("/widgets")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), 201);
        assert_eq!(response.headers().get("x-a").unwrap(), "1");
        assert!(response.headers().get("set-cookie").unwrap().to_str().unwrap().starts_with("c=1"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"k": "v"}));
    }

    #[test]
    fn router_declares_websocket_routes() {
        let transport = Registrar::new().declare_websocket(WebsocketEndpoint::new("/ws")).build();
        let router = Arc::new(ServerRouter::new(vec![transport]));
        let app = build_router(router);
        assert!(app.is_ok());
    }
}
