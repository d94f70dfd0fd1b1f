//! Metrics middleware for API routes.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};

/// Label used for requests that matched no route.
const UNMATCHED_PATH: &str = "unmatched";

/// Keeps the in-flight gauge balanced when a request future is dropped.
struct InFlight;

impl InFlight {
    fn start() -> Self {
        HTTP_REQUESTS_IN_FLIGHT.inc();
        Self
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        HTTP_REQUESTS_IN_FLIGHT.dec();
    }
}

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// Requests are labelled with their route template, so label values stay
/// bounded whatever paths clients send.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let in_flight = InFlight::start();
    let response = next.run(request).await;
    drop(in_flight);

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route("/widgets/{id}", get(|| async { "ok" }))
            .layer(middleware::from_fn(metrics_middleware))
    }

    async fn send(path: &str) -> StatusCode {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_labels_with_route_template() {
        assert_eq!(send("/widgets/42").await, StatusCode::OK);
        assert_eq!(send("/widgets/43").await, StatusCode::OK);

        let templated = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/widgets/{id}", "200"])
            .get();
        assert_eq!(templated, 2);
        let raw = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/widgets/42", "200"])
            .get();
        assert_eq!(raw, 0);
    }

    #[tokio::test]
    async fn test_unrouted_request_is_unmatched() {
        let counter = HTTP_REQUESTS_TOTAL.with_label_values(&["GET", UNMATCHED_PATH, "404"]);
        let before = counter.get();

        assert_eq!(send("/no/such/path").await, StatusCode::NOT_FOUND);

        assert_eq!(counter.get(), before + 1);
    }
}
