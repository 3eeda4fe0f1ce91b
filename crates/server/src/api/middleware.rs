//! Request metrics for the API router.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use prometheus::IntGauge;
use std::time::Instant;

use crate::metrics::{
    normalize_path, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
};

/// Holds one slot of the in-flight gauge until dropped, so requests whose
/// handler future is cancelled are still released.
struct InFlight(&'static IntGauge);

impl InFlight {
    fn enter(gauge: &'static IntGauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.dec();
    }
}

/// Record latency and status for every request, labelled by the
/// normalized route so session ids do not explode cardinality.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let route = normalize_path(request.uri().path());
    let method = request.method().as_str().to_owned();
    let started = Instant::now();

    let response = {
        let _slot = InFlight::enter(&HTTP_REQUESTS_IN_FLIGHT);
        next.run(request).await
    };

    let status = response.status().as_u16().to_string();
    let labels = [method.as_str(), route.as_str(), status.as_str()];
    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(started.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();

    response
}
