use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer. The editor runs on a different origin than this
/// service, so any origin is allowed; methods are limited to what the
/// document routes actually serve.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any)
}
