use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Open-access CORS middleware
///
/// Lets the inner handler run to completion, then stamps
/// `Access-Control-Allow-Origin: *` on whatever came back. Hits, misses and
/// method rejections all pass through here, so every response carries the
/// header; status and body are left untouched.
pub async fn allow_any_origin(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
