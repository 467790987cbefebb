use crate::observability::{REQUEST_ID_HEADER, extract_request_id};
use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

/// Ensure every request carries an `x-request-id`.
///
/// An incoming id is kept; otherwise a v4 UUID is generated. The id is
/// echoed on the response so browser-reported errors can be correlated.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = extract_request_id(req.headers())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let header_value = HeaderValue::from_str(&request_id).ok();

    if let Some(value) = header_value.clone() {
        req.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let mut response = next.run(req).await;

    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
