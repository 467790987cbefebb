use crate::session::SessionContext;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

const LOGIN_PATH: &str = "/login";

/// Send unauthenticated requests to the login page.
///
/// htmx requests get `HX-Redirect` so the whole page navigates instead of the
/// login form being swapped into a fragment target.
pub async fn auth_middleware(session: Session, request: Request<Body>, next: Next) -> Response {
    match SessionContext::load(&session).await {
        Ok(Some(_)) => next.run(request).await,
        Ok(None) => login_redirect(request.headers()),
        Err(e) => e.into_response(),
    }
}

fn login_redirect(headers: &HeaderMap) -> Response {
    if headers.contains_key("hx-request") {
        (StatusCode::OK, [("HX-Redirect", LOGIN_PATH)]).into_response()
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    }
}
