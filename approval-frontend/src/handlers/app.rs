use crate::session::SessionContext;
use axum::{
    response::{IntoResponse, Redirect},
    Json,
};
use serde_json::json;
use tower_sessions::Session;

pub async fn index(session: Session) -> impl IntoResponse {
    match SessionContext::load(&session).await {
        Ok(Some(context)) if context.workspace.is_some() => Redirect::to("/documents"),
        Ok(Some(_)) => Redirect::to("/workspaces"),
        _ => Redirect::to("/login"),
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "approval-frontend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
