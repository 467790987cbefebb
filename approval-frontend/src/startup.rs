use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{PermissionMode, Settings};
use crate::handlers::{
    app::{health_check, index},
    auth::{login_handler, login_page, logout_handler},
    documents::{
        create_document, document_page, edit_document_page, list_documents_page,
        new_document_page, preview_document, to_review_page, update_content, update_metadata,
    },
    metrics::metrics,
    review::{approve, cancel_submission, create_new_version, reject, submit_for_review},
    workspaces::{select_workspace, workspaces_page},
};
use crate::middleware::auth::auth_middleware;
use crate::services::backend_client::BackendClient;
use crate::services::identity_client::IdentityClient;
use crate::services::permissions::{
    BackendPermissionProvider, PermissionProvider, StaticPermissionProvider,
};
use crate::AppState;

/// Multipart framing on top of the file itself.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Wire up clients and the permission provider from configuration.
pub fn build_state(settings: &Settings) -> Result<AppState, service_core::error::AppError> {
    let identity_client = Arc::new(IdentityClient::new(settings.identity.clone()));
    let backend_client = Arc::new(BackendClient::new(settings.backend.clone())?);

    let permissions: Arc<dyn PermissionProvider> = match settings.permissions.mode {
        PermissionMode::Backend => Arc::new(BackendPermissionProvider::new(backend_client.clone())),
        PermissionMode::Static => {
            tracing::warn!(
                grants = settings.permissions.grants.len(),
                "Using static permission grants from configuration"
            );
            Arc::new(StaticPermissionProvider::from_grants(
                &settings.permissions.grants,
            ))
        }
    };

    Ok(AppState::new(
        identity_client,
        backend_client,
        permissions,
        settings.uploads.clone(),
    ))
}

pub fn build_router(state: AppState, session_secure: bool, session_inactivity_hours: i64) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(session_secure)
        .with_expiry(Expiry::OnInactivity(Duration::hours(session_inactivity_hours)));

    let upload_limit = state.uploads.max_bytes + UPLOAD_OVERHEAD_BYTES;

    let protected = Router::new()
        .route("/workspaces", get(workspaces_page))
        .route("/workspaces/select", post(select_workspace))
        .route("/documents", get(list_documents_page).post(create_document))
        .route("/documents/to-review", get(to_review_page))
        .route("/documents/new", get(new_document_page))
        .route("/documents/:id", get(document_page))
        .route("/documents/:id/preview", get(preview_document))
        .route("/documents/:id/edit", get(edit_document_page))
        .route("/documents/:id/metadata", post(update_metadata))
        .route("/documents/:id/content", post(update_content))
        .route("/documents/:id/submit", post(submit_for_review))
        .route("/documents/:id/cancel", post(cancel_submission))
        .route("/documents/:id/approve", post(approve))
        .route("/documents/:id/reject", post(reject))
        .route("/documents/:id/versions", post(create_new_version))
        .layer(DefaultBodyLimit::max(upload_limit))
        .route_layer(from_fn(auth_middleware));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Router built from the server section of the configuration.
pub fn build_app(settings: &Settings) -> Result<Router, service_core::error::AppError> {
    let state = build_state(settings)?;
    Ok(build_router(
        state,
        settings.server.session_secure,
        settings.server.session_inactivity_hours,
    ))
}
