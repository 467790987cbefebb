pub mod app;
pub mod auth;
pub mod documents;
pub mod metrics;
pub mod review;
pub mod workspaces;

use crate::models::{Document, UserProfile};
use crate::policy::{DocumentAction, DocumentRole};
use crate::services::metrics::record_policy_denial;
use crate::services::permissions::resolve_document_role;
use crate::session::{SessionContext, WorkspaceSelection};
use crate::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;

/// Data every page layout needs.
pub struct Layout {
    pub user: UserProfile,
    pub workspace: Option<WorkspaceSelection>,
    pub current_page: &'static str,
}

impl Layout {
    pub fn new(session: &SessionContext, current_page: &'static str) -> Self {
        Self {
            user: session.profile(),
            workspace: session.workspace.clone(),
            current_page,
        }
    }

    pub fn workspace_name(&self) -> &str {
        self.workspace
            .as_ref()
            .map(|w| w.name.as_str())
            .unwrap_or("")
    }
}

/// Full-page navigation for htmx-submitted forms.
pub fn hx_redirect(location: &str) -> Response {
    (StatusCode::OK, [("HX-Redirect", location.to_string())]).into_response()
}

/// Fetch a document of the selected workspace and the user's role on it.
pub(crate) async fn load_document_with_role(
    state: &AppState,
    session: &SessionContext,
    workspace_id: &str,
    document_id: &str,
) -> Result<(Document, DocumentRole), AppError> {
    let document = state
        .backend_client
        .get_document(&session.access_token, workspace_id, document_id)
        .await?;

    let role =
        resolve_document_role(state.permissions.as_ref(), &session.user_id, &document).await;

    Ok((document, role))
}

/// Refuse an action the review policy does not allow, before any backend call.
pub(crate) fn ensure_allowed(
    action: DocumentAction,
    role: DocumentRole,
    document: &Document,
    user_id: &str,
) -> Result<(), AppError> {
    if action.is_allowed(role, document.status) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %user_id,
        document_id = %document.id,
        action = %action.as_str(),
        role = %role,
        status = %document.status,
        "Action refused by review policy"
    );
    record_policy_denial(action);

    Err(AppError::Forbidden(anyhow::anyhow!(
        "{} is not allowed for this document",
        action
    )))
}
