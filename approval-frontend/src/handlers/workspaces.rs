use crate::handlers::{hx_redirect, Layout};
use crate::models::Workspace;
use crate::session::{SessionContext, WorkspaceSelection};
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::Response, Form};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "pages/workspaces.html")]
pub struct WorkspacesTemplate {
    pub layout: Layout,
    pub workspaces: Vec<Workspace>,
    pub selected_id: String,
}

#[derive(Deserialize)]
pub struct SelectWorkspaceForm {
    pub workspace_id: String,
}

pub async fn workspaces_page(
    State(state): State<AppState>,
    context: SessionContext,
) -> Result<WorkspacesTemplate, AppError> {
    let workspaces = state
        .backend_client
        .list_workspaces(&context.access_token)
        .await?;

    let selected_id = context
        .workspace
        .as_ref()
        .map(|w| w.id.clone())
        .unwrap_or_default();

    Ok(WorkspacesTemplate {
        layout: Layout::new(&context, "workspaces"),
        workspaces,
        selected_id,
    })
}

/// Make a workspace the current one.
///
/// Membership is checked against the backend's list so a forged id never
/// ends up in the session.
pub async fn select_workspace(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<SelectWorkspaceForm>,
) -> Result<Response, AppError> {
    let workspaces = state
        .backend_client
        .list_workspaces(&context.access_token)
        .await?;

    let workspace = workspaces
        .into_iter()
        .find(|w| w.id == form.workspace_id)
        .ok_or_else(|| {
            tracing::warn!(
                user_id = %context.user_id,
                workspace_id = %form.workspace_id,
                "Selection of a workspace the user is not a member of"
            );
            AppError::Forbidden(anyhow::anyhow!("You are not a member of this workspace"))
        })?;

    let user_id = context.user_id.clone();
    context
        .select_workspace(
            &session,
            WorkspaceSelection {
                id: workspace.id.clone(),
                name: workspace.name,
            },
        )
        .await?;

    tracing::info!(user_id = %user_id, workspace_id = %workspace.id, "Workspace selected");

    Ok(hx_redirect("/documents"))
}
