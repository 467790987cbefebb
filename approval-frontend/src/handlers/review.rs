//! Review workflow actions.
//!
//! Each handler reloads the document, resolves the user's role and refuses
//! the action locally when the policy does not allow it. Allowed actions are
//! forwarded to the backend, whose refusal is passed back to the user as is.

use crate::handlers::{ensure_allowed, hx_redirect, load_document_with_role};
use crate::models::Document;
use crate::policy::DocumentAction;
use crate::services::metrics::record_backend_rejection;
use crate::session::WorkspaceContext;
use crate::utils::validation::{ApproveForm, RejectForm};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use service_core::error::AppError;
use validator::Validate;

/// Load the document and check `action` against the user's role on it.
async fn authorize(
    state: &AppState,
    context: &WorkspaceContext,
    document_id: &str,
    action: DocumentAction,
) -> Result<Document, AppError> {
    let (document, role) = load_document_with_role(
        state,
        &context.session,
        context.workspace_id(),
        document_id,
    )
    .await?;

    ensure_allowed(action, role, &document, context.user_id())?;
    Ok(document)
}

fn finish(
    context: &WorkspaceContext,
    action: DocumentAction,
    result: Result<Document, AppError>,
) -> Result<Response, AppError> {
    match result {
        Ok(document) => {
            tracing::info!(
                user_id = %context.user_id(),
                workspace_id = %context.workspace_id(),
                document_id = %document.id,
                action = %action.as_str(),
                status = %document.status,
                "Review action completed"
            );
            Ok(hx_redirect(&format!("/documents/{}", document.id)))
        }
        Err(e) => {
            record_backend_rejection(action, e.status_code().as_u16());
            tracing::warn!(
                user_id = %context.user_id(),
                action = %action.as_str(),
                error = %e,
                "Backend refused review action"
            );
            Err(e)
        }
    }
}

pub async fn submit_for_review(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
) -> Result<Response, AppError> {
    let action = DocumentAction::SubmitForReview;
    let document = authorize(&state, &context, &document_id, action).await?;

    let result = state
        .backend_client
        .submit_for_review(context.access_token(), context.workspace_id(), &document.id)
        .await;
    finish(&context, action, result)
}

pub async fn cancel_submission(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
) -> Result<Response, AppError> {
    let action = DocumentAction::CancelSubmission;
    let document = authorize(&state, &context, &document_id, action).await?;

    let result = state
        .backend_client
        .cancel_submission(context.access_token(), context.workspace_id(), &document.id)
        .await;
    finish(&context, action, result)
}

pub async fn approve(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
    Form(form): Form<ApproveForm>,
) -> Result<Response, AppError> {
    form.validate()?;

    let action = DocumentAction::Approve;
    let document = authorize(&state, &context, &document_id, action).await?;

    let result = state
        .backend_client
        .approve(
            context.access_token(),
            context.workspace_id(),
            &document.id,
            form.comment(),
        )
        .await;
    finish(&context, action, result)
}

pub async fn reject(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
    Form(form): Form<RejectForm>,
) -> Result<Response, AppError> {
    let form = form.normalized();
    form.validate()?;

    let action = DocumentAction::Reject;
    let document = authorize(&state, &context, &document_id, action).await?;

    let result = state
        .backend_client
        .reject(
            context.access_token(),
            context.workspace_id(),
            &document.id,
            &form.reason,
        )
        .await;
    finish(&context, action, result)
}

pub async fn create_new_version(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
) -> Result<Response, AppError> {
    let action = DocumentAction::CreateNewVersion;
    let document = authorize(&state, &context, &document_id, action).await?;

    let result = state
        .backend_client
        .create_new_version(context.access_token(), context.workspace_id(), &document.id)
        .await;
    finish(&context, action, result)
}
