use crate::handlers::{ensure_allowed, hx_redirect, load_document_with_role, Layout};
use crate::models::Document;
use crate::policy::{Affordances, DocumentAction, DocumentRole, DocumentStatus};
use crate::services::backend_client::NewDocument;
use crate::services::permissions::{permissions_or_none, role_for};
use crate::session::WorkspaceContext;
use crate::utils::filter::{DocumentFilter, FilterParams, SortOrder};
use crate::utils::validation::{validate_pdf_upload, ContentForm, DocumentMetadataForm};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use service_core::error::AppError;
use tower_sessions::Session;
use validator::Validate;

#[derive(Template)]
#[template(path = "pages/documents.html")]
pub struct DocumentsTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub documents: Vec<Document>,
    pub filter: DocumentFilter,
    pub statuses: Vec<DocumentStatus>,
    pub sort_orders: Vec<SortOrder>,
    pub show_filters: bool,
}

#[derive(Template)]
#[template(path = "pages/document.html")]
pub struct DocumentTemplate {
    pub layout: Layout,
    pub document: Document,
    pub role: DocumentRole,
    pub affordances: Affordances,
}

#[derive(Template)]
#[template(path = "pages/document_form.html")]
pub struct DocumentFormTemplate {
    pub layout: Layout,
    /// `None` when creating a document.
    pub document_id: Option<String>,
    pub title: String,
    pub description: String,
}

pub async fn list_documents_page(
    State(state): State<AppState>,
    session: Session,
    context: WorkspaceContext,
    Query(params): Query<FilterParams>,
) -> Result<Response, AppError> {
    let filter = DocumentFilter::from_params(&params);

    let documents = match state
        .backend_client
        .list_documents(context.access_token(), context.workspace_id())
        .await
    {
        Ok(documents) => documents,
        Err(AppError::Forbidden(_)) | Err(AppError::NotFound(_)) => {
            // Membership was revoked since the workspace was selected
            tracing::warn!(
                user_id = %context.user_id(),
                workspace_id = %context.workspace_id(),
                "Selected workspace is no longer accessible"
            );
            context.session.clear_workspace(&session).await?;
            return Ok(Redirect::to("/workspaces").into_response());
        }
        Err(e) => return Err(e),
    };

    Ok(DocumentsTemplate {
        layout: Layout::new(&context.session, "documents"),
        heading: "Documents",
        documents: filter.apply(&documents),
        filter,
        statuses: DocumentStatus::ALL.to_vec(),
        sort_orders: vec![SortOrder::NewestFirst, SortOrder::OldestFirst, SortOrder::Title],
        show_filters: true,
    }
    .into_response())
}

/// Documents waiting for a decision the user is allowed to take.
pub async fn to_review_page(
    State(state): State<AppState>,
    context: WorkspaceContext,
) -> Result<DocumentsTemplate, AppError> {
    let documents = state
        .backend_client
        .list_documents(context.access_token(), context.workspace_id())
        .await?;

    let permissions = permissions_or_none(
        state.permissions.as_ref(),
        context.user_id(),
        context.workspace_id(),
    )
    .await;

    let pending: Vec<Document> = DocumentFilter::with_status(DocumentStatus::PendingValidation)
        .apply(&documents)
        .into_iter()
        .filter(|doc| role_for(doc, context.user_id(), permissions) == DocumentRole::Approver)
        .collect();

    Ok(DocumentsTemplate {
        layout: Layout::new(&context.session, "to_review"),
        heading: "To review",
        documents: pending,
        filter: DocumentFilter::default(),
        statuses: Vec::new(),
        sort_orders: Vec::new(),
        show_filters: false,
    })
}

pub async fn document_page(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
) -> Result<DocumentTemplate, AppError> {
    let (document, role) = load_document_with_role(
        &state,
        &context.session,
        context.workspace_id(),
        &document_id,
    )
    .await?;

    Ok(DocumentTemplate {
        layout: Layout::new(&context.session, "documents"),
        affordances: Affordances::evaluate(role, document.status),
        document,
        role,
    })
}

/// Stream the PDF rendition of the reviewable version.
pub async fn preview_document(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
) -> Result<Response, AppError> {
    let preview = state
        .backend_client
        .preview(context.access_token(), context.workspace_id(), &document_id)
        .await?;

    if !preview.content_type.starts_with("application/pdf") {
        tracing::error!(
            document_id = %document_id,
            content_type = %preview.content_type,
            "Backend preview is not a PDF"
        );
        return Err(AppError::BadGateway(
            "Preview is not available as PDF".to_string(),
        ));
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", preview_file_name(&document_id)),
            ),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        preview.data,
    )
        .into_response())
}

/// File name offered for a preview. Only `[A-Za-z0-9_-]` of the id survive
/// so the header value is always valid and quoted correctly.
fn preview_file_name(document_id: &str) -> String {
    let stem: String = document_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();

    if stem.is_empty() {
        "document.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}

pub async fn new_document_page(context: WorkspaceContext) -> DocumentFormTemplate {
    DocumentFormTemplate {
        layout: Layout::new(&context.session, "new_document"),
        document_id: None,
        title: String::new(),
        description: String::new(),
    }
}

/// Create a document from a multipart form with `title`, `description` and a PDF `file`.
pub async fn create_document(
    State(state): State<AppState>,
    context: WorkspaceContext,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut title = String::new();
    let mut description = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Malformed upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = read_text(field).await?,
            "description" => description = Some(read_text(field).await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("document.pdf").to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read file: {}", e))
                })?;
                file = Some((file_name, data.to_vec()));
            }
            other => tracing::debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    let metadata = DocumentMetadataForm { title, description }.normalized();
    metadata.validate()?;

    let (file_name, data) = file.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("A PDF file is required"))
    })?;
    validate_pdf_upload(&file_name, &data, state.uploads.max_bytes)
        .map_err(|e| AppError::BadRequest(anyhow::Error::new(e)))?;

    let size = data.len();
    let document = state
        .backend_client
        .create_document(
            context.access_token(),
            context.workspace_id(),
            NewDocument {
                title: metadata.title,
                description: metadata.description,
                file_name,
                data,
            },
        )
        .await?;

    tracing::info!(
        user_id = %context.user_id(),
        workspace_id = %context.workspace_id(),
        document_id = %document.id,
        size = size,
        "Document created"
    );

    Ok(hx_redirect(&format!("/documents/{}", document.id)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Malformed form field: {}", e)))
}

pub async fn edit_document_page(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
) -> Result<DocumentFormTemplate, AppError> {
    let (document, role) = load_document_with_role(
        &state,
        &context.session,
        context.workspace_id(),
        &document_id,
    )
    .await?;
    ensure_allowed(
        DocumentAction::EditMetadata,
        role,
        &document,
        context.user_id(),
    )?;

    Ok(DocumentFormTemplate {
        layout: Layout::new(&context.session, "documents"),
        document_id: Some(document.id.clone()),
        description: document.description_text().to_string(),
        title: document.title,
    })
}

pub async fn update_metadata(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
    Form(form): Form<DocumentMetadataForm>,
) -> Result<Response, AppError> {
    let form = form.normalized();
    form.validate()?;

    let (document, role) = load_document_with_role(
        &state,
        &context.session,
        context.workspace_id(),
        &document_id,
    )
    .await?;
    ensure_allowed(
        DocumentAction::EditMetadata,
        role,
        &document,
        context.user_id(),
    )?;

    let updated = state
        .backend_client
        .update_metadata(
            context.access_token(),
            context.workspace_id(),
            &document.id,
            &form.title,
            form.description.as_deref(),
        )
        .await?;

    tracing::info!(user_id = %context.user_id(), document_id = %updated.id, "Metadata updated");

    Ok(hx_redirect(&format!("/documents/{}", updated.id)))
}

/// Save manually edited content of the reviewable version.
pub async fn update_content(
    State(state): State<AppState>,
    context: WorkspaceContext,
    Path(document_id): Path<String>,
    Form(form): Form<ContentForm>,
) -> Result<Response, AppError> {
    form.validate()?;

    let (document, role) = load_document_with_role(
        &state,
        &context.session,
        context.workspace_id(),
        &document_id,
    )
    .await?;
    ensure_allowed(
        DocumentAction::EditMetadata,
        role,
        &document,
        context.user_id(),
    )?;

    let updated = state
        .backend_client
        .update_content(
            context.access_token(),
            context.workspace_id(),
            &document.id,
            &form.content,
        )
        .await?;

    tracing::info!(user_id = %context.user_id(), document_id = %updated.id, "Content updated");

    Ok(hx_redirect(&format!("/documents/{}", updated.id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_file_name_keeps_plain_ids() {
        assert_eq!(preview_file_name("doc-1_a"), "doc-1_a.pdf");
    }

    #[test]
    fn preview_file_name_strips_quotes_and_control_characters() {
        let name = preview_file_name("a\"b\r\nc\u{7f}d");
        assert_eq!(name, "abcd.pdf");
        assert!(axum::http::HeaderValue::from_str(&format!("inline; filename=\"{}\"", name)).is_ok());
    }

    #[test]
    fn preview_file_name_falls_back_when_nothing_is_left() {
        assert_eq!(preview_file_name("\"\u{0}"), "document.pdf");
    }
}
