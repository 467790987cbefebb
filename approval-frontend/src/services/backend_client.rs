//! Client for the document workflow backend.
//!
//! The backend owns documents, versions and every status transition. Calls
//! are made with the signed-in user's bearer token, so the backend applies
//! its own authorization to each of them.

use crate::config::BackendSettings;
use crate::models::{Document, Workspace, WorkspacePermissions};
use reqwest::{multipart, Client, Url};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use service_core::error::AppError;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::time::Duration;

/// A new document to upload.
#[derive(Debug)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub data: Vec<u8>,
}

/// PDF bytes served for preview.
#[derive(Debug)]
pub struct PdfPreview {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct MetadataUpdate<'a> {
    title: &'a str,
    description: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

        Ok(Self { client, settings })
    }

    pub async fn list_workspaces(&self, token: &str) -> Result<Vec<Workspace>, AppError> {
        let url = self.endpoint(&["workspaces"])?;
        let request = self.client.traced_get(&url).bearer_auth(token);
        self.fetch_json(request, "List workspaces").await
    }

    pub async fn list_documents(
        &self,
        token: &str,
        workspace_id: &str,
    ) -> Result<Vec<Document>, AppError> {
        let url = self.endpoint(&["workspaces", workspace_id, "documents"])?;
        let request = self.client.traced_get(&url).bearer_auth(token);
        self.fetch_json(request, "List documents").await
    }

    pub async fn get_document(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
    ) -> Result<Document, AppError> {
        let url = self.endpoint(&["workspaces", workspace_id, "documents", document_id])?;
        let request = self.client.traced_get(&url).bearer_auth(token);
        self.fetch_json(request, "Get document").await
    }

    pub async fn create_document(
        &self,
        token: &str,
        workspace_id: &str,
        document: NewDocument,
    ) -> Result<Document, AppError> {
        let url = self.endpoint(&["workspaces", workspace_id, "documents"])?;

        let file_part = multipart::Part::bytes(document.data)
            .file_name(document.file_name)
            .mime_str("application/pdf")
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

        let mut form = multipart::Form::new()
            .text("title", document.title)
            .part("file", file_part);
        if let Some(description) = document.description {
            form = form.text("description", description);
        }

        let request = self
            .client
            .traced_post(&url)
            .bearer_auth(token)
            .multipart(form);
        self.fetch_json(request, "Create document").await
    }

    pub async fn update_metadata(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Document, AppError> {
        let url = self.endpoint(&["workspaces", workspace_id, "documents", document_id])?;
        let request = self
            .client
            .traced_patch(&url)
            .bearer_auth(token)
            .json(&MetadataUpdate { title, description });
        self.fetch_json(request, "Update metadata").await
    }

    pub async fn update_content(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
        content: &str,
    ) -> Result<Document, AppError> {
        let url = self.endpoint(&[
            "workspaces",
            workspace_id,
            "documents",
            document_id,
            "content",
        ])?;
        let request = self
            .client
            .traced_put(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "content": content }));
        self.fetch_json(request, "Update content").await
    }

    pub async fn preview(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
    ) -> Result<PdfPreview, AppError> {
        let url = self.endpoint(&[
            "workspaces",
            workspace_id,
            "documents",
            document_id,
            "preview",
        ])?;
        let response = self
            .send(self.client.traced_get(&url).bearer_auth(token), "Preview")
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/pdf")
            .to_string();

        let data = response.bytes().await.map_err(|e| {
            tracing::error!(document_id = %document_id, error = %e, "Failed to read preview bytes");
            AppError::BadGateway(format!("Preview download interrupted: {}", e))
        })?;

        Ok(PdfPreview {
            content_type,
            data: data.to_vec(),
        })
    }

    pub async fn submit_for_review(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
    ) -> Result<Document, AppError> {
        self.post_action(token, workspace_id, document_id, "submit", None)
            .await
    }

    pub async fn cancel_submission(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
    ) -> Result<Document, AppError> {
        self.post_action(token, workspace_id, document_id, "cancel-submission", None)
            .await
    }

    pub async fn approve(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
        comment: Option<&str>,
    ) -> Result<Document, AppError> {
        let body = serde_json::json!({ "comment": comment });
        self.post_action(token, workspace_id, document_id, "approve", Some(body))
            .await
    }

    pub async fn reject(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
        reason: &str,
    ) -> Result<Document, AppError> {
        let body = serde_json::json!({ "reason": reason });
        self.post_action(token, workspace_id, document_id, "reject", Some(body))
            .await
    }

    /// Start a new draft version. Returns the document the draft belongs to.
    pub async fn create_new_version(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
    ) -> Result<Document, AppError> {
        self.post_action(token, workspace_id, document_id, "versions", None)
            .await
    }

    /// Review rights of a workspace member, looked up with the service token.
    pub async fn member_permissions(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<WorkspacePermissions, AppError> {
        let url = self.endpoint(&[
            "workspaces",
            workspace_id,
            "members",
            user_id,
            "permissions",
        ])?;
        let request = self
            .client
            .traced_get(&url)
            .bearer_auth(self.settings.service_token.expose_secret());
        self.fetch_json(request, "Member permissions").await
    }

    async fn post_action(
        &self,
        token: &str,
        workspace_id: &str,
        document_id: &str,
        action: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Document, AppError> {
        let url = self.endpoint(&["workspaces", workspace_id, "documents", document_id, action])?;
        let mut request = self.client.traced_post(&url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.fetch_json(request, action).await
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<String, AppError> {
        let mut url = Url::parse(&self.settings.url).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid backend url {}: {}", self.settings.url, e))
        })?;

        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Backend url {} cannot carry a path",
                    self.settings.url
                ))
            })?;
            path.pop_if_empty().extend(segments);
        }

        Ok(url.to_string())
    }

    async fn send(&self, request: TracedRequest, what: &str) -> Result<reqwest::Response, AppError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(operation = %what, error = %e, "Backend request failed");
            AppError::ServiceUnavailable
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<BackendErrorBody>().await.ok();
        let message = body
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| format!("{} failed", what));

        tracing::warn!(operation = %what, status = %status, detail = %message, "Backend refused request");
        Err(AppError::from_upstream(status, message))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: TracedRequest,
        what: &str,
    ) -> Result<T, AppError> {
        let response = self.send(request, what).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::error!(operation = %what, error = %e, "Unreadable backend response");
            AppError::BadGateway(format!("{}: unreadable response", what))
        })
    }
}
