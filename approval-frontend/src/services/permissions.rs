//! Workspace review rights and document role resolution.

use crate::config::PermissionGrant;
use crate::models::{Document, WorkspacePermissions};
use crate::policy::{resolve_role, DocumentRole};
use crate::services::backend_client::BackendClient;
use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;

/// Source of a user's approve/reject rights in a workspace.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn permissions(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<WorkspacePermissions, AppError>;

    async fn can_approve(&self, user_id: &str, workspace_id: &str) -> Result<bool, AppError> {
        Ok(self.permissions(user_id, workspace_id).await?.can_approve)
    }

    async fn can_reject(&self, user_id: &str, workspace_id: &str) -> Result<bool, AppError> {
        Ok(self.permissions(user_id, workspace_id).await?.can_reject)
    }
}

/// Asks the backend for the member's rights.
pub struct BackendPermissionProvider {
    backend: Arc<BackendClient>,
}

impl BackendPermissionProvider {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl PermissionProvider for BackendPermissionProvider {
    async fn permissions(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<WorkspacePermissions, AppError> {
        self.backend.member_permissions(workspace_id, user_id).await
    }
}

/// Fixed grants keyed by (user, workspace). Unknown pairs have no rights.
#[derive(Debug, Default, Clone)]
pub struct StaticPermissionProvider {
    grants: HashMap<(String, String), WorkspacePermissions>,
}

impl StaticPermissionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(
        mut self,
        user_id: impl Into<String>,
        workspace_id: impl Into<String>,
        permissions: WorkspacePermissions,
    ) -> Self {
        self.grants
            .insert((user_id.into(), workspace_id.into()), permissions);
        self
    }

    pub fn from_grants(grants: &[PermissionGrant]) -> Self {
        grants.iter().fold(Self::new(), |provider, grant| {
            provider.grant(
                grant.user_id.clone(),
                grant.workspace_id.clone(),
                WorkspacePermissions {
                    can_approve: grant.can_approve,
                    can_reject: grant.can_reject,
                },
            )
        })
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissionProvider {
    async fn permissions(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<WorkspacePermissions, AppError> {
        Ok(self
            .grants
            .get(&(user_id.to_string(), workspace_id.to_string()))
            .copied()
            .unwrap_or(WorkspacePermissions::NONE))
    }
}

/// Rights of `user_id` in `workspace_id`, or none if they cannot be fetched.
pub async fn permissions_or_none(
    provider: &dyn PermissionProvider,
    user_id: &str,
    workspace_id: &str,
) -> WorkspacePermissions {
    match provider.permissions(user_id, workspace_id).await {
        Ok(permissions) => permissions,
        Err(e) => {
            tracing::warn!(
                user_id = %user_id,
                workspace_id = %workspace_id,
                error = %e,
                "Permission lookup failed, treating user as without review rights"
            );
            WorkspacePermissions::NONE
        }
    }
}

/// Role of `user_id` on `document`.
pub fn role_for(document: &Document, user_id: &str, permissions: WorkspacePermissions) -> DocumentRole {
    resolve_role(
        document.is_authored_by(user_id),
        permissions.can_approve,
        permissions.can_reject,
    )
}

/// Look up the user's rights and resolve their role on `document`.
pub async fn resolve_document_role(
    provider: &dyn PermissionProvider,
    user_id: &str,
    document: &Document,
) -> DocumentRole {
    let permissions = permissions_or_none(provider, user_id, &document.workspace_id).await;
    role_for(document, user_id, permissions)
}
