//! Per-user context kept in the server-side session.
//!
//! Holds what the browser app used to keep in global providers: who is signed
//! in and which workspace is selected. It is created when a session starts
//! (login) and cleared when it ends (logout).

use crate::models::UserProfile;
use crate::services::identity_client::TokenPair;
use crate::utils::jwt::JwtClaims;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tower_sessions::Session;

const SESSION_KEY: &str = "session_context";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSelection {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub workspace: Option<WorkspaceSelection>,
}

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow::Error::new(err).context("session store failure"))
}

impl SessionContext {
    pub fn new(claims: JwtClaims, tokens: TokenPair) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            display_name: claims.name,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            workspace: None,
        }
    }

    /// Persist a freshly authenticated context.
    ///
    /// The session id is rotated so a pre-login id cannot be reused.
    pub async fn start(self, session: &Session) -> Result<Self, AppError> {
        session.cycle_id().await.map_err(session_error)?;
        self.save(session).await?;
        Ok(self)
    }

    pub async fn load(session: &Session) -> Result<Option<Self>, AppError> {
        session
            .get::<SessionContext>(SESSION_KEY)
            .await
            .map_err(session_error)
    }

    pub async fn select_workspace(
        mut self,
        session: &Session,
        selection: WorkspaceSelection,
    ) -> Result<Self, AppError> {
        self.workspace = Some(selection);
        self.save(session).await?;
        Ok(self)
    }

    pub async fn clear_workspace(mut self, session: &Session) -> Result<Self, AppError> {
        self.workspace = None;
        self.save(session).await?;
        Ok(self)
    }

    /// Drop everything stored for this session.
    pub async fn end(session: &Session) -> Result<(), AppError> {
        session.flush().await.map_err(session_error)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), AppError> {
        session
            .insert(SESSION_KEY, self)
            .await
            .map_err(session_error)
    }
}

async fn session_from_parts<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<Session, Response> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to extract session",
            )
                .into_response()
        })
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;

        match SessionContext::load(&session).await {
            Ok(Some(context)) => Ok(context),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// A signed-in user who has picked a workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    pub session: SessionContext,
    pub workspace: WorkspaceSelection,
}

impl WorkspaceContext {
    pub fn user_id(&self) -> &str {
        &self.session.user_id
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace.id
    }

    pub fn access_token(&self) -> &str {
        &self.session.access_token
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for WorkspaceContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionContext::from_request_parts(parts, state).await?;

        match session.workspace.clone() {
            Some(workspace) => Ok(WorkspaceContext { session, workspace }),
            None => Err(Redirect::to("/workspaces").into_response()),
        }
    }
}
