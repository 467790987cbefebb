//! Test harness: the frontend on a random port with the identity provider
//! and the backend replaced by mock servers.

#![allow(dead_code)]

use approval_frontend::config::{BackendSettings, IdentitySettings, UploadSettings};
use approval_frontend::models::WorkspacePermissions;
use approval_frontend::services::backend_client::BackendClient;
use approval_frontend::services::identity_client::IdentityClient;
use approval_frontend::services::permissions::StaticPermissionProvider;
use approval_frontend::startup::build_router;
use approval_frontend::AppState;
use base64::{engine::general_purpose, Engine as _};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WORKSPACE_ID: &str = "ws-1";
pub const WORKSPACE_NAME: &str = "Legal";

pub const AUTHOR: &str = "author-1";
pub const APPROVER: &str = "approver-1";
pub const VIEWER: &str = "viewer-1";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub identity: MockServer,
    pub backend: MockServer,
}

impl TestApp {
    /// Start with the default grants: the approver and the author may both
    /// approve and reject in the test workspace, the viewer has no rights.
    pub async fn spawn() -> Self {
        let permissions = StaticPermissionProvider::new()
            .grant(APPROVER, WORKSPACE_ID, reviewer_rights())
            .grant(AUTHOR, WORKSPACE_ID, reviewer_rights());
        Self::spawn_with(permissions).await
    }

    pub async fn spawn_with(permissions: StaticPermissionProvider) -> Self {
        let identity = MockServer::start().await;
        let backend = MockServer::start().await;

        let identity_client = Arc::new(IdentityClient::new(IdentitySettings {
            url: identity.uri(),
        }));
        let backend_client = Arc::new(
            BackendClient::new(BackendSettings {
                url: backend.uri(),
                service_token: Secret::new("test-service-token".to_string()),
                request_timeout_secs: 5,
            })
            .expect("Failed to build backend client"),
        );

        let state = AppState::new(
            identity_client,
            backend_client,
            Arc::new(permissions),
            UploadSettings { max_bytes: 1024 * 1024 },
        );
        let app = build_router(state, false, 1);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            address: format!("http://127.0.0.1:{}", port),
            client,
            identity,
            backend,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Sign in through the login form with the identity provider issuing a
    /// token for `user_id`.
    pub async fn login_as(&self, user_id: &str) -> reqwest::Response {
        let email = format!("{}@example.com", user_id);
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_partial_json(json!({ "email": email })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": fake_jwt(user_id, &email),
                "refresh_token": "refresh",
            })))
            .mount(&self.identity)
            .await;

        self.post_form("/login", &[("email", &email), ("password", "secret")])
            .await
    }

    /// Sign in and select the test workspace.
    pub async fn login_into_workspace(&self, user_id: &str) {
        let response = self.login_as(user_id).await;
        assert_eq!(response.status(), 200);

        self.mount_workspaces().await;
        let response = self
            .post_form("/workspaces/select", &[("workspace_id", WORKSPACE_ID)])
            .await;
        assert_eq!(hx_redirect(&response), Some("/documents".to_string()));
    }

    pub async fn mount_workspaces(&self) {
        Mock::given(method("GET"))
            .and(path("/workspaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": WORKSPACE_ID, "name": WORKSPACE_NAME },
            ])))
            .mount(&self.backend)
            .await;
    }

    pub async fn mount_document(&self, document: Value) {
        let id = document["id"].as_str().unwrap().to_string();
        Mock::given(method("GET"))
            .and(path(format!("/workspaces/{}/documents/{}", WORKSPACE_ID, id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(document))
            .mount(&self.backend)
            .await;
    }

    pub async fn mount_document_list(&self, documents: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/workspaces/{}/documents", WORKSPACE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(documents)))
            .mount(&self.backend)
            .await;
    }
}

pub fn reviewer_rights() -> WorkspacePermissions {
    WorkspacePermissions {
        can_approve: true,
        can_reject: true,
    }
}

/// Unsigned token carrying the claims the frontend reads.
pub fn fake_jwt(user_id: &str, email: &str) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(
        json!({
            "sub": user_id,
            "email": email,
            "exp": 9999999999_i64,
            "iat": 1700000000_i64,
        })
        .to_string(),
    );
    format!("{}.{}.signature", header, payload)
}

/// Backend representation of a document whose current version is by `author_id`.
pub fn document_json(id: &str, title: &str, status: &str, author_id: &str) -> Value {
    json!({
        "id": id,
        "workspace_id": WORKSPACE_ID,
        "title": title,
        "status": status,
        "current_version": {
            "number": 1,
            "author_id": author_id,
            "created_at": "2026-03-01T10:00:00Z",
        },
        "created_at": "2026-03-01T10:00:00Z",
        "updated_at": "2026-03-02T10:00:00Z",
    })
}

pub fn hx_redirect(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("HX-Redirect")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
