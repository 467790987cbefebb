use crate::config::IdentitySettings;
use reqwest::Client;
use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;

/// Tokens issued by the identity provider on sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

pub struct IdentityClient {
    client: Client,
    settings: IdentitySettings,
}

impl IdentityClient {
    pub fn new(settings: IdentitySettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    /// Exchange credentials for tokens.
    ///
    /// Rejected credentials surface as `Unauthorized`; the caller decides what
    /// the user sees.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let url = format!("{}/auth/login", self.settings.url);

        let response = self
            .client
            .traced_post(&url)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                AppError::ServiceUnavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Identity provider refused login");
            return Err(AppError::from_upstream(status, "Invalid email or password"));
        }

        response.json::<TokenPair>().await.map_err(|e| {
            AppError::BadGateway(format!("Unreadable token response from identity provider: {}", e))
        })
    }

    /// Revoke an access token.
    pub async fn logout(&self, access_token: &str) -> Result<(), AppError> {
        let url = format!("{}/auth/logout", self.settings.url);

        let response = self
            .client
            .traced_post(&url)
            .json(&serde_json::json!({ "token": access_token }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                AppError::ServiceUnavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_upstream(status, "Token revocation failed"));
        }

        Ok(())
    }
}
