use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub identity: IdentitySettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub uploads: UploadSettings,
    #[serde(default)]
    pub permissions: PermissionSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`. Disable only for plain-HTTP development.
    #[serde(default = "default_session_secure")]
    pub session_secure: bool,
    #[serde(default = "default_session_inactivity_hours")]
    pub session_inactivity_hours: i64,
}

fn default_session_secure() -> bool {
    true
}

fn default_session_inactivity_hours() -> i64 {
    12
}

#[derive(Deserialize, Clone)]
pub struct IdentitySettings {
    /// Base URL of the identity provider's HTTP API.
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the document workflow API.
    pub url: String,
    /// Credential used for lookups that are not made on behalf of the
    /// signed-in user (workspace member permissions).
    pub service_token: Secret<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Deserialize, Clone)]
pub struct UploadSettings {
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionMode {
    #[default]
    Backend,
    Static,
}

#[derive(Deserialize, Clone, Default)]
pub struct PermissionSettings {
    #[serde(default)]
    pub mode: PermissionMode,
    /// Grants served in `static` mode.
    #[serde(default)]
    pub grants: Vec<PermissionGrant>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PermissionGrant {
    pub user_id: String,
    pub workspace_id: String,
    #[serde(default)]
    pub can_approve: bool,
    #[serde(default)]
    pub can_reject: bool,
}

#[derive(Deserialize, Clone)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn configuration_directory() -> Result<PathBuf, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;

    // Support running from the workspace root as well as from the crate directory
    if base_path.ends_with("approval-frontend") {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join("approval-frontend").join("config"))
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let configuration_directory = configuration_directory()?;

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
