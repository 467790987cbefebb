pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod services;
pub mod session;
pub mod startup;
pub mod utils;

use config::UploadSettings;
use services::{
    backend_client::BackendClient, identity_client::IdentityClient,
    permissions::PermissionProvider,
};
use std::sync::Arc;

/// Shared application state containing service clients
#[derive(Clone)]
pub struct AppState {
    pub identity_client: Arc<IdentityClient>,
    pub backend_client: Arc<BackendClient>,
    pub permissions: Arc<dyn PermissionProvider>,
    pub uploads: UploadSettings,
}

impl AppState {
    pub fn new(
        identity_client: Arc<IdentityClient>,
        backend_client: Arc<BackendClient>,
        permissions: Arc<dyn PermissionProvider>,
        uploads: UploadSettings,
    ) -> Self {
        Self {
            identity_client,
            backend_client,
            permissions,
            uploads,
        }
    }
}
