pub mod backend_client;
pub mod identity_client;
pub mod metrics;
pub mod permissions;
