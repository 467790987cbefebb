pub mod document;
pub mod user;
pub mod workspace;

pub use document::{Document, DocumentVersion};
pub use user::UserProfile;
pub use workspace::{Workspace, WorkspacePermissions};
