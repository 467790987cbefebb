use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Workspace-level review rights of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkspacePermissions {
    pub can_approve: bool,
    pub can_reject: bool,
}

impl WorkspacePermissions {
    pub const NONE: WorkspacePermissions = WorkspacePermissions {
        can_approve: false,
        can_reject: false,
    };
}
