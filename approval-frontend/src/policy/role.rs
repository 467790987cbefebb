use serde::{Deserialize, Serialize};
use std::fmt;

/// How the viewing user relates to one document. Computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    Creator,
    Approver,
    Viewer,
}

impl DocumentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::Creator => "creator",
            DocumentRole::Approver => "approver",
            DocumentRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the role from the three facts the caller knows.
///
/// Authorship wins over approval rights: the author of the version under
/// review is never classified as its approver.
pub fn resolve_role(is_creator: bool, can_approve: bool, can_reject: bool) -> DocumentRole {
    if is_creator {
        DocumentRole::Creator
    } else if can_approve || can_reject {
        DocumentRole::Approver
    } else {
        DocumentRole::Viewer
    }
}
