use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a document's reviewable version.
///
/// Only the backend moves a document between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    PendingValidation,
    Approved,
    Rejected,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document status: {0}")]
pub struct UnknownStatus(pub String);

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 5] = [
        DocumentStatus::Draft,
        DocumentStatus::PendingValidation,
        DocumentStatus::Approved,
        DocumentStatus::Rejected,
        DocumentStatus::Archived,
    ];

    /// Wire name, as sent by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::PendingValidation => "pending_validation",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::PendingValidation => "Pending validation",
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Rejected => "Rejected",
            DocumentStatus::Archived => "Archived",
        }
    }

    /// A decision has been made on this version; a new one may be started.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Approved | DocumentStatus::Rejected)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
