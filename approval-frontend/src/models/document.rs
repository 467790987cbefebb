use crate::policy::DocumentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub workspace_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    pub status: DocumentStatus,
    pub current_version: DocumentVersion,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub number: u32,
    pub author_id: String,
    #[serde(default)]
    pub author_name: Option<String>,
    /// Manually edited text content, when the version has any.
    #[serde(default)]
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Whether `user_id` authored the reviewable version.
    ///
    /// While the document is pending validation the current version is the
    /// one under review.
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.current_version.author_id == user_id
    }

    pub fn author_display(&self) -> &str {
        self.current_version
            .author_name
            .as_deref()
            .unwrap_or(&self.current_version.author_id)
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn content_text(&self) -> &str {
        self.current_version.content.as_deref().unwrap_or("")
    }

    pub fn updated_display(&self) -> String {
        self.updated_at.format("%Y-%m-%d %H:%M").to_string()
    }
}
