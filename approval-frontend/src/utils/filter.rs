//! Filtering and ordering of document lists.

use crate::models::Document;
use crate::policy::DocumentStatus;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    Title,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "newest",
            SortOrder::OldestFirst => "oldest",
            SortOrder::Title => "title",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "Newest first",
            SortOrder::OldestFirst => "Oldest first",
            SortOrder::Title => "Title",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(SortOrder::NewestFirst),
            "oldest" => Some(SortOrder::OldestFirst),
            "title" => Some(SortOrder::Title),
            _ => None,
        }
    }
}

/// Raw query-string parameters of the document list page.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub status: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub query: Option<String>,
    pub sort: SortOrder,
}

impl DocumentFilter {
    /// Build a filter from query parameters.
    ///
    /// Values that do not parse are dropped instead of failing the page.
    pub fn from_params(params: &FilterParams) -> Self {
        let status = params
            .status
            .as_deref()
            .and_then(|value| value.parse::<DocumentStatus>().ok());

        let query = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        let sort = params
            .sort
            .as_deref()
            .and_then(SortOrder::parse)
            .unwrap_or_default();

        Self {
            status,
            query,
            sort,
        }
    }

    pub fn with_status(status: DocumentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        if let Some(status) = self.status {
            if document.status != status {
                return false;
            }
        }

        match &self.query {
            Some(query) => {
                let needle = query.to_lowercase();
                [
                    Some(document.title.as_str()),
                    document.reference.as_deref(),
                    document.description.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    pub fn apply(&self, documents: &[Document]) -> Vec<Document> {
        let mut selected: Vec<Document> = documents
            .iter()
            .filter(|doc| self.matches(doc))
            .cloned()
            .collect();

        match self.sort {
            SortOrder::NewestFirst => selected.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            SortOrder::OldestFirst => selected.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
            SortOrder::Title => {
                selected.sort_by_key(|doc| doc.title.to_lowercase());
            }
        }

        selected
    }

    pub fn status_str(&self) -> &'static str {
        self.status.map(|s| s.as_str()).unwrap_or("")
    }

    pub fn query_str(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }
}
