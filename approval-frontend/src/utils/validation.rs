//! Form validation done before anything is sent to the backend.
//!
//! These checks only spare the user a round trip; the backend validates again.

use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

pub const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentMetadataForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description is limited to 2000 characters"))]
    pub description: Option<String>,
}

impl DocumentMetadataForm {
    /// Trim surrounding whitespace and turn a blank description into `None`.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContentForm {
    #[validate(length(max = 200000, message = "Content is limited to 200000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApproveForm {
    #[validate(length(max = 1000, message = "Comment is limited to 1000 characters"))]
    pub comment: Option<String>,
}

impl ApproveForm {
    pub fn comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectForm {
    #[validate(length(min = 1, max = 1000, message = "A reason of at most 1000 characters is required"))]
    pub reason: String,
}

impl RejectForm {
    pub fn normalized(self) -> Self {
        Self {
            reason: self.reason.trim().to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file was provided")]
    Empty,
    #[error("File is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
    #[error("Only PDF files can be uploaded")]
    NotPdf,
}

/// Check an uploaded file before forwarding it.
pub fn validate_pdf_upload(file_name: &str, data: &[u8], max_bytes: usize) -> Result<(), UploadError> {
    if data.is_empty() {
        return Err(UploadError::Empty);
    }

    if data.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: data.len(),
            limit: max_bytes,
        });
    }

    let has_pdf_extension = file_name.to_ascii_lowercase().ends_with(".pdf");
    if !has_pdf_extension || !data.starts_with(PDF_MAGIC) {
        return Err(UploadError::NotPdf);
    }

    Ok(())
}
