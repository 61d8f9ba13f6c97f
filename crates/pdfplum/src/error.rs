//! Error types for the pdfplum library
//!
//! Errors are grouped by the stage of materialization that produced them, so
//! callers can tell a missing template apart from a malformed bundle or a
//! broken template expression.

use thiserror::Error;

use crate::storage::StorageError;

/// Main error type for the pdfplum library
#[derive(Error, Debug)]
pub enum PdfplumError {
    /// Fetching the template archive from object storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The template archive could not be read or has an unusable layout
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Handlebars failed on one of the text members of the archive
    #[error("Render error in {path}: {source}")]
    Render {
        path: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// Creating the output directory or writing into it failed
    #[error("File system error: {0}")]
    FileSystem(#[from] FileSystemError),

    /// A template path could not be split into bucket, prefix and id
    #[error("Template source error: {0}")]
    Source(#[from] SourceError),
}

/// Errors about the structure of a template archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to read zip archive: {0}")]
    Parse(#[from] zip::result::ZipError),

    #[error("There must be an 'index.html' file inside the zip file in its root folder.")]
    MissingIndex,

    #[error("Archive entry escapes the output directory: {path}")]
    UnsafePath { path: String },

    #[error("Archive unpacks to more than {limit} bytes")]
    TooLarge { limit: u64 },
}

/// File system errors raised while materializing a template
#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("Failed to create temporary directory: {reason}")]
    TempDir { reason: String },

    #[error("Failed to create directory {path}: {reason}")]
    CreateDirectory { path: String, reason: String },

    #[error("Failed to write file {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Errors raised when parsing a `bucket/prefix/id` template path
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SourceError {
    #[error("Template path is empty")]
    EmptyPath,

    #[error("Template path has no bucket: {0}")]
    MissingBucket(String),

    #[error("Template path has no template id: {0}")]
    MissingId(String),
}

/// Shorthand result type for pdfplum operations
pub type Result<T> = std::result::Result<T, PdfplumError>;

impl PdfplumError {
    /// Wrap a Handlebars failure with the archive path it happened in
    pub fn render(path: impl Into<String>, source: handlebars::RenderError) -> Self {
        PdfplumError::Render {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Whether the template object was missing from storage
    pub fn is_not_found(&self) -> bool {
        matches!(self, PdfplumError::Storage(StorageError::NotFound(_)))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PdfplumError::Storage(StorageError::NotFound(key)) => {
                format!("Template not found: {}", key)
            }
            PdfplumError::Storage(e) => format!("Could not fetch template: {}", e),
            PdfplumError::Archive(ArchiveError::Parse(_)) => {
                "Template is not a valid zip archive".to_string()
            }
            PdfplumError::Archive(e) => e.to_string(),
            PdfplumError::Render { path, source } => {
                format!("Template {} could not be rendered: {}", path, source)
            }
            PdfplumError::FileSystem(e) => format!("File system error: {}", e),
            PdfplumError::Source(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = PdfplumError::from(StorageError::NotFound("templates/invoice".into()));
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Template not found: templates/invoice");

        let err = PdfplumError::from(ArchiveError::MissingIndex);
        assert!(!err.is_not_found());
        assert!(err.user_message().contains("index.html"));
    }
}
