//! Pdfplum materializes HTML templates for PDF rendering.
//!
//! A template is a zip archive kept in an object-storage bucket. It is
//! downloaded, unpacked into a fresh temporary directory and every `.html`,
//! `.md` and `.txt` member is rendered with Handlebars against a JSON
//! context. The resulting directory is what a headless browser opens to
//! print the PDF.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pdfplum::{Materializer, MemoryStorage, TemplateSource};
//!
//! # async fn example() -> pdfplum::Result<()> {
//! let storage = Arc::new(MemoryStorage::new());
//! let materializer = Materializer::new(storage);
//!
//! let source = TemplateSource::parse("templates/invoices/monthly")?;
//! let data = serde_json::json!({ "title": "Invoice #42" });
//! let template = materializer.materialize(&source, Some(&data)).await?;
//! println!("Rendered into {}", template.path().display());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod engine;
pub mod error;
pub mod materialize;
mod paths;
pub mod source;
pub mod storage;

pub use archive::{ArchiveEntry, ArchiveFile, TemplateArchive};
pub use engine::TemplateEngine;
pub use error::{ArchiveError, FileSystemError, PdfplumError, Result, SourceError};
pub use materialize::{MaterializedTemplate, Materializer, MaterializerConfig};
pub use source::TemplateSource;
pub use storage::{BlobStorage, FileStorage, MemoryStorage, StorageError};

#[cfg(feature = "s3")]
pub use storage::S3Storage;

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
