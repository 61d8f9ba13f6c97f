//! Turning a stored template archive into a directory on disk
//!
//! [`Materializer::materialize`] downloads the archive, removes the wrapping
//! folder if there is one, renders the text members through Handlebars and
//! writes everything into a fresh temporary directory. The returned
//! [`MaterializedTemplate`] owns that directory: dropping it deletes the tree,
//! [`MaterializedTemplate::keep`] hands the path over to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;
use tempfile::TempDir;
use tokio::fs;
use tracing::{debug, info};

use crate::archive::{ArchiveFile, DEFAULT_MAX_UNPACKED_SIZE, TemplateArchive};
use crate::engine::{TemplateEngine, is_text_template};
use crate::error::{FileSystemError, Result};
use crate::source::TemplateSource;
use crate::storage::{BlobStorage, StorageError};

/// Prefix of every output directory name
pub const DEFAULT_DIR_PREFIX: &str = "pdfplum-";

/// Where output directories are created
#[derive(Debug, Clone)]
pub struct MaterializerConfig {
    /// Parent of the output directories
    pub temp_root: PathBuf,
    /// Name prefix of the output directories
    pub dir_prefix: String,
    /// Upper bound on the bytes an archive may unpack to
    pub max_unpacked_size: u64,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            temp_root: std::env::temp_dir(),
            dir_prefix: DEFAULT_DIR_PREFIX.to_string(),
            max_unpacked_size: DEFAULT_MAX_UNPACKED_SIZE,
        }
    }
}

/// A rendered template tree on local disk
#[derive(Debug)]
pub struct MaterializedTemplate {
    dir: TempDir,
}

impl MaterializedTemplate {
    /// Root of the rendered tree
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the entry page of the template
    pub fn index_path(&self) -> PathBuf {
        self.dir.path().join(crate::archive::INDEX_FILE)
    }

    /// Stop tracking the directory and return its path; the caller must
    /// remove it.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}

/// Downloads template archives and materializes them into directories
pub struct Materializer {
    storage: Arc<dyn BlobStorage>,
    engine: Arc<TemplateEngine>,
    config: MaterializerConfig,
}

impl Materializer {
    pub fn new(storage: Arc<dyn BlobStorage>) -> Self {
        Self::with_config(storage, MaterializerConfig::default())
    }

    pub fn with_config(storage: Arc<dyn BlobStorage>, config: MaterializerConfig) -> Self {
        Self {
            storage,
            engine: Arc::new(TemplateEngine::new()),
            config,
        }
    }

    /// Use a preconfigured engine, e.g. one with extra helpers
    pub fn with_engine(mut self, engine: TemplateEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    pub fn config(&self) -> &MaterializerConfig {
        &self.config
    }

    /// Fetch the archive at `prefix + id`, falling back to `prefix + id + ".zip"`.
    ///
    /// When both keys are missing the error of the first lookup is returned.
    pub async fn fetch(&self, source: &TemplateSource) -> Result<Vec<u8>> {
        let key = source.object_key();
        match self.storage.get(&source.bucket, &key).await {
            Ok(bytes) => Ok(bytes),
            Err(original @ StorageError::NotFound(_)) => {
                let fallback = source.fallback_key();
                debug!(bucket = %source.bucket, %key, %fallback, "Template not found, trying archive suffix");
                match self.storage.get(&source.bucket, &fallback).await {
                    Ok(bytes) => Ok(bytes),
                    Err(_) => Err(original.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Materialize the template at `source`, rendering text files against
    /// `context` (an absent context renders like an empty object).
    pub async fn materialize(
        &self,
        source: &TemplateSource,
        context: Option<&Value>,
    ) -> Result<MaterializedTemplate> {
        let bytes = self.fetch(source).await?;

        let dir = tempfile::Builder::new()
            .prefix(&self.config.dir_prefix)
            .tempdir_in(&self.config.temp_root)
            .map_err(|e| FileSystemError::TempDir {
                reason: e.to_string(),
            })?;

        let files =
            TemplateArchive::from_bytes(&bytes, self.config.max_unpacked_size)?.into_files()?;
        drop(bytes);

        let empty = Value::Object(Default::default());
        let context = context.unwrap_or(&empty);

        let output = dir.path();
        try_join_all(
            files
                .into_iter()
                .map(|file| self.write_file(output, file, context)),
        )
        .await?;

        info!(template = %source, path = %output.display(), "Template materialized");
        Ok(MaterializedTemplate { dir })
    }

    async fn write_file(&self, output: &Path, file: ArchiveFile, context: &Value) -> Result<()> {
        let ArchiveFile {
            relative_path,
            path,
            data,
        } = file;

        let content = if is_text_template(&relative_path) {
            info!(%relative_path, "Processing file with handlebars");
            let text = String::from_utf8_lossy(&data);
            self.engine
                .render(&relative_path, &text, context)?
                .into_bytes()
        } else {
            info!(%relative_path, "Copying file as is");
            data
        };

        let file_path = output.join(&path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FileSystemError::CreateDirectory {
                    path: parent.display().to_string(),
                    reason: e.to_string(),
                })?;
        }

        fs::write(&file_path, content)
            .await
            .map_err(|e| FileSystemError::Write {
                path: file_path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
