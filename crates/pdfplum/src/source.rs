//! Addressing of template archives in object storage

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Suffix tried when a template id is stored with its archive extension
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Location of a template archive: `bucket` plus the key `prefix + id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSource {
    pub bucket: String,
    /// Key prefix, either empty or ending in `/`
    pub prefix: String,
    pub id: String,
}

impl TemplateSource {
    pub fn new(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            id: id.into(),
        }
    }

    /// Split a `bucket/dir/.../id` template path.
    ///
    /// The first segment names the bucket and the last one the template id;
    /// everything between becomes the key prefix with a trailing `/`.
    pub fn parse(path: &str) -> Result<Self, SourceError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(SourceError::EmptyPath);
        }

        let parts: Vec<&str> = path.split('/').collect();
        let bucket = parts[0];
        if bucket.is_empty() {
            return Err(SourceError::MissingBucket(path.to_string()));
        }

        if parts.len() < 2 {
            return Err(SourceError::MissingId(path.to_string()));
        }
        let id = parts[parts.len() - 1];
        if id.is_empty() {
            return Err(SourceError::MissingId(path.to_string()));
        }

        let directories = &parts[1..parts.len() - 1];
        let prefix = if directories.is_empty() {
            String::new()
        } else {
            format!("{}/", directories.join("/"))
        };

        Ok(Self::new(bucket, prefix, id))
    }

    /// The key the archive is expected under
    pub fn object_key(&self) -> String {
        format!("{}{}", self.prefix, self.id)
    }

    /// The key tried when [`object_key`](Self::object_key) does not exist
    pub fn fallback_key(&self) -> String {
        format!("{}{}{}", self.prefix, self.id, ARCHIVE_SUFFIX)
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.bucket, self.prefix, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template_path() {
        let source = TemplateSource::parse("my-bucket/templates/invoices/monthly").unwrap();
        assert_eq!(source.bucket, "my-bucket");
        assert_eq!(source.prefix, "templates/invoices/");
        assert_eq!(source.id, "monthly");
        assert_eq!(source.object_key(), "templates/invoices/monthly");
        assert_eq!(source.fallback_key(), "templates/invoices/monthly.zip");
        assert_eq!(source.to_string(), "my-bucket/templates/invoices/monthly");
    }

    #[test]
    fn test_parse_template_path_without_prefix() {
        let source = TemplateSource::parse("my-bucket/invoice.zip").unwrap();
        assert_eq!(source.prefix, "");
        assert_eq!(source.object_key(), "invoice.zip");
    }

    #[test]
    fn test_parse_invalid_template_paths() {
        assert_eq!(TemplateSource::parse("  "), Err(SourceError::EmptyPath));
        assert!(matches!(
            TemplateSource::parse("/templates/invoice"),
            Err(SourceError::MissingBucket(_))
        ));
        assert!(matches!(
            TemplateSource::parse("my-bucket"),
            Err(SourceError::MissingId(_))
        ));
        assert!(matches!(
            TemplateSource::parse("my-bucket/templates/"),
            Err(SourceError::MissingId(_))
        ));
    }
}
