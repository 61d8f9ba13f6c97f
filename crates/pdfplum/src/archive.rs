//! Reading template bundles out of zip archives
//!
//! A bundle either has `index.html` at the top of the archive, or wraps all
//! of its content in exactly one folder (what you get when zipping a
//! directory from a file manager). The wrapping folder is removed so the
//! materialized tree always has `index.html` at its root.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::path::PathBuf;

use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::ArchiveError;
use crate::paths::normalize_relative;

/// Path segment macOS adds to zips for resource forks and Finder metadata
pub const MACOS_METADATA_MARKER: &str = "__MACOSX/";

/// Entry that marks an archive as already rooted
pub const INDEX_FILE: &str = "index.html";

/// Default cap on the total uncompressed size of a template archive
pub const DEFAULT_MAX_UNPACKED_SIZE: u64 = 256 * 1024 * 1024;

/// One record of a template archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: String,
    pub data: Vec<u8>,
    pub is_dir: bool,
}

/// A file to materialize, with the root folder already removed
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    /// Path inside the archive after root stripping, as stored in the zip
    pub relative_path: String,
    /// Normalized path below the output directory
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// The decoded entries of a template archive, macOS metadata excluded
#[derive(Debug)]
pub struct TemplateArchive {
    entries: Vec<ArchiveEntry>,
}

impl TemplateArchive {
    /// Decode a zip archive held in memory, failing once its members unpack
    /// to more than `limit` bytes in total.
    pub fn from_bytes(bytes: &[u8], limit: u64) -> Result<Self, ArchiveError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        let mut remaining = limit;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let path = file.name().to_string();
            if path.contains(MACOS_METADATA_MARKER) {
                continue;
            }

            let is_dir = file.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                if file.size() > remaining {
                    return Err(ArchiveError::TooLarge { limit });
                }

                // Headers can understate the size, so the read is bounded too
                (&mut file)
                    .take(remaining.saturating_add(1))
                    .read_to_end(&mut data)
                    .map_err(ZipError::from)?;
                let read = data.len() as u64;
                if read > remaining {
                    return Err(ArchiveError::TooLarge { limit });
                }
                remaining -= read;
            }

            entries.push(ArchiveEntry { path, data, is_dir });
        }

        Ok(Self { entries })
    }

    /// Find the folder wrapping the archive content, if there is one.
    ///
    /// Returns `Ok(None)` when `index.html` sits at the top of the archive.
    /// Otherwise every entry must share the same first path segment.
    pub fn root_directory(&self) -> Result<Option<&str>, ArchiveError> {
        if self.entries.iter().any(|entry| entry.path == INDEX_FILE) {
            return Ok(None);
        }

        let candidates: BTreeSet<&str> = self
            .entries
            .iter()
            .map(|entry| first_segment(&entry.path))
            .collect();

        let mut candidates = candidates.into_iter();
        match (candidates.next(), candidates.next()) {
            (Some(root), None) => {
                debug!(root, "Detected root directory in template archive");
                Ok(Some(root))
            }
            _ => Err(ArchiveError::MissingIndex),
        }
    }

    /// Consume the archive into the files to write, keyed by output path.
    ///
    /// Directory records and paths that are empty after root stripping are
    /// dropped. When two entries land on the same output path the one that
    /// comes later in the archive wins.
    pub fn into_files(self) -> Result<Vec<ArchiveFile>, ArchiveError> {
        let root = self.root_directory()?.map(str::to_string);
        let mut files = BTreeMap::new();

        for entry in self.entries {
            if entry.is_dir {
                continue;
            }

            let relative_path = strip_root(&entry.path, root.as_deref());
            if relative_path.is_empty() || relative_path.ends_with('/') {
                continue;
            }

            let path = normalize_relative(relative_path).ok_or_else(|| ArchiveError::UnsafePath {
                path: entry.path.clone(),
            })?;
            if path.as_os_str().is_empty() {
                continue;
            }

            files.insert(
                path.clone(),
                ArchiveFile {
                    relative_path: relative_path.to_string(),
                    path,
                    data: entry.data,
                },
            );
        }

        Ok(files.into_values().collect())
    }
}

fn first_segment(path: &str) -> &str {
    path.split_once('/').map_or(path, |(first, _)| first)
}

/// Remove `root` and the separator after it from the front of `path`.
///
/// The root name is compared as literal text.
pub fn strip_root<'a>(path: &'a str, root: Option<&str>) -> &'a str {
    let Some(root) = root else {
        return path;
    };

    match path.strip_prefix(root) {
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> ArchiveEntry {
        ArchiveEntry {
            path: path.to_string(),
            data: path.as_bytes().to_vec(),
            is_dir: path.ends_with('/'),
        }
    }

    fn archive(paths: &[&str]) -> TemplateArchive {
        TemplateArchive {
            entries: paths.iter().map(|path| entry(path)).collect(),
        }
    }

    #[test]
    fn test_strip_root_is_literal() {
        assert_eq!(strip_root("a.b+c/index.html", Some("a.b+c")), "index.html");
        assert_eq!(strip_root("a.b+c/", Some("a.b+c")), "");
        assert_eq!(strip_root("axb+c/index.html", Some("a.b+c")), "axb+c/index.html");
        assert_eq!(strip_root("(x|y)*/css/a.css", Some("(x|y)*")), "css/a.css");
        assert_eq!(strip_root("site/index.html", None), "site/index.html");
    }

    #[test]
    fn test_root_directory_detection() {
        assert_eq!(
            archive(&["index.html", "site/other.html"]).root_directory().unwrap(),
            None
        );
        assert_eq!(
            archive(&["site/", "site/index.html", "site/img/logo.png"])
                .root_directory()
                .unwrap(),
            Some("site")
        );
        assert!(matches!(
            archive(&["a/index.html", "b/index.html"]).root_directory(),
            Err(ArchiveError::MissingIndex)
        ));
        assert!(matches!(
            archive(&[]).root_directory(),
            Err(ArchiveError::MissingIndex)
        ));
    }

    #[test]
    fn test_into_files_duplicates_last_wins() {
        let mut archive = archive(&["index.html", "style.css"]);
        archive.entries.push(ArchiveEntry {
            path: "./style.css".to_string(),
            data: b"second".to_vec(),
            is_dir: false,
        });

        let files = archive.into_files().unwrap();
        assert_eq!(files.len(), 2);
        let style = files.iter().find(|f| f.path == PathBuf::from("style.css")).unwrap();
        assert_eq!(style.data, b"second");
    }

    fn zip_of(files: &[(&str, &[u8])]) -> Vec<u8> {
        use std::io::Write;
        use zip::write::{SimpleFileOptions, ZipWriter};

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, data) in files {
            zip.start_file(*path, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unpacked_size_limit() {
        let bytes = zip_of(&[("index.html", &[b'a'; 600][..]), ("style.css", &[b'b'; 600][..])]);

        let archive = TemplateArchive::from_bytes(&bytes, 1200).unwrap();
        assert_eq!(archive.entries.len(), 2);

        match TemplateArchive::from_bytes(&bytes, 1000) {
            Err(ArchiveError::TooLarge { limit }) => assert_eq!(limit, 1000),
            other => panic!("Expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_into_files_rejects_escaping_paths() {
        let result = archive(&["index.html", "../outside.txt"]).into_files();
        match result {
            Err(ArchiveError::UnsafePath { path }) => assert_eq!(path, "../outside.txt"),
            other => panic!("Expected UnsafePath, got {:?}", other),
        }
    }
}
