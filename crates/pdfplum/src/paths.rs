use std::path::{Component, Path, PathBuf};

/// Lexically normalize a slash-separated relative path.
///
/// Returns `None` when the path is absolute, carries a root or drive prefix,
/// or when its `..` components climb above the starting directory. `.`
/// components are dropped and `a/../b` collapses to `b`.
pub(crate) fn normalize_relative(path: &str) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;

    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                normalized.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relative() {
        assert_eq!(
            normalize_relative("css/site.css"),
            Some(PathBuf::from("css/site.css"))
        );
        assert_eq!(
            normalize_relative("./a/../b/index.html"),
            Some(PathBuf::from("b/index.html"))
        );
        assert_eq!(normalize_relative("a/.."), Some(PathBuf::new()));

        assert_eq!(normalize_relative("../evil.html"), None);
        assert_eq!(normalize_relative("a/../../evil.html"), None);
        assert_eq!(normalize_relative("/etc/passwd"), None);
    }
}
