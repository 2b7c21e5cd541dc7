//! Path resolution operations

use log::warn;
use percent_encoding::percent_decode_str;
use url::{ParseError, Url};

use crate::error::FsError;

/// Canonicalizes `input` into the absolute, scheme-free path the store expects.
///
/// Relative input is taken against `working_dir`; empty input resolves to
/// `working_dir` itself. Resolving an already resolved path returns it
/// unchanged.
pub fn resolve(input: &str, working_dir: &str, scheme: &str) -> Result<String, FsError> {
    let trimmed = input.trim();
    let resolved = match Url::parse(trimmed) {
        Ok(url) => {
            if !url.scheme().eq_ignore_ascii_case(scheme) {
                return Err(FsError::UnsupportedScheme(input.to_string()));
            }
            let path = percent_decode_str(url.path())
                .decode_utf8()
                .map_err(|_| FsError::InvalidPath(input.to_string()))?;
            let path = path.trim();
            if path.is_empty() {
                return Err(FsError::InvalidPath(input.to_string()));
            }
            normalize(path)
        }
        Err(ParseError::RelativeUrlWithoutBase) => {
            if trimmed.is_empty() {
                warn!("Reset the path with working-dir: {}", working_dir);
                normalize(working_dir)
            } else if trimmed.starts_with('/') {
                normalize(trimmed)
            } else {
                normalize(&format!("{}/{}", working_dir, trimmed))
            }
        }
        Err(e) => return Err(FsError::InvalidPath(format!("{}: {}", input, e))),
    };

    if !resolved.starts_with('/') {
        return Err(FsError::InvalidPath(input.to_string()));
    }
    Ok(resolved)
}

/// Collapses empty and `.` segments and folds `..` (clamped at the root).
///
/// Relative input stays relative, so callers can still reject it.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() && !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Parent of a resolved path; `None` for the root.
pub fn parent(path: &str) -> Option<&str> {
    match path.rfind('/') {
        _ if path == "/" => None,
        Some(0) => Some("/"),
        Some(n) => Some(&path[..n]),
        None => None,
    }
}

/// Appends a child name to a resolved directory path.
pub fn join_child(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Prefixes a resolved path with the filesystem URI, when there is one.
pub fn qualify(uri_prefix: Option<&str>, path: &str) -> String {
    match uri_prefix {
        Some(prefix) => format!("{}{}", prefix, path),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WD: &str = "/user/alice";

    #[test]
    fn test_resolve_absolute_schemeless() {
        assert_eq!(resolve("/a/b", WD, "cfs").unwrap(), "/a/b");
    }

    #[test]
    fn test_resolve_relative_against_working_dir() {
        assert_eq!(resolve("data/x", WD, "cfs").unwrap(), "/user/alice/data/x");
        assert_eq!(resolve("./x", WD, "cfs").unwrap(), "/user/alice/x");
        assert_eq!(resolve("../bob", WD, "cfs").unwrap(), "/user/bob");
    }

    #[test]
    fn test_resolve_empty_uses_working_dir() {
        assert_eq!(resolve("", WD, "cfs").unwrap(), WD);
        assert_eq!(resolve("   ", WD, "cfs").unwrap(), WD);
    }

    #[test]
    fn test_resolve_qualified() {
        assert_eq!(resolve("cfs://vol/a/b", WD, "cfs").unwrap(), "/a/b");
        assert_eq!(resolve("CFS://vol/a", WD, "cfs").unwrap(), "/a");
        assert_eq!(resolve("cfs://vol/a%20b", WD, "cfs").unwrap(), "/a b");
    }

    #[test]
    fn test_resolve_qualified_without_path_is_invalid() {
        assert!(matches!(
            resolve("cfs://vol", WD, "cfs"),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_resolve_foreign_scheme() {
        assert!(matches!(
            resolve("hdfs://nn/a", WD, "cfs"),
            Err(FsError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            resolve("file:///tmp/a", WD, "cfs"),
            Err(FsError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_resolve_opaque_qualified_path_is_invalid() {
        assert!(matches!(
            resolve("cfs:relative", WD, "cfs"),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for input in ["", "a", "/a//b/", "cfs://v/x/./y", "../../..", "a/../../b"] {
            let once = resolve(input, WD, "cfs").unwrap();
            assert_eq!(resolve(&once, WD, "cfs").unwrap(), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/a//b/"), "/a/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize("a/../.."), "..");
    }

    #[test]
    fn test_parent_and_join() {
        assert_eq!(parent("/a/b"), Some("/a"));
        assert_eq!(parent("/a"), Some("/"));
        assert_eq!(parent("/"), None);
        assert_eq!(join_child("/", "x"), "/x");
        assert_eq!(join_child("/a", "x"), "/a/x");
    }
}
