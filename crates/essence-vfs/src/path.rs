//! Lexical path handling for VFS paths.
//!
//! VFS paths use Unix conventions on all platforms: '/' separates
//! components and every lookup path must be absolute. Cleaning is purely
//! lexical, no I/O is involved, so it behaves the same for the in-memory
//! tree and the disk passthrough.
//!
//! # Examples
//!
//! ```
//! use essence_vfs::path;
//!
//! assert_eq!(path::clean("/a/./b/../c//d"), "/a/c/d");
//! assert_eq!(path::components("/a/c"), vec!["/", "a", "c"]);
//! assert_eq!(path::base_name("/subdir/subtmpl.tmpl"), "subtmpl.tmpl");
//! ```

use crate::error::{Result, VfsError};

/// Root marker and separator.
pub const SEPARATOR: &str = "/";

/// Returns `true` if the path starts at the root.
#[must_use]
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Returns the shortest lexically equivalent form of an absolute path.
///
/// Redundant separators and `.` components are removed and `..` consumes
/// the preceding component. A `..` at the root stays at the root, so the
/// result never escapes above `/`.
///
/// # Examples
///
/// ```
/// use essence_vfs::path::clean;
///
/// assert_eq!(clean("/"), "/");
/// assert_eq!(clean("//hello.txt"), "/hello.txt");
/// assert_eq!(clean("/../../etc"), "/etc");
/// assert_eq!(clean("/subdir/"), "/subdir");
/// ```
#[must_use]
pub fn clean(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return SEPARATOR.to_string();
    }

    let mut cleaned = String::with_capacity(path.len());
    for part in parts {
        cleaned.push('/');
        cleaned.push_str(part);
    }
    cleaned
}

/// Validates and cleans a lookup path.
///
/// # Errors
///
/// Returns `VfsError::PathNotAbsolute` if the path does not start with '/'.
pub fn normalize(path: &str) -> Result<String> {
    if !is_absolute(path) {
        return Err(VfsError::PathNotAbsolute {
            path: path.to_string(),
        });
    }
    Ok(clean(path))
}

/// Splits a cleaned path into components, starting with the root marker.
#[must_use]
pub fn components(path: &str) -> Vec<&str> {
    let mut parts = vec![SEPARATOR];
    parts.extend(path.split('/').filter(|part| !part.is_empty()));
    parts
}

/// Returns the final component of a path, or `/` for the root.
#[must_use]
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return SEPARATOR;
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Joins a child name onto a directory path.
#[must_use]
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_dots_and_separators() {
        assert_eq!(clean("/a/b/../c"), "/a/c");
        assert_eq!(clean("/a/./b"), "/a/b");
        assert_eq!(clean("///a//b///"), "/a/b");
    }

    #[test]
    fn test_clean_root_forms() {
        assert_eq!(clean("/"), "/");
        assert_eq!(clean("/."), "/");
        assert_eq!(clean("/.."), "/");
        assert_eq!(clean("/a/.."), "/");
    }

    #[test]
    fn test_normalize_rejects_relative() {
        let err = normalize("hello.txt").unwrap_err();
        assert!(err.is_invalid_path());

        let err = normalize("").unwrap_err();
        assert!(err.is_invalid_path());
    }

    #[test]
    fn test_components() {
        assert_eq!(components("/"), vec!["/"]);
        assert_eq!(
            components("/subdir/subtmpl.tmpl"),
            vec!["/", "subdir", "subtmpl.tmpl"]
        );
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/tmpl.tmpl"), "tmpl.tmpl");
        assert_eq!(base_name("/a/b/"), "b");
        assert_eq!(base_name("/"), "/");
        assert_eq!(base_name("plain"), "plain");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
    }
}
