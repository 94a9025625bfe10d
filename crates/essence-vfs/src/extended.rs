//! Convenience facade over a [`Source`].
//!
//! [`Extended`] is what generated asset modules expose: whole-file reads,
//! UTF-8 reads, and template parsing from explicit paths or a glob pattern.
//!
//! # Examples
//!
//! ```
//! use essence_vfs::{unix_time, Extended, VFile, Vfs};
//! use serde_json::json;
//!
//! let t = unix_time(0, 0);
//! let fs = Extended::embedded(Vfs::from_children(t, [
//!     VFile::file("hello.txt", t, &b"hello essence\n"[..]),
//!     VFile::dir("mail", t).with_children([
//!         VFile::file("greet.tmpl", t, &b"Hi {{name}}"[..]),
//!     ]),
//! ]));
//!
//! assert_eq!(fs.string("/hello.txt")?, "hello essence\n");
//!
//! let set = fs.parse_glob("/mail/*.tmpl")?;
//! assert_eq!(set.execute(&json!({"name": "Ada"}))?, "Hi Ada");
//! # Ok::<(), essence_vfs::VfsError>(())
//! ```

use crate::disk::DirFs;
use crate::error::{Result, VfsError};
use crate::node::VFileInfo;
use crate::path;
use crate::source::{FileHandle, Source};
use crate::template::{FuncMap, TemplateSet};
use crate::tree::Vfs;
use glob::{MatchOptions, Pattern};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Asset access with read and template helpers.
#[derive(Debug)]
pub struct Extended {
    source: Source,
}

impl Extended {
    /// Wraps a source.
    #[must_use]
    pub fn new(source: impl Into<Source>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Serves assets from an in-memory tree.
    #[must_use]
    pub fn embedded(vfs: Vfs) -> Self {
        Self::new(vfs)
    }

    /// Serves assets from a directory on disk.
    #[must_use]
    pub fn passthrough(root: impl Into<PathBuf>) -> Self {
        Self::new(DirFs::new(root))
    }

    /// Returns the underlying source.
    #[must_use]
    pub const fn source(&self) -> &Source {
        &self.source
    }

    /// Opens the node at an absolute path.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::PathNotAbsolute` or `VfsError::NotFound`.
    pub fn open(&self, path: &str) -> Result<FileHandle> {
        self.source.open(path)
    }

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// Returns the open error, or `VfsError::Io` if reading fails.
    pub fn bytes(&self, path: &str) -> Result<Vec<u8>> {
        let mut handle = self.open(path)?;
        let mut data = Vec::new();
        handle
            .read_to_end(&mut data)
            .map_err(|source| VfsError::Io {
                path: path.to_string(),
                source,
            })?;
        handle.close();
        Ok(data)
    }

    /// Reads a whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns any [`bytes`](Self::bytes) error, or `VfsError::InvalidUtf8`.
    pub fn string(&self, path: &str) -> Result<String> {
        String::from_utf8(self.bytes(path)?).map_err(|source| VfsError::InvalidUtf8 {
            path: path.to_string(),
            source,
        })
    }

    /// Parses the named files into one template set.
    ///
    /// # Errors
    ///
    /// See [`parse_files_with_func_map`](Self::parse_files_with_func_map).
    pub fn parse_files<I, S>(&self, paths: I) -> Result<TemplateSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parse_files_with_func_map(FuncMap::new(), paths)
    }

    /// Parses the named files into one template set with `funcs` available
    /// as helpers.
    ///
    /// Each template is named by the final segment of its path, and the
    /// first path becomes the set's primary template for
    /// [`TemplateSet::execute`]. Parsing stops at the first failure.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::NoFiles` for an empty list, any
    /// [`string`](Self::string) error, or `VfsError::TemplateParse`.
    pub fn parse_files_with_func_map<I, S>(&self, funcs: FuncMap, paths: I) -> Result<TemplateSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut paths = paths.into_iter().peekable();
        if paths.peek().is_none() {
            return Err(VfsError::NoFiles);
        }

        let mut set = TemplateSet::with_helpers(funcs);
        for file in paths {
            let file = file.as_ref();
            let text = self.string(file)?;
            set.add(path::base_name(&path::clean(file)), &text)?;
            debug!(path = %file, "template parsed");
        }
        Ok(set)
    }

    /// Parses every file matching `pattern` into one template set.
    ///
    /// # Errors
    ///
    /// See [`parse_glob_with_func_map`](Self::parse_glob_with_func_map).
    pub fn parse_glob(&self, pattern: &str) -> Result<TemplateSet> {
        self.parse_glob_with_func_map(FuncMap::new(), pattern)
    }

    /// Parses every file matching `pattern` into one template set with
    /// `funcs` available as helpers.
    ///
    /// The pattern is matched against absolute paths; `*` never crosses a
    /// `/`. Matches are parsed in traversal order.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::Pattern` for a malformed pattern, `VfsError::NoFiles`
    /// when nothing matches, or any parse error.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_vfs::{unix_time, Extended, VFile, Vfs};
    ///
    /// let t = unix_time(0, 0);
    /// let fs = Extended::embedded(Vfs::from_children(t, [
    ///     VFile::file("a.tmpl", t, &b"a"[..]),
    ///     VFile::dir("sub", t).with_children([VFile::file("b.tmpl", t, &b"b"[..])]),
    /// ]));
    ///
    /// assert_eq!(fs.parse_glob("/*.tmpl")?.names(), ["a.tmpl"]);
    /// assert!(fs.parse_glob("/*.txt").is_err());
    /// assert!(fs.parse_glob("/[").unwrap_err().is_config_error());
    /// # Ok::<(), essence_vfs::VfsError>(())
    /// ```
    pub fn parse_glob_with_func_map(&self, funcs: FuncMap, pattern: &str) -> Result<TemplateSet> {
        let matcher = Pattern::new(pattern).map_err(|source| VfsError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matches = Vec::new();
        self.walk(|file, info| {
            if !info.is_dir() && matcher.matches_with(file, GLOB_OPTIONS) {
                matches.push(file.to_string());
            }
        })?;

        debug!(pattern, count = matches.len(), "glob matched");
        self.parse_files_with_func_map(funcs, matches)
    }

    /// Visits every node below `/` depth-first, passing its absolute path
    /// and metadata. A directory is visited before its children.
    ///
    /// # Errors
    ///
    /// Returns the first open or listing error.
    pub fn walk<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&str, &VFileInfo),
    {
        self.walk_dir(path::SEPARATOR, &mut visitor)
    }

    fn walk_dir(&self, dir: &str, visitor: &mut dyn FnMut(&str, &VFileInfo)) -> Result<()> {
        let entries = self.open(dir)?.readdir(0)?;
        for info in entries {
            let child = path::join(dir, info.name());
            visitor(&child, &info);
            if info.is_dir() {
                self.walk_dir(&child, visitor)?;
            }
        }
        Ok(())
    }
}

impl From<Vfs> for Extended {
    fn from(vfs: Vfs) -> Self {
        Self::embedded(vfs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{VFile, unix_time};
    use serde_json::json;

    fn fixture() -> Extended {
        let t = unix_time(0, 0);
        Extended::embedded(Vfs::from_children(
            t,
            [
                VFile::file("hello.txt", t, &b"hello essence\n"[..]),
                VFile::file("latin1.txt", t, vec![0xff, 0xfe]),
                VFile::file("tmpl.tmpl", t, &b"subject: {{Message}} - {{> subtmpl.tmpl}}\n"[..]),
                VFile::dir("subdir", t).with_children([VFile::file(
                    "subtmpl.tmpl",
                    t,
                    &b"this is sub template: {{InnerMessage}}\n"[..],
                )]),
            ],
        ))
    }

    #[test]
    fn test_bytes_and_string() {
        let fs = fixture();
        assert_eq!(fs.bytes("/hello.txt").unwrap(), b"hello essence\n");
        assert_eq!(fs.string("/hello.txt").unwrap(), "hello essence\n");
    }

    #[test]
    fn test_string_rejects_invalid_utf8() {
        let err = fixture().string("/latin1.txt").unwrap_err();
        assert!(matches!(err, VfsError::InvalidUtf8 { ref path, .. } if path == "/latin1.txt"));
    }

    #[test]
    fn test_bytes_missing_file() {
        assert!(fixture().bytes("/nope.txt").unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_files_with_partial() {
        let set = fixture()
            .parse_files(["/tmpl.tmpl", "/subdir/subtmpl.tmpl"])
            .unwrap();
        let out = set
            .execute(&json!({"Message": "a", "InnerMessage": "b"}))
            .unwrap();
        assert_eq!(out, "subject: a - this is sub template: b\n\n");
    }

    #[test]
    fn test_first_path_is_primary_template() {
        let set = fixture()
            .parse_files(["/subdir/subtmpl.tmpl", "/tmpl.tmpl"])
            .unwrap();
        let data = json!({"Message": "a", "InnerMessage": "b"});

        assert_eq!(set.names(), ["subtmpl.tmpl", "tmpl.tmpl"]);
        assert_eq!(set.execute(&data).unwrap(), "this is sub template: b\n");
        assert_eq!(
            set.execute_template("tmpl.tmpl", &data).unwrap(),
            "subject: a - this is sub template: b\n\n"
        );
    }

    #[test]
    fn test_parse_files_empty_list() {
        let err = fixture().parse_files(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, VfsError::NoFiles));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_parse_files_fails_fast_on_missing() {
        let err = fixture()
            .parse_files(["/tmpl.tmpl", "/missing.tmpl"])
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parse_glob_star_stays_in_directory() {
        let fs = fixture();
        assert_eq!(fs.parse_glob("/*.tmpl").unwrap().names(), ["tmpl.tmpl"]);
        assert_eq!(
            fs.parse_glob("/subdir/*.tmpl").unwrap().names(),
            ["subtmpl.tmpl"]
        );
    }

    #[test]
    fn test_parse_glob_no_matches() {
        assert!(matches!(
            fixture().parse_glob("/*.html"),
            Err(VfsError::NoFiles)
        ));
    }

    #[test]
    fn test_parse_glob_invalid_pattern() {
        let err = fixture().parse_glob("/[").unwrap_err();
        assert!(matches!(err, VfsError::Pattern { .. }));
    }

    #[test]
    fn test_walk_visits_depth_first() {
        let mut seen = Vec::new();
        fixture()
            .walk(|file, info| seen.push((file.to_string(), info.is_dir())))
            .unwrap();
        assert_eq!(
            seen,
            vec![
                ("/hello.txt".to_string(), false),
                ("/latin1.txt".to_string(), false),
                ("/tmpl.tmpl".to_string(), false),
                ("/subdir".to_string(), true),
                ("/subdir/subtmpl.tmpl".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_extended_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Extended>();
        assert_send_sync::<TemplateSet>();
    }
}
