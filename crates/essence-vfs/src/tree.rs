//! Virtual filesystem tree.
//!
//! Provides an in-memory, read-only tree of [`VFile`] nodes rooted at `/`.
//! Lookups clean the requested path and descend component by component,
//! scanning siblings linearly.
//!
//! # Examples
//!
//! ```
//! use essence_vfs::{unix_time, VFile, Vfs};
//! use std::io::Read;
//!
//! let vfs = Vfs::from_children(
//!     unix_time(0, 0),
//!     [VFile::dir("css", unix_time(0, 0))
//!         .with_children([VFile::file("site.css", unix_time(0, 0), &b"body{}"[..])])],
//! );
//!
//! let mut css = String::new();
//! vfs.open("/css/./site.css")?.read_to_string(&mut css)?;
//! assert_eq!(css, "body{}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{Result, VfsError};
use crate::handle::VFileHandle;
use crate::node::VFile;
use crate::path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;
use tracing::debug;

/// An in-memory virtual filesystem.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`. Lookups share a read lock; handles
/// returned from [`open`](Self::open) are independent of the lock and of
/// each other.
#[derive(Debug)]
pub struct Vfs {
    root: RwLock<Arc<VFile>>,
}

impl Vfs {
    /// Creates a tree holding only an empty root directory, timestamped now.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_vfs::Vfs;
    ///
    /// let vfs = Vfs::new();
    /// assert_eq!(vfs.file_count(), 0);
    /// assert!(vfs.open("/")?.stat().is_dir());
    /// # Ok::<(), essence_vfs::VfsError>(())
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_children(SystemTime::now(), [])
    }

    /// Creates a tree whose root directory holds `children` in order.
    #[must_use]
    pub fn from_children(mod_time: SystemTime, children: impl IntoIterator<Item = VFile>) -> Self {
        let root = VFile::dir(path::SEPARATOR, mod_time).with_children(children);
        Self {
            root: RwLock::new(Arc::new(root)),
        }
    }

    /// Appends a node to the root directory.
    pub fn append(&self, child: VFile) {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut root).append(child);
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> Arc<VFile> {
        Arc::clone(&self.root.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Opens the node at an absolute path.
    ///
    /// The path is cleaned first, so `/a/../b` and `//b` both resolve to
    /// `/b`. The returned handle starts at offset 0.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::PathNotAbsolute` if the path does not start with '/'.
    /// Returns `VfsError::NotFound` if any component has no match.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_vfs::Vfs;
    ///
    /// let vfs = Vfs::new();
    /// assert!(vfs.open("/missing.txt").unwrap_err().is_not_found());
    /// assert!(vfs.open("missing.txt").unwrap_err().is_invalid_path());
    /// ```
    pub fn open(&self, requested: &str) -> Result<VFileHandle> {
        let cleaned = path::normalize(requested)?;

        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let found = descend(std::slice::from_ref(&*root), &path::components(&cleaned));

        match found {
            Some(node) => {
                debug!(path = %cleaned, "vfs open");
                Ok(VFileHandle::new(node))
            }
            None => Err(VfsError::NotFound {
                op: "open",
                path: requested.to_string(),
            }),
        }
    }

    /// Returns `true` if a node exists at the path.
    #[must_use]
    pub fn exists(&self, requested: &str) -> bool {
        self.open(requested).is_ok()
    }

    /// Returns the number of regular files in the tree.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.root().file_count()
    }

    /// Returns the absolute path of every regular file, depth-first in
    /// tree order.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_vfs::{unix_time, VFile, Vfs};
    ///
    /// let vfs = Vfs::new();
    /// vfs.append(VFile::file("b.txt", unix_time(0, 0), Vec::new()));
    /// vfs.append(VFile::dir("a", unix_time(0, 0))
    ///     .with_children([VFile::file("c.txt", unix_time(0, 0), Vec::new())]));
    ///
    /// assert_eq!(vfs.walk_files(), vec!["/b.txt", "/a/c.txt"]);
    /// ```
    #[must_use]
    pub fn walk_files(&self) -> Vec<String> {
        fn visit(node: &VFile, dir: &str, out: &mut Vec<String>) {
            for child in node.children() {
                let child_path = path::join(dir, child.name());
                if child.is_dir() {
                    visit(child, &child_path, out);
                } else {
                    out.push(child_path);
                }
            }
        }

        let mut out = Vec::new();
        visit(&self.root(), path::SEPARATOR, &mut out);
        out
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first descent matching one component per level.
fn descend(level: &[Arc<VFile>], components: &[&str]) -> Option<Arc<VFile>> {
    let (first, rest) = components.split_first()?;
    let node = level.iter().find(|node| node.name() == *first)?;

    if rest.is_empty() {
        return Some(Arc::clone(node));
    }

    descend(node.child_nodes(), rest)
}
