//! Mirrors a real directory into an in-memory [`Vfs`].
//!
//! The builder walks the source root in pre-order and keeps a stack of open
//! directory nodes. When the walk climbs back out of a directory, the
//! finished node is popped and appended to its parent, so the stack always
//! matches the ancestry of the entry being visited.
//!
//! # Examples
//!
//! ```no_run
//! use essence_gen::TreeBuilder;
//! use std::path::Path;
//!
//! let tree = TreeBuilder::new().compact_json(false).build(Path::new("./static"))?;
//! println!("{} files embedded", tree.vfs.file_count());
//! # Ok::<(), essence_gen::GenError>(())
//! ```

use crate::compact::{compact_json, is_json};
use crate::error::{GenError, Result};
use essence_vfs::{VFile, Vfs, mode_bits};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};
use walkdir::WalkDir;

/// A built tree plus the on-disk paths of the files it embeds.
#[derive(Debug)]
pub struct BuiltTree {
    /// The mirrored tree
    pub vfs: Vfs,
    /// Every embedded file, in walk order
    pub embedded: Vec<PathBuf>,
}

/// Builder for mirroring a directory.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder {
    compact_json: bool,
    sort_entries: bool,
}

impl TreeBuilder {
    /// Creates a builder with JSON compaction and sorted entries.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            compact_json: true,
            sort_entries: true,
        }
    }

    /// Enables or disables JSON compaction.
    #[must_use]
    pub const fn compact_json(mut self, enabled: bool) -> Self {
        self.compact_json = enabled;
        self
    }

    /// Enables or disables file-name ordering of directory entries.
    ///
    /// Without it entries follow the order the operating system lists them.
    #[must_use]
    pub const fn sort_entries(mut self, enabled: bool) -> Self {
        self.sort_entries = enabled;
        self
    }

    /// Walks `root` and builds the equivalent tree.
    ///
    /// Symbolic links are followed. Files named `*.json` are compacted when
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns a source error naming the failing path: `NotADirectory` for
    /// a non-directory root, `Walk` for listing failures, `Metadata` or
    /// `ReadFile` for unreadable entries, and `CompactJson` for malformed
    /// JSON assets.
    pub fn build(&self, root: &Path) -> Result<BuiltTree> {
        let root_meta = fs::metadata(root).map_err(|source| GenError::ResolvePath {
            path: root.to_path_buf(),
            source,
        })?;
        if !root_meta.is_dir() {
            return Err(GenError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut stack = vec![VFile::dir(essence_vfs::path::SEPARATOR, modified(root, &root_meta)?)];
        let mut embedded = Vec::new();

        let mut walker = WalkDir::new(root).follow_links(true).min_depth(1);
        if self.sort_entries {
            walker = walker.sort_by_file_name();
        }

        for entry in walker {
            let entry = entry.map_err(|source| GenError::Walk {
                path: source.path().unwrap_or(root).to_path_buf(),
                source,
            })?;
            let location = entry.path();
            collapse(&mut stack, entry.depth());

            let metadata = entry.metadata().map_err(|source| GenError::Metadata {
                path: location.to_path_buf(),
                source: source.into(),
            })?;
            let name = entry
                .file_name()
                .to_str()
                .ok_or_else(|| GenError::NonUtf8Name {
                    path: location.to_path_buf(),
                })?
                .to_string();
            let mod_time = modified(location, &metadata)?;

            if metadata.is_dir() {
                debug!(path = %location.display(), "entering directory");
                stack.push(VFile::dir(name, mod_time).with_mode(mode_bits(&metadata)));
                continue;
            }

            let data = self.read_asset(location)?;
            let file = VFile::file(name, mod_time, data).with_mode(mode_bits(&metadata));
            if let Some(parent) = stack.last_mut() {
                parent.append(file);
            }

            info!(path = %location.display(), "embedded file");
            embedded.push(location.to_path_buf());
        }

        collapse(&mut stack, 1);
        let root = stack.pop().ok_or_else(|| GenError::NotADirectory {
            path: root.to_path_buf(),
        })?;

        Ok(BuiltTree {
            vfs: Vfs::from_children(root.mod_time(), root.into_children()),
            embedded,
        })
    }

    fn read_asset(&self, location: &Path) -> Result<Vec<u8>> {
        let data = fs::read(location).map_err(|source| GenError::ReadFile {
            path: location.to_path_buf(),
            source,
        })?;

        if self.compact_json && is_json(location) {
            compact_json(location, &data)
        } else {
            Ok(data)
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pops finished directories until the stack holds `depth` nodes.
fn collapse(stack: &mut Vec<VFile>, depth: usize) {
    while stack.len() > depth.max(1) {
        if let Some(done) = stack.pop()
            && let Some(parent) = stack.last_mut()
        {
            parent.append(done);
        }
    }
}

fn modified(path: &Path, metadata: &Metadata) -> Result<SystemTime> {
    metadata.modified().map_err(|source| GenError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}
