//! Passthrough to a real directory on disk.
//!
//! Development builds serve assets through [`DirFs`] so edits show up
//! without regenerating anything. It accepts the same absolute VFS paths as
//! the in-memory tree and resolves them beneath its root directory.

use crate::error::{Result, VfsError};
use crate::handle::{Whence, resolve_seek, std_target};
use crate::node::VFileInfo;
use crate::path;
use std::fs::{self, File, Metadata};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// A directory-backed file source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    /// Creates a passthrough rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a VFS path to a location beneath the root.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::PathNotAbsolute` if the path does not start with '/'.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf> {
        let cleaned = path::normalize(requested)?;
        let relative = cleaned.trim_start_matches('/');
        if relative.is_empty() {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(relative))
        }
    }

    /// Opens the file or directory at an absolute VFS path.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::PathNotAbsolute` for relative paths,
    /// `VfsError::NotFound` when nothing exists there, and `VfsError::Io`
    /// for other I/O failures.
    pub fn open(&self, requested: &str) -> Result<DiskFile> {
        let location = self.resolve(requested)?;
        let io_err = |source: io::Error| {
            if source.kind() == io::ErrorKind::NotFound {
                VfsError::NotFound {
                    op: "open",
                    path: requested.to_string(),
                }
            } else {
                VfsError::Io {
                    path: location.display().to_string(),
                    source,
                }
            }
        };

        let metadata = fs::metadata(&location).map_err(io_err)?;
        let file = if metadata.is_dir() {
            None
        } else {
            Some(File::open(&location).map_err(io_err)?)
        };

        debug!(path = %location.display(), "disk open");

        Ok(DiskFile {
            name: path::base_name(&path::clean(requested)).to_string(),
            location,
            metadata,
            file,
        })
    }
}

/// An open file or directory from a [`DirFs`].
#[derive(Debug)]
pub struct DiskFile {
    name: String,
    location: PathBuf,
    metadata: Metadata,
    file: Option<File>,
}

impl DiskFile {
    /// Returns the on-disk location.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Moves the cursor with the same bounds as
    /// [`VFileHandle::seek_to`](crate::VFileHandle::seek_to), measured
    /// against the size seen at open.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::OutOfRange` when the target falls outside the
    /// data, or `VfsError::Io` when the underlying seek fails.
    pub fn seek_to(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let len = self.stat().size();
        let io_err = |source| VfsError::Io {
            path: self.location.display().to_string(),
            source,
        };
        let cursor = match self.file.as_mut() {
            Some(file) => file.stream_position().map_err(io_err)?,
            None => 0,
        };

        let pos = resolve_seek(len, cursor, offset, whence).map_err(|target| VfsError::OutOfRange {
            name: self.name.clone(),
            offset: target,
            len,
        })?;

        if let Some(file) = self.file.as_mut() {
            file.seek(SeekFrom::Start(pos)).map_err(io_err)?;
        }
        Ok(pos)
    }

    /// Rewinds to the start. Always succeeds and may be repeated.
    pub fn close(&mut self) {
        if let Some(file) = self.file.as_mut()
            && let Err(err) = file.rewind()
        {
            warn!(path = %self.location.display(), error = %err, "rewind on close failed");
        }
    }

    /// Returns a metadata snapshot.
    #[must_use]
    pub fn stat(&self) -> VFileInfo {
        info_from_metadata(self.name.clone(), &self.metadata)
    }

    /// Lists the directory's entries sorted by name. A regular file lists
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::Io` if the directory cannot be read.
    pub fn readdir(&self, _count: isize) -> Result<Vec<VFileInfo>> {
        if !self.metadata.is_dir() {
            return Ok(Vec::new());
        }

        let io_err = |source| VfsError::Io {
            path: self.location.display().to_string(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.location).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let metadata = fs::metadata(entry.path()).map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(info_from_metadata(name, &metadata));
        }
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entries)
    }
}

impl Read for DiskFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.as_mut().map_or(Ok(0), |file| file.read(buf))
    }
}

impl Seek for DiskFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let cursor = match self.file.as_mut() {
            Some(file) => file.stream_position()?,
            None => 0,
        };
        let target = std_target(self.stat().size(), cursor, pos);
        Ok(self.seek_to(target, Whence::Start)?)
    }
}

fn info_from_metadata(name: String, metadata: &Metadata) -> VFileInfo {
    let is_dir = metadata.is_dir();
    let size = if is_dir { 0 } else { metadata.len() };
    let mod_time = metadata.modified().unwrap_or(UNIX_EPOCH);
    VFileInfo::new(name, size, mode_bits(metadata), mod_time, is_dir)
}

/// Permission bits of a metadata record; platform defaults off Unix.
#[must_use]
pub fn mode_bits(metadata: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o777
    }
    #[cfg(not(unix))]
    {
        if metadata.is_dir() {
            crate::node::DIR_MODE
        } else {
            crate::node::FILE_MODE
        }
    }
}
