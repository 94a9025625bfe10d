//! The two backing stores behind one surface.
//!
//! [`Source`] is chosen once when an [`Extended`](crate::Extended) is
//! constructed: either the compiled-in tree or a directory on disk. Every
//! open yields the matching [`FileHandle`] variant.

use crate::disk::{DirFs, DiskFile};
use crate::error::Result;
use crate::handle::{VFileHandle, Whence};
use crate::node::VFileInfo;
use crate::tree::Vfs;
use std::io::{self, Read, Seek, SeekFrom};

/// A backing store for asset lookups.
#[derive(Debug)]
pub enum Source {
    /// In-memory tree compiled into the binary
    Embedded(Vfs),
    /// Live directory on disk
    Passthrough(DirFs),
}

impl Source {
    /// Opens the node at an absolute path.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::PathNotAbsolute` for relative paths and
    /// `VfsError::NotFound` when nothing exists there.
    pub fn open(&self, path: &str) -> Result<FileHandle> {
        match self {
            Self::Embedded(vfs) => vfs.open(path).map(FileHandle::Memory),
            Self::Passthrough(dir) => dir.open(path).map(FileHandle::Disk),
        }
    }

    /// Returns `true` for the in-memory variant.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }
}

impl From<Vfs> for Source {
    fn from(vfs: Vfs) -> Self {
        Self::Embedded(vfs)
    }
}

impl From<DirFs> for Source {
    fn from(dir: DirFs) -> Self {
        Self::Passthrough(dir)
    }
}

/// An open file or directory from either [`Source`] variant.
#[derive(Debug)]
pub enum FileHandle {
    /// Handle onto an in-memory node
    Memory(VFileHandle),
    /// Handle onto a file on disk
    Disk(DiskFile),
}

impl FileHandle {
    /// Moves the cursor. Both variants accept exactly the positions in
    /// `[0, len - 1]`; see [`VFileHandle::seek_to`].
    ///
    /// # Errors
    ///
    /// Returns `VfsError::OutOfRange` for a target outside the data, or
    /// `VfsError::Io` when the disk seek fails.
    pub fn seek_to(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        match self {
            Self::Memory(handle) => handle.seek_to(offset, whence),
            Self::Disk(file) => file.seek_to(offset, whence),
        }
    }

    /// Rewinds to the start. Always succeeds and may be repeated.
    pub fn close(&mut self) {
        match self {
            Self::Memory(handle) => handle.close(),
            Self::Disk(file) => file.close(),
        }
    }

    /// Returns a metadata snapshot.
    #[must_use]
    pub fn stat(&self) -> VFileInfo {
        match self {
            Self::Memory(handle) => handle.stat(),
            Self::Disk(file) => file.stat(),
        }
    }

    /// Lists a directory's entries. Regular files list nothing.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::Io` if a disk directory cannot be read.
    pub fn readdir(&self, count: isize) -> Result<Vec<VFileInfo>> {
        match self {
            Self::Memory(handle) => Ok(handle.readdir(count)),
            Self::Disk(file) => file.readdir(count),
        }
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Memory(handle) => handle.read(buf),
            Self::Disk(file) => file.read(buf),
        }
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::Memory(handle) => handle.seek(pos),
            Self::Disk(file) => file.seek(pos),
        }
    }
}
