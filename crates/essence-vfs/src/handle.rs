//! Open handles onto in-memory nodes.
//!
//! Every successful [`Vfs::open`](crate::Vfs::open) returns a fresh
//! [`VFileHandle`] that shares the immutable node and owns its own read
//! cursor, so concurrent readers of one path never disturb each other.
//!
//! # Examples
//!
//! ```
//! use essence_vfs::{unix_time, VFile, Vfs, Whence};
//! use std::io::Read;
//!
//! let vfs = Vfs::new();
//! vfs.append(VFile::file("hello.txt", unix_time(0, 0), &b"hello essence\n"[..]));
//!
//! let mut file = vfs.open("/hello.txt")?;
//! file.seek_to(6, Whence::Start)?;
//!
//! let mut rest = String::new();
//! file.read_to_string(&mut rest)?;
//! assert_eq!(rest, "essence\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{Result, VfsError};
use crate::node::{VFile, VFileInfo};
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;
use tracing::debug;

/// Origin of a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Whence {
    /// Relative to the start of the data
    Start,
    /// Relative to the current cursor
    Current,
    /// Relative to the end of the data
    End,
}

impl Whence {
    /// Raw constant for [`Whence::Start`].
    pub const SEEK_START: i32 = 0;
    /// Raw constant for [`Whence::Current`].
    pub const SEEK_CURRENT: i32 = 1;
    /// Raw constant for [`Whence::End`].
    pub const SEEK_END: i32 = 2;
}

impl TryFrom<i32> for Whence {
    type Error = VfsError;

    fn try_from(whence: i32) -> Result<Self> {
        match whence {
            Self::SEEK_START => Ok(Self::Start),
            Self::SEEK_CURRENT => Ok(Self::Current),
            Self::SEEK_END => Ok(Self::End),
            _ => Err(VfsError::InvalidWhence { whence }),
        }
    }
}

/// A reader over one in-memory node.
#[derive(Debug, Clone)]
pub struct VFileHandle {
    node: Arc<VFile>,
    cursor: u64,
}

impl VFileHandle {
    pub(crate) const fn new(node: Arc<VFile>) -> Self {
        Self { node, cursor: 0 }
    }

    /// Returns the node this handle reads.
    #[must_use]
    pub fn node(&self) -> &VFile {
        &self.node
    }

    /// Returns the current cursor position.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.cursor
    }

    /// Moves the cursor.
    ///
    /// The resolved position must lie in `[0, len - 1]`; an empty file only
    /// accepts position 0. `Whence::End` counts back from the last byte, so
    /// `seek_to(0, Whence::End)` lands on it. The [`Seek`] impl keeps the std
    /// meaning of `SeekFrom::End` (`len + offset`).
    ///
    /// # Errors
    ///
    /// Returns `VfsError::OutOfRange` when the target falls outside the
    /// data. The cursor is left unchanged.
    pub fn seek_to(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let pos = resolve_seek(self.node.size(), self.cursor, offset, whence)
            .map_err(|target| self.out_of_range(target))?;

        debug!(name = self.node.name(), offset, ?whence, pos, "seek");
        self.cursor = pos;
        Ok(pos)
    }

    /// Moves the cursor using a raw origin constant.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::InvalidWhence` for an unknown constant and
    /// `VfsError::OutOfRange` as for [`seek_to`](Self::seek_to).
    pub fn seek_raw(&mut self, offset: i64, whence: i32) -> Result<u64> {
        self.seek_to(offset, Whence::try_from(whence)?)
    }

    /// Rewinds the cursor to the start. Always succeeds and may be repeated.
    pub const fn close(&mut self) {
        self.cursor = 0;
    }

    /// Returns a metadata snapshot of the node.
    #[must_use]
    pub fn stat(&self) -> VFileInfo {
        self.node.stat()
    }

    /// Lists the node's direct children. See [`VFile::readdir`].
    #[must_use]
    pub fn readdir(&self, count: isize) -> Vec<VFileInfo> {
        self.node.readdir(count)
    }

    fn out_of_range(&self, offset: i64) -> VfsError {
        VfsError::OutOfRange {
            name: self.node.name().to_string(),
            offset,
            len: self.node.size(),
        }
    }
}

impl Read for VFileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.node.data();
        let start = usize::try_from(self.cursor).unwrap_or(usize::MAX).min(data.len());
        let count = buf.len().min(data.len() - start);

        buf[..count].copy_from_slice(&data[start..start + count]);
        self.cursor += count as u64;

        Ok(count)
    }
}

impl Seek for VFileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = std_target(self.node.size(), self.cursor, pos);
        Ok(self.seek_to(target, Whence::Start)?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.cursor)
    }
}

/// Resolves a seek over `len` bytes with the cursor at `cursor`.
///
/// Returns the new position, or the rejected target when it falls outside
/// `[0, len - 1]` (only 0 for empty data).
pub(crate) fn resolve_seek(
    len: u64,
    cursor: u64,
    offset: i64,
    whence: Whence,
) -> std::result::Result<u64, i64> {
    let last = i64::try_from(len).unwrap_or(i64::MAX).saturating_sub(1).max(0);
    let target = match whence {
        Whence::Start => Some(offset),
        Whence::Current => i64::try_from(cursor).ok().and_then(|cursor| cursor.checked_add(offset)),
        Whence::End => last.checked_sub(offset),
    }
    .ok_or(i64::MAX)?;

    if (0..=last).contains(&target) {
        Ok(target.unsigned_abs())
    } else {
        Err(target)
    }
}

/// Converts a std seek into an offset from the start.
pub(crate) fn std_target(len: u64, cursor: u64, pos: SeekFrom) -> i64 {
    let signed = |value: u64| i64::try_from(value).unwrap_or(i64::MAX);
    match pos {
        SeekFrom::Start(offset) => signed(offset),
        SeekFrom::Current(offset) => signed(cursor).saturating_add(offset),
        SeekFrom::End(offset) => signed(len).saturating_add(offset),
    }
}
