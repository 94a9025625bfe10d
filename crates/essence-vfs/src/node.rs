//! Tree nodes of the virtual filesystem.
//!
//! A [`VFile`] is either a directory holding an ordered list of children or
//! a regular file holding an immutable byte blob. Nodes carry no read
//! position; a cursor belongs to the [`VFileHandle`](crate::VFileHandle)
//! returned by each open.
//!
//! # Examples
//!
//! ```
//! use essence_vfs::{unix_time, VFile};
//!
//! let mut dir = VFile::dir("static", unix_time(1_700_000_000, 0));
//! dir.append(VFile::file("hello.txt", unix_time(1_700_000_000, 0), b"hi".to_vec()));
//!
//! let listing = dir.readdir(0);
//! assert_eq!(listing.len(), 1);
//! assert_eq!(listing[0].name(), "hello.txt");
//! assert_eq!(listing[0].size(), 2);
//! ```

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default permission bits carried by directories.
pub const DIR_MODE: u32 = 0o755;

/// Default permission bits carried by regular files.
pub const FILE_MODE: u32 = 0o644;

/// Builds a timestamp from seconds and nanoseconds since the Unix epoch.
///
/// Generated sources use this to express captured modification times.
#[must_use]
pub fn unix_time(secs: u64, nanos: u32) -> SystemTime {
    UNIX_EPOCH + Duration::new(secs, nanos)
}

/// Splits a timestamp into seconds and nanoseconds since the Unix epoch.
///
/// Times before the epoch are clamped to the epoch.
#[must_use]
pub fn unix_parts(time: SystemTime) -> (u64, u32) {
    time.duration_since(UNIX_EPOCH)
        .map_or((0, 0), |elapsed| (elapsed.as_secs(), elapsed.subsec_nanos()))
}

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// A directory with children and no data
    Directory,
    /// A regular file with data and no children
    File,
}

/// A node of the virtual filesystem tree.
#[derive(Debug, Clone)]
pub struct VFile {
    name: String,
    kind: FileKind,
    data: Cow<'static, [u8]>,
    mod_time: SystemTime,
    mode: u32,
    children: Vec<Arc<VFile>>,
}

impl VFile {
    /// Creates an empty directory node with the default directory mode.
    #[must_use]
    pub fn dir(name: impl Into<String>, mod_time: SystemTime) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::Directory,
            data: Cow::Borrowed(&[]),
            mod_time,
            mode: DIR_MODE,
            children: Vec::new(),
        }
    }

    /// Creates a regular file node with the default file mode.
    ///
    /// Static byte slices are borrowed, owned buffers are moved in.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_vfs::{unix_time, VFile};
    ///
    /// let borrowed = VFile::file("a.txt", unix_time(0, 0), &b"abc"[..]);
    /// let owned = VFile::file("b.txt", unix_time(0, 0), vec![1, 2, 3]);
    /// assert_eq!(borrowed.data(), b"abc");
    /// assert_eq!(owned.size(), 3);
    /// ```
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        mod_time: SystemTime,
        data: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::File,
            data: data.into(),
            mod_time,
            mode: FILE_MODE,
            children: Vec::new(),
        }
    }

    /// Replaces the permission bits.
    #[must_use]
    pub const fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Appends every child in order. Has no effect on regular files.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        for child in children {
            self.append(child);
        }
        self
    }

    /// Adds a child to a directory.
    ///
    /// Silently ignored when the receiver is a regular file: callers only
    /// append to directories they created.
    pub fn append(&mut self, child: Self) {
        if self.is_dir() {
            self.children.push(Arc::new(child));
        }
    }

    /// Returns the node name (last path segment).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node kind.
    #[must_use]
    pub const fn kind(&self) -> FileKind {
        self.kind
    }

    /// Returns `true` for directories.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Returns the file data; always empty for directories.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the data length in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns the captured modification time.
    #[must_use]
    pub const fn mod_time(&self) -> SystemTime {
        self.mod_time
    }

    /// Returns the permission bits.
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Iterates over direct children in tree order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = &Self> {
        self.children.iter().map(|child| &**child)
    }

    /// Consumes the node and returns its children.
    #[must_use]
    pub fn into_children(self) -> Vec<Self> {
        self.children.into_iter().map(Arc::unwrap_or_clone).collect()
    }

    pub(crate) fn child_nodes(&self) -> &[Arc<Self>] {
        &self.children
    }

    /// Returns a metadata snapshot.
    #[must_use]
    pub fn stat(&self) -> VFileInfo {
        VFileInfo {
            name: self.name.clone(),
            size: self.size(),
            mode: self.mode,
            mod_time: self.mod_time,
            is_dir: self.is_dir(),
        }
    }

    /// Returns a snapshot for every direct child, in tree order.
    ///
    /// `count` exists for interface compatibility; the full listing is
    /// always returned. Regular files have no children and yield an empty
    /// list.
    #[must_use]
    pub fn readdir(&self, _count: isize) -> Vec<VFileInfo> {
        self.children.iter().map(|child| child.stat()).collect()
    }

    /// Counts regular files in this subtree, including the node itself.
    #[must_use]
    pub fn file_count(&self) -> usize {
        if self.is_dir() {
            self.children.iter().map(|child| child.file_count()).sum()
        } else {
            1
        }
    }
}

/// Read-only metadata snapshot of a node.
///
/// Listings hold these values rather than live node references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VFileInfo {
    name: String,
    size: u64,
    mode: u32,
    mod_time: SystemTime,
    is_dir: bool,
}

impl VFileInfo {
    /// Creates a snapshot from raw metadata.
    #[must_use]
    pub const fn new(name: String, size: u64, mode: u32, mod_time: SystemTime, is_dir: bool) -> Self {
        Self {
            name,
            size,
            mode,
            mod_time,
            is_dir,
        }
    }

    /// Returns the entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data length; 0 for directories.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the permission bits.
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Returns the modification time.
    #[must_use]
    pub const fn mod_time(&self) -> SystemTime {
        self.mod_time
    }

    /// Returns `true` for directories.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.is_dir
    }
}
