//! Read-only virtual filesystem for static assets compiled into a binary.
//!
//! Generated asset modules build a [`Vfs`] tree from literal data and wrap
//! it in an [`Extended`] facade. Development builds instead point the same
//! facade at the asset directory on disk through [`DirFs`], so callers see
//! one surface either way.
//!
//! # Examples
//!
//! ```
//! use essence_vfs::{unix_time, Extended, VFile, Vfs, Whence};
//! use std::io::Read;
//!
//! let t = unix_time(1_700_000_000, 0);
//! let fs = Extended::embedded(Vfs::from_children(t, [
//!     VFile::file("hello.txt", t, &b"hello essence\n"[..]),
//! ]));
//!
//! let mut file = fs.open("/hello.txt")?;
//! file.seek_to(6, Whence::Start)?;
//! let mut rest = String::new();
//! file.read_to_string(&mut rest)?;
//! assert_eq!(rest, "essence\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod bundle;
pub mod disk;
pub mod error;
pub mod extended;
pub mod handle;
pub mod node;
pub mod path;
pub mod source;
pub mod template;
pub mod tree;

pub use disk::{DirFs, DiskFile, mode_bits};
pub use error::{Result, VfsError};
pub use extended::Extended;
pub use handle::{VFileHandle, Whence};
pub use node::{DIR_MODE, FILE_MODE, FileKind, VFile, VFileInfo, unix_parts, unix_time};
pub use source::{FileHandle, Source};
pub use template::{FuncMap, TemplateSet};
pub use tree::Vfs;
