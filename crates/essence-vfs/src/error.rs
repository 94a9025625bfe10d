//! Error types for the virtual filesystem.
//!
//! Every failure carries the operation context it happened in (path,
//! offset, template name) and can be classified with the `is_xxx()` helpers.
//!
//! # Examples
//!
//! ```
//! use essence_vfs::VfsError;
//!
//! let error = VfsError::NotFound {
//!     op: "open",
//!     path: "/missing.txt".to_string(),
//! };
//!
//! assert!(error.is_not_found());
//! assert_eq!(error.to_string(), "open /missing.txt: file does not exist");
//! ```

use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Errors that can occur during VFS operations.
#[derive(Error, Debug)]
pub enum VfsError {
    /// Path is not absolute (must start with '/')
    #[error("path must be absolute: {path}")]
    PathNotAbsolute {
        /// The relative path
        path: String,
    },

    /// No node exists at the requested path
    #[error("{op} {path}: file does not exist")]
    NotFound {
        /// Operation that performed the lookup
        op: &'static str,
        /// The path that was not found
        path: String,
    },

    /// Seek target lies outside the byte range of the file
    #[error("offset {offset} outside byte range of {name} (length {len})")]
    OutOfRange {
        /// Name of the file being seeked
        name: String,
        /// The resolved target position
        offset: i64,
        /// Length of the file data
        len: u64,
    },

    /// Seek origin constant is not one of start/current/end
    #[error("invalid seek origin: {whence}")]
    InvalidWhence {
        /// The rejected constant
        whence: i32,
    },

    /// Template parsing was requested with an empty file list
    #[error("template: no files named in call to parse_files")]
    NoFiles,

    /// Glob pattern is syntactically invalid
    #[error("invalid glob pattern {pattern:?}: {source}")]
    Pattern {
        /// The rejected pattern
        pattern: String,
        /// Underlying pattern error
        #[source]
        source: glob::PatternError,
    },

    /// Template source failed to parse
    #[error("template {name}: {source}")]
    TemplateParse {
        /// Template name (final path segment)
        name: String,
        /// Underlying handlebars error
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// Template failed to render
    #[error("render template {name}: {source}")]
    TemplateRender {
        /// Template name
        name: String,
        /// Underlying handlebars error
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// File content is not valid UTF-8
    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 {
        /// Path of the file
        path: String,
        /// Underlying conversion error
        #[source]
        source: FromUtf8Error,
    },

    /// I/O failure while reading from the disk passthrough or a handle
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Bundle bytes could not be decoded
    #[error("corrupt bundle: {reason}")]
    CorruptBundle {
        /// What was wrong with the input
        reason: String,
    },
}

impl VfsError {
    /// Returns `true` if this is a not found error.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_vfs::VfsError;
    ///
    /// let error = VfsError::NotFound {
    ///     op: "open",
    ///     path: "/test.txt".to_string(),
    /// };
    ///
    /// assert!(error.is_not_found());
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an invalid path error.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_vfs::VfsError;
    ///
    /// let error = VfsError::PathNotAbsolute {
    ///     path: "relative".to_string(),
    /// };
    ///
    /// assert!(error.is_invalid_path());
    /// ```
    #[must_use]
    pub const fn is_invalid_path(&self) -> bool {
        matches!(self, Self::PathNotAbsolute { .. })
    }

    /// Returns `true` if a seek target fell outside the file.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Returns `true` if an argument constant was rejected.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidWhence { .. })
    }

    /// Returns `true` for caller configuration mistakes: an empty template
    /// file list or a malformed glob pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_vfs::VfsError;
    ///
    /// assert!(VfsError::NoFiles.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::NoFiles | Self::Pattern { .. })
    }
}

impl From<VfsError> for io::Error {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::Io { source, .. } => source,
            VfsError::NotFound { .. } => Self::new(io::ErrorKind::NotFound, err),
            VfsError::InvalidUtf8 { .. } | VfsError::CorruptBundle { .. } => {
                Self::new(io::ErrorKind::InvalidData, err)
            }
            other => Self::new(io::ErrorKind::InvalidInput, other),
        }
    }
}

/// Type alias for VFS operation results.
pub type Result<T> = std::result::Result<T, VfsError>;
