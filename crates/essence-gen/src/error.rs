//! Error types for source generation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating an asset module.
#[derive(Error, Debug)]
pub enum GenError {
    /// Configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    Config {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration file is not valid TOML for [`GenerateConfig`](crate::GenerateConfig)
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        /// Config file path
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A configured name is not a valid Rust identifier
    #[error("{field} must be a Rust identifier, got {value:?}")]
    InvalidPackageName {
        /// Which setting was rejected
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// Source or output directory could not be made absolute
    #[error("failed to resolve {path}: {source}")]
    ResolvePath {
        /// The path being resolved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Source root exists but is not a directory
    #[error("source root {path} is not a directory")]
    NotADirectory {
        /// The rejected root
        path: PathBuf,
    },

    /// Directory traversal failed
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// Directory being walked
        path: PathBuf,
        /// Underlying walkdir error
        #[source]
        source: walkdir::Error,
    },

    /// An entry name is not valid UTF-8
    #[error("entry name is not valid UTF-8: {path}")]
    NonUtf8Name {
        /// Entry path
        path: PathBuf,
    },

    /// An asset could not be read
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Asset path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Metadata for an entry could not be read
    #[error("failed to read metadata of {path}: {source}")]
    Metadata {
        /// Entry path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A `.json` asset is malformed
    #[error("failed to compact JSON in {path}: {source}")]
    CompactJson {
        /// Asset path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Output directory could not be created
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A built-in template failed to register
    #[error("failed to register template {name}: {source}")]
    TemplateRegister {
        /// Template name
        name: &'static str,
        /// Underlying handlebars error
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// Rendering a generated file failed
    #[error("failed to render template {name}: {source}")]
    Render {
        /// Template name
        name: &'static str,
        /// Underlying handlebars error
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// Rendered text is not valid Rust
    #[error("generated {file} is not valid Rust: {source}")]
    Syntax {
        /// Generated file name
        file: String,
        /// Underlying parse error
        #[source]
        source: syn::Error,
    },

    /// rustfmt ran but failed
    #[error("rustfmt failed on {file}: {reason}")]
    Format {
        /// Generated file name
        file: String,
        /// rustfmt diagnostics or the launch failure
        reason: String,
    },

    /// A generated file could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The tree could not be encoded as a bundle
    #[error("failed to encode bundle: {source}")]
    Bundle {
        /// Underlying VFS error
        #[from]
        source: essence_vfs::VfsError,
    },
}

impl GenError {
    /// Returns `true` if the error comes from configuration rather than the
    /// asset tree or output.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_gen::GenError;
    ///
    /// let error = GenError::InvalidPackageName {
    ///     field: "package_name",
    ///     value: "my-assets".to_string(),
    /// };
    /// assert!(error.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::ConfigParse { .. } | Self::InvalidPackageName { .. }
        )
    }

    /// Returns `true` if the error arose while reading the source tree.
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::ResolvePath { .. }
                | Self::NotADirectory { .. }
                | Self::Walk { .. }
                | Self::NonUtf8Name { .. }
                | Self::ReadFile { .. }
                | Self::Metadata { .. }
                | Self::CompactJson { .. }
        )
    }

    /// Returns `true` if the error arose while producing or writing output.
    #[must_use]
    pub const fn is_output_error(&self) -> bool {
        matches!(
            self,
            Self::CreateDir { .. }
                | Self::TemplateRegister { .. }
                | Self::Render { .. }
                | Self::Syntax { .. }
                | Self::Format { .. }
                | Self::Write { .. }
                | Self::Bundle { .. }
        )
    }
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, GenError>;
