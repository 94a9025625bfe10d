//! Generator configuration.
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! file, and command-line flags or environment variables, each overriding
//! the one before.
//!
//! # Examples
//!
//! ```toml
//! package_name = "assets"
//! src_dir = "./web/static"
//! out_dir = "./src"
//! compact_json = true
//! embed_format = "bundle"
//! ```
//!
//! ```
//! use essence_gen::{EmbedFormat, GenerateConfig};
//!
//! let config: GenerateConfig = toml::from_str(r#"
//!     package_name = "assets"
//!     embed_format = "bundle"
//! "#)?;
//!
//! assert_eq!(config.package_name, "assets");
//! assert_eq!(config.embed_format, EmbedFormat::Bundle);
//! assert_eq!(config.src_dir.to_str(), Some("./static"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{GenError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// How file contents are placed in the embedded profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedFormat {
    /// One byte-string literal per file inside the generated source
    #[default]
    Literal,
    /// A binary bundle next to the source, pulled in with `include_bytes!`
    Bundle,
}

impl fmt::Display for EmbedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => f.write_str("literal"),
            Self::Bundle => f.write_str("bundle"),
        }
    }
}

impl FromStr for EmbedFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "literal" => Ok(Self::Literal),
            "bundle" => Ok(Self::Bundle),
            other => Err(format!("unknown embed format {other:?} (expected literal or bundle)")),
        }
    }
}

/// Settings for one generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Module name of the generated code; also names the output directory
    /// and files.
    pub package_name: String,

    /// Directory whose contents are embedded.
    pub src_dir: PathBuf,

    /// Directory the `<package_name>/` output directory is created in.
    pub out_dir: PathBuf,

    /// Re-encode `.json` assets without insignificant whitespace.
    pub compact_json: bool,

    /// Visit directory entries in file-name order.
    pub sort_entries: bool,

    /// Run rustfmt over generated sources.
    pub format: bool,

    /// Literal or bundle embedding.
    pub embed_format: EmbedFormat,

    /// Crate path the generated code refers to for runtime types.
    pub runtime_crate: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            package_name: "essence".to_string(),
            src_dir: PathBuf::from("./static"),
            out_dir: PathBuf::from("."),
            compact_json: true,
            sort_entries: true,
            format: true,
            embed_format: EmbedFormat::Literal,
            runtime_crate: "essence_vfs".to_string(),
        }
    }
}

impl GenerateConfig {
    /// Loads settings from a TOML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `GenError::Config` if the file cannot be read and
    /// `GenError::ConfigParse` if it is not valid.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| GenError::Config {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| GenError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Checks that the names used in generated code are Rust identifiers.
    ///
    /// # Errors
    ///
    /// Returns `GenError::InvalidPackageName` naming the offending field.
    ///
    /// # Examples
    ///
    /// ```
    /// use essence_gen::GenerateConfig;
    ///
    /// assert!(GenerateConfig::default().validate().is_ok());
    ///
    /// let config = GenerateConfig {
    ///     package_name: "static-assets".to_string(),
    ///     ..Default::default()
    /// };
    /// assert!(config.validate().unwrap_err().is_config_error());
    /// ```
    pub fn validate(&self) -> Result<()> {
        check_ident("package_name", &self.package_name)?;
        check_ident("runtime_crate", &self.runtime_crate)
    }

    /// Path of the directory holding generated files.
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.out_dir.join(&self.package_name)
    }
}

fn check_ident(field: &'static str, value: &str) -> Result<()> {
    syn::parse_str::<syn::Ident>(value)
        .map(|_| ())
        .map_err(|_| GenError::InvalidPackageName {
            field,
            value: value.to_string(),
        })
}
