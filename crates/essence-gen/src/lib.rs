//! Build-time generator that embeds a static asset directory as Rust source.
//!
//! [`generate`] walks a source directory into an [`essence_vfs::Vfs`],
//! then writes two modules for the consuming crate: one with every asset
//! compiled in, and one that reads the directory live for development.
//! The consumer selects between them with a `dev` cargo feature:
//!
//! ```ignore
//! #[cfg_attr(not(feature = "dev"), path = "essence/essence.rs")]
//! #[cfg_attr(feature = "dev", path = "essence/essence_dev.rs")]
//! mod essence;
//!
//! let greeting = essence::string("/hello_essence.txt")?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod compact;
pub mod config;
pub mod emitter;
pub mod error;
pub mod generate;
pub mod template_engine;
pub mod tree_builder;

pub use config::{EmbedFormat, GenerateConfig};
pub use emitter::{Artifact, Emitter};
pub use error::{GenError, Result};
pub use generate::{GenerateReport, generate};
pub use tree_builder::{BuiltTree, TreeBuilder};
