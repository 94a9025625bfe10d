//! End-to-end generation: build the tree, then emit both profiles.

use crate::config::GenerateConfig;
use crate::emitter::Emitter;
use crate::error::{GenError, Result};
use crate::tree_builder::TreeBuilder;
use std::path::PathBuf;
use tracing::info;

/// What a generator run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Absolute source directory that was embedded
    pub src_dir: PathBuf,
    /// Every embedded asset, in walk order
    pub embedded: Vec<PathBuf>,
    /// Absolute path of every file written
    pub written: Vec<PathBuf>,
}

/// Embeds the configured source directory as generated Rust modules.
///
/// Writes `<out_dir>/<package_name>/<package_name>.rs` (embedded profile)
/// and `<package_name>_dev.rs` (passthrough profile), plus
/// `<package_name>.bundle` in bundle mode. Nothing is written if the tree
/// cannot be built or rendered.
///
/// # Errors
///
/// Returns the first configuration, source, or output error.
///
/// # Examples
///
/// ```no_run
/// use essence_gen::{generate, GenerateConfig};
///
/// let report = generate(&GenerateConfig {
///     package_name: "assets".to_string(),
///     src_dir: "./web".into(),
///     ..Default::default()
/// })?;
/// for path in &report.written {
///     println!("wrote {}", path.display());
/// }
/// # Ok::<(), essence_gen::GenError>(())
/// ```
pub fn generate(config: &GenerateConfig) -> Result<GenerateReport> {
    config.validate()?;

    let src_dir = std::path::absolute(&config.src_dir).map_err(|source| GenError::ResolvePath {
        path: config.src_dir.clone(),
        source,
    })?;

    info!(
        src = %src_dir.display(),
        package = %config.package_name,
        format = %config.embed_format,
        "generating asset module"
    );

    let tree = TreeBuilder::new()
        .compact_json(config.compact_json)
        .sort_entries(config.sort_entries)
        .build(&src_dir)?;

    let emitter = Emitter::new(config)?;
    let written = emitter.emit(&tree.vfs, &src_dir, &config.package_dir())?;

    Ok(GenerateReport {
        src_dir,
        embedded: tree.embedded,
        written,
    })
}
