//! Essence asset embedding CLI.
//!
//! Walks a static asset directory and writes the generated Rust modules
//! that embed it.
//!
//! # Examples
//!
//! ```bash
//! # Embed ./static as module `essence` in the current directory
//! essence
//!
//! # Custom names and locations
//! essence --package-name assets --src-dir web/public --out-dir src
//!
//! # Settings from a file, with a flag overriding one of them
//! essence --config essence.toml --embed-format bundle
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use essence_gen::{EmbedFormat, GenerateConfig, generate};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Essence - embed a static asset directory as Rust source.
///
/// Writes `<out-dir>/<package-name>/<package-name>.rs` with every asset
/// compiled in and `<package-name>_dev.rs` reading the source directory
/// live, selected by the consumer's `dev` feature.
#[derive(Parser, Debug)]
#[command(name = "essence")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML file with generator settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Module name of the generated code [default: essence]
    #[arg(long, env = "ESSENCE_PACKAGE_NAME")]
    package_name: Option<String>,

    /// Directory to embed [default: ./static]
    #[arg(long, env = "ESSENCE_SRC_DIR")]
    src_dir: Option<PathBuf>,

    /// Directory the package directory is created in [default: .]
    #[arg(long, env = "ESSENCE_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Skip rustfmt on generated sources
    #[arg(long)]
    no_format: bool,

    /// Embed `.json` assets byte for byte
    #[arg(long)]
    no_compact_json: bool,

    /// How file contents are embedded (literal, bundle)
    #[arg(long)]
    embed_format: Option<EmbedFormat>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// Layers flags and environment over the config file over defaults.
    fn resolve_config(&self) -> Result<GenerateConfig> {
        let mut config = match &self.config {
            Some(path) => GenerateConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => GenerateConfig::default(),
        };

        if let Some(name) = &self.package_name {
            config.package_name.clone_from(name);
        }
        if let Some(dir) = &self.src_dir {
            config.src_dir.clone_from(dir);
        }
        if let Some(dir) = &self.out_dir {
            config.out_dir.clone_from(dir);
        }
        if let Some(format) = self.embed_format {
            config.embed_format = format;
        }
        if self.no_format {
            config.format = false;
        }
        if self.no_compact_json {
            config.compact_json = false;
        }

        debug!(?config, "resolved configuration");
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json)?;

    let config = cli.resolve_config()?;
    let report = generate(&config).context("generate")?;

    for path in &report.embedded {
        println!("ESSENCE: embedded file: {}", path.display());
    }
    for path in &report.written {
        println!("ESSENCE: file written: {}", path.display());
    }

    Ok(())
}

/// Initializes logging infrastructure.
///
/// `RUST_LOG` selects the level unless `verbose` forces debug; the default
/// is `warn` so progress lines on stdout are not repeated on stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
