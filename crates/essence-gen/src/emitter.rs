//! Renders a built tree into the two generated source files.
//!
//! The embedded profile describes every node as a literal constructor
//! expression (or points at a binary bundle); the passthrough profile only
//! records the absolute source directory. Both files are rendered, checked
//! with `syn` and optionally formatted before anything is written.

use crate::config::{EmbedFormat, GenerateConfig};
use crate::error::{GenError, Result};
use crate::template_engine::TemplateEngine;
use essence_vfs::{VFile, Vfs, unix_parts};
use proc_macro2::Literal;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct EmbeddedContext<'a> {
    runtime_crate: &'a str,
    package_name: &'a str,
    root_secs: u64,
    root_nanos: u32,
    children: Vec<String>,
    has_bundle: bool,
    bundle_file: String,
}

#[derive(Serialize)]
struct PassthroughContext<'a> {
    runtime_crate: &'a str,
    package_name: &'a str,
    src_dir: String,
}

/// A generated file held in memory until every output is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name inside the package directory
    pub file_name: String,
    /// Complete file contents
    pub contents: Vec<u8>,
}

/// Writes generated asset modules.
#[derive(Debug)]
pub struct Emitter<'a> {
    engine: TemplateEngine<'a>,
    package_name: String,
    runtime_crate: String,
    embed_format: EmbedFormat,
    format: bool,
}

impl Emitter<'_> {
    /// Creates an emitter for the settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns `GenError::TemplateRegister` if the built-in templates fail
    /// to load.
    pub fn new(config: &GenerateConfig) -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
            package_name: config.package_name.clone(),
            runtime_crate: config.runtime_crate.clone(),
            embed_format: config.embed_format,
            format: config.format,
        })
    }

    /// Renders every output for `vfs` without touching the filesystem.
    ///
    /// `src_dir` must be absolute; the passthrough profile opens it at run
    /// time.
    ///
    /// # Errors
    ///
    /// Returns `GenError::Bundle`, `GenError::Render`, `GenError::Syntax` or
    /// `GenError::Format`.
    pub fn render(&self, vfs: &Vfs, src_dir: &Path) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::with_capacity(3);

        let bundle_file = format!("{}.bundle", self.package_name);
        let children = match self.embed_format {
            EmbedFormat::Literal => vfs
                .root()
                .children()
                .map(|child| node_expr(child, &self.runtime_crate))
                .collect(),
            EmbedFormat::Bundle => {
                artifacts.push(Artifact {
                    file_name: bundle_file.clone(),
                    contents: vfs.to_bundle()?,
                });
                Vec::new()
            }
        };

        let (root_secs, root_nanos) = unix_parts(vfs.root().mod_time());
        let embedded = self.engine.render(
            TemplateEngine::EMBEDDED,
            &EmbeddedContext {
                runtime_crate: &self.runtime_crate,
                package_name: &self.package_name,
                root_secs,
                root_nanos,
                children,
                has_bundle: self.embed_format == EmbedFormat::Bundle,
                bundle_file: Literal::string(&bundle_file).to_string(),
            },
        )?;
        let embedded_name = format!("{}.rs", self.package_name);
        artifacts.push(Artifact {
            contents: self.finish(&embedded_name, embedded)?.into_bytes(),
            file_name: embedded_name,
        });

        let passthrough = self.engine.render(
            TemplateEngine::PASSTHROUGH,
            &PassthroughContext {
                runtime_crate: &self.runtime_crate,
                package_name: &self.package_name,
                src_dir: Literal::string(&src_dir.display().to_string()).to_string(),
            },
        )?;
        let passthrough_name = format!("{}_dev.rs", self.package_name);
        artifacts.push(Artifact {
            contents: self.finish(&passthrough_name, passthrough)?.into_bytes(),
            file_name: passthrough_name,
        });

        Ok(artifacts)
    }

    /// Renders every output and writes it into `package_dir`, returning the
    /// absolute path of each file written.
    ///
    /// # Errors
    ///
    /// Returns any [`render`](Self::render) error, `GenError::CreateDir`,
    /// `GenError::Write` or `GenError::ResolvePath`.
    pub fn emit(&self, vfs: &Vfs, src_dir: &Path, package_dir: &Path) -> Result<Vec<PathBuf>> {
        let artifacts = self.render(vfs, src_dir)?;

        fs::create_dir_all(package_dir).map_err(|source| GenError::CreateDir {
            path: package_dir.to_path_buf(),
            source,
        })?;

        let files: Vec<_> = artifacts
            .iter()
            .map(|artifact| (package_dir.join(&artifact.file_name), artifact.contents.as_slice()))
            .collect();
        write_files_atomic(&files)?;

        let mut written = Vec::with_capacity(files.len());
        for (destination, _) in files {
            let absolute = std::path::absolute(&destination).map_err(|source| GenError::ResolvePath {
                path: destination.clone(),
                source,
            })?;
            info!(path = %absolute.display(), "file written");
            written.push(absolute);
        }

        Ok(written)
    }

    fn finish(&self, file_name: &str, source: String) -> Result<String> {
        syn::parse_file(&source).map_err(|e| GenError::Syntax {
            file: file_name.to_string(),
            source: e,
        })?;

        if self.format {
            rustfmt(file_name, source)
        } else {
            Ok(source)
        }
    }
}

/// Builds the constructor expression for one node and its subtree.
///
/// # Examples
///
/// ```
/// use essence_gen::emitter::node_expr;
/// use essence_vfs::{unix_time, VFile};
///
/// let file = VFile::file("a.txt", unix_time(3, 4), &b"hi\n"[..]);
/// assert_eq!(
///     node_expr(&file, "essence_vfs"),
///     "::essence_vfs::VFile::file(\"a.txt\", ::essence_vfs::unix_time(3, 4), \
///      &b\"hi\\n\"[..]).with_mode(0o644)",
/// );
/// ```
#[must_use]
pub fn node_expr(node: &VFile, runtime_crate: &str) -> String {
    let mut out = String::new();
    write_node(&mut out, node, runtime_crate);
    out
}

fn write_node(out: &mut String, node: &VFile, rt: &str) {
    let name = Literal::string(node.name());
    let (secs, nanos) = unix_parts(node.mod_time());

    // Writing to a String cannot fail
    if node.is_dir() {
        let _ = write!(out, "::{rt}::VFile::dir({name}, ::{rt}::unix_time({secs}, {nanos})).with_mode({:#o})", node.mode());
        let mut children = node.children().peekable();
        if children.peek().is_some() {
            out.push_str(".with_children([");
            for child in children {
                write_node(out, child, rt);
                out.push_str(", ");
            }
            out.push_str("])");
        }
    } else {
        let data = Literal::byte_string(node.data());
        let _ = write!(
            out,
            "::{rt}::VFile::file({name}, ::{rt}::unix_time({secs}, {nanos}), &{data}[..]).with_mode({:#o})",
            node.mode()
        );
    }
}

/// Pipes `source` through rustfmt. A missing rustfmt leaves the text as is.
fn rustfmt(file_name: &str, source: String) -> Result<String> {
    let format_error = |reason: String| GenError::Format {
        file: file_name.to_string(),
        reason,
    };

    let mut child = match Command::new("rustfmt")
        .args(["--edition", "2024"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(file = file_name, "rustfmt not found, writing unformatted source");
            return Ok(source);
        }
        Err(e) => return Err(format_error(e.to_string())),
    };

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| format_error("stdin was not captured".to_string()))?;

    let (written, output) = thread::scope(|scope| {
        let text = source.as_str();
        let writer = scope.spawn(move || stdin.write_all(text.as_bytes()));
        let output = child.wait_with_output();
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
        (written, output)
    });

    let output = output.map_err(|e| format_error(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format_error(format!("{}: {}", output.status, stderr.trim())));
    }
    written.map_err(|e| format_error(e.to_string()))?;

    debug!(file = file_name, "formatted with rustfmt");
    String::from_utf8(output.stdout).map_err(|e| format_error(e.to_string()))
}

/// Writes every file to a `.tmp` sibling, then renames them all into
/// place. If any temporary cannot be written, the staged ones are removed
/// and existing outputs are left untouched.
fn write_files_atomic(files: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());

    for (destination, content) in files {
        let temp_path = temp_sibling(destination);
        if let Err(source) = fs::write(&temp_path, content) {
            if temp_path.is_file() {
                staged.push((temp_path.clone(), destination.as_path()));
            }
            discard(&staged);
            return Err(GenError::Write { path: temp_path, source });
        }
        staged.push((temp_path, destination.as_path()));
    }

    for (index, (temp_path, destination)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(temp_path, destination) {
            discard(&staged[index..]);
            return Err(GenError::Write {
                path: destination.to_path_buf(),
                source,
            });
        }
    }

    Ok(())
}

fn temp_sibling(destination: &Path) -> PathBuf {
    let mut temp_name = destination.as_os_str().to_owned();
    temp_name.push(".tmp");
    PathBuf::from(temp_name)
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (temp_path, _) in staged {
        if let Err(err) = fs::remove_file(temp_path) {
            warn!(path = %temp_path.display(), error = %err, "failed to remove temporary file");
        }
    }
}
