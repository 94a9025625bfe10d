//! Template engine for generated asset modules.
//!
//! Wraps Handlebars with the built-in templates for both profiles and the
//! shared forwarding functions. Output is Rust source, so HTML escaping is
//! turned off.
//!
//! # Examples
//!
//! ```
//! use essence_gen::template_engine::TemplateEngine;
//! use serde_json::json;
//!
//! let engine = TemplateEngine::new()?;
//! let source = engine.render(TemplateEngine::PASSTHROUGH, &json!({
//!     "runtime_crate": "essence_vfs",
//!     "package_name": "essence",
//!     "src_dir": "\"/srv/static\"",
//! }))?;
//! assert!(source.contains("Extended::passthrough(\"/srv/static\")"));
//! # Ok::<(), essence_gen::GenError>(())
//! ```

use crate::error::{GenError, Result};
use handlebars::{Handlebars, no_escape};
use serde::Serialize;

/// Template engine for generated sources.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl TemplateEngine<'_> {
    /// Name of the embedded-profile template.
    pub const EMBEDDED: &'static str = "embedded";
    /// Name of the passthrough-profile template.
    pub const PASSTHROUGH: &'static str = "passthrough";
    /// Name of the forwarding-function partial shared by both profiles.
    pub const PUBLIC_INTERFACE: &'static str = "public_interface";

    /// Creates an engine with the built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns `GenError::TemplateRegister` if a built-in template fails to
    /// parse.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Fail on missing context fields
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(no_escape);

        for (name, source) in [
            (Self::EMBEDDED, include_str!("../templates/embedded.rs.hbs")),
            (Self::PASSTHROUGH, include_str!("../templates/passthrough.rs.hbs")),
            (
                Self::PUBLIC_INTERFACE,
                include_str!("../templates/public_interface.rs.hbs"),
            ),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| GenError::TemplateRegister {
                    name,
                    source: Box::new(e),
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Renders a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns `GenError::Render` if the template is unknown, a context
    /// field is missing, or rendering fails.
    pub fn render<T: Serialize>(&self, name: &'static str, context: &T) -> Result<String> {
        self.handlebars
            .render(name, context)
            .map_err(|e| GenError::Render {
                name,
                source: Box::new(e),
            })
    }
}
