//! Template sets parsed from filesystem assets.
//!
//! A [`TemplateSet`] is a handlebars registry holding every template parsed
//! in one call, each named by the final segment of its path. Templates in
//! the same set can include each other as partials:
//!
//! ```text
//! subject: {{Message}} - {{> subtmpl.tmpl}}
//! ```

use crate::error::{Result, VfsError};
use handlebars::{Handlebars, HelperDef};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Named helpers made available to every template in a set.
pub type FuncMap = HashMap<String, Box<dyn HelperDef + Send + Sync>>;

/// A parsed group of templates sharing one namespace.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`; rendering takes `&self`.
pub struct TemplateSet {
    registry: Handlebars<'static>,
    names: Vec<String>,
}

impl TemplateSet {
    /// Creates an empty set with `funcs` registered as helpers.
    pub(crate) fn with_helpers(funcs: FuncMap) -> Self {
        let mut registry = Handlebars::new();
        for (name, helper) in funcs {
            registry.register_helper(&name, helper);
        }
        Self {
            registry,
            names: Vec::new(),
        }
    }

    /// Parses `source` and registers it under `name`, replacing any earlier
    /// template of the same name.
    pub(crate) fn add(&mut self, name: &str, source: &str) -> Result<()> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| VfsError::TemplateParse {
                name: name.to_string(),
                source: Box::new(e),
            })?;
        if !self.names.iter().any(|existing| existing == name) {
            self.names.push(name.to_string());
        }
        Ok(())
    }

    /// Renders the template registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::TemplateRender` if the template is unknown or
    /// rendering fails.
    pub fn execute_template<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.registry
            .render(name, data)
            .map_err(|e| VfsError::TemplateRender {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    /// Renders the first template parsed into the set.
    ///
    /// The primary template is fixed by the first path handed to
    /// [`Extended::parse_files`](crate::Extended::parse_files) (or the first
    /// glob match), not the last. Templates added later only act as
    /// partials here; render them directly with
    /// [`execute_template`](Self::execute_template).
    ///
    /// # Errors
    ///
    /// Returns `VfsError::NoFiles` for an empty set and
    /// `VfsError::TemplateRender` if rendering fails.
    pub fn execute<T: Serialize>(&self, data: &T) -> Result<String> {
        let primary = self.names.first().ok_or(VfsError::NoFiles)?;
        self.execute_template(primary, data)
    }

    /// Returns template names in the order they were parsed.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` if a template is registered as `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}
