//! Template rendering seam.
//!
//! Negotiation only needs "template name + variables in, markup out".
//! [`Templates`] provides that on top of minijinja; anything else can
//! implement [`TemplateRenderer`].

use std::path::Path;

use minijinja::Environment;
use serde_json::{Map, Value};

use crate::error::Error;

/// Renders a named template with a mapping of variables.
pub trait TemplateRenderer: Send + Sync + 'static {
    fn render(&self, name: &str, vars: &Map<String, Value>) -> Result<String, Error>;
}

/// minijinja-backed renderer. `.html` templates are autoescaped.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Loads templates lazily from `dir`; `"all_users.html"` resolves to
    /// `dir/all_users.html`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir));
        Self { env }
    }

    /// A renderer with no templates; add them with [`with_template`](Self::with_template).
    pub fn empty() -> Self {
        Self { env: Environment::new() }
    }

    /// Registers an in-memory template.
    pub fn with_template(mut self, name: &str, source: &str) -> Result<Self, Error> {
        self.env.add_template_owned(name.to_owned(), source.to_owned())?;
        Ok(self)
    }
}

impl TemplateRenderer for Templates {
    fn render(&self, name: &str, vars: &Map<String, Value>) -> Result<String, Error> {
        let template = self.env.get_template(name)?;
        Ok(template.render(vars)?)
    }
}
