//! Handlebars rendering of the text members of a template bundle

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderErrorReason,
};
use serde_json::Value;

use crate::error::{PdfplumError, Result};

/// Extensions of archive members that go through Handlebars
pub const TEXT_EXTENSIONS: &[&str] = &[".txt", ".md", ".html"];

/// Whether an archive member is rendered as a template or copied as is
pub fn is_text_template(path: &str) -> bool {
    TEXT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// `{{json value}}` writes the value as JSON without HTML escaping, so
/// templates can hand data to their own scripts.
fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let Some(param) = h.param(0) else {
        return Ok(());
    };
    if param.is_value_missing() {
        return Ok(());
    }

    let json = serde_json::to_string(param.value())
        .map_err(|e| RenderErrorReason::Other(e.to_string()))?;
    out.write(&json)?;
    Ok(())
}

/// Template engine shared by every entry of a materialization
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        // Missing fields render as empty strings
        registry.set_strict_mode(false);
        registry.register_helper("json", Box::new(json_helper));

        Self { registry }
    }

    /// Register an additional helper before the engine is shared
    pub fn register_helper(
        &mut self,
        name: &str,
        helper: Box<dyn HelperDef + Send + Sync + 'static>,
    ) -> &mut Self {
        self.registry.register_helper(name, helper);
        self
    }

    /// Compile `template` and render it against `context`.
    ///
    /// `path` only labels errors.
    pub fn render(&self, path: &str, template: &str, context: &Value) -> Result<String> {
        self.registry
            .render_template(template, context)
            .map_err(|e| PdfplumError::render(path, e))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
