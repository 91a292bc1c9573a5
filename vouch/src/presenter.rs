//! Renders a field's outcome into the document.

use formdom::Document;

use crate::error::{Error, Result};
use crate::options::{Options, StatusPolicy};
use crate::registry::Binding;

pub(crate) struct Presenter<'a> {
    document: &'a Document,
    options: &'a Options,
}

impl<'a> Presenter<'a> {
    pub fn new(document: &'a Document, options: &'a Options) -> Self {
        Self { document, options }
    }

    /// Mark the input and render `message` into the status target.
    ///
    /// An absent or empty message leaves the document untouched.
    pub fn show(&self, binding: &Binding, valid: bool, message: Option<&str>) -> Result<()> {
        let Some(message) = message.filter(|m| !m.is_empty()) else {
            return Ok(());
        };

        if binding.target.is_none() && self.options.status_policy == StatusPolicy::Strict {
            return Err(Error::StatusTarget(binding.name.clone()));
        }

        self.clear_markers(binding);
        self.document
            .add_class(&binding.input, self.options.classes.select(valid));

        match &binding.target {
            Some(target) => {
                let message = self.options.markup.apply(message);
                let rendered = self.options.templates.render_status(valid, &message);
                self.document.set_text(target, rendered);
            }
            None => log::debug!(
                "[status] no status target for '{}', dropping message",
                binding.name
            ),
        }
        Ok(())
    }

    /// Remove both markers and blank the status target.
    pub fn hide(&self, binding: &Binding) {
        self.clear_markers(binding);
        if let Some(target) = &binding.target {
            self.document.set_text(target, "");
        }
    }

    fn clear_markers(&self, binding: &Binding) {
        let classes = &self.options.classes;
        self.document.remove_class(&binding.input, &classes.success);
        self.document.remove_class(&binding.input, &classes.error);
    }
}
