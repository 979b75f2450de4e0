//! Page hooks: user customization of generated pages.

use std::path::{Path, PathBuf};

use crate::model::NodeId;

/// A page about to be written.
#[derive(Debug)]
pub struct PageEvent<'a> {
    /// The file-level item the page documents.
    pub node: NodeId,
    pub output_filename: &'a Path,
    /// Final Markdown text; hooks may rewrite it.
    pub page_content: String,
}

/// Hooks invoked by the generator. Both default to no-ops.
pub trait DocumenterFeature {
    fn on_before_write_page(&mut self, _event: &mut PageEvent<'_>) {}

    fn on_finished(&mut self) {}
}

/// The feature used when nothing is configured.
#[derive(Debug, Default)]
pub struct NoFeature;

impl DocumenterFeature for NoFeature {}

/// Prepends a template to every page. `${name}` in the template is replaced
/// with the page's file stem (e.g. `my-package.widget`).
#[derive(Debug)]
pub struct PrefixFeature {
    template: String,
    pages: Vec<PathBuf>,
}

impl PrefixFeature {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            pages: Vec::new(),
        }
    }

    /// Pages rewritten so far.
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }
}

impl DocumenterFeature for PrefixFeature {
    fn on_before_write_page(&mut self, event: &mut PageEvent<'_>) {
        let name = event
            .output_filename
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let mut content = self.template.replace("${name}", name);
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&event.page_content);
        event.page_content = content;
        self.pages.push(event.output_filename.to_path_buf());
    }

    fn on_finished(&mut self) {
        tracing::debug!(pages = self.pages.len(), "prefix applied");
    }
}
