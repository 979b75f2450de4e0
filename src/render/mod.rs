//! Page renderer: walks the model and writes one Markdown page per
//! file-level item.
//!
//! Each visit owns the [`ItemPath`] of the item being rendered and passes it
//! down explicitly; links are always computed relative to that path.

pub mod output;
mod tables;

use std::path::Path;

use crate::collision::CollisionLookup;
use crate::config::DocumenterConfig;
use crate::error::{DocumenterError, Result};
use crate::item_path::{ItemPath, PathResolver};
use crate::kinds::Granularity;
use crate::markdown::{Block, Inline, MarkdownEmitter, Section};
use crate::model::{unscoped_package_name, ApiItemKind, ApiModel, ApiNode, NodeId, TokenRange};
use crate::plugin::{DocumenterFeature, PageEvent};
use crate::tsdoc::{self, DocBlock, DocInline, DocSection, LinkDestination};

pub use output::{FsPageWriter, PageWriter};

const PAGE_HEADER: &str =
    "<!-- Do not edit this file. It is automatically generated by API Documenter. -->\n\n";

const BETA_WARNING: &str = "This API is provided as a preview for developers and may change \
based on feedback that we receive.  Do not use this API in a production environment.";

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub package_count: usize,
    pub file_count: usize,
}

pub struct MarkdownDocumenter<'a> {
    model: &'a ApiModel,
    paths: PathResolver<'a>,
    config: &'a DocumenterConfig,
    output_folder: &'a Path,
    feature: &'a mut dyn DocumenterFeature,
    writer: &'a mut dyn PageWriter,
    stats: RenderStats,
}

impl<'a> MarkdownDocumenter<'a> {
    pub fn new(
        model: &'a ApiModel,
        lookup: &'a CollisionLookup,
        granularity: Granularity,
        config: &'a DocumenterConfig,
        output_folder: &'a Path,
        feature: &'a mut dyn DocumenterFeature,
        writer: &'a mut dyn PageWriter,
    ) -> Self {
        let paths = PathResolver::new(
            model,
            lookup,
            granularity,
            &config.markdown_options.index_filename,
        )
        .with_collapsed_call_signatures(config.markdown_options.collapse_call_signatures);
        Self {
            model,
            paths,
            config,
            output_folder,
            feature,
            writer,
            stats: RenderStats::default(),
        }
    }

    /// Render the whole model, starting from the root page.
    pub fn generate_files(mut self) -> Result<RenderStats> {
        self.write_page(self.model.root(), None)?;
        Ok(self.stats)
    }

    fn granularity(&self) -> Granularity {
        self.paths.granularity
    }

    // -- Pages --------------------------------------------------------------

    fn write_pages(
        &mut self,
        items: &[NodeId],
        output: &mut Section,
        add_rule: bool,
        line_breaks: bool,
    ) -> Result<()> {
        for item in items {
            if line_breaks {
                output.push(Block::LineBreak);
            }
            self.write_page(*item, Some(&mut *output))?;
        }
        if add_rule {
            output.push(Block::HorizontalRule);
        }
        Ok(())
    }

    fn write_page(&mut self, id: NodeId, parent: Option<&mut Section>) -> Result<()> {
        let model = self.model;
        let node = model.node(id);
        let path = self.paths.path(id);
        let collapsed_interface = self.is_collapsed_interface(id);
        let collapsed_call = path.is_collapsed();
        let mut output = Section::new();

        if path.is_file_level() {
            self.write_breadcrumb(&mut output, &path, id);
        }
        if !collapsed_call && path.has_anchor() {
            output.push(Block::Anchor(path.anchor_path()));
        }
        if let Some(title) = self.heading_title(id, collapsed_interface, collapsed_call)? {
            output.push(Block::heading(path.header_level(), title));
        }
        if node.kind == ApiItemKind::Package {
            self.stats.package_count += 1;
            tracing::debug!(package = node.display_name(), "rendering package");
        }

        if node.is_beta() {
            output.push(Block::NoteBox(vec![Block::text(BETA_WARNING)]));
        }

        let mut decorators = Vec::new();
        if let Some(doc) = &node.doc {
            decorators.extend(doc.custom_blocks(tsdoc::DECORATOR));
            if let Some(deprecated) = &doc.deprecated {
                let mut content = vec![Block::text("Warning: This API is now obsolete. ")];
                content.extend(self.convert_section(&path, deprecated));
                output.push(Block::NoteBox(content));
            }
            output.extend(self.convert_section(&path, &doc.summary));
        }

        if !collapsed_interface && is_declared(node.kind) {
            if !node.excerpt_text().is_empty() {
                output.push(Block::paragraph(vec![Inline::bold("Signature:")]));
                let code = match model.parent(id).filter(|_| collapsed_call) {
                    Some(parent) => format!(
                        "{} {{\n  {}\n}}",
                        model.excerpt_with_modifiers(parent).trim(),
                        model.excerpt_with_modifiers(id)
                    ),
                    None => model.excerpt_with_modifiers(id),
                };
                output.push(Block::code("typescript", code));
            }
            self.write_heritage(&mut output, &path, node);
        }

        if !decorators.is_empty() {
            output.push(Block::paragraph(vec![Inline::bold("Decorators:")]));
            for block in decorators {
                output.extend(self.convert_section(&path, &block.content));
            }
        }

        let remarks_first = matches!(
            node.kind,
            ApiItemKind::Class | ApiItemKind::Interface | ApiItemKind::Namespace | ApiItemKind::Package
        );
        if remarks_first {
            self.write_remarks(&mut output, &path, node);
        }

        match node.kind {
            ApiItemKind::Class => self.write_class_tables(&mut output, &path, id)?,
            ApiItemKind::Enum => self.write_enum_tables(&mut output, &path, id)?,
            ApiItemKind::Interface => self.write_interface_tables(&mut output, &path, id)?,
            ApiItemKind::CallSignature
            | ApiItemKind::Constructor
            | ApiItemKind::ConstructSignature
            | ApiItemKind::Method
            | ApiItemKind::MethodSignature
            | ApiItemKind::Function => {
                self.write_parameter_tables(&mut output, &path, node);
                self.write_throws(&mut output, &path, node);
            }
            ApiItemKind::Namespace | ApiItemKind::Package => {
                self.write_package_or_namespace_tables(&mut output, &path, id)?
            }
            ApiItemKind::Model => self.write_model_table(&mut output, &path)?,
            ApiItemKind::EnumMember
            | ApiItemKind::Property
            | ApiItemKind::PropertySignature
            | ApiItemKind::TypeAlias
            | ApiItemKind::Variable => {}
            other => return Err(DocumenterError::UnsupportedKind(other)),
        }

        if !remarks_first {
            self.write_remarks(&mut output, &path, node);
        }
        self.write_default_value(&mut output, &path, node);

        if path.is_file_level() {
            self.emit_page(id, &path, &output)?;
        } else if let Some(parent) = parent {
            parent.extend(output);
        }
        Ok(())
    }

    fn emit_page(&mut self, id: NodeId, path: &ItemPath, output: &Section) -> Result<()> {
        let filename = self.output_folder.join(path.file_path());
        let mut content = String::from(PAGE_HEADER);
        content.push_str(&MarkdownEmitter::emit(output));

        let mut event = PageEvent {
            node: id,
            output_filename: &filename,
            page_content: content,
        };
        self.feature.on_before_write_page(&mut event);

        tracing::debug!(file = %filename.display(), "writing");
        self.writer.write_page(&filename, &event.page_content)?;
        self.stats.file_count += 1;
        Ok(())
    }

    fn heading_title(
        &self,
        id: NodeId,
        collapsed_interface: bool,
        collapsed_call: bool,
    ) -> Result<Option<String>> {
        let model = self.model;
        let node = model.node(id);
        let scoped = model.scoped_name(id);
        let title = match node.kind {
            ApiItemKind::Class => format!("{scoped} class"),
            ApiItemKind::Enum => format!("{scoped} enum"),
            ApiItemKind::Interface if collapsed_interface => format!("{scoped} call signature"),
            ApiItemKind::Interface => format!("{scoped} interface"),
            ApiItemKind::CallSignature if collapsed_call => return Ok(None),
            ApiItemKind::CallSignature => {
                let prefix = model
                    .parent(id)
                    .map(|p| format!("{}.", model.display_name(p)))
                    .unwrap_or_default();
                format!(
                    "{prefix}call-{} call signature",
                    node.overload_index.unwrap_or(0)
                )
            }
            ApiItemKind::Constructor | ApiItemKind::ConstructSignature => scoped,
            ApiItemKind::Method | ApiItemKind::MethodSignature => format!("{scoped} method"),
            ApiItemKind::EnumMember => format!("{scoped} member"),
            ApiItemKind::Function => format!("{scoped} function"),
            ApiItemKind::Model => self.config.markdown_options.index_title.clone(),
            ApiItemKind::Namespace => format!("{scoped} namespace"),
            ApiItemKind::Package => {
                format!("{} package", unscoped_package_name(node.display_name()))
            }
            ApiItemKind::Property | ApiItemKind::PropertySignature => format!("{scoped} property"),
            ApiItemKind::TypeAlias => format!("{scoped} type"),
            ApiItemKind::Variable => format!("{scoped} variable"),
            other => return Err(DocumenterError::UnsupportedKind(other)),
        };
        Ok(Some(title))
    }

    fn write_breadcrumb(&self, output: &mut Section, path: &ItemPath, id: NodeId) {
        let options = &self.config.markdown_options;
        if !options.show_breadcrumb {
            return;
        }
        let model = self.model;
        let mut crumbs = Vec::new();
        if options.use_index {
            let url = if options.index_breadcrumb_url.is_empty() {
                self.link_to(path, model.root())
            } else {
                options.index_breadcrumb_url.clone()
            };
            crumbs.push(Inline::link(options.index_breadcrumb_title.as_str(), url));
        }
        for ancestor in model.hierarchy(id) {
            if matches!(model.kind(ancestor), ApiItemKind::Model | ApiItemKind::EntryPoint) {
                continue;
            }
            crumbs.push(Inline::text(" > "));
            crumbs.push(Inline::link(
                model.display_name(ancestor),
                self.link_to(path, ancestor),
            ));
        }
        append_in_paragraph(output, crumbs);
    }

    fn write_heritage(&self, output: &mut Section, path: &ItemPath, node: &ApiNode) {
        let label = |text: &str| vec![Inline::bold(text)];
        match node.kind {
            ApiItemKind::Class => {
                if let Some(range) = node.extends.first() {
                    let mut paragraph = label("Extends: ");
                    paragraph.extend(self.excerpt_inlines(path, node, *range));
                    output.push(Block::paragraph(paragraph));
                }
                if !node.implements.is_empty() {
                    let mut paragraph = label("Implements: ");
                    self.join_ranges(&mut paragraph, path, node, &node.implements);
                    output.push(Block::paragraph(paragraph));
                }
            }
            ApiItemKind::Interface if !node.extends.is_empty() => {
                let mut paragraph = label("Extends: ");
                self.join_ranges(&mut paragraph, path, node, &node.extends);
                output.push(Block::paragraph(paragraph));
            }
            ApiItemKind::TypeAlias => {
                let mut seen = std::collections::HashSet::new();
                let mut references = Vec::new();
                for token in &node.excerpt_tokens {
                    let resolved = token
                        .canonical_reference
                        .as_deref()
                        .and_then(|r| self.model.resolve_canonical(r));
                    if let Some(target) = resolved {
                        if seen.insert(token.text.as_str()) {
                            references.push((token.text.replace(['\r', '\n'], " "), target));
                        }
                    }
                }
                if !references.is_empty() {
                    let mut paragraph = label("References: ");
                    for (i, (text, target)) in references.into_iter().enumerate() {
                        if i > 0 {
                            paragraph.push(Inline::text(", "));
                        }
                        paragraph.push(Inline::link(text, self.link_to(path, target)));
                    }
                    output.push(Block::paragraph(paragraph));
                }
            }
            _ => {}
        }
    }

    fn join_ranges(
        &self,
        paragraph: &mut Vec<Inline>,
        path: &ItemPath,
        node: &ApiNode,
        ranges: &[TokenRange],
    ) {
        for (i, range) in ranges.iter().enumerate() {
            if i > 0 {
                paragraph.push(Inline::text(", "));
            }
            paragraph.extend(self.excerpt_inlines(path, node, *range));
        }
    }

    // -- Doc sections -------------------------------------------------------

    /// Child heading: plain at member granularity, otherwise one step below
    /// the container's heading with a trailing colon.
    fn append_heading(&self, output: &mut Section, path: &ItemPath, title: &str) {
        if self.granularity() == Granularity::Member {
            output.push(Block::heading(1, title));
            return;
        }
        let title = format!("{title}:");
        match path.header_level_child() {
            Some(level) => output.push(Block::heading(level, title)),
            None => output.push(Block::paragraph(vec![Inline::bold(title)])),
        }
    }

    fn append_table_heading(&self, output: &mut Section, path: &ItemPath, title: &str, line_breaks: bool) {
        if line_breaks {
            output.push(Block::LineBreak);
        }
        self.append_heading(output, path, title);
    }

    fn write_remarks(&self, output: &mut Section, path: &ItemPath, node: &ApiNode) {
        let Some(doc) = &node.doc else {
            return;
        };
        if let Some(remarks) = &doc.remarks {
            self.append_heading(output, path, "Remarks");
            output.extend(self.convert_section(path, remarks));
        }
        let examples: Vec<_> = doc.custom_blocks(tsdoc::EXAMPLE).collect();
        for (i, example) in examples.iter().enumerate() {
            let heading = if examples.len() > 1 {
                format!("Example {}", i + 1)
            } else {
                "Example".to_string()
            };
            self.append_heading(output, path, &heading);
            output.extend(self.convert_section(path, &example.content));
        }
    }

    fn write_default_value(&self, output: &mut Section, path: &ItemPath, node: &ApiNode) {
        if let Some(content) = single_default_value(node) {
            self.append_heading(output, path, "Default Value");
            output.extend(self.convert_section(path, content));
        }
    }

    fn write_throws(&self, output: &mut Section, path: &ItemPath, node: &ApiNode) {
        let Some(doc) = &node.doc else {
            return;
        };
        let blocks: Vec<_> = doc.custom_blocks(tsdoc::THROWS).collect();
        if blocks.is_empty() {
            return;
        }
        self.append_heading(output, path, "Exceptions");
        for block in blocks {
            output.extend(self.convert_section(path, &block.content));
        }
    }

    fn convert_section(&self, path: &ItemPath, section: &DocSection) -> Section {
        section
            .iter()
            .map(|block| match block {
                DocBlock::Paragraph(inlines) => Block::paragraph(self.convert_inlines(path, inlines)),
                DocBlock::FencedCode { language, code } => Block::code(language, code.as_str()),
            })
            .collect()
    }

    fn convert_inlines(&self, path: &ItemPath, inlines: &[DocInline]) -> Vec<Inline> {
        let mut out = Vec::with_capacity(inlines.len());
        for inline in inlines {
            match inline {
                DocInline::Text(text) => out.push(Inline::text(text.as_str())),
                DocInline::Code(code) => out.push(Inline::code(code.as_str())),
                DocInline::SoftBreak => out.push(Inline::SoftBreak),
                DocInline::Link {
                    destination: LinkDestination::Url(url),
                    text,
                } => out.push(Inline::link(text.as_deref().unwrap_or(url.as_str()), url.as_str())),
                DocInline::Link {
                    destination: LinkDestination::Declaration(reference),
                    text,
                } => match self.model.resolve_declaration(reference, Some(path.node())) {
                    Some(target) => {
                        let text = text
                            .clone()
                            .filter(|t| !t.is_empty())
                            .unwrap_or_else(|| self.model.scoped_name(target));
                        if text.is_empty() {
                            tracing::warn!(reference = %reference, "unable to determine link text");
                        } else {
                            out.push(Inline::link(text, self.link_to(path, target)));
                        }
                    }
                    None => {
                        tracing::warn!(reference = %reference, "unable to resolve reference");
                        out.push(Inline::text(text.as_deref().unwrap_or(reference.as_str())));
                    }
                },
            }
        }
        out
    }

    // -- Excerpts -----------------------------------------------------------

    fn link_to(&self, from: &ItemPath, to: NodeId) -> String {
        from.relative_link(&self.paths.path(to))
    }

    /// Excerpt tokens as text, hyperlinking references that resolve.
    fn excerpt_inlines(&self, path: &ItemPath, node: &ApiNode, range: TokenRange) -> Vec<Inline> {
        node.tokens(range)
            .iter()
            .map(|token| {
                let text = token.text.replace(['\r', '\n'], " ");
                let target = token
                    .canonical_reference
                    .as_deref()
                    .and_then(|r| self.model.resolve_canonical(r));
                match target {
                    Some(target) => Inline::link(text, self.link_to(path, target)),
                    None => Inline::text(text),
                }
            })
            .collect()
    }

    /// A type as a paragraph, or `(not declared)` when it is empty.
    fn type_paragraph(&self, path: &ItemPath, node: &ApiNode, range: Option<TokenRange>) -> Block {
        match range.filter(|r| !node.range_text(*r).is_empty()) {
            Some(range) => Block::paragraph(self.excerpt_inlines(path, node, range)),
            None => Block::text("(not declared)"),
        }
    }

    fn is_collapsed_interface(&self, id: NodeId) -> bool {
        self.paths.collapse_call_signatures && self.model.is_call_signature_interface(id)
    }
}

/// Items that carry a declaration excerpt.
fn is_declared(kind: ApiItemKind) -> bool {
    !matches!(
        kind,
        ApiItemKind::Model | ApiItemKind::Package | ApiItemKind::EntryPoint
    )
}

/// The `@defaultValue` content of a property, when there is exactly one.
fn single_default_value(node: &ApiNode) -> Option<&DocSection> {
    if !node.kind.is_property() {
        return None;
    }
    let doc = node.doc.as_ref()?;
    let mut blocks = doc.custom_blocks(tsdoc::DEFAULT_VALUE);
    match (blocks.next(), blocks.next()) {
        (Some(block), None) => Some(&block.content),
        _ => None,
    }
}

/// Append inline content to the trailing paragraph, starting one if needed.
fn append_in_paragraph(section: &mut Section, inlines: Vec<Inline>) {
    if let Some(Block::Paragraph(last)) = section.last_mut() {
        last.extend(inlines);
    } else {
        section.push(Block::Paragraph(inlines));
    }
}

/// Append `blocks`, merging a leading paragraph into the trailing paragraph.
fn append_and_merge(section: &mut Section, blocks: Section) {
    let mut blocks = blocks.into_iter();
    match blocks.next() {
        Some(Block::Paragraph(inlines)) => append_in_paragraph(section, inlines),
        Some(other) => section.push(other),
        None => return,
    }
    section.extend(blocks);
}
