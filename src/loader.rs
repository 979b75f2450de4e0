//! Reads `*.api.json` files into an [`ApiModel`].

use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DocumenterError, Result};
use crate::model::{ApiItemKind, ApiModel, ApiNode, ExcerptToken, NodeId, Parameter, ReleaseTag, TokenRange};
use crate::model::unscoped_package_name;
use crate::tsdoc::DocComment;

/// One item as serialized by the extractor. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    kind: ApiItemKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    canonical_reference: Option<String>,
    #[serde(default)]
    doc_comment: Option<String>,
    #[serde(default)]
    excerpt_tokens: Vec<ExcerptToken>,
    #[serde(default)]
    members: Vec<RawItem>,
    #[serde(default)]
    overload_index: Option<u32>,
    #[serde(default)]
    release_tag: Option<ReleaseTag>,
    #[serde(default)]
    is_optional: bool,
    #[serde(default)]
    is_static: bool,
    #[serde(default)]
    is_readonly: bool,
    #[serde(default)]
    is_protected: bool,
    #[serde(default)]
    is_abstract: bool,
    #[serde(default)]
    parameters: Vec<RawParameter>,
    #[serde(default)]
    return_type_token_range: Option<TokenRange>,
    #[serde(default)]
    property_type_token_range: Option<TokenRange>,
    #[serde(default)]
    initializer_token_range: Option<TokenRange>,
    /// Classes have a single base class.
    #[serde(default)]
    extends_token_range: Option<TokenRange>,
    /// Interfaces may extend several.
    #[serde(default)]
    extends_token_ranges: Vec<TokenRange>,
    #[serde(default)]
    implements_token_ranges: Vec<TokenRange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameter {
    parameter_name: String,
    parameter_type_token_range: TokenRange,
    #[serde(default)]
    is_optional: bool,
}

impl RawItem {
    fn into_node(self, model: &mut ApiModel, parent: NodeId) {
        let doc = self
            .doc_comment
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(DocComment::parse);
        let mut extends: Vec<TokenRange> = self.extends_token_range.into_iter().collect();
        extends.extend(self.extends_token_ranges);

        let node = ApiNode {
            kind: self.kind,
            name: self.name,
            parent: None,
            members: Vec::new(),
            canonical_reference: self.canonical_reference,
            doc,
            excerpt_tokens: self.excerpt_tokens,
            overload_index: self.overload_index,
            release_tag: self.release_tag,
            is_optional: self.is_optional,
            is_static: self.is_static,
            is_readonly: self.is_readonly,
            is_protected: self.is_protected,
            is_abstract: self.is_abstract,
            parameters: self
                .parameters
                .into_iter()
                .map(|p| Parameter {
                    name: p.parameter_name,
                    type_range: p.parameter_type_token_range,
                    is_optional: p.is_optional,
                })
                .collect(),
            return_type: self.return_type_token_range,
            property_type: self.property_type_token_range,
            initializer: self.initializer_token_range,
            extends,
            implements: self.implements_token_ranges,
        };
        let id = model.add_node(parent, node);
        for member in self.members {
            member.into_node(model, id);
        }
    }
}

/// Include/exclude glob patterns applied to package names.
///
/// A package is kept when it matches any include pattern (or there are
/// none) and matches no exclude pattern. Patterns are tried against both
/// the full and the unscoped name.
#[derive(Debug, Default)]
pub struct PackageFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PackageFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn allows(&self, name: &str) -> bool {
        let matches = |p: &Pattern| p.matches(name) || p.matches(unscoped_package_name(name));
        (self.include.is_empty() || self.include.iter().any(matches))
            && !self.exclude.iter().any(matches)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| DocumenterError::Config(format!("bad package pattern {p:?}: {e}")))
        })
        .collect()
}

fn parse_package(path: &Path, content: &str) -> Result<RawItem> {
    let raw: RawItem = serde_json::from_str(content).map_err(|source| DocumenterError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.kind != ApiItemKind::Package {
        return Err(DocumenterError::Config(format!(
            "{} does not contain a package (found {:?})",
            path.display(),
            raw.kind
        )));
    }
    Ok(raw)
}

/// Parse a single `.api.json` document and attach its package to the model root.
pub fn load_package_str(model: &mut ApiModel, path: &Path, content: &str) -> Result<NodeId> {
    let raw = parse_package(path, content)?;
    raw.into_node(model, NodeId::ROOT);
    Ok(*model
        .members(NodeId::ROOT)
        .last()
        .ok_or_else(|| DocumenterError::Config(format!("{} produced no package", path.display())))?)
}

/// Load every `*.api.json` in `folder` (sorted by file name) that passes `filter`.
pub fn load_folder(model: &mut ApiModel, folder: &Path, filter: &PackageFilter) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(DocumenterError::InputFolderMissing(folder.to_path_buf()));
    }
    let entries = fs::read_dir(folder)
        .map_err(|e| DocumenterError::io(format!("failed to read {}", folder.display()), e))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DocumenterError::io(format!("failed to read {}", folder.display()), e))?;
        let path = entry.path();
        let is_api_json = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".api.json"));
        if is_api_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut loaded = Vec::new();
    for path in files {
        let content = fs::read_to_string(&path)
            .map_err(|e| DocumenterError::io(format!("failed to read {}", path.display()), e))?;
        let raw = parse_package(&path, &content)?;
        if !filter.allows(&raw.name) {
            tracing::warn!(package = %raw.name, "skipping filtered package");
            continue;
        }
        tracing::info!(file = %path.display(), "reading");
        raw.into_node(model, NodeId::ROOT);
        loaded.push(path);
    }
    Ok(loaded)
}
