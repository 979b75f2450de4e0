//! API model: an arena of typed nodes loaded from `*.api.json` files.
//!
//! Node identity is the arena index ([`NodeId`]), assigned once during tree
//! construction. The renderer never mutates the tree.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::tsdoc::{self, DocComment};

/// Stable per-node id; node 0 is the Model root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// The closed set of item kinds an extractor can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ApiItemKind {
    Model,
    Package,
    Namespace,
    Class,
    Interface,
    Enum,
    EnumMember,
    Function,
    Variable,
    TypeAlias,
    Constructor,
    ConstructSignature,
    CallSignature,
    Method,
    MethodSignature,
    Property,
    PropertySignature,
    EntryPoint,
    IndexSignature,
    #[default]
    #[serde(other)]
    None,
}

impl ApiItemKind {
    /// Kinds that carry a parameter list (and therefore an overload index).
    pub fn has_parameters(self) -> bool {
        matches!(
            self,
            ApiItemKind::Constructor
                | ApiItemKind::ConstructSignature
                | ApiItemKind::CallSignature
                | ApiItemKind::Method
                | ApiItemKind::MethodSignature
                | ApiItemKind::Function
                | ApiItemKind::IndexSignature
        )
    }

    pub fn is_property(self) -> bool {
        matches!(self, ApiItemKind::Property | ApiItemKind::PropertySignature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ReleaseTag {
    None,
    Internal,
    Alpha,
    Beta,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ExcerptTokenKind {
    Content,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcerptToken {
    pub kind: ExcerptTokenKind,
    pub text: String,
    #[serde(default)]
    pub canonical_reference: Option<String>,
}

impl ExcerptToken {
    pub fn content(text: &str) -> Self {
        Self {
            kind: ExcerptTokenKind::Content,
            text: text.to_string(),
            canonical_reference: None,
        }
    }

    pub fn reference(text: &str, canonical_reference: &str) -> Self {
        Self {
            kind: ExcerptTokenKind::Reference,
            text: text.to_string(),
            canonical_reference: Some(canonical_reference.to_string()),
        }
    }
}

/// Half-open range into a node's excerpt tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl TokenRange {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_range: TokenRange,
    pub is_optional: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ApiNode {
    pub kind: ApiItemKind,
    pub name: String,
    pub parent: Option<NodeId>,
    pub members: Vec<NodeId>,
    pub canonical_reference: Option<String>,
    pub doc: Option<DocComment>,
    pub excerpt_tokens: Vec<ExcerptToken>,
    pub overload_index: Option<u32>,
    pub release_tag: Option<ReleaseTag>,
    pub is_optional: bool,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_protected: bool,
    pub is_abstract: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TokenRange>,
    pub property_type: Option<TokenRange>,
    pub initializer: Option<TokenRange>,
    pub extends: Vec<TokenRange>,
    pub implements: Vec<TokenRange>,
}

impl ApiNode {
    pub fn new(kind: ApiItemKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> &str {
        match self.kind {
            ApiItemKind::Constructor => "constructor",
            ApiItemKind::CallSignature => "(call)",
            ApiItemKind::ConstructSignature => "(new)",
            ApiItemKind::IndexSignature => "(indexer)",
            _ => &self.name,
        }
    }

    pub fn tokens(&self, range: TokenRange) -> &[ExcerptToken] {
        let end = range.end_index.min(self.excerpt_tokens.len());
        let start = range.start_index.min(end);
        &self.excerpt_tokens[start..end]
    }

    pub fn range_text(&self, range: TokenRange) -> String {
        self.tokens(range)
            .iter()
            .map(|t| t.text.as_str())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Text of the whole declaration excerpt.
    pub fn excerpt_text(&self) -> String {
        self.range_text(TokenRange::new(0, self.excerpt_tokens.len()))
    }

    pub fn is_beta(&self) -> bool {
        self.release_tag == Some(ReleaseTag::Beta)
    }
}

/// Result of [`ApiModel::members_with_inheritance`].
#[derive(Debug, Default)]
pub struct InheritedMembers {
    pub items: Vec<NodeId>,
    /// A heritage reference could not be followed; some members may be missing.
    pub maybe_incomplete: bool,
}

#[derive(Debug)]
pub struct ApiModel {
    nodes: Vec<ApiNode>,
    canonical: HashMap<String, NodeId>,
}

impl Default for ApiModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiModel {
    pub fn new() -> Self {
        Self {
            nodes: vec![ApiNode::new(ApiItemKind::Model, "")],
            canonical: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &ApiNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ApiNode {
        &mut self.nodes[id.0]
    }

    /// Attach `node` as the last member of `parent`.
    pub fn add_node(&mut self, parent: NodeId, mut node: ApiNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        if let Some(reference) = &node.canonical_reference {
            // Packages and their entry point share a reference; the first one wins.
            self.canonical.entry(reference.clone()).or_insert(id);
        }
        self.nodes.push(node);
        self.nodes[parent.0].members.push(id);
        id
    }

    pub fn add(&mut self, parent: NodeId, kind: ApiItemKind, name: &str) -> NodeId {
        self.add_node(parent, ApiNode::new(kind, name))
    }

    pub fn kind(&self, id: NodeId) -> ApiItemKind {
        self.node(id).kind
    }

    pub fn display_name(&self, id: NodeId) -> &str {
        self.node(id).display_name()
    }

    pub fn members(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).members
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Ancestor chain from the root down to `id` (inclusive).
    pub fn hierarchy(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    pub fn packages(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members(NodeId::ROOT)
            .iter()
            .copied()
            .filter(|id| self.kind(*id) == ApiItemKind::Package)
    }

    pub fn package_of(&self, id: NodeId) -> Option<NodeId> {
        self.hierarchy(id)
            .into_iter()
            .find(|a| self.kind(*a) == ApiItemKind::Package)
    }

    /// The exported members of a package: the members of its first entry point.
    pub fn entry_point_members(&self, package: NodeId) -> &[NodeId] {
        self.members(package)
            .iter()
            .find(|id| self.kind(**id) == ApiItemKind::EntryPoint)
            .map(|ep| self.members(*ep))
            .unwrap_or(&[])
    }

    /// Children as seen through transparent entry points.
    pub fn effective_members(&self, id: NodeId) -> Vec<NodeId> {
        if self.kind(id) == ApiItemKind::Package {
            self.members(id)
                .iter()
                .flat_map(|m| self.members(*m).iter().copied())
                .collect()
        } else {
            self.members(id).to_vec()
        }
    }

    /// Dotted name below the entry point, e.g. `Outer.Widget.render`.
    pub fn scoped_name(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            match self.kind(c) {
                ApiItemKind::Model | ApiItemKind::Package | ApiItemKind::EntryPoint => break,
                _ => parts.push(self.display_name(c)),
            }
            current = self.parent(c);
        }
        parts.reverse();
        parts.join(".")
    }

    /// `name(a, b)` for parameter-list kinds, the display name otherwise.
    pub fn concise_signature(&self, id: NodeId) -> String {
        let node = self.node(id);
        if node.kind.has_parameters() {
            let params: Vec<&str> = node.parameters.iter().map(|p| p.name.as_str()).collect();
            format!("{}({})", node.display_name(), params.join(", "))
        } else {
            node.display_name().to_string()
        }
    }

    pub fn excerpt_with_modifiers(&self, id: NodeId) -> String {
        let node = self.node(id);
        let excerpt = node.excerpt_text();
        let mut modifiers: Vec<&str> = Vec::new();
        if !excerpt.is_empty() {
            if node.is_protected {
                modifiers.push("protected");
            }
            if node.is_readonly && !excerpt.split_whitespace().any(|w| w == "readonly") {
                modifiers.push("readonly");
            }
            if node.is_static {
                modifiers.push("static");
            }
            if node.is_abstract {
                modifiers.push("abstract");
            }
        }
        if modifiers.is_empty() {
            excerpt
        } else {
            format!("{} {}", modifiers.join(" "), excerpt)
        }
    }

    pub fn is_event_property(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.kind.is_property()
            && node
                .doc
                .as_ref()
                .is_some_and(|d| d.has_modifier(tsdoc::EVENT_PROPERTY))
    }

    /// An interface that extends nothing and whose only member is a call
    /// signature. Such interfaces can be shown as a plain callable type.
    pub fn is_call_signature_interface(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.kind == ApiItemKind::Interface
            && node.extends.is_empty()
            && matches!(node.members.as_slice(), [only] if self.kind(*only) == ApiItemKind::CallSignature)
    }

    /// The call signature of a [call signature interface](Self::is_call_signature_interface).
    pub fn is_lone_call_signature(&self, id: NodeId) -> bool {
        self.kind(id) == ApiItemKind::CallSignature
            && self
                .parent(id)
                .is_some_and(|parent| self.is_call_signature_interface(parent))
    }

    /// Exact lookup of an excerpt token's canonical reference.
    pub fn resolve_canonical(&self, reference: &str) -> Option<NodeId> {
        self.canonical.get(reference).copied()
    }

    /// Resolve a `{@link}` declaration reference such as
    /// `my-package#Widget.render:member(1)` relative to `context`.
    pub fn resolve_declaration(&self, destination: &str, context: Option<NodeId>) -> Option<NodeId> {
        let destination = destination.trim();
        let (package_name, path) = match destination.split_once('#') {
            Some((pkg, path)) => (Some(pkg.trim()), path),
            None => (None, destination),
        };
        let components: Vec<&str> = path
            .split('.')
            .map(|c| {
                let c = c.trim().trim_matches(|ch| matches!(ch, '(' | ')' | '"' | '[' | ']'));
                c.split(':').next().unwrap_or(c)
            })
            .filter(|c| !c.is_empty())
            .collect();

        let mut candidates: Vec<NodeId> = Vec::new();
        match package_name {
            Some(name) => candidates.extend(
                self.packages()
                    .filter(|p| package_matches(self.display_name(*p), name)),
            ),
            None => {
                let home = context.and_then(|c| self.package_of(c));
                candidates.extend(home);
                candidates.extend(self.packages().filter(|p| Some(*p) != home));
            }
        }

        candidates
            .into_iter()
            .find_map(|pkg| self.walk_path(pkg, &components))
    }

    fn walk_path(&self, package: NodeId, components: &[&str]) -> Option<NodeId> {
        let Some((first, rest)) = components.split_first() else {
            return Some(package);
        };
        let mut current = *self
            .entry_point_members(package)
            .iter()
            .find(|m| self.display_name(**m) == *first)?;
        for component in rest {
            current = *self
                .members(current)
                .iter()
                .find(|m| self.display_name(**m) == *component)?;
        }
        Some(current)
    }

    /// Own members followed by members inherited through `extends` heritage.
    pub fn members_with_inheritance(&self, id: NodeId) -> InheritedMembers {
        let mut result = InheritedMembers::default();
        let mut seen: HashSet<(String, bool, ApiItemKind)> = HashSet::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        self.collect_inherited(id, &mut result, &mut seen, &mut visited);
        result
    }

    fn collect_inherited(
        &self,
        id: NodeId,
        result: &mut InheritedMembers,
        seen: &mut HashSet<(String, bool, ApiItemKind)>,
        visited: &mut HashSet<NodeId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        for member in self.members(id) {
            let node = self.node(*member);
            let key = (node.display_name().to_string(), node.is_static, node.kind);
            if seen.insert(key) {
                result.items.push(*member);
            }
        }
        let node = self.node(id);
        for range in &node.extends {
            let base = node
                .tokens(*range)
                .iter()
                .find_map(|t| t.canonical_reference.as_deref())
                .and_then(|r| self.resolve_canonical(r))
                .filter(|b| matches!(self.kind(*b), ApiItemKind::Class | ApiItemKind::Interface));
            match base {
                Some(base) => self.collect_inherited(base, result, seen, visited),
                None => result.maybe_incomplete = true,
            }
        }
    }
}

/// Strip the `@scope/` prefix of a package name.
pub fn unscoped_package_name(name: &str) -> &str {
    match name.strip_prefix('@').and_then(|rest| rest.split_once('/')) {
        Some((_, unscoped)) => unscoped,
        None => name,
    }
}

fn package_matches(package: &str, wanted: &str) -> bool {
    package == wanted || unscoped_package_name(package) == wanted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ApiModel, NodeId, NodeId, NodeId) {
        let mut model = ApiModel::new();
        let pkg = model.add_node(
            NodeId::ROOT,
            ApiNode {
                canonical_reference: Some("pkg!".into()),
                ..ApiNode::new(ApiItemKind::Package, "pkg")
            },
        );
        let ep = model.add_node(
            pkg,
            ApiNode {
                canonical_reference: Some("pkg!".into()),
                ..ApiNode::new(ApiItemKind::EntryPoint, "")
            },
        );
        let class = model.add_node(
            ep,
            ApiNode {
                canonical_reference: Some("pkg!Widget:class".into()),
                ..ApiNode::new(ApiItemKind::Class, "Widget")
            },
        );
        (model, pkg, ep, class)
    }

    #[test]
    fn hierarchy_is_root_first() {
        let (mut model, pkg, ep, class) = sample();
        let method = model.add(class, ApiItemKind::Method, "render");
        assert_eq!(
            model.hierarchy(method),
            vec![NodeId::ROOT, pkg, ep, class, method]
        );
        assert_eq!(model.scoped_name(method), "Widget.render");
    }

    #[test]
    fn display_names_of_unnamed_kinds() {
        let (mut model, _, _, class) = sample();
        let ctor = model.add(class, ApiItemKind::Constructor, "");
        let call = model.add(class, ApiItemKind::CallSignature, "");
        assert_eq!(model.display_name(ctor), "constructor");
        assert_eq!(model.display_name(call), "(call)");
    }

    #[test]
    fn canonical_reference_prefers_package_over_entry_point() {
        let (model, pkg, _, class) = sample();
        assert_eq!(model.resolve_canonical("pkg!"), Some(pkg));
        assert_eq!(model.resolve_canonical("pkg!Widget:class"), Some(class));
        assert_eq!(model.resolve_canonical("!Promise:interface"), None);
    }

    #[test]
    fn resolve_declaration_paths() {
        let (mut model, pkg, _, class) = sample();
        let method = model.add(class, ApiItemKind::Method, "render");
        assert_eq!(model.resolve_declaration("Widget", Some(class)), Some(class));
        assert_eq!(
            model.resolve_declaration("pkg#Widget.render:member(1)", None),
            Some(method)
        );
        assert_eq!(model.resolve_declaration("pkg#", None), Some(pkg));
        assert_eq!(model.resolve_declaration("Missing.thing", Some(class)), None);
    }

    #[test]
    fn concise_signature_lists_parameter_names() {
        let (mut model, _, _, class) = sample();
        let method = model.add(class, ApiItemKind::Method, "render");
        model.node_mut(method).parameters = vec![
            Parameter {
                name: "a".into(),
                type_range: TokenRange::new(0, 0),
                is_optional: false,
            },
            Parameter {
                name: "b".into(),
                type_range: TokenRange::new(0, 0),
                is_optional: true,
            },
        ];
        assert_eq!(model.concise_signature(method), "render(a, b)");
        assert_eq!(model.concise_signature(class), "Widget");
    }

    #[test]
    fn excerpt_modifiers_are_prefixed() {
        let (mut model, _, _, class) = sample();
        let prop = model.add(class, ApiItemKind::Property, "size");
        {
            let node = model.node_mut(prop);
            node.excerpt_tokens = vec![ExcerptToken::content("size: number;")];
            node.is_static = true;
            node.is_protected = true;
        }
        assert_eq!(
            model.excerpt_with_modifiers(prop),
            "protected static size: number;"
        );
    }

    #[test]
    fn inherited_members_follow_extends() {
        let (mut model, _, ep, class) = sample();
        model.add(class, ApiItemKind::Method, "render");
        let derived = model.add_node(
            ep,
            ApiNode {
                excerpt_tokens: vec![
                    ExcerptToken::content("class Fancy extends "),
                    ExcerptToken::reference("Widget", "pkg!Widget:class"),
                ],
                extends: vec![TokenRange::new(1, 2)],
                ..ApiNode::new(ApiItemKind::Class, "Fancy")
            },
        );
        let own = model.add(derived, ApiItemKind::Method, "sparkle");
        let result = model.members_with_inheritance(derived);
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0], own);
        assert!(!result.maybe_incomplete);
    }

    #[test]
    fn unresolved_heritage_is_incomplete() {
        let (mut model, _, _, class) = sample();
        {
            let node = model.node_mut(class);
            node.excerpt_tokens = vec![ExcerptToken::reference("Base", "other!Base:class")];
            node.extends = vec![TokenRange::new(0, 1)];
        }
        assert!(model.members_with_inheritance(class).maybe_incomplete);
    }

    #[test]
    fn lone_call_signatures() {
        let (mut model, _, ep, class) = sample();
        let handler = model.add(ep, ApiItemKind::Interface, "Handler");
        let call = model.add(handler, ApiItemKind::CallSignature, "");
        let other = model.add(class, ApiItemKind::CallSignature, "");
        assert!(model.is_call_signature_interface(handler));
        assert!(model.is_lone_call_signature(call));
        assert!(!model.is_lone_call_signature(other));

        model.add(handler, ApiItemKind::PropertySignature, "name");
        assert!(!model.is_call_signature_interface(handler));
        assert!(!model.is_lone_call_signature(call));
    }

    #[test]
    fn unscoped_names() {
        assert_eq!(unscoped_package_name("@scope/name"), "name");
        assert_eq!(unscoped_package_name("plain"), "plain");
    }
}
