//! Item paths: which file an item lands in, and its anchor inside that file.

use regex::Regex;
use std::sync::LazyLock;

use crate::collision::CollisionLookup;
use crate::kinds::{self, Granularity};
use crate::model::{ApiItemKind, ApiModel, NodeId};

static RE_UNSAFE_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_\-.]").unwrap());

/// Everything needed to compute paths and links for one generation run.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    pub model: &'a ApiModel,
    pub lookup: &'a CollisionLookup,
    pub granularity: Granularity,
    pub index_filename: &'a str,
    /// Lone call signatures render inside their interface's section.
    pub collapse_call_signatures: bool,
}

impl<'a> PathResolver<'a> {
    pub fn new(
        model: &'a ApiModel,
        lookup: &'a CollisionLookup,
        granularity: Granularity,
        index_filename: &'a str,
    ) -> Self {
        Self {
            model,
            lookup,
            granularity,
            index_filename,
            collapse_call_signatures: false,
        }
    }

    pub fn with_collapsed_call_signatures(mut self, collapse: bool) -> Self {
        self.collapse_call_signatures = collapse;
        self
    }

    /// True when `node` is folded into its parent interface's section.
    pub fn is_collapsed(&self, node: NodeId) -> bool {
        self.collapse_call_signatures && self.model.is_lone_call_signature(node)
    }

    pub fn path(&self, node: NodeId) -> ItemPath {
        ItemPath::new(self, node)
    }

    /// Link from the page `from` is rendered on to `to`.
    pub fn relative_link(&self, from: NodeId, to: NodeId) -> String {
        self.path(from).relative_link(&self.path(to))
    }
}

/// File and anchor segments of one item at one granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPath {
    node: NodeId,
    kind: ApiItemKind,
    granularity: Granularity,
    is_model: bool,
    collapsed: bool,
    index_filename: String,
    file_segments: Vec<String>,
    anchor_segments: Vec<String>,
}

impl ItemPath {
    /// Collapsed call signatures contribute no segment, so they share the
    /// path of their interface.
    pub fn new(resolver: &PathResolver<'_>, node: NodeId) -> Self {
        let model = resolver.model;
        let granularity = resolver.granularity;
        let mut file_segments = Vec::new();
        let mut anchor_segments = Vec::new();
        for ancestor in model.hierarchy(node) {
            let kind = model.kind(ancestor);
            if !kinds::is_included(kind)
                || kinds::is_skipped(kind)
                || kinds::is_ignored(kind)
                || resolver.is_collapsed(ancestor)
            {
                continue;
            }
            let component = path_component(model, resolver.lookup, ancestor);
            if granularity.is_file_level(kind) {
                file_segments.push(safe_filename(&component));
            } else {
                anchor_segments.push(component.to_lowercase());
            }
        }
        Self {
            node,
            kind: model.kind(node),
            granularity,
            is_model: node == model.root(),
            collapsed: resolver.is_collapsed(node),
            index_filename: resolver.index_filename.to_string(),
            file_segments,
            anchor_segments,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn file_segments(&self) -> &[String] {
        &self.file_segments
    }

    pub fn anchor_segments(&self) -> &[String] {
        &self.anchor_segments
    }

    pub fn has_anchor(&self) -> bool {
        !self.anchor_segments.is_empty()
    }

    pub fn is_file_level(&self) -> bool {
        !self.collapsed && self.granularity.is_file_level(self.kind)
    }

    pub fn is_file_level_exact(&self) -> bool {
        !self.collapsed && self.granularity.is_file_level_exact(self.kind)
    }

    /// True for a call signature folded into its interface's section.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// 0 anchors → 1, 1 → 3, deeper → 5.
    pub fn header_level(&self) -> u8 {
        match self.anchor_segments.len() {
            0 => 1,
            1 => 3,
            _ => 5,
        }
    }

    /// Heading level for a child group, or `None` when the child label
    /// should be a bold paragraph instead.
    pub fn header_level_child(&self) -> Option<u8> {
        match self.anchor_segments.len() {
            0 => Some(3),
            1 => Some(5),
            _ => None,
        }
    }

    /// Output file name. Items with no file-level ancestor (the Model, or
    /// everything at Model granularity) live in the index file.
    pub fn file_path(&self) -> String {
        if self.is_model || self.file_segments.is_empty() {
            format!("{}.md", self.index_filename)
        } else {
            format!("{}.md", self.file_segments.join("."))
        }
    }

    pub fn anchor_path(&self) -> String {
        self.anchor_segments.join(".")
    }

    pub fn external_link(&self) -> String {
        if self.has_anchor() {
            format!("./{}#{}", self.file_path(), self.anchor_path())
        } else {
            format!("./{}", self.file_path())
        }
    }

    /// Link from the file this path renders into to `target`.
    pub fn relative_link(&self, target: &ItemPath) -> String {
        if self.file_path() == target.file_path() {
            if target.has_anchor() {
                format!("#{}", target.anchor_path())
            } else {
                "./".to_string()
            }
        } else if target.is_model {
            format!("./{}.md", target.index_filename)
        } else {
            target.external_link()
        }
    }
}

/// Raw path component of a single item, before slugging.
fn path_component(model: &ApiModel, lookup: &CollisionLookup, id: NodeId) -> String {
    let node = model.node(id);
    if node.kind == ApiItemKind::CallSignature {
        return format!("call-{}", node.overload_index.unwrap_or(0));
    }

    let mut path = match node.kind {
        ApiItemKind::Package => match node.name.strip_prefix('@') {
            Some(scoped) => scoped.replacen('/', "$", 1),
            None => node.name.clone(),
        },
        _ => node.display_name().to_string(),
    };

    let overload = node
        .overload_index
        .filter(|i| node.kind.has_parameters() && *i > 1);
    if let Some(overload) = overload {
        path.push_str(&format!("_{}", overload - 1));
    } else if let Some(index) = lookup.name_index(id) {
        path.push_str(&format!("-{index}"));
    } else if let Some(index) = lookup.case_index(id) {
        path.push_str(&format!("~{index}"));
    }
    path
}

/// Lowercase and replace every character that is unsafe in a file name with `_`.
pub fn safe_filename(name: &str) -> String {
    RE_UNSAFE_FILENAME.replace_all(name, "_").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ApiNode;

    struct Fixture {
        model: ApiModel,
        pkg: NodeId,
        class: NodeId,
        method: NodeId,
        overloads: Vec<NodeId>,
    }

    fn fixture() -> Fixture {
        let mut model = ApiModel::new();
        let pkg = model.add(NodeId::ROOT, ApiItemKind::Package, "@acme/widgets");
        let ep = model.add(pkg, ApiItemKind::EntryPoint, "");
        let class = model.add(ep, ApiItemKind::Class, "Widget");
        let method = model.add_node(
            class,
            ApiNode {
                overload_index: Some(1),
                ..ApiNode::new(ApiItemKind::Method, "render")
            },
        );
        let overloads = (1..=3)
            .map(|i| {
                model.add_node(
                    ep,
                    ApiNode {
                        overload_index: Some(i),
                        ..ApiNode::new(ApiItemKind::Function, "load")
                    },
                )
            })
            .collect();
        Fixture {
            model,
            pkg,
            class,
            method,
            overloads,
        }
    }

    fn resolver<'a>(f: &'a Fixture, lookup: &'a CollisionLookup, g: Granularity) -> PathResolver<'a> {
        PathResolver::new(&f.model, lookup, g, "index")
    }

    #[test]
    fn member_granularity_splits_every_level() {
        let f = fixture();
        let lookup = CollisionLookup::build(&f.model);
        let paths = resolver(&f, &lookup, Granularity::Member);

        let method = paths.path(f.method);
        assert_eq!(method.file_segments(), ["acme_widgets", "widget", "render"]);
        assert!(!method.has_anchor());
        assert_eq!(method.file_path(), "acme_widgets.widget.render.md");
        assert_eq!(method.header_level(), 1);
    }

    #[test]
    fn export_granularity_anchors_members() {
        let f = fixture();
        let lookup = CollisionLookup::build(&f.model);
        let paths = resolver(&f, &lookup, Granularity::Export);

        let method = paths.path(f.method);
        assert_eq!(method.file_path(), "acme_widgets.widget.md");
        assert_eq!(method.anchor_path(), "render");
        assert_eq!(method.header_level(), 3);
        assert_eq!(method.header_level_child(), Some(5));
        assert_eq!(method.external_link(), "./acme_widgets.widget.md#render");
        assert!(!method.is_file_level());
        assert!(paths.path(f.class).is_file_level_exact());
        assert!(!paths.path(f.pkg).is_file_level_exact());
    }

    #[test]
    fn overload_suffixes() {
        let f = fixture();
        let lookup = CollisionLookup::build(&f.model);
        let paths = resolver(&f, &lookup, Granularity::Member);
        let files: Vec<String> = f.overloads.iter().map(|o| paths.path(*o).file_path()).collect();
        assert_eq!(
            files,
            [
                "acme_widgets.load.md",
                "acme_widgets.load_1.md",
                "acme_widgets.load_2.md"
            ]
        );
    }

    #[test]
    fn model_granularity_uses_index_file() {
        let f = fixture();
        let lookup = CollisionLookup::build(&f.model);
        let paths = resolver(&f, &lookup, Granularity::Model);

        let root = paths.path(NodeId::ROOT);
        assert_eq!(root.file_path(), "index.md");
        assert!(root.is_file_level());

        let method = paths.path(f.method);
        assert_eq!(method.file_path(), "index.md");
        assert_eq!(method.anchor_path(), "acme$widgets.widget.render");
        assert_eq!(method.header_level(), 5);
        assert_eq!(method.header_level_child(), None);
    }

    fn all_nodes(model: &ApiModel, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for member in model.members(id) {
            all_nodes(model, *member, out);
        }
    }

    #[test]
    fn finer_granularity_only_moves_anchors_into_files() {
        let mut f = fixture();
        let handler = f.model.add(f.class, ApiItemKind::Interface, "Handler");
        f.model.add(handler, ApiItemKind::CallSignature, "");
        let mut nodes = Vec::new();
        all_nodes(&f.model, NodeId::ROOT, &mut nodes);
        let lookup = CollisionLookup::build(&f.model);

        for collapse in [false, true] {
            for node in &nodes {
                let mut last_files = 0;
                let mut total = None;
                for g in Granularity::ALL {
                    let path = resolver(&f, &lookup, g)
                        .with_collapsed_call_signatures(collapse)
                        .path(*node);
                    let files = path.file_segments().len();
                    assert!(files >= last_files, "{g} {node:?}");
                    last_files = files;

                    let sum = files + path.anchor_segments().len();
                    assert_eq!(*total.get_or_insert(sum), sum, "{g} {node:?}");
                }
            }
        }
    }

    #[test]
    fn collapsed_call_signature_shares_interface_path() {
        let mut f = fixture();
        let handler = f.model.add(f.class, ApiItemKind::Interface, "Handler");
        let call = f.model.add(handler, ApiItemKind::CallSignature, "");
        let lookup = CollisionLookup::build(&f.model);

        let paths = resolver(&f, &lookup, Granularity::Member).with_collapsed_call_signatures(true);
        assert_eq!(paths.path(call).file_path(), paths.path(handler).file_path());
        assert!(!paths.path(call).is_file_level());
        assert!(paths.path(call).is_collapsed());
        assert_eq!(paths.relative_link(call, call), "./");

        let paths = resolver(&f, &lookup, Granularity::Member);
        assert!(paths.path(call).is_file_level());
        assert_eq!(paths.path(call).file_segments().last().map(String::as_str), Some("call-0"));
    }

    #[test]
    fn relative_links() {
        let f = fixture();
        let lookup = CollisionLookup::build(&f.model);
        let paths = resolver(&f, &lookup, Granularity::Export);

        assert_eq!(paths.relative_link(f.class, f.method), "#render");
        assert_eq!(paths.relative_link(f.method, f.class), "./");
        assert_eq!(paths.relative_link(f.class, f.pkg), "./acme_widgets.md");
        assert_eq!(paths.relative_link(f.class, NodeId::ROOT), "./index.md");
        assert_eq!(paths.relative_link(NodeId::ROOT, NodeId::ROOT), "./");

        let member = resolver(&f, &lookup, Granularity::Member);
        assert_eq!(
            member.relative_link(f.class, f.method),
            "./acme_widgets.widget.render.md"
        );
    }

    #[test]
    fn collision_suffixes() {
        let mut model = ApiModel::new();
        let pkg = model.add(NodeId::ROOT, ApiItemKind::Package, "pkg");
        let ep = model.add(pkg, ApiItemKind::EntryPoint, "");
        let iface = model.add(ep, ApiItemKind::Interface, "Opts");
        let lower = model.add(iface, ApiItemKind::PropertySignature, "foo");
        let upper = model.add(iface, ApiItemKind::PropertySignature, "Foo");
        let a = model.add(ep, ApiItemKind::Variable, "dup");
        let b = model.add(ep, ApiItemKind::Namespace, "dup");
        let call = model.add(iface, ApiItemKind::CallSignature, "");

        let lookup = CollisionLookup::build(&model);
        let paths = PathResolver::new(&model, &lookup, Granularity::Export, "index");
        assert_eq!(paths.path(lower).anchor_path(), "foo~0");
        assert_eq!(paths.path(upper).anchor_path(), "foo~1");
        assert_eq!(paths.path(a).file_path(), "pkg.dup-0.md");
        assert_eq!(paths.path(b).file_path(), "pkg.dup-1.md");
        assert_eq!(paths.path(call).anchor_path(), "call-0");

        let member = PathResolver::new(&model, &lookup, Granularity::Member, "index");
        assert_eq!(member.path(lower).file_path(), "pkg.opts.foo_0.md");
        assert_eq!(member.path(upper).file_path(), "pkg.opts.foo_1.md");
    }

    #[test]
    fn safe_filenames() {
        assert_eq!(safe_filename("My Widget<T>"), "my_widget_t_");
        assert_eq!(safe_filename("load_1"), "load_1");
        assert_eq!(safe_filename("dup-0"), "dup-0");
    }
}
