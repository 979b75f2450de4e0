//! Collision index: per-sibling disambiguation numbers for duplicate names.
//!
//! Built once per run by a pre-order walk of the whole model. Two siblings
//! with the same display name get a name index (`-N` suffix); siblings whose
//! names differ only by case get a case index (`~N` suffix). A plain overload
//! set is left alone since the overload suffix already tells its members apart.

use std::collections::{HashMap, HashSet};

use crate::model::{ApiItemKind, ApiModel, NodeId};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollisionLookup {
    name: HashMap<NodeId, usize>,
    case: HashMap<NodeId, usize>,
}

impl CollisionLookup {
    pub fn build(model: &ApiModel) -> Self {
        let mut lookup = Self::default();
        lookup.visit(model, model.root());
        lookup
    }

    pub fn name_index(&self, id: NodeId) -> Option<usize> {
        self.name.get(&id).copied()
    }

    pub fn case_index(&self, id: NodeId) -> Option<usize> {
        self.case.get(&id).copied()
    }

    fn visit(&mut self, model: &ApiModel, id: NodeId) {
        // Entry point members are indexed through their package.
        let kind = model.kind(id);
        if id != model.root() && kind != ApiItemKind::EntryPoint {
            self.index_siblings(model, &model.effective_members(id));
        }
        for member in model.members(id) {
            self.visit(model, *member);
        }
    }

    fn index_siblings(&mut self, model: &ApiModel, children: &[NodeId]) {
        for group in group_by(children, |c| model.display_name(*c).to_string()) {
            if group.len() > 1 && !is_overload_set(model, &group) {
                for (i, child) in group.iter().enumerate() {
                    self.name.insert(*child, i);
                }
            }
        }

        let remaining: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|c| !self.name.contains_key(c))
            .collect();
        for bucket in group_by(&remaining, |c| model.display_name(*c).to_lowercase()) {
            let distinct: HashSet<&str> = bucket.iter().map(|c| model.display_name(*c)).collect();
            if distinct.len() > 1 {
                for (i, child) in bucket.iter().enumerate() {
                    self.case.insert(*child, i);
                }
            }
        }
    }
}

/// Group ids by key, keeping first-seen key order and sibling order within a group.
fn group_by(ids: &[NodeId], key: impl Fn(&NodeId) -> String) -> Vec<Vec<NodeId>> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<NodeId>> = Vec::new();
    for id in ids {
        let slot = *positions.entry(key(id)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(*id);
    }
    groups
}

fn is_overload_set(model: &ApiModel, group: &[NodeId]) -> bool {
    let mut seen = HashSet::new();
    group.iter().all(|id| {
        let node = model.node(*id);
        node.kind.has_parameters()
            && node
                .overload_index
                .is_some_and(|overload| seen.insert(overload))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ApiNode;

    fn package(model: &mut ApiModel) -> NodeId {
        let pkg = model.add(NodeId::ROOT, ApiItemKind::Package, "pkg");
        model.add(pkg, ApiItemKind::EntryPoint, "")
    }

    fn overload(model: &mut ApiModel, parent: NodeId, name: &str, index: u32) -> NodeId {
        model.add_node(
            parent,
            ApiNode {
                overload_index: Some(index),
                ..ApiNode::new(ApiItemKind::Function, name)
            },
        )
    }

    #[test]
    fn duplicate_names_get_name_indices() {
        let mut model = ApiModel::new();
        let ep = package(&mut model);
        let a = model.add(ep, ApiItemKind::Class, "Thing");
        let b = model.add(ep, ApiItemKind::Namespace, "Thing");
        let other = model.add(ep, ApiItemKind::Class, "Other");

        let lookup = CollisionLookup::build(&model);
        assert_eq!(lookup.name_index(a), Some(0));
        assert_eq!(lookup.name_index(b), Some(1));
        assert_eq!(lookup.name_index(other), None);
        assert_eq!(lookup.case_index(a), None);
    }

    #[test]
    fn case_only_clash_gets_case_indices() {
        let mut model = ApiModel::new();
        let ep = package(&mut model);
        let iface = model.add(ep, ApiItemKind::Interface, "Opts");
        let lower = model.add(iface, ApiItemKind::PropertySignature, "foo");
        let upper = model.add(iface, ApiItemKind::PropertySignature, "Foo");

        let lookup = CollisionLookup::build(&model);
        assert_eq!(lookup.case_index(lower), Some(0));
        assert_eq!(lookup.case_index(upper), Some(1));
        assert_eq!(lookup.name_index(lower), None);
    }

    #[test]
    fn name_duplicates_are_not_case_indexed() {
        let mut model = ApiModel::new();
        let ep = package(&mut model);
        let a = model.add(ep, ApiItemKind::Variable, "item");
        let b = model.add(ep, ApiItemKind::Namespace, "item");
        let c = model.add(ep, ApiItemKind::Class, "Item");

        let lookup = CollisionLookup::build(&model);
        assert_eq!(lookup.name_index(a), Some(0));
        assert_eq!(lookup.name_index(b), Some(1));
        assert_eq!(lookup.case_index(a), None);
        assert_eq!(lookup.case_index(b), None);
        // Alone in its case bucket once the exact duplicates are removed.
        assert_eq!(lookup.case_index(c), None);
    }

    #[test]
    fn overload_sets_are_not_collisions() {
        let mut model = ApiModel::new();
        let ep = package(&mut model);
        let ids: Vec<NodeId> = (1..=3).map(|i| overload(&mut model, ep, "load", i)).collect();

        let lookup = CollisionLookup::build(&model);
        for id in ids {
            assert_eq!(lookup.name_index(id), None);
            assert_eq!(lookup.case_index(id), None);
        }
    }

    #[test]
    fn grandchildren_are_indexed_recursively() {
        let mut model = ApiModel::new();
        let ep = package(&mut model);
        let ns = model.add(ep, ApiItemKind::Namespace, "Outer");
        let inner = model.add(ns, ApiItemKind::Class, "Inner");
        let a = model.add(inner, ApiItemKind::Property, "x");
        let b = model.add(inner, ApiItemKind::Method, "x");

        let lookup = CollisionLookup::build(&model);
        assert_eq!(lookup.name_index(a), Some(0));
        assert_eq!(lookup.name_index(b), Some(1));
    }

    #[test]
    fn deterministic_across_builds() {
        let mut model = ApiModel::new();
        let ep = package(&mut model);
        for name in ["a", "A", "b", "a", "B"] {
            model.add(ep, ApiItemKind::Variable, name);
        }
        assert_eq!(CollisionLookup::build(&model), CollisionLookup::build(&model));
    }
}
