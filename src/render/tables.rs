//! Member tables for each container kind, and the cells they are built from.

use crate::error::Result;
use crate::item_path::ItemPath;
use crate::kinds::Granularity;
use crate::markdown::{Block, Cell, Inline, Section, Table};
use crate::model::{ApiItemKind, ApiNode, NodeId};

use super::{append_and_merge, append_in_paragraph, single_default_value, MarkdownDocumenter};

const INCOMPLETE_WARNING: &str = "(Some inherited members may not be shown because they are not represented in the documentation.)";

/// One titled table plus the items whose pages follow it.
struct TableGroup {
    title: &'static str,
    table: Table,
    items: Vec<NodeId>,
}

impl TableGroup {
    fn new(title: &'static str, header: &[&str]) -> Self {
        Self {
            title,
            table: Table::new(header),
            items: Vec::new(),
        }
    }

    /// Add a row; `item` is rendered after the table unless it is inherited.
    fn add(&mut self, row: Vec<Cell>, item: NodeId, inherited: bool) {
        self.table.add_row(row);
        if !inherited {
            self.items.push(item);
        }
    }
}

impl MarkdownDocumenter<'_> {
    fn write_groups(
        &mut self,
        output: &mut Section,
        path: &ItemPath,
        groups: Vec<TableGroup>,
        use_rule: bool,
        line_breaks: bool,
    ) -> Result<()> {
        for group in groups {
            if group.table.is_empty() {
                continue;
            }
            self.append_table_heading(output, path, group.title, line_breaks);
            output.push(Block::Table(group.table));
            self.write_pages(&group.items, output, use_rule, line_breaks)?;
        }
        Ok(())
    }

    fn use_rule(&self, path: &ItemPath) -> bool {
        self.config.markdown_options.show_rules && path.is_file_level_exact()
    }

    fn property_header(&self) -> &'static [&'static str] {
        if self.config.markdown_options.show_property_defaults {
            &["Property", "Modifiers", "Type", "Default", "Description"]
        } else {
            &["Property", "Modifiers", "Type", "Description"]
        }
    }

    pub(super) fn write_model_table(&mut self, output: &mut Section, path: &ItemPath) -> Result<()> {
        let model = self.model;
        let mut packages = TableGroup::new("Packages", &["Package", "Description"]);
        packages.table.skip_empty_columns = self.config.markdown_options.hide_empty_table_columns;
        for member in model.members(model.root()) {
            if model.kind(*member) == ApiItemKind::Package {
                let row = vec![
                    self.title_cell(path, *member),
                    self.description_cell(path, *member, false),
                ];
                packages.add(row, *member, false);
            }
        }

        let use_rule = self.use_rule(path);
        if use_rule {
            output.push(Block::HorizontalRule);
        }
        self.write_groups(output, path, vec![packages], use_rule, false)
    }

    pub(super) fn write_package_or_namespace_tables(
        &mut self,
        output: &mut Section,
        path: &ItemPath,
        id: NodeId,
    ) -> Result<()> {
        let model = self.model;
        let mut classes = TableGroup::new("Classes", &["Class", "Description"]);
        let mut enums = TableGroup::new("Enumerations", &["Enumeration", "Description"]);
        let mut functions = TableGroup::new("Functions", &["Function", "Description"]);
        let mut collapsed = TableGroup::new("Call Signatures", &["Call Signature", "Description"]);
        let mut interfaces = TableGroup::new("Interfaces", &["Interface", "Description"]);
        let mut namespaces = TableGroup::new("Namespaces", &["Namespace", "Description"]);
        let mut type_aliases = TableGroup::new("Type Aliases", &["Type Alias", "Description"]);
        let mut variables = TableGroup::new("Variables", &["Variable", "Description"]);

        let members = match model.kind(id) {
            ApiItemKind::Package => model.entry_point_members(id),
            _ => model.members(id),
        };
        for member in members {
            let group = match model.kind(*member) {
                ApiItemKind::Class => &mut classes,
                ApiItemKind::Enum => &mut enums,
                ApiItemKind::Interface if self.is_collapsed_interface(*member) => &mut collapsed,
                ApiItemKind::Interface => &mut interfaces,
                ApiItemKind::Namespace => &mut namespaces,
                ApiItemKind::Function => &mut functions,
                ApiItemKind::TypeAlias => &mut type_aliases,
                ApiItemKind::Variable => &mut variables,
                _ => continue,
            };
            let row = vec![
                self.title_cell(path, *member),
                self.description_cell(path, *member, false),
            ];
            group.add(row, *member, false);
        }

        let use_rule = self.use_rule(path);
        if use_rule {
            output.push(Block::HorizontalRule);
        }
        let line_breaks = self.config.markdown_options.show_line_breaks
            && !matches!(self.granularity(), Granularity::Export | Granularity::Member);
        let groups = vec![
            classes,
            enums,
            functions,
            collapsed,
            interfaces,
            namespaces,
            type_aliases,
            variables,
        ];
        self.write_groups(output, path, groups, use_rule, line_breaks)
    }

    pub(super) fn write_class_tables(&mut self, output: &mut Section, path: &ItemPath, id: NodeId) -> Result<()> {
        let model = self.model;
        let mut events = TableGroup::new("Events", &["Property", "Modifiers", "Type", "Description"]);
        let mut constructors = TableGroup::new("Constructors", &["Constructor", "Modifiers", "Description"]);
        let mut properties = TableGroup::new("Properties", self.property_header());
        let mut methods = TableGroup::new("Methods", &["Method", "Modifiers", "Description"]);

        for member in self.members_with_warning(output, id) {
            let inherited = model.parent(member) != Some(id);
            match model.kind(member) {
                ApiItemKind::Constructor => {
                    let row = vec![
                        self.title_cell(path, member),
                        self.modifiers_cell(member),
                        self.description_cell(path, member, inherited),
                    ];
                    constructors.add(row, member, inherited);
                }
                ApiItemKind::Method => {
                    let row = vec![
                        self.title_cell(path, member),
                        self.modifiers_cell(member),
                        self.description_cell(path, member, inherited),
                    ];
                    methods.add(row, member, inherited);
                }
                ApiItemKind::Property if model.is_event_property(member) => {
                    let row = self.property_row(path, member, inherited, false);
                    events.add(row, member, inherited);
                }
                ApiItemKind::Property => {
                    let defaults = self.config.markdown_options.show_property_defaults;
                    let row = self.property_row(path, member, inherited, defaults);
                    properties.add(row, member, inherited);
                }
                _ => {}
            }
        }

        let use_rule = self.use_rule(path);
        if use_rule {
            output.push(Block::HorizontalRule);
        }
        let line_breaks =
            self.config.markdown_options.show_line_breaks && self.granularity() != Granularity::Member;
        let groups = vec![events, constructors, properties, methods];
        self.write_groups(output, path, groups, use_rule, line_breaks)
    }

    pub(super) fn write_enum_tables(&mut self, output: &mut Section, path: &ItemPath, id: NodeId) -> Result<()> {
        let model = self.model;
        let mut members = TableGroup::new("Enumeration Members", &["Member", "Value", "Description"]);
        for member in model.members(id) {
            if model.kind(*member) != ApiItemKind::EnumMember {
                continue;
            }
            let row = vec![
                self.title_cell(path, *member),
                self.initializer_cell(model.node(*member)),
                self.description_cell(path, *member, false),
            ];
            members.add(row, *member, false);
        }

        let use_rule = self.use_rule(path);
        if use_rule {
            output.push(Block::HorizontalRule);
        }
        let line_breaks =
            self.config.markdown_options.show_line_breaks && self.granularity() != Granularity::Member;
        self.write_groups(output, path, vec![members], use_rule, line_breaks)
    }

    pub(super) fn write_interface_tables(
        &mut self,
        output: &mut Section,
        path: &ItemPath,
        id: NodeId,
    ) -> Result<()> {
        let model = self.model;
        if self.is_collapsed_interface(id) {
            return self.write_page(model.members(id)[0], Some(output));
        }

        let mut events = TableGroup::new("Events", &["Property", "Modifiers", "Type", "Description"]);
        let mut properties = TableGroup::new("Properties", self.property_header());
        let mut methods = TableGroup::new("Methods", &["Method", "Description"]);
        let mut calls = TableGroup::new("Call Signatures", &["Call Signature", "Description"]);

        for member in self.members_with_warning(output, id) {
            let inherited = model.parent(member) != Some(id);
            match model.kind(member) {
                ApiItemKind::ConstructSignature | ApiItemKind::MethodSignature => {
                    let row = vec![
                        self.title_cell(path, member),
                        self.description_cell(path, member, inherited),
                    ];
                    methods.add(row, member, inherited);
                }
                ApiItemKind::CallSignature => {
                    let row = vec![
                        self.title_cell(path, member),
                        self.description_cell(path, member, inherited),
                    ];
                    calls.add(row, member, inherited);
                }
                ApiItemKind::PropertySignature if model.is_event_property(member) => {
                    let row = self.property_row(path, member, inherited, false);
                    events.add(row, member, inherited);
                }
                ApiItemKind::PropertySignature => {
                    let defaults = self.config.markdown_options.show_property_defaults;
                    let row = self.property_row(path, member, inherited, defaults);
                    properties.add(row, member, inherited);
                }
                _ => {}
            }
        }

        let use_rule = self.use_rule(path);
        if use_rule {
            output.push(Block::HorizontalRule);
        }
        let line_breaks =
            self.config.markdown_options.show_line_breaks && self.granularity() != Granularity::Member;
        let mut groups = vec![events, properties, methods];
        if self.config.markdown_options.show_call_signatures {
            groups.push(calls);
        }
        self.write_groups(output, path, groups, use_rule, line_breaks)
    }

    pub(super) fn write_parameter_tables(&self, output: &mut Section, path: &ItemPath, node: &ApiNode) {
        let mut table = Table::new(&["Parameter", "Type", "Description"]);
        for parameter in &node.parameters {
            let mut description = Section::new();
            if parameter.is_optional {
                append_in_paragraph(
                    &mut description,
                    vec![Inline::italic("(Optional)"), Inline::text(" ")],
                );
            }
            if let Some(content) = node.doc.as_ref().and_then(|d| d.param(&parameter.name)) {
                append_and_merge(&mut description, self.convert_section(path, content));
            }
            table.add_row(vec![
                vec![Block::text(parameter.name.as_str())],
                vec![self.type_paragraph(path, node, Some(parameter.type_range))],
                description,
            ]);
        }
        if !table.is_empty() {
            self.append_heading(output, path, "Parameters");
            output.push(Block::Table(table));
        }

        if node.return_type.is_some() {
            output.push(Block::paragraph(vec![Inline::bold("Returns:")]));
            output.push(self.type_paragraph(path, node, node.return_type));
            if let Some(returns) = node.doc.as_ref().and_then(|d| d.returns.as_ref()) {
                output.extend(self.convert_section(path, returns));
            }
        }
    }

    /// Members to tabulate, following heritage when inherited members are shown.
    fn members_with_warning(&self, output: &mut Section, id: NodeId) -> Vec<NodeId> {
        if !self.config.show_inherited_members {
            return self.model.members(id).to_vec();
        }
        let result = self.model.members_with_inheritance(id);
        if result.maybe_incomplete {
            output.push(Block::paragraph(vec![Inline::italic(INCOMPLETE_WARNING)]));
        }
        result.items
    }

    // -- Cells --------------------------------------------------------------

    fn property_row(&self, path: &ItemPath, id: NodeId, inherited: bool, defaults: bool) -> Vec<Cell> {
        let node = self.model.node(id);
        let mut row = vec![
            self.title_cell(path, id),
            self.modifiers_cell(id),
            vec![self.type_paragraph(path, node, node.property_type)],
        ];
        if defaults {
            let default = single_default_value(node)
                .map(|content| self.convert_section(path, content))
                .unwrap_or_default();
            row.push(default);
        }
        row.push(self.description_cell(path, id, inherited));
        row
    }

    fn title_cell(&self, path: &ItemPath, id: NodeId) -> Cell {
        let node = self.model.node(id);
        let mut text = match node.kind {
            ApiItemKind::CallSignature => format!("call-{}", node.overload_index.unwrap_or(0)),
            _ => self.model.concise_signature(id),
        };
        if node.is_optional {
            text.push('?');
        }
        vec![Block::paragraph(vec![Inline::link(text, self.link_to(path, id))])]
    }

    fn description_cell(&self, path: &ItemPath, id: NodeId, inherited: bool) -> Cell {
        let model = self.model;
        let node = model.node(id);
        let mut cell = Section::new();
        if node.is_beta() {
            append_in_paragraph(&mut cell, vec![Inline::bold_italic("(BETA)"), Inline::text(" ")]);
        }
        if node.is_optional {
            append_in_paragraph(&mut cell, vec![Inline::italic("(Optional)"), Inline::text(" ")]);
        }
        if let Some(doc) = &node.doc {
            append_and_merge(&mut cell, self.convert_section(path, &doc.summary));
        }
        if let Some(parent) = model.parent(id).filter(|_| inherited) {
            cell.push(Block::paragraph(vec![
                Inline::text("(Inherited from "),
                Inline::link(model.display_name(parent), self.link_to(path, parent)),
                Inline::text(")"),
            ]));
        }
        cell
    }

    fn modifiers_cell(&self, id: NodeId) -> Cell {
        let node = self.model.node(id);
        [
            (node.is_protected, "protected"),
            (node.is_readonly, "readonly"),
            (node.is_static, "static"),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .map(|(_, modifier)| Block::paragraph(vec![Inline::code(modifier)]))
        .collect()
    }

    fn initializer_cell(&self, node: &ApiNode) -> Cell {
        match node.initializer {
            Some(range) => vec![Block::paragraph(vec![Inline::code(node.range_text(range))])],
            None => Vec::new(),
        }
    }
}
