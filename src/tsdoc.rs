//! Doc comment AST: a small TSDoc block parser.
//!
//! Only the structure the page renderer consumes is modelled: the summary
//! section, the standard block tags, `@param` blocks, modifier tags and
//! inline `{@link}` tags. Everything else is carried through as plain text.

use regex::Regex;
use std::sync::LazyLock;

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][A-Za-z0-9]*)(?:\s+(.*))?$").unwrap());

static RE_PARAM_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_$][\w$.]*)\s*(?:-\s*)?(.*)$").unwrap());

/// Block tags with dedicated slots on [`DocComment`].
const REMARKS: &str = "@remarks";
const DEPRECATED: &str = "@deprecated";
const RETURNS: &str = "@returns";
const PARAM: &str = "@param";
const TYPE_PARAM: &str = "@typeParam";
const PRIVATE_REMARKS: &str = "@privateRemarks";

pub const EXAMPLE: &str = "@example";
pub const THROWS: &str = "@throws";
pub const DEFAULT_VALUE: &str = "@defaultValue";
pub const DECORATOR: &str = "@decorator";

/// Modifier tags: they carry no content, only presence.
const MODIFIER_TAGS: &[&str] = &[
    "@alpha",
    "@beta",
    "@public",
    "@internal",
    "@eventProperty",
    "@packageDocumentation",
    "@override",
    "@virtual",
    "@sealed",
    "@readonly",
    "@experimental",
];

pub const EVENT_PROPERTY: &str = "@eventProperty";

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocInline {
    Text(String),
    Code(String),
    Link {
        destination: LinkDestination,
        text: Option<String>,
    },
    SoftBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDestination {
    Url(String),
    /// A declaration reference such as `my-package#Widget.render`.
    Declaration(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocBlock {
    Paragraph(Vec<DocInline>),
    FencedCode { language: String, code: String },
}

pub type DocSection = Vec<DocBlock>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBlock {
    pub name: String,
    pub content: DocSection,
}

/// A block tag without a dedicated slot, kept in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomBlock {
    pub tag: String,
    pub content: DocSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub summary: DocSection,
    pub remarks: Option<DocSection>,
    pub deprecated: Option<DocSection>,
    pub returns: Option<DocSection>,
    pub params: Vec<ParamBlock>,
    pub blocks: Vec<CustomBlock>,
    pub modifiers: Vec<String>,
}

enum Target {
    Summary,
    Remarks,
    Deprecated,
    Returns,
    Param(String),
    Custom(String),
    Discard,
}

impl DocComment {
    /// Parse a raw `/** ... */` comment.
    pub fn parse(raw: &str) -> Self {
        let mut comment = DocComment::default();
        let mut target = Target::Summary;
        let mut lines: Vec<String> = Vec::new();
        let mut in_fence = false;

        for line in comment_lines(raw) {
            let trimmed = line.trim();
            if trimmed.starts_with("```") {
                in_fence = !in_fence;
                lines.push(line);
                continue;
            }
            if in_fence {
                lines.push(line);
                continue;
            }

            let Some(caps) = RE_TAG_LINE.captures(trimmed) else {
                lines.push(line);
                continue;
            };
            let tag = format!("@{}", &caps[1]);
            let rest = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();

            if let Some(modifier) = MODIFIER_TAGS.iter().find(|m| m.eq_ignore_ascii_case(&tag)) {
                comment.modifiers.push((*modifier).to_string());
                if !rest.is_empty() {
                    lines.push(rest);
                }
                continue;
            }

            comment.finish(target, &lines);
            lines.clear();
            target = match tag.as_str() {
                REMARKS => Target::Remarks,
                DEPRECATED => Target::Deprecated,
                RETURNS => Target::Returns,
                PRIVATE_REMARKS | TYPE_PARAM => Target::Discard,
                PARAM => {
                    let (name, first) = split_param_head(&rest);
                    if !first.is_empty() {
                        lines.push(first);
                    }
                    Target::Param(name)
                }
                _ => Target::Custom(tag.clone()),
            };
            if !matches!(target, Target::Param(_)) && !rest.is_empty() {
                lines.push(rest);
            }
        }
        comment.finish(target, &lines);
        comment
    }

    fn finish(&mut self, target: Target, lines: &[String]) {
        let section = parse_section(lines);
        match target {
            Target::Summary => self.summary = section,
            Target::Remarks => self.remarks = Some(section),
            Target::Deprecated => self.deprecated = Some(section),
            Target::Returns => self.returns = Some(section),
            Target::Param(name) => self.params.push(ParamBlock {
                name,
                content: section,
            }),
            Target::Custom(tag) => self.blocks.push(CustomBlock {
                tag,
                content: section,
            }),
            Target::Discard => {}
        }
    }

    /// Custom blocks with the given tag (case-insensitive), in source order.
    pub fn custom_blocks<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a CustomBlock> + 'a {
        self.blocks
            .iter()
            .filter(move |b| b.tag.eq_ignore_ascii_case(tag))
    }

    pub fn has_modifier(&self, tag: &str) -> bool {
        self.modifiers.iter().any(|m| m.eq_ignore_ascii_case(tag))
    }

    pub fn param(&self, name: &str) -> Option<&DocSection> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.content)
    }
}

/// Strip the comment delimiters and the leading ` * ` of every line.
fn comment_lines(raw: &str) -> Vec<String> {
    let body = raw.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);
    body.lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end().to_string()
        })
        .collect()
}

fn split_param_head(rest: &str) -> (String, String) {
    match RE_PARAM_HEAD.captures(rest.trim()) {
        Some(caps) => (caps[1].to_string(), caps[2].trim().to_string()),
        None => (rest.trim().to_string(), String::new()),
    }
}

/// Split block content into paragraphs and fenced code blocks.
pub fn parse_section(lines: &[String]) -> DocSection {
    let mut section = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut iter = lines.iter();

    while let Some(line) = iter.next() {
        let trimmed = line.trim();
        if let Some(language) = trimmed.strip_prefix("```") {
            flush_paragraph(&mut section, &mut paragraph);
            let mut code: Vec<&str> = Vec::new();
            for inner in iter.by_ref() {
                if inner.trim() == "```" {
                    break;
                }
                code.push(inner);
            }
            section.push(DocBlock::FencedCode {
                language: language.trim().to_string(),
                code: code.join("\n"),
            });
        } else if trimmed.is_empty() {
            flush_paragraph(&mut section, &mut paragraph);
        } else {
            paragraph.push(trimmed);
        }
    }
    flush_paragraph(&mut section, &mut paragraph);
    section
}

fn flush_paragraph<'a>(section: &mut DocSection, paragraph: &mut Vec<&'a str>) {
    if paragraph.is_empty() {
        return;
    }
    let mut inlines = Vec::new();
    for (i, line) in paragraph.iter().enumerate() {
        if i > 0 {
            inlines.push(DocInline::SoftBreak);
        }
        parse_inline(line, &mut inlines);
    }
    section.push(DocBlock::Paragraph(inlines));
    paragraph.clear();
}

/// Parse code spans and inline tags within a single line.
fn parse_inline(text: &str, out: &mut Vec<DocInline>) {
    let mut plain = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find(['`', '{']) {
        let (before, tail) = rest.split_at(pos);
        plain.push_str(before);

        if tail.starts_with('`') {
            if let Some(end) = tail[1..].find('`') {
                push_text(out, &mut plain);
                out.push(DocInline::Code(tail[1..1 + end].to_string()));
                rest = &tail[end + 2..];
                continue;
            }
        } else if tail.starts_with("{@") {
            if let Some(end) = tail.find('}') {
                push_text(out, &mut plain);
                if let Some(link) = parse_inline_tag(&tail[2..end]) {
                    out.push(link);
                }
                rest = &tail[end + 1..];
                continue;
            }
        }

        plain.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    plain.push_str(rest);
    push_text(out, &mut plain);
}

fn push_text(out: &mut Vec<DocInline>, plain: &mut String) {
    if !plain.is_empty() {
        out.push(DocInline::Text(std::mem::take(plain)));
    }
}

/// `link target | text` → a link; other inline tags (`inheritDoc`, `label`) are dropped.
fn parse_inline_tag(body: &str) -> Option<DocInline> {
    let body = body.trim();
    let (name, args) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    if name != "link" {
        return None;
    }
    let (target, text) = match args.split_once('|') {
        Some((t, txt)) => (t.trim(), Some(txt.trim().to_string())),
        None => (args.trim(), None),
    };
    let destination = if target.contains("://") {
        LinkDestination::Url(target.to_string())
    } else {
        LinkDestination::Declaration(target.to_string())
    };
    Some(DocInline::Link {
        destination,
        text: text.filter(|t| !t.is_empty()),
    })
}
