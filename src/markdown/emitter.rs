//! Markdown emitter: turns a [`Section`] into text.
//!
//! Output always uses `\n`; the newline convention is applied when the page
//! is written.

use regex::Regex;
use std::sync::LazyLock;

use super::{Block, Inline, Section, Table};

static RE_SPECIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*#\[\]_|`~]").unwrap());

static RE_EDGE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(.*?)(\s*)$").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Escape text for use in ordinary Markdown.
pub fn escape_text(text: &str) -> String {
    let text = text.replace('\\', "\\\\");
    let text = RE_SPECIAL.replace_all(&text, "\\$0");
    text.replace("---", "\\-\\-\\-")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text placed inside an HTML element in a table cell.
pub fn escape_table_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('|', "&#124;")
}

/// Line-oriented buffer with an indentation prefix stack.
#[derive(Debug, Default)]
struct LineWriter {
    buf: String,
    indent: Vec<String>,
    at_line_start: bool,
}

impl LineWriter {
    fn new() -> Self {
        Self {
            at_line_start: true,
            ..Self::default()
        }
    }

    fn write(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.new_line();
            }
            if !part.is_empty() {
                if self.at_line_start {
                    let prefix = self.indent.concat();
                    self.buf.push_str(&prefix);
                }
                self.buf.push_str(part);
                self.at_line_start = false;
            }
        }
    }

    fn write_line(&mut self, text: &str) {
        self.write(text);
        self.new_line();
    }

    fn new_line(&mut self) {
        if self.at_line_start && !self.indent.is_empty() {
            let prefix = self.indent.concat();
            self.buf.push_str(prefix.trim_end());
        }
        self.buf.push('\n');
        self.at_line_start = true;
    }

    fn last_char(&self) -> Option<char> {
        self.buf.chars().next_back()
    }

    fn second_last_char(&self) -> Option<char> {
        self.buf.chars().rev().nth(1)
    }

    fn ensure_new_line(&mut self) {
        if self.last_char().is_some_and(|c| c != '\n') {
            self.new_line();
        }
    }

    fn ensure_skipped_line(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        self.ensure_new_line();
        if self.second_last_char() != Some('\n') {
            self.new_line();
        }
    }

    fn push_indent(&mut self, prefix: &str) {
        self.indent.push(prefix.to_string());
    }

    fn pop_indent(&mut self) {
        self.indent.pop();
    }
}

/// Renders Markdown nodes with GitHub-compatible escaping.
#[derive(Debug, Default)]
pub struct MarkdownEmitter {
    writer: LineWriter,
    bold: bool,
    italic: bool,
    inside_table: bool,
}

impl MarkdownEmitter {
    pub fn emit(section: &Section) -> String {
        let mut emitter = MarkdownEmitter {
            writer: LineWriter::new(),
            ..Self::default()
        };
        emitter.write_blocks(section);
        emitter.writer.buf
    }

    fn write_blocks(&mut self, blocks: &[Block]) {
        let siblings = blocks.len() > 1;
        for block in blocks {
            self.write_block(block, siblings);
        }
    }

    fn write_block(&mut self, block: &Block, siblings: bool) {
        match block {
            Block::Heading { level, title } => {
                self.writer.ensure_skipped_line();
                let prefix = match level {
                    1 => "##",
                    2 | 3 => "###",
                    _ => "####",
                };
                self.writer
                    .write_line(&format!("{prefix} {}", escape_text(title)));
                self.writer.new_line();
            }
            Block::Paragraph(inlines) => {
                let inlines = trim_paragraph(inlines);
                if self.inside_table {
                    if siblings {
                        self.writer.write("<p>");
                        self.write_inlines(&inlines);
                        self.writer.write("</p>");
                    } else {
                        self.write_inlines(&inlines);
                    }
                } else {
                    self.write_inlines(&inlines);
                    self.writer.ensure_new_line();
                    self.writer.new_line();
                }
            }
            Block::FencedCode { language, code } => {
                self.writer.ensure_new_line();
                self.writer.write("```");
                self.writer.write(language);
                self.writer.new_line();
                self.writer.write(code);
                self.writer.ensure_new_line();
                self.writer.write("```");
                self.writer.new_line();
            }
            Block::Table(table) => self.write_table(table),
            Block::HorizontalRule => {
                self.writer.ensure_skipped_line();
                self.writer.write("---");
                self.writer.new_line();
                self.writer.new_line();
            }
            Block::Anchor(name) => {
                self.writer.ensure_skipped_line();
                let quoted = serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""));
                self.writer.write(&format!("<a name={quoted}></a>"));
                self.writer.new_line();
            }
            Block::NoteBox(content) => {
                self.writer.ensure_new_line();
                self.writer.push_indent("> ");
                self.write_blocks(content);
                self.writer.ensure_new_line();
                self.writer.pop_indent();
                self.writer.new_line();
            }
            Block::LineBreak => {
                self.writer.ensure_skipped_line();
                self.writer.write("<br/>");
                self.writer.new_line();
            }
        }
    }

    fn write_table(&mut self, table: &Table) {
        self.writer.ensure_skipped_line();
        self.inside_table = true;

        let columns = table
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(table.header.len()))
            .max()
            .unwrap_or(0);
        let visible: Vec<usize> = (0..columns)
            .filter(|i| {
                !table.skip_empty_columns
                    || table
                        .rows
                        .iter()
                        .any(|row| row.get(*i).is_some_and(|cell| !cell.is_empty()))
            })
            .collect();

        self.writer.write("| ");
        for i in &visible {
            self.writer.write(" ");
            if let Some(title) = table.header.get(*i) {
                self.writer.write(&escape_text(title));
            }
            self.writer.write(" |");
        }
        self.writer.new_line();

        self.writer.write("| ");
        for _ in &visible {
            self.writer.write(" --- |");
        }
        self.writer.new_line();

        for row in &table.rows {
            self.writer.write("| ");
            for i in &visible {
                self.writer.write(" ");
                if let Some(cell) = row.get(*i) {
                    self.write_blocks(cell);
                }
                self.writer.write(" |");
            }
            self.writer.new_line();
        }
        self.writer.new_line();

        self.inside_table = false;
    }

    fn write_inlines(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            self.write_inline(inline);
        }
    }

    fn write_inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Text(text) => self.write_plain_text(text),
            Inline::Emphasis {
                bold,
                italic,
                content,
            } => {
                let (old_bold, old_italic) = (self.bold, self.italic);
                self.bold = *bold;
                self.italic = *italic;
                self.write_inlines(content);
                self.bold = old_bold;
                self.italic = old_italic;
            }
            Inline::Code(code) => {
                if self.inside_table {
                    self.writer.write("<code>");
                    self.writer.write(&escape_table_text(code));
                    self.writer.write("</code>");
                } else {
                    self.writer.write(&format!("`{code}`"));
                }
            }
            Inline::Link { text, url } => {
                let text = RE_WHITESPACE.replace_all(text, " ");
                self.writer
                    .write(&format!("[{}]({url})", escape_text(&text)));
            }
            Inline::SoftBreak => {
                if !self.writer.last_char().is_some_and(char::is_whitespace) {
                    self.writer.write(" ");
                }
            }
        }
    }

    fn write_plain_text(&mut self, text: &str) {
        if !self.bold && !self.italic {
            self.writer.write(&escape_text(text));
            return;
        }
        let Some(caps) = RE_EDGE_SPACE.captures(text) else {
            return;
        };
        self.writer.write(&caps[1]);
        let middle = &caps[2];
        if !middle.is_empty() {
            // Separate adjacent emphasis runs so `**a***b*` cannot happen.
            match self.writer.last_char() {
                None | Some('\n' | ' ' | '[' | '>') => {}
                Some(_) => self.writer.write("<!-- -->"),
            }
            if self.bold {
                self.writer.write("**");
            }
            if self.italic {
                self.writer.write("_");
            }
            self.writer.write(&escape_text(middle));
            if self.italic {
                self.writer.write("_");
            }
            if self.bold {
                self.writer.write("**");
            }
        }
        self.writer.write(&caps[3]);
    }
}

/// Collapse whitespace runs in text and trim the paragraph's outer edges.
fn trim_paragraph(inlines: &[Inline]) -> Vec<Inline> {
    let mut out: Vec<Inline> = inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(text) => Inline::Text(RE_WHITESPACE.replace_all(text, " ").into_owned()),
            other => other.clone(),
        })
        .collect();
    if let Some(Inline::Text(first)) = out.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(Inline::Text(last)) = out.last_mut() {
        *last = last.trim_end().to_string();
    }
    out
}
