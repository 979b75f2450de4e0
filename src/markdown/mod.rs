//! Markdown node tree: what the page renderer builds and the emitter prints.

pub mod emitter;

pub use emitter::MarkdownEmitter;

/// Inline content inside a paragraph, heading-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis {
        bold: bool,
        italic: bool,
        content: Vec<Inline>,
    },
    Code(String),
    Link {
        text: String,
        url: String,
    },
    SoftBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(text.into())
    }

    pub fn code(code: impl Into<String>) -> Self {
        Inline::Code(code.into())
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Inline::Link {
            text: text.into(),
            url: url.into(),
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Inline::Emphasis {
            bold: true,
            italic: false,
            content: vec![Inline::text(text)],
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Inline::Emphasis {
            bold: false,
            italic: true,
            content: vec![Inline::text(text)],
        }
    }

    pub fn bold_italic(text: impl Into<String>) -> Self {
        Inline::Emphasis {
            bold: true,
            italic: true,
            content: vec![Inline::text(text)],
        }
    }
}

/// One table cell: a small section of blocks.
pub type Cell = Vec<Block>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Drop columns that are empty in every row.
    pub skip_empty_columns: bool,
}

impl Table {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn add_row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, title: String },
    Paragraph(Vec<Inline>),
    FencedCode { language: String, code: String },
    Table(Table),
    HorizontalRule,
    Anchor(String),
    NoteBox(Vec<Block>),
    LineBreak,
}

impl Block {
    pub fn heading(level: u8, title: impl Into<String>) -> Self {
        Block::Heading {
            level,
            title: title.into(),
        }
    }

    pub fn paragraph(inlines: Vec<Inline>) -> Self {
        Block::Paragraph(inlines)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Block::Paragraph(vec![Inline::text(text)])
    }

    pub fn code(language: &str, code: impl Into<String>) -> Self {
        Block::FencedCode {
            language: language.to_string(),
            code: code.into(),
        }
    }
}

/// An ordered list of blocks making up (part of) a page.
pub type Section = Vec<Block>;
