//! Core data structures for the richdoc document tree.
//!
//! This is a pure data crate: every node kind the conversion pipeline knows
//! about is a variant here, with its required attributes statically present
//! at construction. Parsing and serialization live in `richdoc-convert`;
//! nothing in this crate inspects text.
//!
//! Extended leaf kinds (`Diagram`, `BlockMath`, inline `Math`) store their
//! raw source as an opaque string attribute rather than as children. That
//! attribute must survive conversion byte-for-byte.

use serde::{Deserialize, Serialize};

/// Root of a structured document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Document { children }
    }

    /// Concatenated plain text of the whole document.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// A block-level document node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Paragraph(Paragraph),
    Heading(Heading),
    Blockquote(Blockquote),
    List(List),
    TaskList(TaskList),
    Table(Table),
    CodeBlock(CodeBlock),
    Diagram(Diagram),
    BlockMath(BlockMath),
    Aligned(Aligned),
    ThematicBreak,
}

impl Node {
    /// Semantic kind tag, matching the carrier discriminants.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Paragraph(_) => "paragraph",
            Node::Heading(_) => "heading",
            Node::Blockquote(_) => "blockquote",
            Node::List(list) => {
                if list.ordered {
                    "orderedList"
                } else {
                    "bulletList"
                }
            }
            Node::TaskList(_) => "taskList",
            Node::Table(_) => "table",
            Node::CodeBlock(_) => "codeBlock",
            Node::Diagram(_) => "diagram",
            Node::BlockMath(_) => "blockMath",
            Node::Aligned(_) => "aligned",
            Node::ThematicBreak => "thematicBreak",
        }
    }

    /// Plain text content of this node, ignoring structure.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Paragraph(p) => collect_inline_text(&p.content, out),
            Node::Heading(h) => collect_inline_text(&h.content, out),
            Node::Blockquote(b) => {
                for child in &b.children {
                    child.collect_text(out);
                }
            }
            Node::List(list) => {
                for item in &list.items {
                    for child in &item.children {
                        child.collect_text(out);
                    }
                }
            }
            Node::TaskList(list) => {
                for item in &list.items {
                    collect_inline_text(&item.content, out);
                }
            }
            Node::Table(table) => {
                for row in &table.rows {
                    for cell in &row.cells {
                        collect_inline_text(&cell.content, out);
                    }
                }
            }
            Node::CodeBlock(code) => out.push_str(&code.code),
            Node::Diagram(diagram) => out.push_str(&diagram.content),
            Node::BlockMath(math) => out.push_str(&math.latex),
            Node::Aligned(aligned) => {
                for child in &aligned.children {
                    child.collect_text(out);
                }
            }
            Node::ThematicBreak => {}
        }
    }
}

/// A paragraph of inline content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub content: Vec<Inline>,
}

/// A heading, level 1 through 6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub content: Vec<Inline>,
}

/// A block quote wrapping further block nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blockquote {
    pub children: Vec<Node>,
}

/// An ordered or bullet list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

/// One list item; may hold nested block content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub children: Vec<Node>,
}

/// A list in which every item carries a checkbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    pub items: Vec<TaskItem>,
}

/// A checkbox item. Only ever appears under a [`TaskList`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub checked: bool,
    pub content: Vec<Inline>,
}

/// A table of rows; the first row is treated as the header on output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub header: bool,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub content: Vec<Inline>,
}

/// A fenced code block with an optional language tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub code: String,
}

/// A diagram block. `content` is the raw diagram source, byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub content: String,
}

/// Display math. `latex` is the raw source between the `$$` delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMath {
    pub latex: String,
}

/// A block-level alignment wrapper preserved from the carrier markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aligned {
    pub alignment: String,
    pub children: Vec<Node>,
}

/// Inline content: text runs with mark sets, breaks, math, links, images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text(Text),
    HardBreak,
    #[serde(rename = "inlineMath")]
    Math(InlineMath),
    Link(Link),
    Image(Image),
    LinkedImage(LinkedImage),
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(Text {
            text: text.into(),
            marks: Vec::new(),
        })
    }

    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Inline::Text(Text {
            text: text.into(),
            marks,
        })
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_inline_text(std::slice::from_ref(self), &mut out);
        out
    }
}

/// A run of text with a set of formatting marks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

/// Formatting marks applicable to a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Highlight,
    Subscript,
    Superscript,
}

/// Inline math. `latex` is the raw source between the `$` delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineMath {
    pub latex: String,
}

/// A hyperlink around inline content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: Vec<Inline>,
}

/// An image. `badge` marks images served by a badge-generation host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub badge: bool,
}

/// A link whose sole content is an image, kept as one composite so the
/// wrapping href stays associated with the inner image across round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedImage {
    pub src: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub href: String,
    #[serde(default)]
    pub badge: bool,
}

fn collect_inline_text(content: &[Inline], out: &mut String) {
    for inline in content {
        match inline {
            Inline::Text(run) => out.push_str(&run.text),
            Inline::HardBreak => out.push('\n'),
            Inline::Math(math) => out.push_str(&math.latex),
            Inline::Link(link) => collect_inline_text(&link.content, out),
            Inline::Image(image) => out.push_str(&image.alt),
            Inline::LinkedImage(image) => out.push_str(&image.alt),
        }
    }
}

/// Concatenated plain text of a slice of inline nodes.
pub fn inline_text(content: &[Inline]) -> String {
    let mut out = String::new();
    collect_inline_text(content, &mut out);
    out
}
