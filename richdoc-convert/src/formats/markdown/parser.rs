//! Markdown parsing (Markdown → Document import)
//!
//! Converts CommonMark-flavored Markdown to richdoc documents.
//! Pipeline: Markdown string → comrak AST → extension passes → Document
//!
//! Parsing is error-tolerant and total: malformed spans degrade to literal
//! text or paragraph content, never to an error. An opened `$$` with no
//! closing marker simply never matches the math extension and falls through
//! to ordinary text tokenization.

use crate::error::FormatError;
use crate::extensions::{ExtensionSet, RawBlock, RawInline};
use crate::options::ConvertOptions;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use richdoc_model::{
    Blockquote, CodeBlock, Document, Heading, Inline, Link, LinkedImage, List, ListItem, Mark,
    Node, Paragraph, Table, TableCell, TableRow, TaskItem, TaskList, Text,
};

/// Parse a Markdown string into a Document. Total over the space of strings.
pub fn parse_from_markdown(
    source: &str,
    options: &ConvertOptions,
    extensions: &ExtensionSet,
) -> Result<Document, FormatError> {
    let arena = Arena::new();
    let comrak_options = comrak_options(options);
    let root = parse_document(&arena, source, &comrak_options);

    let children = collect_blocks(root.children(), extensions);
    log::debug!(
        "parsed {} bytes of markdown into {} top-level nodes",
        source.len(),
        children.len()
    );
    Ok(Document::new(children))
}

fn comrak_options(options: &ConvertOptions) -> ComrakOptions<'static> {
    let mut comrak = ComrakOptions::default();
    comrak.extension.table = true;
    comrak.extension.strikethrough = true;
    comrak.extension.autolink = true;
    comrak.extension.tasklist = true;
    comrak.extension.superscript = true;
    comrak.extension.math_dollars = true;
    comrak.parse.smart = options.typographer;
    comrak
}

/// Collect sibling block nodes, pairing `<div align>` open/close HTML blocks
/// into alignment wrappers around the enclosed siblings.
fn collect_blocks<'a, I>(children: I, extensions: &ExtensionSet) -> Vec<Node>
where
    I: Iterator<Item = &'a AstNode<'a>>,
{
    let mut out = Vec::new();
    let mut iter = children.peekable();

    while let Some(node) = iter.next() {
        let alignment = match &node.data.borrow().value {
            NodeValue::HtmlBlock(html) => aligned_open(&html.literal),
            _ => None,
        };

        if let Some(alignment) = alignment {
            // Consume siblings up to the matching close; an unterminated
            // wrapper runs to end of input.
            let mut inner: Vec<&AstNode<'_>> = Vec::new();
            for sibling in iter.by_ref() {
                if let NodeValue::HtmlBlock(html) = &sibling.data.borrow().value {
                    if is_aligned_close(&html.literal) {
                        break;
                    }
                }
                inner.push(sibling);
            }
            out.push(Node::Aligned(richdoc_model::Aligned {
                alignment,
                children: collect_blocks(inner.into_iter(), extensions),
            }));
        } else if let Some(converted) = convert_block(node, extensions) {
            out.push(converted);
        }
    }

    out
}

/// Convert one comrak block node, or drop it (empty paragraphs, stray HTML).
fn convert_block<'a>(node: &'a AstNode<'a>, extensions: &ExtensionSet) -> Option<Node> {
    let data = node.data.borrow();

    match &data.value {
        NodeValue::Heading(heading) => {
            let level = heading.level.clamp(1, 6);
            Some(Node::Heading(Heading {
                level,
                content: collect_inlines(node, extensions),
            }))
        }

        NodeValue::Paragraph => convert_paragraph(node, extensions),

        NodeValue::BlockQuote => Some(Node::Blockquote(Blockquote {
            children: collect_blocks(node.children(), extensions),
        })),

        NodeValue::List(list) => Some(convert_list(
            node,
            matches!(list.list_type, ListType::Ordered),
            extensions,
        )),

        NodeValue::CodeBlock(code_block) => {
            let info = code_block.info.trim();
            // comrak appends the newline before the closing fence to the
            // literal; strip exactly one so the payload round-trips
            // byte-for-byte.
            let literal = code_block
                .literal
                .strip_suffix('\n')
                .unwrap_or(&code_block.literal);

            let raw = RawBlock::Fence { info, literal };
            if let Some(extended) = extensions.parse_block(&raw) {
                return Some(extended);
            }

            Some(Node::CodeBlock(CodeBlock {
                language: if info.is_empty() {
                    None
                } else {
                    Some(info.to_string())
                },
                code: literal.to_string(),
            }))
        }

        NodeValue::Table(_) => {
            let mut rows = Vec::new();
            for row_node in node.children() {
                if let NodeValue::TableRow(header) = &row_node.data.borrow().value {
                    let mut cells = Vec::new();
                    for cell_node in row_node.children() {
                        cells.push(TableCell {
                            content: collect_inlines(cell_node, extensions),
                        });
                    }
                    rows.push(TableRow {
                        header: *header,
                        cells,
                    });
                }
            }
            Some(Node::Table(Table { rows }))
        }

        NodeValue::ThematicBreak => Some(Node::ThematicBreak),

        NodeValue::HtmlBlock(html) => {
            // Unrecognized raw HTML degrades to paragraph text rather than
            // being dropped.
            let literal = html.literal.trim();
            if literal.is_empty() {
                None
            } else {
                Some(Node::Paragraph(Paragraph {
                    content: vec![Inline::text(literal)],
                }))
            }
        }

        // Unknown block kinds degrade to their visible text.
        _ => {
            let mut text = String::new();
            collect_text_content(node, &mut text);
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(Node::Paragraph(Paragraph {
                    content: vec![Inline::text(text)],
                }))
            }
        }
    }
}

/// Paragraphs are where display math surfaces: a paragraph whose sole
/// content is a `$$` span becomes a block math node. Empty paragraphs
/// collapse to nothing so they do not accumulate across edit cycles.
fn convert_paragraph<'a>(node: &'a AstNode<'a>, extensions: &ExtensionSet) -> Option<Node> {
    let mut children = node.children();
    if let (Some(only), None) = (children.next(), children.next()) {
        if let NodeValue::Math(math) = &only.data.borrow().value {
            if math.display_math {
                let latex = math.literal.trim();
                let raw = RawBlock::DollarMath { latex };
                if let Some(extended) = extensions.parse_block(&raw) {
                    return Some(extended);
                }
            }
        }
    }

    let content = collect_inlines(node, extensions);
    if richdoc_model::inline_text(&content).trim().is_empty() {
        return None;
    }
    Some(Node::Paragraph(Paragraph { content }))
}

fn convert_list<'a>(node: &'a AstNode<'a>, ordered: bool, extensions: &ExtensionSet) -> Node {
    let mut item_count = 0usize;
    let mut task_count = 0usize;
    for item in node.children() {
        item_count += 1;
        if matches!(item.data.borrow().value, NodeValue::TaskItem(_)) {
            task_count += 1;
        }
    }

    // A bullet list where every item carries a checkbox becomes a task list.
    if !ordered && item_count > 0 && task_count == item_count {
        let mut items = Vec::new();
        for item in node.children() {
            if let NodeValue::TaskItem(symbol) = &item.data.borrow().value {
                items.push(TaskItem {
                    checked: symbol.is_some(),
                    content: item_inline_content(item, extensions),
                });
            }
        }
        return Node::TaskList(TaskList { items });
    }

    // Mixed lists degrade to a plain list with the checkbox marker restored
    // as literal text, so no content is lost.
    let mut items = Vec::new();
    for item in node.children() {
        let marker = match &item.data.borrow().value {
            NodeValue::TaskItem(Some(_)) => Some("[x] "),
            NodeValue::TaskItem(None) => Some("[ ] "),
            _ => None,
        };
        let mut children = collect_blocks(item.children(), extensions);
        if let Some(marker) = marker {
            prepend_text(&mut children, marker);
        }
        items.push(ListItem { children });
    }
    Node::List(List { ordered, items })
}

fn prepend_text(children: &mut Vec<Node>, prefix: &str) {
    if let Some(Node::Paragraph(paragraph)) = children.first_mut() {
        paragraph.content.insert(0, Inline::text(prefix));
        return;
    }
    children.insert(
        0,
        Node::Paragraph(Paragraph {
            content: vec![Inline::text(prefix)],
        }),
    );
}

/// Inline content of a task item: its paragraphs flattened into one run
/// sequence (nested structure inside checkbox items is not modeled).
fn item_inline_content<'a>(item: &'a AstNode<'a>, extensions: &ExtensionSet) -> Vec<Inline> {
    let mut out = Vec::new();
    for child in item.children() {
        match &child.data.borrow().value {
            NodeValue::Paragraph => {
                if !out.is_empty() {
                    push_text(&mut out, " ", &[]);
                }
                out.extend(collect_inlines(child, extensions));
            }
            _ => {
                let mut text = String::new();
                collect_text_content(child, &mut text);
                let text = text.trim();
                if !text.is_empty() {
                    if !out.is_empty() {
                        push_text(&mut out, " ", &[]);
                    }
                    push_text(&mut out, text, &[]);
                }
            }
        }
    }
    out
}

/// Collect the inline children of `node` into text runs with mark sets.
fn collect_inlines<'a>(node: &'a AstNode<'a>, extensions: &ExtensionSet) -> Vec<Inline> {
    let mut out = Vec::new();
    for child in node.children() {
        collect_inline(child, &[], &mut out, extensions);
    }
    out
}

fn collect_inline<'a>(
    node: &'a AstNode<'a>,
    marks: &[Mark],
    out: &mut Vec<Inline>,
    extensions: &ExtensionSet,
) {
    let data = node.data.borrow();

    match &data.value {
        NodeValue::Text(text) => push_text(out, text, marks),

        NodeValue::Code(code) => {
            push_text(out, &code.literal, &with_mark(marks, Mark::Code));
        }

        NodeValue::Strong => descend_with_mark(node, marks, Mark::Bold, out, extensions),
        NodeValue::Emph => descend_with_mark(node, marks, Mark::Italic, out, extensions),
        NodeValue::Strikethrough => descend_with_mark(node, marks, Mark::Strike, out, extensions),
        NodeValue::Superscript => {
            descend_with_mark(node, marks, Mark::Superscript, out, extensions)
        }
        NodeValue::Underline => descend_with_mark(node, marks, Mark::Underline, out, extensions),

        // The editor treats a bare newline as a rendered break, so soft and
        // hard breaks collapse into the same node.
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(Inline::HardBreak),

        NodeValue::Math(math) => {
            let raw = RawInline::DollarMath {
                latex: &math.literal,
            };
            match extensions.parse_inline(&raw) {
                Some(inline) => out.push(inline),
                // No rule claims it: keep the visible text, delimiters and all.
                None => push_text(out, &format!("${}$", math.literal), marks),
            }
        }

        NodeValue::Link(link) => {
            if let Some(image) = sole_image_child(node) {
                let alt = collect_text_from_children(image);
                let image_data = image.data.borrow();
                if let NodeValue::Image(img_link) = &image_data.value {
                    let raw = RawInline::WrappedImage {
                        href: &link.url,
                        src: &img_link.url,
                        alt: &alt,
                        title: non_empty(&img_link.title),
                    };
                    match extensions.parse_inline(&raw) {
                        Some(inline) => out.push(inline),
                        None => out.push(Inline::LinkedImage(LinkedImage {
                            src: img_link.url.clone(),
                            alt,
                            title: non_empty(&img_link.title).map(str::to_string),
                            href: link.url.clone(),
                            badge: false,
                        })),
                    }
                    return;
                }
            }

            let mut content = Vec::new();
            for child in node.children() {
                collect_inline(child, marks, &mut content, extensions);
            }
            out.push(Inline::Link(Link {
                href: link.url.clone(),
                title: non_empty(&link.title).map(str::to_string),
                content,
            }));
        }

        NodeValue::Image(link) => {
            let alt = collect_text_from_children(node);
            let raw = RawInline::Image {
                src: &link.url,
                alt: &alt,
                title: non_empty(&link.title),
            };
            match extensions.parse_inline(&raw) {
                Some(inline) => out.push(inline),
                None => out.push(Inline::Image(richdoc_model::Image {
                    src: link.url.clone(),
                    alt,
                    title: non_empty(&link.title).map(str::to_string),
                    badge: false,
                })),
            }
        }

        // Inline HTML tags are dropped; their surrounding text survives as
        // ordinary text tokens.
        NodeValue::HtmlInline(_) => {}

        // Unknown inline kinds: descend so their text is not lost.
        _ => {
            for child in node.children() {
                collect_inline(child, marks, out, extensions);
            }
        }
    }
}

fn descend_with_mark<'a>(
    node: &'a AstNode<'a>,
    marks: &[Mark],
    mark: Mark,
    out: &mut Vec<Inline>,
    extensions: &ExtensionSet,
) {
    let marks = with_mark(marks, mark);
    for child in node.children() {
        collect_inline(child, &marks, out, extensions);
    }
}

fn with_mark(marks: &[Mark], mark: Mark) -> Vec<Mark> {
    let mut next = marks.to_vec();
    if !next.contains(&mark) {
        next.push(mark);
    }
    next
}

/// Append a text run, merging with the previous run when the mark sets match.
fn push_text(out: &mut Vec<Inline>, text: &str, marks: &[Mark]) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = out.last_mut() {
        if last.marks == marks {
            last.text.push_str(text);
            return;
        }
    }
    out.push(Inline::Text(Text {
        text: text.to_string(),
        marks: marks.to_vec(),
    }));
}

fn sole_image_child<'a>(node: &'a AstNode<'a>) -> Option<&'a AstNode<'a>> {
    let mut children = node.children();
    let first = children.next()?;
    if children.next().is_some() {
        return None;
    }
    if matches!(first.data.borrow().value, NodeValue::Image(_)) {
        Some(first)
    } else {
        None
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Collect the visible text of a node and its descendants.
fn collect_text_content<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text_content(child, output);
            }
        }
    }
}

fn collect_text_from_children<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        collect_text_content(child, &mut text);
    }
    text
}

static ALIGNED_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^<div\s+align="(left|center|right)"\s*>$"#).expect("static regex")
});

fn aligned_open(html: &str) -> Option<String> {
    ALIGNED_OPEN
        .captures(html.trim())
        .map(|captures| captures[1].to_string())
}

fn is_aligned_close(html: &str) -> bool {
    html.trim() == "</div>"
}
