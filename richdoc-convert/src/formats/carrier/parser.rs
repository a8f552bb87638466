//! Carrier parsing (editor HTML → Document)
//!
//! Pipeline: HTML string → html5ever RcDom → Document. The tokenizer decodes
//! entity escapes in attributes and text, so payloads come back exactly as
//! they were before escaping.
//!
//! Defensive by construction: missing payload attributes fall back to text
//! content, unknown elements strip to their text, and editor chrome (the
//! trailing-break placeholder paragraph) is dropped.

use crate::error::FormatError;
use crate::options::ConvertOptions;
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use richdoc_model::{
    Aligned, Blockquote, CodeBlock, Diagram, Document, Heading, Image, Inline, InlineMath, Link,
    LinkedImage, List, ListItem, Mark, Node, Paragraph, Table, TableCell, TableRow, TaskItem,
    TaskList, Text,
};

pub fn parse_from_carrier(
    source: &str,
    options: &ConvertOptions,
) -> Result<Document, FormatError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);

    let children = match find_body(&dom.document) {
        Some(body) => collect_blocks(&body, options),
        None => Vec::new(),
    };
    log::debug!(
        "parsed {} bytes of carrier markup into {} top-level nodes",
        source.len(),
        children.len()
    );
    Ok(Document::new(children))
}

fn find_body(handle: &Handle) -> Option<Handle> {
    if element_name(handle) == Some("body".to_string()) {
        return Some(handle.clone());
    }
    for child in handle.children.borrow().iter() {
        if let Some(body) = find_body(child) {
            return Some(body);
        }
    }
    None
}

fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref().to_string()),
        _ => None,
    }
}

fn attribute(handle: &Handle, attr_name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

fn collect_blocks(parent: &Handle, options: &ConvertOptions) -> Vec<Node> {
    let mut out = Vec::new();
    for child in parent.children.borrow().iter() {
        convert_block(child, options, &mut out);
    }
    out
}

fn convert_block(handle: &Handle, options: &ConvertOptions, out: &mut Vec<Node>) {
    let name = match &handle.data {
        NodeData::Element { name, .. } => name.local.as_ref().to_string(),
        NodeData::Text { contents } => {
            // Stray text between blocks becomes its own paragraph.
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                out.push(Node::Paragraph(Paragraph {
                    content: vec![Inline::text(text.trim())],
                }));
            }
            return;
        }
        _ => return,
    };

    match name.as_str() {
        "p" => {
            let content = collect_inlines(handle, options);
            // Placeholder paragraphs (trailing-break chrome, blank lines)
            // must not accumulate across edit cycles.
            if !richdoc_model::inline_text(&content).trim().is_empty() {
                out.push(Node::Paragraph(Paragraph { content }));
            }
        }

        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name.as_bytes()[1] - b'0';
            out.push(Node::Heading(Heading {
                level,
                content: collect_inlines(handle, options),
            }));
        }

        "blockquote" => out.push(Node::Blockquote(Blockquote {
            children: collect_blocks(handle, options),
        })),

        "ul" => {
            if attribute(handle, "data-type").as_deref() == Some("taskList") {
                out.push(convert_task_list(handle, options));
            } else {
                out.push(convert_list(handle, false, options));
            }
        }

        "ol" => out.push(convert_list(handle, true, options)),

        "table" => out.push(convert_table(handle, options)),

        "pre" => out.push(convert_code_block(handle)),

        "hr" => out.push(Node::ThematicBreak),

        "div" => convert_div(handle, options, out),

        // Transparent containers and unknown blocks: descend so nothing
        // visible is lost.
        _ => {
            let nested = collect_blocks(handle, options);
            if !nested.is_empty() {
                out.extend(nested);
            } else {
                let text = text_content(handle);
                let text = text.trim();
                if !text.is_empty() {
                    out.push(Node::Paragraph(Paragraph {
                        content: vec![Inline::text(text)],
                    }));
                }
            }
        }
    }
}

fn convert_div(handle: &Handle, options: &ConvertOptions, out: &mut Vec<Node>) {
    let data_type = attribute(handle, "data-type");

    if data_type.as_deref() == Some(options.diagram_language.as_str()) {
        // Missing payload attribute: the visible text is the next best
        // source.
        let content = attribute(handle, "data-content")
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| text_content(handle));
        out.push(Node::Diagram(Diagram { content }));
        return;
    }

    if data_type.as_deref() == Some("block-math") || attribute(handle, "data-latex").is_some() {
        let latex = attribute(handle, "data-latex")
            .filter(|latex| !latex.is_empty())
            .unwrap_or_else(|| text_content(handle));
        out.push(Node::BlockMath(richdoc_model::BlockMath { latex }));
        return;
    }

    // Only the alignments the markdown wrapper can express; anything else
    // is treated as a transparent container so its content still survives.
    if let Some(alignment) = attribute(handle, "align") {
        if matches!(alignment.as_str(), "left" | "center" | "right") {
            out.push(Node::Aligned(Aligned {
                alignment,
                children: collect_blocks(handle, options),
            }));
            return;
        }
    }

    out.extend(collect_blocks(handle, options));
}

fn convert_list(handle: &Handle, ordered: bool, options: &ConvertOptions) -> Node {
    let mut items = Vec::new();
    for child in handle.children.borrow().iter() {
        if element_name(child).as_deref() == Some("li") {
            items.push(ListItem {
                children: item_blocks(child, options),
            });
        }
    }
    Node::List(List { ordered, items })
}

/// List items may hold bare inline content or nested blocks; bare content
/// is wrapped in a paragraph.
fn item_blocks(item: &Handle, options: &ConvertOptions) -> Vec<Node> {
    let has_block_child = item.children.borrow().iter().any(|child| {
        matches!(
            element_name(child).as_deref(),
            Some(
                "p" | "ul" | "ol" | "blockquote" | "pre" | "table" | "div" | "h1" | "h2" | "h3"
                    | "h4" | "h5" | "h6"
            )
        )
    });
    if has_block_child {
        collect_blocks(item, options)
    } else {
        let content = collect_inlines(item, options);
        if richdoc_model::inline_text(&content).trim().is_empty() {
            Vec::new()
        } else {
            vec![Node::Paragraph(Paragraph { content })]
        }
    }
}

fn convert_task_list(handle: &Handle, options: &ConvertOptions) -> Node {
    let mut items = Vec::new();
    for child in handle.children.borrow().iter() {
        if element_name(child).as_deref() != Some("li") {
            continue;
        }
        let checked = attribute(child, "data-checked").as_deref() == Some("true");
        items.push(TaskItem {
            checked,
            content: task_item_content(child, options),
        });
    }
    Node::TaskList(TaskList { items })
}

/// Task item content may be nested in `<label>`/`<div>`/`<p>` editor
/// wrappers; checkbox inputs are chrome, not content.
fn task_item_content(item: &Handle, options: &ConvertOptions) -> Vec<Inline> {
    let mut out = Vec::new();
    collect_task_inlines(item, options, &mut out);
    out
}

fn collect_task_inlines(handle: &Handle, options: &ConvertOptions, out: &mut Vec<Inline>) {
    for child in handle.children.borrow().iter() {
        match element_name(child).as_deref() {
            Some("input") => {}
            Some("label" | "div" | "p" | "span") if attribute(child, "data-type").is_none() => {
                collect_task_inlines(child, options, out)
            }
            _ => collect_inline(child, &[], options, out),
        }
    }
}

fn convert_table(handle: &Handle, options: &ConvertOptions) -> Node {
    let mut rows = Vec::new();
    collect_table_rows(handle, options, &mut rows);
    Node::Table(Table { rows })
}

fn collect_table_rows(handle: &Handle, options: &ConvertOptions, rows: &mut Vec<TableRow>) {
    for child in handle.children.borrow().iter() {
        match element_name(child).as_deref() {
            Some("thead" | "tbody") => collect_table_rows(child, options, rows),
            Some("tr") => {
                let mut cells = Vec::new();
                let mut header = false;
                for cell in child.children.borrow().iter() {
                    match element_name(cell).as_deref() {
                        Some("th") => {
                            header = true;
                            cells.push(TableCell {
                                content: collect_inlines(cell, options),
                            });
                        }
                        Some("td") => cells.push(TableCell {
                            content: collect_inlines(cell, options),
                        }),
                        _ => {}
                    }
                }
                rows.push(TableRow { header, cells });
            }
            _ => {}
        }
    }
}

fn convert_code_block(pre: &Handle) -> Node {
    let code_child = pre
        .children
        .borrow()
        .iter()
        .find(|child| element_name(child).as_deref() == Some("code"))
        .cloned();

    let (language, code) = match code_child {
        Some(code) => {
            let language = attribute(&code, "class")
                .and_then(|class| {
                    class
                        .split_whitespace()
                        .find_map(|part| part.strip_prefix("language-").map(str::to_string))
                })
                .filter(|language| !language.is_empty());
            (language, text_content(&code))
        }
        None => (None, text_content(pre)),
    };

    // The serializer writes a trailing newline before </code> on some
    // editors; one is stripped so payloads stay stable.
    let code = code.strip_suffix('\n').unwrap_or(&code).to_string();
    Node::CodeBlock(CodeBlock { language, code })
}

fn collect_inlines(handle: &Handle, options: &ConvertOptions) -> Vec<Inline> {
    let mut out = Vec::new();
    for child in handle.children.borrow().iter() {
        collect_inline(child, &[], options, &mut out);
    }
    out
}

fn collect_inline(handle: &Handle, marks: &[Mark], options: &ConvertOptions, out: &mut Vec<Inline>) {
    match &handle.data {
        NodeData::Text { contents } => {
            push_text(out, &contents.borrow(), marks);
            return;
        }
        NodeData::Element { .. } => {}
        _ => return,
    }

    let name = element_name(handle).unwrap_or_default();
    match name.as_str() {
        "strong" | "b" => descend_with_mark(handle, marks, Mark::Bold, options, out),
        "em" | "i" => descend_with_mark(handle, marks, Mark::Italic, options, out),
        "u" => descend_with_mark(handle, marks, Mark::Underline, options, out),
        "s" | "del" | "strike" => descend_with_mark(handle, marks, Mark::Strike, options, out),
        "code" => descend_with_mark(handle, marks, Mark::Code, options, out),
        "mark" => descend_with_mark(handle, marks, Mark::Highlight, options, out),
        "sub" => descend_with_mark(handle, marks, Mark::Subscript, options, out),
        "sup" => descend_with_mark(handle, marks, Mark::Superscript, options, out),

        "br" => out.push(Inline::HardBreak),

        "span" => {
            if attribute(handle, "data-type").as_deref() == Some("inline-math")
                || attribute(handle, "data-latex").is_some()
            {
                let latex = attribute(handle, "data-latex")
                    .filter(|latex| !latex.is_empty())
                    .unwrap_or_else(|| text_content(handle));
                out.push(Inline::Math(InlineMath { latex }));
            } else {
                for child in handle.children.borrow().iter() {
                    collect_inline(child, marks, options, out);
                }
            }
        }

        "a" => convert_anchor(handle, marks, options, out),

        "img" => {
            let src = attribute(handle, "src").unwrap_or_default();
            out.push(Inline::Image(Image {
                badge: options.is_badge_src(&src),
                src,
                alt: attribute(handle, "alt").unwrap_or_default(),
                title: attribute(handle, "title").filter(|title| !title.is_empty()),
            }));
        }

        // Unknown inline elements strip to their children.
        _ => {
            for child in handle.children.borrow().iter() {
                collect_inline(child, marks, options, out);
            }
        }
    }
}

fn convert_anchor(handle: &Handle, marks: &[Mark], options: &ConvertOptions, out: &mut Vec<Inline>) {
    let href = attribute(handle, "href").unwrap_or_default();

    // An anchor wrapping a single image is the linked-image composite.
    let children = handle.children.borrow();
    let elements: Vec<Handle> = children
        .iter()
        .filter(|child| !matches!(&child.data, NodeData::Text { contents } if contents.borrow().trim().is_empty()))
        .cloned()
        .collect();
    if let [only] = elements.as_slice() {
        if element_name(only).as_deref() == Some("img") {
            let src = attribute(only, "src").unwrap_or_default();
            out.push(Inline::LinkedImage(LinkedImage {
                badge: options.is_badge_src(&src),
                src,
                alt: attribute(only, "alt").unwrap_or_default(),
                title: attribute(only, "title").filter(|title| !title.is_empty()),
                href,
            }));
            return;
        }
    }
    drop(children);

    let mut content = Vec::new();
    for child in handle.children.borrow().iter() {
        collect_inline(child, marks, options, &mut content);
    }
    out.push(Inline::Link(Link {
        href,
        title: attribute(handle, "title").filter(|title| !title.is_empty()),
        content,
    }));
}

fn descend_with_mark(
    handle: &Handle,
    marks: &[Mark],
    mark: Mark,
    options: &ConvertOptions,
    out: &mut Vec<Inline>,
) {
    let mut next = marks.to_vec();
    if !next.contains(&mark) {
        next.push(mark);
    }
    for child in handle.children.borrow().iter() {
        collect_inline(child, &next, options, out);
    }
}

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

fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    collect_text(handle, &mut text);
    text
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}
