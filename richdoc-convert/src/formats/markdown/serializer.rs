//! Markdown serialization (Document → Markdown export)
//!
//! A deterministic tree walker: blocks are rendered to strings and joined by
//! blank lines, so the same Document always yields the same Markdown.
//! Extended nodes go through the extension registry first; a declined
//! emission falls back to the node's plain text rather than erroring.

use crate::error::FormatError;
use crate::extensions::ExtensionSet;
use richdoc_model::{Document, Inline, Mark, Node, TableRow};

/// Serialize a Document to Markdown. Always succeeds; malformed extended
/// nodes degrade to plain text.
pub fn serialize_to_markdown(
    document: &Document,
    extensions: &ExtensionSet,
) -> Result<String, FormatError> {
    let writer = MarkdownWriter { extensions };
    let body = writer.render_blocks(&document.children);
    if body.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{body}\n"))
    }
}

struct MarkdownWriter<'e> {
    extensions: &'e ExtensionSet,
}

impl MarkdownWriter<'_> {
    fn render_blocks(&self, nodes: &[Node]) -> String {
        let rendered: Vec<String> = nodes
            .iter()
            .filter_map(|node| self.render_block(node))
            .collect();
        rendered.join("\n\n")
    }

    fn render_block(&self, node: &Node) -> Option<String> {
        if let Some(emitted) = self.extensions.emit_block(node) {
            return Some(emitted);
        }

        match node {
            // An extension owns these; reaching here means the owning rule
            // declined, so reconstruct from visible text.
            Node::Diagram(_) | Node::BlockMath(_) => {
                let text = node.plain_text();
                let text = text.trim();
                if text.is_empty() {
                    log::warn!("dropping {} node with empty payload", node.kind());
                    None
                } else {
                    Some(text.to_string())
                }
            }

            Node::Paragraph(paragraph) => {
                let text = self.render_inlines(&paragraph.content);
                if text.trim().is_empty() {
                    None
                } else {
                    Some(text)
                }
            }

            Node::Heading(heading) => {
                let text = self.render_inline_line(&heading.content);
                Some(format!(
                    "{} {}",
                    "#".repeat(heading.level as usize),
                    text
                ))
            }

            Node::Blockquote(quote) => {
                let inner = self.render_blocks(&quote.children);
                Some(prefix_lines(&inner, "> ", ">"))
            }

            Node::List(list) => {
                let mut lines = Vec::new();
                for (index, item) in list.items.iter().enumerate() {
                    let marker = if list.ordered {
                        format!("{}. ", index + 1)
                    } else {
                        "- ".to_string()
                    };
                    let body = self.render_blocks(&item.children);
                    lines.push(indent_under_marker(&marker, &body));
                }
                Some(lines.join("\n"))
            }

            Node::TaskList(list) => {
                let mut lines = Vec::new();
                for item in &list.items {
                    let checkbox = if item.checked { "[x]" } else { "[ ]" };
                    let text = self.render_inline_line(&item.content);
                    lines.push(format!("- {checkbox} {text}"));
                }
                Some(lines.join("\n"))
            }

            Node::Table(table) => Some(self.render_table(&table.rows)),

            Node::CodeBlock(code) => {
                let language = code.language.as_deref().unwrap_or("");
                Some(format!("```{language}\n{}\n```", code.code))
            }

            Node::Aligned(aligned) => {
                let inner = self.render_blocks(&aligned.children);
                if inner.is_empty() {
                    Some(format!("<div align=\"{}\">\n\n</div>", aligned.alignment))
                } else {
                    Some(format!(
                        "<div align=\"{}\">\n\n{inner}\n\n</div>",
                        aligned.alignment
                    ))
                }
            }

            Node::ThematicBreak => Some("---".to_string()),
        }
    }

    fn render_table(&self, rows: &[TableRow]) -> String {
        let mut lines = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let cells: Vec<String> = row
                .cells
                .iter()
                .map(|cell| {
                    self.render_inline_line(&cell.content)
                        .replace('|', "\\|")
                })
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));

            // The separator row is synthesized after the first row; the
            // document model does not store it.
            if index == 0 {
                let dashes = vec!["---"; row.cells.len().max(1)];
                lines.push(format!("| {} |", dashes.join(" | ")));
            }
        }
        lines.join("\n")
    }

    /// Inline content constrained to one physical line (headings, table
    /// cells, task items): rendered breaks become spaces.
    fn render_inline_line(&self, inlines: &[Inline]) -> String {
        self.render_inlines(inlines).replace('\n', " ")
    }

    fn render_inlines(&self, inlines: &[Inline]) -> String {
        let mut out = String::new();
        self.write_inline_slice(&mut out, inlines, &[]);
        out
    }

    /// Write a run sequence, grouping consecutive runs that share a mark
    /// under one delimiter pair so adjacent emphasis never collides.
    fn write_inline_slice(&self, out: &mut String, inlines: &[Inline], active: &[Mark]) {
        let mut i = 0;
        while i < inlines.len() {
            let text = match &inlines[i] {
                Inline::Text(text) => text,
                other => {
                    self.write_inline_atom(out, other);
                    i += 1;
                    continue;
                }
            };

            let pending: Vec<Mark> = text
                .marks
                .iter()
                .filter(|mark| !active.contains(mark))
                .copied()
                .collect();

            match pending.iter().find(|mark| delimiter(**mark).is_some()) {
                None => {
                    if pending.contains(&Mark::Code) {
                        write_code_span(out, &text.text);
                    } else {
                        out.push_str(&text.text);
                    }
                    i += 1;
                }
                Some(&mark) => {
                    let mut j = i;
                    while j < inlines.len() {
                        match &inlines[j] {
                            Inline::Text(t) if t.marks.contains(&mark) => j += 1,
                            _ => break,
                        }
                    }
                    let open = delimiter(mark).unwrap_or("");
                    out.push_str(open);
                    let mut inner = active.to_vec();
                    inner.push(mark);
                    self.write_inline_slice(out, &inlines[i..j], &inner);
                    out.push_str(open);
                    i = j;
                }
            }
        }
    }

    fn write_inline_atom(&self, out: &mut String, inline: &Inline) {
        if let Some(emitted) = self.extensions.emit_inline(inline) {
            out.push_str(&emitted);
            return;
        }

        match inline {
            Inline::HardBreak => out.push('\n'),

            // Declined by the owning rule: reconstruct from visible text.
            Inline::Math(math) => out.push_str(&math.latex),
            Inline::LinkedImage(image) => out.push_str(&image.alt),

            Inline::Link(link) => {
                let text = self.render_inlines(&link.content);
                match &link.title {
                    Some(title) => {
                        out.push_str(&format!("[{text}]({} \"{title}\")", link.href))
                    }
                    None => out.push_str(&format!("[{text}]({})", link.href)),
                }
            }

            Inline::Image(image) => match &image.title {
                Some(title) => out.push_str(&format!(
                    "![{}]({} \"{title}\")",
                    image.alt, image.src
                )),
                None => out.push_str(&format!("![{}]({})", image.alt, image.src)),
            },

            Inline::Text(text) => out.push_str(&text.text),
        }
    }
}

/// Marks with a Markdown spelling. Marks without one (underline, highlight,
/// subscript) have no portable syntax and strip to their text.
fn delimiter(mark: Mark) -> Option<&'static str> {
    match mark {
        Mark::Bold => Some("**"),
        Mark::Italic => Some("*"),
        Mark::Strike => Some("~~"),
        Mark::Superscript => Some("^"),
        Mark::Code | Mark::Underline | Mark::Highlight | Mark::Subscript => None,
    }
}

fn write_code_span(out: &mut String, text: &str) {
    if text.contains('`') {
        out.push_str("`` ");
        out.push_str(text);
        out.push_str(" ``");
    } else {
        out.push('`');
        out.push_str(text);
        out.push('`');
    }
}

fn prefix_lines(text: &str, prefix: &str, empty_prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                empty_prefix.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First line gets the list marker, continuation lines align under it.
fn indent_under_marker(marker: &str, body: &str) -> String {
    let indent = " ".repeat(marker.len());
    let mut lines = body.lines();
    let first = lines.next().unwrap_or("");
    let mut out = format!("{marker}{first}");
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&indent);
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionSet;
    use crate::options::ConvertOptions;
    use richdoc_model::{
        BlockMath, CodeBlock, Diagram, Heading, InlineMath, List, ListItem, Node, Paragraph,
        Table, TableCell, TableRow, TaskItem, TaskList,
    };

    fn serialize(nodes: Vec<Node>) -> String {
        let extensions = ExtensionSet::standard(&ConvertOptions::default());
        serialize_to_markdown(&Document::new(nodes), &extensions).unwrap()
    }

    #[test]
    fn heading_and_paragraph_are_blank_line_separated() {
        let out = serialize(vec![
            Node::Heading(Heading {
                level: 2,
                content: vec![Inline::text("Title")],
            }),
            Node::Paragraph(Paragraph {
                content: vec![Inline::text("Body.")],
            }),
        ]);
        assert_eq!(out, "## Title\n\nBody.\n");
    }

    #[test]
    fn diagram_payload_is_verbatim() {
        let out = serialize(vec![Node::Diagram(Diagram {
            content: "graph TD\n  A --> B".into(),
        })]);
        assert_eq!(out, "```mermaid\ngraph TD\n  A --> B\n```\n");
    }

    #[test]
    fn degraded_diagram_falls_back_to_nothing() {
        let out = serialize(vec![Node::Diagram(Diagram {
            content: String::new(),
        })]);
        assert_eq!(out, "");
    }

    #[test]
    fn block_math_uses_double_dollar_fences() {
        let out = serialize(vec![Node::BlockMath(BlockMath {
            latex: r"\sum_{i=1}^n i = \frac{n(n+1)}{2}".into(),
        })]);
        assert_eq!(
            out,
            format!("$$\n{}\n$$\n", r"\sum_{i=1}^n i = \frac{n(n+1)}{2}")
        );
    }

    #[test]
    fn inline_math_in_prose() {
        let out = serialize(vec![Node::Paragraph(Paragraph {
            content: vec![
                Inline::text("Euler: "),
                Inline::Math(InlineMath {
                    latex: "e^{i\\pi}+1=0".into(),
                }),
            ],
        })]);
        assert_eq!(out, "Euler: $e^{i\\pi}+1=0$\n");
    }

    #[test]
    fn task_list_markers() {
        let out = serialize(vec![Node::TaskList(TaskList {
            items: vec![
                TaskItem {
                    checked: false,
                    content: vec![Inline::text("todo")],
                },
                TaskItem {
                    checked: true,
                    content: vec![Inline::text("done")],
                },
            ],
        })]);
        assert_eq!(out, "- [ ] todo\n- [x] done\n");
    }

    #[test]
    fn table_synthesizes_separator_after_first_row() {
        let row = |header: bool, a: &str, b: &str| TableRow {
            header,
            cells: vec![
                TableCell {
                    content: vec![Inline::text(a)],
                },
                TableCell {
                    content: vec![Inline::text(b)],
                },
            ],
        };
        let out = serialize(vec![Node::Table(Table {
            rows: vec![row(true, "a", "b"), row(false, "1", "pipe|cell")],
        })]);
        assert_eq!(
            out,
            "| a | b |\n| --- | --- |\n| 1 | pipe\\|cell |\n"
        );
    }

    #[test]
    fn nested_emphasis_groups_share_delimiters() {
        let out = serialize(vec![Node::Paragraph(Paragraph {
            content: vec![
                Inline::marked("bold ", vec![Mark::Bold]),
                Inline::marked("both", vec![Mark::Bold, Mark::Italic]),
            ],
        })]);
        assert_eq!(out, "**bold *both***\n");
    }

    #[test]
    fn ordered_list_renumbers_from_one() {
        let item = |text: &str| ListItem {
            children: vec![Node::Paragraph(Paragraph {
                content: vec![Inline::text(text)],
            })],
        };
        let out = serialize(vec![Node::List(List {
            ordered: true,
            items: vec![item("first"), item("second"), item("third")],
        })]);
        assert_eq!(out, "1. first\n2. second\n3. third\n");
    }

    #[test]
    fn nested_list_blocks_indent_under_marker() {
        let out = serialize(vec![Node::List(List {
            ordered: false,
            items: vec![ListItem {
                children: vec![
                    Node::Paragraph(Paragraph {
                        content: vec![Inline::text("item")],
                    }),
                    Node::CodeBlock(CodeBlock {
                        language: Some("sh".into()),
                        code: "ls".into(),
                    }),
                ],
            }],
        })]);
        assert_eq!(out, "- item\n\n  ```sh\n  ls\n  ```\n");
    }

    #[test]
    fn empty_document_serializes_to_empty_string() {
        assert_eq!(serialize(vec![]), "");
    }
}
