//! Carrier serialization (Document → editor HTML)
//!
//! Output is a flat element stream, no document shell. Attribute values are
//! entity-escaped; element text is escaped separately so payload bytes never
//! leak into markup.

use crate::error::FormatError;
use crate::options::ConvertOptions;
use html_escape::{encode_double_quoted_attribute, encode_text};
use richdoc_model::{Document, Inline, Mark, Node};

pub fn serialize_to_carrier(
    document: &Document,
    options: &ConvertOptions,
) -> Result<String, FormatError> {
    let mut out = String::new();
    for node in &document.children {
        write_block(&mut out, node, options);
    }
    Ok(out)
}

fn write_block(out: &mut String, node: &Node, options: &ConvertOptions) {
    match node {
        Node::Paragraph(paragraph) => {
            out.push_str("<p>");
            write_inlines(out, &paragraph.content);
            out.push_str("</p>");
        }

        Node::Heading(heading) => {
            let level = heading.level.clamp(1, 6);
            out.push_str(&format!("<h{level}>"));
            write_inlines(out, &heading.content);
            out.push_str(&format!("</h{level}>"));
        }

        Node::Blockquote(quote) => {
            out.push_str("<blockquote>");
            for child in &quote.children {
                write_block(out, child, options);
            }
            out.push_str("</blockquote>");
        }

        Node::List(list) => {
            let tag = if list.ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag}>"));
            for item in &list.items {
                out.push_str("<li>");
                for child in &item.children {
                    write_block(out, child, options);
                }
                out.push_str("</li>");
            }
            out.push_str(&format!("</{tag}>"));
        }

        Node::TaskList(list) => {
            out.push_str("<ul data-type=\"taskList\">");
            for item in &list.items {
                let checked = if item.checked { "true" } else { "false" };
                out.push_str(&format!(
                    "<li data-type=\"taskItem\" data-checked=\"{checked}\"><p>"
                ));
                write_inlines(out, &item.content);
                out.push_str("</p></li>");
            }
            out.push_str("</ul>");
        }

        Node::Table(table) => {
            out.push_str("<table><tbody>");
            for row in &table.rows {
                out.push_str("<tr>");
                let tag = if row.header { "th" } else { "td" };
                for cell in &row.cells {
                    out.push_str(&format!("<{tag}>"));
                    write_inlines(out, &cell.content);
                    out.push_str(&format!("</{tag}>"));
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table>");
        }

        Node::CodeBlock(code) => {
            out.push_str("<pre><code");
            if let Some(language) = &code.language {
                out.push_str(&format!(
                    " class=\"language-{}\"",
                    encode_double_quoted_attribute(language)
                ));
            }
            out.push('>');
            out.push_str(&encode_text(&code.code));
            out.push_str("</code></pre>");
        }

        Node::Diagram(diagram) => {
            out.push_str(&format!(
                "<div data-type=\"{}\" data-content=\"{}\"></div>",
                encode_double_quoted_attribute(&options.diagram_language),
                encode_double_quoted_attribute(&diagram.content)
            ));
        }

        // data-latex leads so the editor widget reads it before dispatching
        // on data-type.
        Node::BlockMath(math) => {
            out.push_str(&format!(
                "<div data-latex=\"{}\" data-type=\"block-math\"></div>",
                encode_double_quoted_attribute(&math.latex)
            ));
        }

        Node::Aligned(aligned) => {
            out.push_str(&format!(
                "<div align=\"{}\">",
                encode_double_quoted_attribute(&aligned.alignment)
            ));
            for child in &aligned.children {
                write_block(out, child, options);
            }
            out.push_str("</div>");
        }

        Node::ThematicBreak => out.push_str("<hr>"),
    }
}

fn write_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        write_inline(out, inline);
    }
}

fn write_inline(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(text) => {
            for mark in &text.marks {
                out.push_str(&format!("<{}>", mark_tag(*mark)));
            }
            out.push_str(&encode_text(&text.text));
            for mark in text.marks.iter().rev() {
                out.push_str(&format!("</{}>", mark_tag(*mark)));
            }
        }

        Inline::HardBreak => out.push_str("<br>"),

        Inline::Math(math) => {
            out.push_str(&format!(
                "<span data-latex=\"{}\" data-type=\"inline-math\"></span>",
                encode_double_quoted_attribute(&math.latex)
            ));
        }

        Inline::Link(link) => {
            out.push_str(&format!(
                "<a href=\"{}\"",
                encode_double_quoted_attribute(&link.href)
            ));
            if let Some(title) = &link.title {
                out.push_str(&format!(
                    " title=\"{}\"",
                    encode_double_quoted_attribute(title)
                ));
            }
            out.push('>');
            write_inlines(out, &link.content);
            out.push_str("</a>");
        }

        Inline::Image(image) => {
            write_img(out, &image.src, &image.alt, image.title.as_deref());
        }

        Inline::LinkedImage(image) => {
            out.push_str(&format!(
                "<a href=\"{}\">",
                encode_double_quoted_attribute(&image.href)
            ));
            write_img(out, &image.src, &image.alt, image.title.as_deref());
            out.push_str("</a>");
        }
    }
}

fn write_img(out: &mut String, src: &str, alt: &str, title: Option<&str>) {
    out.push_str(&format!(
        "<img src=\"{}\" alt=\"{}\"",
        encode_double_quoted_attribute(src),
        encode_double_quoted_attribute(alt)
    ));
    if let Some(title) = title {
        out.push_str(&format!(
            " title=\"{}\"",
            encode_double_quoted_attribute(title)
        ));
    }
    out.push('>');
}

fn mark_tag(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Underline => "u",
        Mark::Strike => "s",
        Mark::Code => "code",
        Mark::Highlight => "mark",
        Mark::Subscript => "sub",
        Mark::Superscript => "sup",
    }
}
