//! Carrier-side fidelity: a Document survives an editor HTML cycle, and the
//! load/save composition reproduces canonical Markdown.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use richdoc_convert::formats::carrier::CarrierFormat;
use richdoc_convert::{carrier_to_markdown, markdown_to_carrier, ConvertOptions, Format};
use richdoc_model::{
    Aligned, BlockMath, Diagram, Document, Inline, InlineMath, LinkedImage, Mark, Node, Paragraph,
    TaskItem, TaskList,
};

fn carrier() -> CarrierFormat {
    CarrierFormat::new(ConvertOptions::default())
}

fn cycle(document: &Document) -> Document {
    let format = carrier();
    let html = format.serialize(document).unwrap();
    format.parse(&html).unwrap()
}

#[test]
fn structural_nodes_survive_a_carrier_cycle() {
    let document = Document::new(vec![
        Node::Paragraph(Paragraph {
            content: vec![
                Inline::text("plain "),
                Inline::marked("styled", vec![Mark::Bold, Mark::Italic]),
                Inline::HardBreak,
                Inline::Math(InlineMath {
                    latex: "a < b \\\\ c".to_string(),
                }),
            ],
        }),
        Node::Diagram(Diagram {
            content: "graph TD\n  A[\"x > y\"] --> B".to_string(),
        }),
        Node::BlockMath(BlockMath {
            latex: "\\frac{1}{2} & \"half\"".to_string(),
        }),
        Node::TaskList(TaskList {
            items: vec![
                TaskItem {
                    checked: true,
                    content: vec![Inline::text("done")],
                },
                TaskItem {
                    checked: false,
                    content: vec![Inline::text("todo")],
                },
            ],
        }),
        Node::Aligned(Aligned {
            alignment: "center".to_string(),
            children: vec![Node::Paragraph(Paragraph {
                content: vec![Inline::text("centered")],
            })],
        }),
        Node::ThematicBreak,
    ]);

    assert_eq!(cycle(&document), document);
}

#[test]
fn linked_badge_image_survives_a_carrier_cycle() {
    let document = Document::new(vec![Node::Paragraph(Paragraph {
        content: vec![Inline::LinkedImage(LinkedImage {
            src: "https://img.shields.io/crates/v/x.svg".to_string(),
            alt: "crates.io".to_string(),
            title: None,
            href: "https://crates.io/crates/x".to_string(),
            badge: true,
        })],
    })]);
    assert_eq!(cycle(&document), document);
}

#[test]
fn load_then_save_reproduces_canonical_markdown() {
    let options = ConvertOptions::default();
    let markdown = "\
# Notes

Some **bold** and $x^2$ math.

- [ ] open item
- [x] closed item

```mermaid
graph LR
  A --> B
```

$$
\\sum_{i=1}^n i
$$

| k | v |
| --- | --- |
| a | 1 |

```sh
ls -la
```
";
    let html = markdown_to_carrier(markdown, &options).unwrap();
    let back = carrier_to_markdown(&html, &options).unwrap();
    assert_eq!(back, markdown);
}

#[test]
fn editor_chrome_does_not_leak_into_markdown() {
    let options = ConvertOptions::default();
    let html = "<p>line one</p><p><br class=\"ProseMirror-trailingBreak\"></p>";
    let markdown = carrier_to_markdown(html, &options).unwrap();
    assert_eq!(markdown, "line one\n");
}

proptest! {
    #[test]
    fn any_math_payload_survives_a_carrier_cycle(latex in "\\PC{1,60}") {
        let document = Document::new(vec![Node::BlockMath(BlockMath {
            latex: latex.clone(),
        })]);
        let cycled = cycle(&document);
        match &cycled.children[0] {
            Node::BlockMath(math) => prop_assert_eq!(&math.latex, &latex),
            other => prop_assert!(false, "expected block math, got {:?}", other),
        }
    }
}

#[test]
fn diagram_attribute_escaping_round_trips_hostile_payloads() {
    let content = "A[\"</div>\"] --> B\nB --> C[\"&amp; raw\"]";
    let document = Document::new(vec![Node::Diagram(Diagram {
        content: content.to_string(),
    })]);
    match &cycle(&document).children[0] {
        Node::Diagram(diagram) => assert_eq!(diagram.content, content),
        other => panic!("expected diagram, got {other:?}"),
    }
}
