//! Round-trip fidelity of the Markdown side: structural payloads survive a
//! full import/export cycle byte-for-byte, and re-serialization is
//! idempotent.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use richdoc_convert::{parse_markdown, serialize_markdown, ConvertOptions};
use richdoc_model::{BlockMath, Diagram, Document, Inline, Node};

fn options() -> ConvertOptions {
    ConvertOptions::default()
}

fn cycle(document: &Document) -> Document {
    let markdown = serialize_markdown(document, &options()).unwrap();
    parse_markdown(&markdown, &options()).unwrap()
}

#[test]
fn diagram_payload_with_quotes_arrows_and_indentation() {
    let content = "graph TD\n  A[\"x > y\"] -->|yes| B\n  B --> C";
    let document = Document::new(vec![Node::Diagram(Diagram {
        content: content.to_string(),
    })]);
    match &cycle(&document).children[0] {
        Node::Diagram(diagram) => assert_eq!(diagram.content, content),
        other => panic!("expected diagram, got {other:?}"),
    }
}

#[test]
fn block_math_with_doubled_backslashes() {
    let latex = "\\begin{aligned}a &= b \\\\ c &= d\\end{aligned}";
    let document = Document::new(vec![Node::BlockMath(BlockMath {
        latex: latex.to_string(),
    })]);
    match &cycle(&document).children[0] {
        Node::BlockMath(math) => assert_eq!(math.latex, latex),
        other => panic!("expected block math, got {other:?}"),
    }
}

#[test]
fn inline_math_with_doubled_backslashes() {
    let source = "before $a \\\\ b$ after\n";
    let document = parse_markdown(source, &options()).unwrap();
    let markdown = serialize_markdown(&document, &options()).unwrap();
    assert_eq!(markdown, source);
}

#[test]
fn reserialization_is_idempotent_on_a_kitchensink_document() {
    let source = "\
# Project

Badge: [![build](https://img.shields.io/b.svg)](https://ci.example.com)

- [ ] write docs
- [x] ship

```mermaid
graph TD
  A --> B
```

$$
E = mc^2
$$

| a | b |
| --- | --- |
| 1 | 2 |

```rust
fn main() {}
```

> quoted **bold** text

---
";
    let first = parse_markdown(source, &options()).unwrap();
    let markdown = serialize_markdown(&first, &options()).unwrap();
    let second = parse_markdown(&markdown, &options()).unwrap();
    assert_eq!(first, second);

    // A second cycle emits identical bytes.
    assert_eq!(serialize_markdown(&second, &options()).unwrap(), markdown);
}

#[test]
fn kitchensink_serialization_shape() {
    let source = "# Project\n\nBadge: [![build](https://img.shields.io/b.svg)](https://ci.example.com)\n\n- [ ] write docs\n- [x] ship\n\n```mermaid\ngraph TD\n  A --> B\n```\n\n$$\nE = mc^2\n$$\n";
    let document = parse_markdown(source, &options()).unwrap();
    let markdown = serialize_markdown(&document, &options()).unwrap();
    insta::assert_snapshot!(markdown, @r###"
    # Project

    Badge: [![build](https://img.shields.io/b.svg)](https://ci.example.com)

    - [ ] write docs
    - [x] ship

    ```mermaid
    graph TD
      A --> B
    ```

    $$
    E = mc^2
    $$
    "###);
}

#[test]
fn mixed_task_and_plain_list_degrades_stably() {
    let source = "- plain\n- [x] done\n";
    let first = parse_markdown(source, &options()).unwrap();
    match &first.children[0] {
        Node::List(list) => assert_eq!(list.items.len(), 2),
        other => panic!("expected plain list, got {other:?}"),
    }

    // The degraded form re-parses to the same degraded form.
    let markdown = serialize_markdown(&first, &options()).unwrap();
    let second = parse_markdown(&markdown, &options()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unterminated_block_math_never_produces_a_math_node() {
    let document = parse_markdown("$$\nleft open\n", &options()).unwrap();
    assert!(document
        .children
        .iter()
        .all(|node| !matches!(node, Node::BlockMath(_))));
}

#[test]
fn badge_classification_is_config_driven() {
    let mut custom = ConvertOptions::default();
    custom.badge_hosts = vec!["badges.internal.example".to_string()];

    let source = "![build](https://img.shields.io/b.svg)\n";
    let document = parse_markdown(source, &custom).unwrap();
    match &document.children[0] {
        Node::Paragraph(p) => match &p.content[0] {
            Inline::Image(image) => assert!(!image.badge),
            other => panic!("expected image, got {other:?}"),
        },
        other => panic!("expected paragraph, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn any_diagram_payload_survives_a_markdown_cycle(
        content in "[A-Za-z0-9 _>(){}\\[\\]\\\\\n-]{1,60}"
    ) {
        prop_assume!(!content.contains("```"));
        prop_assume!(!content.trim().is_empty());

        let document = Document::new(vec![Node::Diagram(Diagram {
            content: content.clone(),
        })]);
        let cycled = cycle(&document);
        prop_assert_eq!(cycled.children.len(), 1);
        match &cycled.children[0] {
            Node::Diagram(diagram) => prop_assert_eq!(&diagram.content, &content),
            other => prop_assert!(false, "expected diagram, got {:?}", other),
        }
    }

    #[test]
    fn any_block_math_latex_survives_a_markdown_cycle(
        latex in "[A-Za-z0-9^_{}+=() \\\\-]{1,40}"
    ) {
        prop_assume!(latex.trim() == latex);
        // A leading list or setext marker would restructure the enclosing
        // paragraph before the math rule sees it.
        prop_assume!(latex.chars().next().is_some_and(|c| c.is_ascii_alphabetic()));

        let document = Document::new(vec![Node::BlockMath(BlockMath {
            latex: latex.clone(),
        })]);
        let cycled = cycle(&document);
        match &cycled.children[0] {
            Node::BlockMath(math) => prop_assert_eq!(&math.latex, &latex),
            other => prop_assert!(false, "expected block math, got {:?}", other),
        }
    }

    #[test]
    fn parsing_never_panics(source in "\\PC{0,200}") {
        let _ = parse_markdown(&source, &options()).unwrap();
    }
}
