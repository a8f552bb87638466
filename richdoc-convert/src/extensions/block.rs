//! Block-level extension rules: fenced diagrams and `$$` math.

use richdoc_model::{BlockMath, Diagram, Node};

/// A raw block-level token as seen by the extension pass, before any rule
/// has rewritten it into an extended node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawBlock<'a> {
    /// A fenced code block: info string and fence body. The body carries no
    /// trailing fence newline; it is the payload byte-for-byte.
    Fence { info: &'a str, literal: &'a str },
    /// A display math span that stands alone at block level, delimiters
    /// already stripped.
    DollarMath { latex: &'a str },
}

/// One block extension: predicate, forward transform, reverse transform.
pub trait BlockRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Match predicate over a raw token.
    fn matches(&self, raw: &RawBlock<'_>) -> bool;

    /// Forward transform; only called when [`Self::matches`] returned true.
    fn build(&self, raw: &RawBlock<'_>) -> Node;

    /// Whether this rule is responsible for serializing `node`.
    fn owns(&self, node: &Node) -> bool;

    /// Reverse transform. `None` means the payload is degraded and the
    /// caller should fall back to plain-text reconstruction.
    fn emit(&self, node: &Node) -> Option<String>;
}

/// Rewrites fenced blocks tagged with the diagram language into diagram
/// nodes whose content is the raw fence body, unprocessed by inline parsing.
pub struct DiagramRule {
    language: String,
}

impl DiagramRule {
    pub fn new(language: String) -> Self {
        DiagramRule { language }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl BlockRule for DiagramRule {
    fn name(&self) -> &'static str {
        "diagram"
    }

    fn matches(&self, raw: &RawBlock<'_>) -> bool {
        matches!(raw, RawBlock::Fence { info, .. } if info.trim() == self.language)
    }

    fn build(&self, raw: &RawBlock<'_>) -> Node {
        match raw {
            RawBlock::Fence { literal, .. } => Node::Diagram(Diagram {
                content: (*literal).to_string(),
            }),
            RawBlock::DollarMath { latex } => Node::Diagram(Diagram {
                content: (*latex).to_string(),
            }),
        }
    }

    fn owns(&self, node: &Node) -> bool {
        matches!(node, Node::Diagram(_))
    }

    fn emit(&self, node: &Node) -> Option<String> {
        match node {
            Node::Diagram(diagram) if !diagram.content.is_empty() => Some(format!(
                "```{}\n{}\n```",
                self.language, diagram.content
            )),
            _ => None,
        }
    }
}

/// Rewrites standalone display math into block math nodes. Declared before
/// the fence rule so `$$` regions are never swallowed by unrelated rules.
pub struct BlockMathRule;

impl BlockRule for BlockMathRule {
    fn name(&self) -> &'static str {
        "block-math"
    }

    fn matches(&self, raw: &RawBlock<'_>) -> bool {
        matches!(raw, RawBlock::DollarMath { .. })
    }

    fn build(&self, raw: &RawBlock<'_>) -> Node {
        match raw {
            RawBlock::DollarMath { latex } => Node::BlockMath(BlockMath {
                latex: (*latex).to_string(),
            }),
            RawBlock::Fence { literal, .. } => Node::BlockMath(BlockMath {
                latex: (*literal).to_string(),
            }),
        }
    }

    fn owns(&self, node: &Node) -> bool {
        matches!(node, Node::BlockMath(_))
    }

    fn emit(&self, node: &Node) -> Option<String> {
        match node {
            Node::BlockMath(math) if !math.latex.is_empty() => {
                Some(format!("$$\n{}\n$$", math.latex))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagram_rule_matches_exact_info_string() {
        let rule = DiagramRule::new("mermaid".into());
        assert!(rule.matches(&RawBlock::Fence {
            info: "mermaid",
            literal: "graph TD",
        }));
        assert!(rule.matches(&RawBlock::Fence {
            info: " mermaid ",
            literal: "",
        }));
        assert!(!rule.matches(&RawBlock::Fence {
            info: "mermaidjs",
            literal: "",
        }));
        assert!(!rule.matches(&RawBlock::DollarMath { latex: "x" }));
    }

    #[test]
    fn diagram_emission_is_verbatim() {
        let rule = DiagramRule::new("mermaid".into());
        let node = Node::Diagram(Diagram {
            content: "graph TD\n  A[\"x > y\"] --> B".into(),
        });
        assert_eq!(
            rule.emit(&node).unwrap(),
            "```mermaid\ngraph TD\n  A[\"x > y\"] --> B\n```"
        );
    }

    #[test]
    fn block_math_emission_keeps_backslashes() {
        let rule = BlockMathRule;
        let node = Node::BlockMath(BlockMath {
            latex: r"\\sum_{i=1}^n i = \frac{n(n+1)}{2}".into(),
        });
        assert_eq!(
            rule.emit(&node).unwrap(),
            format!("$$\n{}\n$$", r"\\sum_{i=1}^n i = \frac{n(n+1)}{2}")
        );
    }

    #[test]
    fn empty_payloads_decline() {
        let diagram = Node::Diagram(Diagram {
            content: String::new(),
        });
        let math = Node::BlockMath(BlockMath {
            latex: String::new(),
        });
        assert_eq!(DiagramRule::new("mermaid".into()).emit(&diagram), None);
        assert_eq!(BlockMathRule.emit(&math), None);
    }
}
