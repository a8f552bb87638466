//! Extension rule registries for non-standard Markdown constructs.
//!
//! Each rule is a triple: a match predicate over a raw token, a forward
//! transform producing a document node, and a reverse transform producing
//! Markdown text. Rules live in explicit ordered lists owned by an
//! [`ExtensionSet`] that is handed to the parser and serializer at
//! construction; they are consulted in declared order and the first match
//! wins per token.
//!
//! A reverse transform may decline (return `None`) when the node's payload
//! attribute is empty; the serializer then falls back to reconstructing the
//! emission from the node's plain text, so partially-corrupted nodes still
//! degrade to something textually sensible.

pub mod block;
pub mod inline;

pub use block::{BlockMathRule, BlockRule, DiagramRule, RawBlock};
pub use inline::{BadgeImageRule, InlineMathRule, InlineRule, LinkedImageRule, RawInline};

use crate::options::ConvertOptions;
use richdoc_model::{Inline, Node};

/// The ordered block and inline rule lists used by one parser/serializer pair.
pub struct ExtensionSet {
    block: Vec<Box<dyn BlockRule>>,
    inline: Vec<Box<dyn InlineRule>>,
}

impl ExtensionSet {
    /// Build the standard rule set for the given options.
    ///
    /// Order is load-bearing: the block math rule is declared before the
    /// diagram (fence) rule, and both inline math and image classification
    /// run before any generic handling.
    pub fn standard(options: &ConvertOptions) -> Self {
        ExtensionSet {
            block: vec![
                Box::new(BlockMathRule),
                Box::new(DiagramRule::new(options.diagram_language.clone())),
            ],
            inline: vec![
                Box::new(InlineMathRule),
                Box::new(LinkedImageRule::new(options.badge_hosts.clone())),
                Box::new(BadgeImageRule::new(options.badge_hosts.clone())),
            ],
        }
    }

    /// Custom rule lists, mainly for precedence tests.
    pub fn with_rules(block: Vec<Box<dyn BlockRule>>, inline: Vec<Box<dyn InlineRule>>) -> Self {
        ExtensionSet { block, inline }
    }

    /// Forward transform for a raw block token. First matching rule wins.
    pub fn parse_block(&self, raw: &RawBlock<'_>) -> Option<Node> {
        for rule in &self.block {
            if rule.matches(raw) {
                log::trace!("block rule '{}' matched", rule.name());
                return Some(rule.build(raw));
            }
        }
        None
    }

    /// Forward transform for a raw inline token. First matching rule wins.
    pub fn parse_inline(&self, raw: &RawInline<'_>) -> Option<Inline> {
        for rule in &self.inline {
            if rule.matches(raw) {
                log::trace!("inline rule '{}' matched", rule.name());
                return Some(rule.build(raw));
            }
        }
        None
    }

    /// Reverse transform for a block node, or `None` when no rule owns it or
    /// the owning rule declines (degraded payload).
    pub fn emit_block(&self, node: &Node) -> Option<String> {
        for rule in &self.block {
            if rule.owns(node) {
                return rule.emit(node);
            }
        }
        None
    }

    /// Reverse transform for an inline node; same contract as [`Self::emit_block`].
    pub fn emit_inline(&self, inline: &Inline) -> Option<String> {
        for rule in &self.inline {
            if rule.owns(inline) {
                return rule.emit(inline);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richdoc_model::Diagram;

    #[test]
    fn block_math_is_consulted_before_the_fence_rule() {
        let set = ExtensionSet::standard(&ConvertOptions::default());

        // A dollar-math token must never be claimed by the diagram rule.
        let raw = RawBlock::DollarMath { latex: "x^2" };
        match set.parse_block(&raw) {
            Some(Node::BlockMath(math)) => assert_eq!(math.latex, "x^2"),
            other => panic!("expected block math, got {other:?}"),
        }
    }

    #[test]
    fn diagram_rule_claims_only_its_language() {
        let set = ExtensionSet::standard(&ConvertOptions::default());

        let mermaid = RawBlock::Fence {
            info: "mermaid",
            literal: "graph TD",
        };
        assert!(matches!(
            set.parse_block(&mermaid),
            Some(Node::Diagram(Diagram { .. }))
        ));

        let rust = RawBlock::Fence {
            info: "rust",
            literal: "fn main() {}",
        };
        assert!(set.parse_block(&rust).is_none());
    }

    #[test]
    fn first_match_wins_across_duplicate_rules() {
        // Two diagram rules with different languages: declaration order decides.
        let set = ExtensionSet::with_rules(
            vec![
                Box::new(DiagramRule::new("mermaid".into())),
                Box::new(BlockMathRule),
            ],
            vec![],
        );
        let raw = RawBlock::DollarMath { latex: "1+1" };
        assert!(matches!(set.parse_block(&raw), Some(Node::BlockMath(_))));
    }

    #[test]
    fn degraded_payload_declines_emission() {
        let set = ExtensionSet::standard(&ConvertOptions::default());
        let empty = Node::Diagram(Diagram {
            content: String::new(),
        });
        assert_eq!(set.emit_block(&empty), None);
    }
}
