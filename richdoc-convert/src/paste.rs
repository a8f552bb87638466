//! Paste preprocessing.
//!
//! Clipboard text pasted into the editor sometimes arrives wrapped in a
//! Markdown code fence (chat tools and AI assistants export that way). The
//! wrapper is unwrapped before import so the payload is edited as rich
//! content, not as a code block.

use once_cell::sync::Lazy;
use regex::Regex;

// The fence must span the remainder of the text; a fenced snippet in the
// middle of prose is real content, not a wrapper.
static MARKDOWN_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```(?:markdown|md)[ \t]*\n([\s\S]*?)\n```\s*$").expect("static regex")
});

/// Strip a markdown-fence wrapper, returning the inner payload, or `None`
/// when the text is not fence-wrapped.
pub fn unwrap_markdown_fence(text: &str) -> Option<String> {
    MARKDOWN_FENCE
        .captures(text.trim_start())
        .map(|captures| captures[1].to_string())
}

/// Heuristic for clipboard HTML that originated in a rich editor rather
/// than a plain-text source. Editor-origin HTML is imported via the carrier
/// parser; everything else goes through Markdown import.
pub fn is_editor_origin_html(html: &str) -> bool {
    html.contains("ProseMirror")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_markdown_fence() {
        let wrapped = "```markdown\n# Title\n\nBody with `code`.\n```";
        assert_eq!(
            unwrap_markdown_fence(wrapped).as_deref(),
            Some("# Title\n\nBody with `code`.")
        );
    }

    #[test]
    fn unwraps_md_alias_and_trailing_whitespace() {
        let wrapped = "```md\ncontent\n```\n";
        assert_eq!(unwrap_markdown_fence(wrapped).as_deref(), Some("content"));
    }

    #[test]
    fn leaves_other_fences_alone() {
        assert_eq!(unwrap_markdown_fence("```rust\nfn main() {}\n```"), None);
    }

    #[test]
    fn leaves_fences_embedded_in_prose_alone() {
        let text = "intro\n\n```markdown\ninner\n```\n\noutro";
        assert_eq!(unwrap_markdown_fence(text), None);
    }

    #[test]
    fn inner_fences_survive_one_unwrap() {
        // Only the outer wrapper is removed; nested fences are payload.
        let wrapped = "```markdown\n```mermaid\ngraph TD\n```\n```";
        assert_eq!(
            unwrap_markdown_fence(wrapped).as_deref(),
            Some("```mermaid\ngraph TD\n```")
        );
    }

    #[test]
    fn editor_origin_detection() {
        assert!(is_editor_origin_html(
            "<p class=\"ProseMirror-paragraph\">x</p>"
        ));
        assert!(!is_editor_origin_html("<p>plain</p>"));
    }
}
