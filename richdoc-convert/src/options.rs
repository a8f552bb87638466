//! Conversion options injected into format constructors.

use serde::{Deserialize, Serialize};

/// Knobs shared by the Markdown and carrier formats.
///
/// Passed in at construction rather than read from global state, so that
/// rule precedence and classification can be tested deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Info-string tag that marks a fenced block as a diagram.
    pub diagram_language: String,
    /// Substrings identifying badge-generation image hosts. This is a closed
    /// allowlist carried over from the editor, not a general rule.
    pub badge_hosts: Vec<String>,
    /// Enable smart punctuation when parsing Markdown.
    pub typographer: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            diagram_language: "mermaid".to_string(),
            badge_hosts: vec![
                "shields.io".to_string(),
                "badge.fury.io".to_string(),
                "badges.gitter".to_string(),
                "badgen.net".to_string(),
            ],
            typographer: true,
        }
    }
}

impl ConvertOptions {
    /// Whether `src` points at a known badge host.
    pub fn is_badge_src(&self, src: &str) -> bool {
        self.badge_hosts.iter().any(|host| src.contains(host))
    }
}
