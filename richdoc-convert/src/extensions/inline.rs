//! Inline extension rules: `$...$` math and badge/linked image classification.

use richdoc_model::{Image, Inline, InlineMath, LinkedImage};

/// A raw inline token as seen by the extension pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInline<'a> {
    /// A `$...$` span, delimiters stripped, single-line, non-empty, not
    /// inside code.
    DollarMath { latex: &'a str },
    /// A link whose sole content is an image.
    WrappedImage {
        href: &'a str,
        src: &'a str,
        alt: &'a str,
        title: Option<&'a str>,
    },
    /// A bare image.
    Image {
        src: &'a str,
        alt: &'a str,
        title: Option<&'a str>,
    },
}

/// One inline extension: predicate, forward transform, reverse transform.
pub trait InlineRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, raw: &RawInline<'_>) -> bool;

    fn build(&self, raw: &RawInline<'_>) -> Inline;

    fn owns(&self, inline: &Inline) -> bool;

    /// `None` means the payload is degraded; the caller reconstructs from
    /// plain text.
    fn emit(&self, inline: &Inline) -> Option<String>;
}

/// Rewrites `$...$` spans into inline math nodes.
pub struct InlineMathRule;

impl InlineRule for InlineMathRule {
    fn name(&self) -> &'static str {
        "inline-math"
    }

    fn matches(&self, raw: &RawInline<'_>) -> bool {
        matches!(raw, RawInline::DollarMath { latex } if !latex.is_empty())
    }

    fn build(&self, raw: &RawInline<'_>) -> Inline {
        match raw {
            RawInline::DollarMath { latex } => Inline::Math(InlineMath {
                latex: (*latex).to_string(),
            }),
            _ => Inline::text(""),
        }
    }

    fn owns(&self, inline: &Inline) -> bool {
        matches!(inline, Inline::Math(_))
    }

    fn emit(&self, inline: &Inline) -> Option<String> {
        match inline {
            Inline::Math(math) if !math.latex.is_empty() => Some(format!("${}$", math.latex)),
            _ => None,
        }
    }
}

/// Classifies a link wrapping a single image as a linked-image composite,
/// flagged as a badge when the image src matches a known badge host. The
/// wrapping href stays associated with the inner image either way; only the
/// internal classification differs.
pub struct LinkedImageRule {
    badge_hosts: Vec<String>,
}

impl LinkedImageRule {
    pub fn new(badge_hosts: Vec<String>) -> Self {
        LinkedImageRule { badge_hosts }
    }

    fn is_badge(&self, src: &str) -> bool {
        self.badge_hosts.iter().any(|host| src.contains(host))
    }
}

impl InlineRule for LinkedImageRule {
    fn name(&self) -> &'static str {
        "linked-image"
    }

    fn matches(&self, raw: &RawInline<'_>) -> bool {
        matches!(raw, RawInline::WrappedImage { .. })
    }

    fn build(&self, raw: &RawInline<'_>) -> Inline {
        match raw {
            RawInline::WrappedImage {
                href,
                src,
                alt,
                title,
            } => Inline::LinkedImage(LinkedImage {
                src: (*src).to_string(),
                alt: (*alt).to_string(),
                title: title.map(str::to_string),
                href: (*href).to_string(),
                badge: self.is_badge(src),
            }),
            _ => Inline::text(""),
        }
    }

    fn owns(&self, inline: &Inline) -> bool {
        matches!(inline, Inline::LinkedImage(_))
    }

    fn emit(&self, inline: &Inline) -> Option<String> {
        match inline {
            Inline::LinkedImage(image) if !image.src.is_empty() => Some(format!(
                "[![{}]({})]({})",
                image.alt, image.src, image.href
            )),
            _ => None,
        }
    }
}

/// Flags bare images served by a badge host. Non-badge images fall through
/// to the parser's standard image handling.
pub struct BadgeImageRule {
    badge_hosts: Vec<String>,
}

impl BadgeImageRule {
    pub fn new(badge_hosts: Vec<String>) -> Self {
        BadgeImageRule { badge_hosts }
    }

    fn is_badge(&self, src: &str) -> bool {
        self.badge_hosts.iter().any(|host| src.contains(host))
    }
}

impl InlineRule for BadgeImageRule {
    fn name(&self) -> &'static str {
        "badge-image"
    }

    fn matches(&self, raw: &RawInline<'_>) -> bool {
        matches!(raw, RawInline::Image { src, .. } if self.is_badge(src))
    }

    fn build(&self, raw: &RawInline<'_>) -> Inline {
        match raw {
            RawInline::Image { src, alt, title } => Inline::Image(Image {
                src: (*src).to_string(),
                alt: (*alt).to_string(),
                title: title.map(str::to_string),
                badge: true,
            }),
            _ => Inline::text(""),
        }
    }

    fn owns(&self, inline: &Inline) -> bool {
        matches!(inline, Inline::Image(image) if image.badge)
    }

    fn emit(&self, inline: &Inline) -> Option<String> {
        match inline {
            Inline::Image(image) if !image.src.is_empty() => {
                Some(format!("![{}]({})", image.alt, image.src))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["shields.io".to_string(), "badgen.net".to_string()]
    }

    #[test]
    fn inline_math_requires_nonempty_payload() {
        let rule = InlineMathRule;
        assert!(rule.matches(&RawInline::DollarMath { latex: "E=mc^2" }));
        assert!(!rule.matches(&RawInline::DollarMath { latex: "" }));
    }

    #[test]
    fn wrapped_badge_image_is_classified() {
        let rule = LinkedImageRule::new(hosts());
        let raw = RawInline::WrappedImage {
            href: "https://crates.io/crates/x",
            src: "https://img.shields.io/crates/v/x.svg",
            alt: "crates.io",
            title: None,
        };
        match rule.build(&raw) {
            Inline::LinkedImage(image) => {
                assert!(image.badge);
                assert_eq!(image.href, "https://crates.io/crates/x");
            }
            other => panic!("expected linked image, got {other:?}"),
        }
    }

    #[test]
    fn wrapped_plain_image_keeps_the_composite_without_badge() {
        let rule = LinkedImageRule::new(hosts());
        let raw = RawInline::WrappedImage {
            href: "https://example.com",
            src: "https://example.com/logo.png",
            alt: "logo",
            title: None,
        };
        match rule.build(&raw) {
            Inline::LinkedImage(image) => assert!(!image.badge),
            other => panic!("expected linked image, got {other:?}"),
        }
    }

    #[test]
    fn linked_image_emission_shape() {
        let rule = LinkedImageRule::new(hosts());
        let inline = Inline::LinkedImage(LinkedImage {
            src: "https://img.shields.io/b.svg".into(),
            alt: "build".into(),
            title: None,
            href: "https://ci.example.com".into(),
            badge: true,
        });
        assert_eq!(
            rule.emit(&inline).unwrap(),
            "[![build](https://img.shields.io/b.svg)](https://ci.example.com)"
        );
    }

    #[test]
    fn bare_badge_image_matches_only_badge_hosts() {
        let rule = BadgeImageRule::new(hosts());
        assert!(rule.matches(&RawInline::Image {
            src: "https://badgen.net/npm/v/x",
            alt: "npm",
            title: None,
        }));
        assert!(!rule.matches(&RawInline::Image {
            src: "https://example.com/a.png",
            alt: "a",
            title: None,
        }));
    }
}
