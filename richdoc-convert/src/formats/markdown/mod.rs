//! Markdown format support.
//!
//! Element mapping:
//!
//! | Markdown construct            | Document node                          |
//! |-------------------------------|----------------------------------------|
//! | `# .. ######`                 | `Heading { level }`                    |
//! | paragraph                     | `Paragraph`                            |
//! | `>` quote                     | `Blockquote`                           |
//! | `-` / `1.` list               | `List { ordered }`                     |
//! | `- [ ]` / `- [x]` list        | `TaskList`                             |
//! | pipe table                    | `Table`                                |
//! | ```` ```lang ```` fence       | `CodeBlock { language }`               |
//! | ```` ```mermaid ```` fence    | `Diagram` (configurable info string)   |
//! | `$$ .. $$` standalone         | `BlockMath`                            |
//! | `$..$` span                   | `Inline::Math`                         |
//! | `---`                         | `ThematicBreak`                        |
//! | `<div align="..">` pair       | `Aligned`                              |
//! | `[![alt](src)](href)`         | `Inline::LinkedImage`                  |
//! | badge-host image              | `Inline::Image { badge: true }`        |
//!
//! Both directions are total: parsing never fails on any input string, and
//! serialization degrades malformed extended nodes to plain text instead of
//! erroring.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::extensions::ExtensionSet;
use crate::format::Format;
use crate::options::ConvertOptions;
use richdoc_model::Document;

pub struct MarkdownFormat {
    options: ConvertOptions,
    extensions: ExtensionSet,
}

impl MarkdownFormat {
    pub fn new(options: ConvertOptions) -> Self {
        let extensions = ExtensionSet::standard(&options);
        MarkdownFormat {
            options,
            extensions,
        }
    }
}

impl Default for MarkdownFormat {
    fn default() -> Self {
        MarkdownFormat::new(ConvertOptions::default())
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark with tables, task lists, math and diagram extensions"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parser::parse_from_markdown(source, &self.options, &self.extensions)
    }

    fn serialize(&self, document: &Document) -> Result<String, FormatError> {
        serializer::serialize_to_markdown(document, &self.extensions)
    }
}
