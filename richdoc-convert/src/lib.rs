//! Bidirectional Markdown ⇄ rich-document conversion
//!
//!     This crate is the conversion core of a rich Markdown editor: Markdown
//!     files on disk, a structured document model in memory, and an HTML
//!     carrier dialect on the editor side. Both directions must round-trip:
//!     an open/save cycle with no edits leaves structural content (diagrams,
//!     math, task lists, tables) byte-for-byte intact.
//!
//! Architecture
//!
//!     All conversions go through the document model (richdoc-model), never
//!     format to format directly. Each format contributes a parser and a
//!     serializer behind the Format trait, and a FormatRegistry owns the
//!     installed formats for discovery and filename-based selection.
//!
//!     Non-standard constructs (diagram fences, $/$$ math, badge images,
//!     task lists) are handled by small extension rules rather than by the
//!     format walkers themselves. A rule is a predicate + forward transform
//!     + reverse transform; rules live in ordered lists and the first match
//!     wins, so precedence is explicit and testable.
//!
//!     The file structure:
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── options.rs              # ConvertOptions injected into formats
//!     ├── extensions
//!     │   ├── block.rs            # diagram fences, $$ math
//!     │   └── inline.rs           # $ math, badge / linked images
//!     ├── formats
//!     │   ├── markdown
//!     │   │   ├── parser.rs
//!     │   │   └── serializer.rs
//!     │   └── carrier             # editor HTML dialect
//!     ├── paste.rs                # clipboard preprocessing
//!     └── protocol.rs             # host ⇄ editor message types
//!
//! Error handling
//!
//!     Parsing is total: any input string yields a Document, with malformed
//!     constructs degrading to text. FormatError exists for registry-level
//!     failures (unknown format, unsupported direction), not for content.
//!
//! Library choices
//!
//!     Markdown parsing is offloaded to comrak and HTML parsing to the
//!     html5ever/rcdom ecosystem; this crate only adapts their ASTs to the
//!     document model. The serializers are hand-written walkers because the
//!     round-trip contract needs exact control over emitted bytes, which
//!     generic pretty-printers do not give.

pub mod error;
pub mod extensions;
pub mod format;
pub mod formats;
pub mod options;
pub mod paste;
pub mod protocol;
pub mod registry;

pub use error::FormatError;
pub use format::Format;
pub use options::ConvertOptions;
pub use registry::FormatRegistry;

use richdoc_model::Document;

/// Import Markdown into a Document using the standard extension rules.
pub fn parse_markdown(source: &str, options: &ConvertOptions) -> Result<Document, FormatError> {
    formats::markdown::MarkdownFormat::new(options.clone()).parse(source)
}

/// Export a Document to Markdown using the standard extension rules.
pub fn serialize_markdown(
    document: &Document,
    options: &ConvertOptions,
) -> Result<String, FormatError> {
    formats::markdown::MarkdownFormat::new(options.clone()).serialize(document)
}

/// Markdown → editor carrier HTML, the editor's load path.
pub fn markdown_to_carrier(source: &str, options: &ConvertOptions) -> Result<String, FormatError> {
    let document = parse_markdown(source, options)?;
    formats::carrier::CarrierFormat::new(options.clone()).serialize(&document)
}

/// Editor carrier HTML → Markdown, the editor's save path.
pub fn carrier_to_markdown(source: &str, options: &ConvertOptions) -> Result<String, FormatError> {
    let document = formats::carrier::CarrierFormat::new(options.clone()).parse(source)?;
    serialize_markdown(&document, options)
}
