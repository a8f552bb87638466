//! Carrier format support: the HTML dialect exchanged with the rich editor.
//!
//! Extended nodes travel as data-attributes on plain elements so the editor
//! can mount widgets over them:
//!
//! | Document node          | Carrier element                                          |
//! |------------------------|----------------------------------------------------------|
//! | `Diagram`              | `<div data-type="<lang>" data-content="..">`             |
//! | `BlockMath`            | `<div data-latex=".." data-type="block-math">`           |
//! | `Inline::Math`         | `<span data-latex=".." data-type="inline-math">`         |
//! | `TaskList` / `TaskItem`| `<ul data-type="taskList">` / `<li data-checked="..">`   |
//! | `Aligned`              | `<div align="..">`                                       |
//!
//! Attribute values are entity-escaped on the way in and decoded by the HTML
//! tokenizer on the way out, so payloads with quotes, angle brackets and
//! backslash sequences survive a full cycle byte-for-byte.
//!
//! Parsing is defensive: a math or diagram element missing its payload
//! attribute falls back to its text content, and unknown elements strip to
//! their text rather than being dropped.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::Format;
use crate::options::ConvertOptions;
use richdoc_model::Document;

pub struct CarrierFormat {
    options: ConvertOptions,
}

impl CarrierFormat {
    pub fn new(options: ConvertOptions) -> Self {
        CarrierFormat { options }
    }
}

impl Default for CarrierFormat {
    fn default() -> Self {
        CarrierFormat::new(ConvertOptions::default())
    }
}

impl Format for CarrierFormat {
    fn name(&self) -> &str {
        "carrier"
    }

    fn description(&self) -> &str {
        "Editor HTML with data-attribute encoded extended nodes"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parser::parse_from_carrier(source, &self.options)
    }

    fn serialize(&self, document: &Document) -> Result<String, FormatError> {
        serializer::serialize_to_carrier(document, &self.options)
    }
}
