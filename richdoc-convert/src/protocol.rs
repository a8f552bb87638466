//! Host protocol messages.
//!
//! The editor webview and its host exchange tagged JSON messages. The tag
//! travels in a `type` field; payload fields are camelCase. Both directions
//! are modeled so either side of the bridge can be driven from Rust.

use serde::{Deserialize, Serialize};

/// Messages sent by the editor to its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorMessage {
    /// The editor finished booting and can accept content.
    Ready,
    /// The document changed; carries the current Markdown rendition.
    ContentChanged { content: String },
    /// Persist the current content.
    Save { content: String },
    /// Open an external link on the host side.
    OpenLink { href: String },
    /// Ask the host to resolve a relative image path.
    ConvertImagePath { src: String, id: String },
}

/// Messages sent by the host to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// Replace the whole document (initial load, external change).
    Update { content: String },
    /// Append content at the current cursor.
    Add { content: String },
    /// Answer to a `ConvertImagePath` request.
    ImagePathConverted { src: String, id: String },
}
