//! Format implementations.
//!
//! Each format lives in its own module with a `parser.rs` / `serializer.rs`
//! pair behind a thin [`crate::format::Format`] wrapper.

pub mod carrier;
pub mod markdown;
