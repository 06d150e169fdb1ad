//! Placeholder scanning
//!
//! Locates `${...}` variable references and `#{...}` expression invocations
//! in arbitrary text, matching balanced braces so bodies may nest to any
//! depth and span line breaks. Anything that does not form a well-formed
//! placeholder is plain text.

pub mod lexer;
mod scan;

pub use scan::{next_placeholder, Placeholder, PlaceholderKind};
