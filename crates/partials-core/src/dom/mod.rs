//! In-memory page document.
//!
//! Stands in for the browser DOM: a tolerant parser for pages and fragments,
//! an arena node tree with the handful of queries the loader and its deferred
//! passes need, and a serializer for writing assembled pages back out.

pub mod document;
pub mod parser;

pub use document::{Document, NodeId};
pub use parser::{Attribute, Token, tokenize};
