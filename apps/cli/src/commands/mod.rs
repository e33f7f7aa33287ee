//! Command implementations for the Partials CLI.

pub mod components;
pub mod migrate;
pub mod render;
pub mod stylesheet;
