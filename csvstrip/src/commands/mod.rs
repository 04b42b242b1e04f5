//! Subcommand implementations.

pub mod strip;
pub mod unescape;
