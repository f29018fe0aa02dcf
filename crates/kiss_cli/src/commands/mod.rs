//! CLI command implementations.

pub mod serve;
pub mod show;
pub mod tokens;
