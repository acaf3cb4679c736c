//! CLI subcommands.

pub mod apply;
pub mod common;
pub mod plan;
