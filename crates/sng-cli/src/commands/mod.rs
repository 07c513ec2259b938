//! CLI command implementations

pub mod completions;
pub mod config;
pub mod generate;
pub mod graph;
pub mod seed;
pub mod serve;
