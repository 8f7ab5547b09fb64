//! Small helpers shared by the workspace crates: environment lookups and TOML config files.

pub mod config;
pub mod env;
