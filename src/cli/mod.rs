// file: src/cli/mod.rs
// version: 2.1.0
// guid: a236a97f-b17c-4799-959c-1a9d0460cf4a

//! Command line interface for the GEOM partition agent

pub mod args;
pub mod commands;

pub use args::{confirmed, Cli, CONFIRM_TOKEN};
pub use commands::*;
