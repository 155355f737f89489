// file: src/logging/mod.rs
// version: 1.2.0
// guid: 011321d0-f05f-4236-a6de-29110ae71838

//! Logging system for the GEOM partition agent

pub mod logger;

pub use logger::{init_logger, with_operation_span};
