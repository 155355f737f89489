// file: src/utils/mod.rs
// version: 2.1.0
// guid: d3a3168b-ceb8-4053-b30e-c3e711e998b7

//! Utility modules

pub mod size;

pub use size::{bytes_to_string, string_to_bytes};
