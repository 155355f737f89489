// file: src/lib.rs
// version: 3.1.0
// guid: 84df467a-45c5-4db8-9d4e-088df7a9e677

//! # GEOM Partition Agent
//!
//! Issues GEOM `PART` control requests through FreeBSD's `libgeom` and
//! reports the outcome. The binary deletes partition 1 of `ada1`; the
//! library also offers a deferred-commit editing session, a partition
//! table model and an in-process dry-run backend.

pub mod cli;
pub mod config;
pub mod error;
pub mod geom;
pub mod logging;
pub mod utils;

pub use error::{AgentError, Result};
