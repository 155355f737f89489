// file: src/geom/mod.rs
// version: 1.0.0
// guid: 4b6f0a2d-e193-47c8-8d5e-1c7a9b3f2e60

//! GEOM control requests and the backends that issue them

pub mod control;
pub mod libgeom;
pub mod part;
pub mod request;
pub mod table;

pub use control::{Control, DryRunControl};
pub use libgeom::LibGeom;
pub use part::{partition_type_for, PartSession};
pub use request::{Access, Param, ParamValue, Request};
pub use table::{create_table, FreeRange, Partition, PartitionTable};
