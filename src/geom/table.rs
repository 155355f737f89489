// file: src/geom/table.rs
// version: 1.0.0
// guid: 9a2e5d70-c614-4b8f-a3d9-42f0e8b17c65

//! Partition table model and the gpart verbs that edit it

use libc::c_long;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::control::Control;
use super::part::{partition_type_for, PartSession};
use super::request::Param;
use crate::error::AgentError;
use crate::Result;

/// One partition inside a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub name: String,
    pub bytes: u64,
    pub sector_size: u32,
    pub part_type: Option<String>,
    pub raw_type: Option<String>,
    /// First sector, inclusive
    pub start: u64,
    /// Last sector, inclusive
    pub end: u64,
    pub index: u32,
    pub label: Option<String>,
}

/// Unallocated sectors, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeRange {
    pub start: u64,
    pub end: u64,
}

impl FreeRange {
    pub fn sectors(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// A partitioned provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTable {
    pub name: String,
    pub scheme: String,
    /// First usable sector
    pub first: u64,
    /// Last usable sector
    pub last: u64,
    pub size: u64,
    pub sector_size: u32,
    partitions: Vec<Partition>,
}

impl PartitionTable {
    pub fn new(
        name: impl Into<String>,
        scheme: impl Into<String>,
        first: u64,
        last: u64,
        size: u64,
        sector_size: u32,
    ) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
            first,
            last,
            size,
            sector_size,
            partitions: Vec::new(),
        }
    }

    /// Partitions ordered by start sector
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Insert keeping the start-sector order
    pub fn add(&mut self, partition: Partition) {
        let position = self
            .partitions
            .iter()
            .position(|p| partition.start < p.start)
            .unwrap_or(self.partitions.len());
        self.partitions.insert(position, partition);
    }

    pub fn find(&self, index: u32) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.index == index)
    }

    /// Gaps before, between and after the partitions
    pub fn free_ranges(&self) -> Vec<FreeRange> {
        let mut ranges = Vec::new();
        // None once a partition reaches the last addressable sector
        let mut next = Some(self.first);
        for partition in &self.partitions {
            let Some(from) = next else { break };
            if partition.start > from {
                ranges.push(FreeRange {
                    start: from,
                    end: partition.start - 1,
                });
            }
            next = partition.end.checked_add(1).map(|after| after.max(from));
        }
        if let Some(from) = next.filter(|from| *from <= self.last) {
            ranges.push(FreeRange {
                start: from,
                end: self.last,
            });
        }
        ranges
    }

    /// Stage deletion of the partition with gpart index `index`.
    ///
    /// The partition leaves the model only once the kernel accepted the
    /// request.
    pub fn delete_partition<C: Control + ?Sized>(
        &mut self,
        session: &mut PartSession<'_, C>,
        index: u32,
    ) -> Result<Option<String>> {
        let Some(position) = self.partitions.iter().position(|p| p.index == index) else {
            return Ok(Some(format!("no partition with index {}", index)));
        };
        let value = c_long::try_from(index)
            .map_err(|_| AgentError::invalid_parameter(format!("index {} out of range", index)))?;

        let error = session.run(&self.name, "delete", vec![Param::ro("index", value)])?;
        if error.is_none() {
            let removed = self.partitions.remove(position);
            info!("Deleted {} from {}", removed.name, self.name);
        }
        Ok(error)
    }

    /// Stage a new partition. `start` and `size` are in bytes and get
    /// rounded onto the table's sectors.
    pub fn create_partition<C: Control + ?Sized>(
        &self,
        session: &mut PartSession<'_, C>,
        label: &str,
        start: u64,
        size: u64,
        ty: &str,
    ) -> Result<Option<String>> {
        if self.sector_size == 0 {
            return Err(AgentError::invalid_parameter(format!(
                "{} has a sector size of 0",
                self.name
            )));
        }
        let sector_size = u64::from(self.sector_size);

        let mut params = Vec::new();
        if !label.is_empty() {
            params.push(Param::ro("label", label));
        }
        if !ty.is_empty() {
            params.push(Param::ro("type", partition_type_for(&self.scheme, ty)));
        }

        let start = (start / sector_size).max(self.first);
        if start > self.last {
            return Ok(Some(format!(
                "start sector {} is past the end of {}",
                start, self.name
            )));
        }
        let mut size = (size / sector_size).saturating_add(1);
        if size > self.last - start {
            size = (self.last - start).saturating_add(1);
        }

        params.push(Param::ro("start", start.to_string()));
        params.push(Param::ro("size", size.to_string()));

        session.run(&self.name, "add", params)
    }

    /// Stage removal of the whole table; refused while partitions remain
    pub fn destroy<C: Control + ?Sized>(
        &self,
        session: &mut PartSession<'_, C>,
    ) -> Result<Option<String>> {
        if !self.partitions.is_empty() {
            return Ok(Some(
                "Disk is not empty, remove partitions first!".to_string(),
            ));
        }
        session.run(&self.name, "destroy", Vec::new())
    }
}

/// Stage a fresh partitioning scheme on `provider`
pub fn create_table<C: Control + ?Sized>(
    session: &mut PartSession<'_, C>,
    provider: &str,
    scheme: &str,
) -> Result<Option<String>> {
    session.run(provider, "create", vec![Param::ro("scheme", scheme)])
}
