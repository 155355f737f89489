// file: src/geom/control.rs
// version: 1.0.0
// guid: 1f8a2c47-5be0-4d39-9c61-70e4a3d8b512

//! Control backends that accept a [`Request`] and report the kernel's answer

use std::collections::VecDeque;

use tracing::{debug, info};

use super::request::Request;
use crate::Result;

/// Something that can submit a control request to the GEOM subsystem.
///
/// `Ok(None)` means the request was accepted, `Ok(Some(text))` carries the
/// error string the subsystem returned. `Err` is reserved for failures to
/// reach the subsystem at all.
pub trait Control {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Submit `request` and return the subsystem's error text, if any
    fn issue(&mut self, request: &Request) -> Result<Option<String>>;
}

impl<C: Control + ?Sized> Control for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn issue(&mut self, request: &Request) -> Result<Option<String>> {
        (**self).issue(request)
    }
}

/// In-process backend that never touches a disk.
///
/// Every issued request is recorded. Answers come from the scripted queue
/// first and fall back to the default outcome once it is empty.
#[derive(Debug, Default)]
pub struct DryRunControl {
    default_error: Option<String>,
    scripted: VecDeque<Option<String>>,
    issued: Vec<Request>,
}

impl DryRunControl {
    /// Backend that accepts every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that rejects every request with `error`
    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            default_error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Queue the outcome of the next unscripted issue
    pub fn push_outcome(&mut self, outcome: Option<&str>) -> &mut Self {
        self.scripted.push_back(outcome.map(str::to_string));
        self
    }

    /// Requests issued so far, oldest first
    pub fn issued(&self) -> &[Request] {
        &self.issued
    }
}

impl Control for DryRunControl {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn issue(&mut self, request: &Request) -> Result<Option<String>> {
        info!("DRY RUN: would issue gctl request: {}", request);
        self.issued.push(request.clone());

        let outcome = match self.scripted.pop_front() {
            Some(outcome) => outcome,
            None => self.default_error.clone(),
        };
        debug!("DRY RUN: answering with {:?}", outcome);
        Ok(outcome)
    }
}
