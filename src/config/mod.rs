// file: src/config/mod.rs
// version: 2.1.0
// guid: c4b9d65f-de2e-429f-b0f3-a8200c0322e1

//! Configuration module for the GEOM partition agent
//!
//! Selects the control backend and its settings. Values come from an
//! optional YAML file and are then overridden from the environment.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::geom::libgeom::DEFAULT_LIBRARY;
use crate::geom::{Control, DryRunControl, LibGeom};
use crate::Result;

/// Which control backend issues requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// FreeBSD's libgeom, loaded at runtime
    #[default]
    #[serde(rename = "libgeom")]
    Libgeom,
    /// In-process stub, nothing reaches the kernel
    #[serde(rename = "dry-run")]
    DryRun,
}

impl BackendKind {
    /// Get the backend as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Libgeom => "libgeom",
            BackendKind::DryRun => "dry-run",
        }
    }
}

/// Resolved agent settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    pub backend: BackendKind,
    /// Path or soname handed to the dynamic loader
    pub library: String,
    /// Error the dry-run backend answers with; `None` accepts everything
    pub dry_run_error: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            library: DEFAULT_LIBRARY.to_string(),
            dry_run_error: None,
        }
    }
}

impl AgentConfig {
    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.library.trim().is_empty() {
            return Err(crate::error::AgentError::config(
                "library path must not be empty",
            ));
        }
        Ok(())
    }

    /// Build the backend these settings describe
    pub fn build_control(&self) -> Box<dyn Control> {
        match self.backend {
            BackendKind::Libgeom => Box::new(LibGeom::new(self.library.clone())),
            BackendKind::DryRun => match &self.dry_run_error {
                Some(error) => Box::new(DryRunControl::with_error(error.clone())),
                None => Box::new(DryRunControl::new()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_libgeom() {
        let config = AgentConfig::default();
        assert_eq!(config.backend, BackendKind::Libgeom);
        assert_eq!(config.library, "libgeom.so.5");
        assert!(config.validate().is_ok());
        assert_eq!(config.build_control().name(), "libgeom");
    }

    #[test]
    fn test_empty_library_rejected() {
        let config = AgentConfig {
            library: "  ".to_string(),
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dry_run_control_answers_configured_error() {
        let config = AgentConfig {
            backend: BackendKind::DryRun,
            dry_run_error: Some("Device busy".to_string()),
            ..AgentConfig::default()
        };
        let mut control = config.build_control();
        let answer = control.issue(&crate::geom::Request::new()).unwrap();
        assert_eq!(answer.as_deref(), Some("Device busy"));
    }
}
