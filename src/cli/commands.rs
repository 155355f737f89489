// file: src/cli/commands.rs
// version: 2.1.0
// guid: 0d0c6f0e-9f52-490b-af5e-e7145a4074be

//! Command implementations for the CLI

use std::io::Write;

use tracing::{info, warn};

use super::args::Cli;
use crate::{
    config::{loader::ConfigLoader, AgentConfig},
    error::AgentError,
    geom::{part::PART_CLASS, Control, Request},
    logging::with_operation_span,
    Result,
};

/// Verb sent to the PART class
pub const TARGET_VERB: &str = "delete";
/// Provider whose partition is deleted
pub const TARGET_GEOM: &str = "ada1";
/// gpart index of the partition, sent as text
pub const TARGET_INDEX: &str = "1";

/// Build the fixed delete request
pub fn delete_request() -> Request {
    let mut request = Request::new();
    request
        .ro_param("class", PART_CLASS)
        .ro_param("verb", TARGET_VERB)
        .ro_param("geom", TARGET_GEOM)
        .ro_param("index", TARGET_INDEX);
    request
}

/// Issue the delete request through `control` and write the report to `out`
pub fn delete_command<C, W>(control: &mut C, out: &mut W) -> Result<()>
where
    C: Control + ?Sized,
    W: Write,
{
    with_operation_span("delete_partition", || -> Result<()> {
        let mut request = delete_request();
        info!(
            "Deleting partition {} of {} via {}",
            TARGET_INDEX,
            TARGET_GEOM,
            control.name()
        );

        let outcome = request.issue(&mut *control).map(|_| ());
        if let Err(e) = outcome {
            warn!("{} backend failed: {}", control.name(), e);
            request.set_error(e.to_string());
        }
        report(&request, out)
    })
}

/// Report a failure that happened before the request could be issued.
///
/// Goes through the same error branch as a rejected request, so an armed
/// run always ends with the report and a zero exit status.
pub fn startup_failure_command<W: Write>(error: &AgentError, out: &mut W) -> Result<()> {
    warn!("Not issuing the request: {}", error);
    let mut request = delete_request();
    request.set_error(error.to_string());
    report(&request, out)
}

fn report<W: Write>(request: &Request, out: &mut W) -> Result<()> {
    // The branches look swapped: an error prints the details and a clean
    // issue prints ERROR. Scripts parse this output, leave it as is.
    match request.error() {
        Some(error) => {
            writeln!(out, ": {}", error)?;
            request.dump(&mut *out)?;
        }
        None => writeln!(out, "ERROR")?,
    }
    out.flush()?;
    Ok(())
}

/// Merge the config file (if any) with environment overrides
pub fn resolve_config(cli: &Cli) -> Result<AgentConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new().load_agent_config(path)?,
        None => AgentConfig::default(),
    };

    if let Some(backend) = cli.backend {
        config.backend = backend.into();
    }
    if let Some(library) = &cli.library {
        config.library = library.clone();
    }
    if let Some(error) = &cli.dry_run_error {
        config.dry_run_error = Some(error.clone());
    }

    config.validate()?;
    info!(
        "Using {} backend (library {})",
        config.backend.as_str(),
        config.library
    );
    Ok(config)
}
