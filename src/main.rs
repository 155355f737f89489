// file: src/main.rs
// version: 2.1.0
// guid: 2f5c8e14-6a3b-4d90-9b71-c4e02a8d5f37

//! GEOM Partition Agent - Main entry point

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use geom_part_agent::{
    cli::{args::describe_parse_error, commands::*, confirmed, Cli},
    logging::logger,
    AgentError,
};

fn main() -> anyhow::Result<()> {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    if !confirmed(&args) {
        println!("No");
        std::process::exit(1);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Only the token is on the command line; the rest comes from the environment
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            logger::init_logger(false, false, false).context("Failed to initialize logging")?;
            let error = AgentError::config(describe_parse_error(&e));
            startup_failure_command(&error, &mut out).context("Failed to write report")?;
            return Ok(());
        }
    };

    logger::init_logger(cli.verbose, cli.quiet, cli.log_json)
        .context("Failed to initialize logging")?;

    match resolve_config(&cli) {
        Ok(config) => {
            let mut control = config.build_control();
            delete_command(&mut control, &mut out).context("Failed to write report")?;
        }
        Err(e) => {
            startup_failure_command(&e, &mut out).context("Failed to write report")?;
        }
    }

    Ok(())
}
