// file: src/cli/args.rs
// version: 2.1.0
// guid: 87ca8c6e-d7ae-48b7-8a00-a6fbaeba54f7

//! Command line argument definitions
//!
//! The command line carries nothing but the confirmation token. Every other
//! setting is read from the environment.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::error::ContextKind;
use clap::{ArgAction, CommandFactory, Parser};

use crate::config::BackendKind;

/// The single argument that arms the command
pub const CONFIRM_TOKEN: &str = "doit";

/// True when `args` (program name excluded) is exactly the confirmation token
pub fn confirmed(args: &[OsString]) -> bool {
    matches!(args, [only] if only.as_os_str() == OsStr::new(CONFIRM_TOKEN))
}

/// Phrase a parse failure in terms of the environment variable that caused it.
///
/// Settings can only arrive through the environment, so clap's own message,
/// which names the long flag, would point at something nobody can type.
pub fn describe_parse_error(err: &clap::Error) -> String {
    let invalid_arg = err.get(ContextKind::InvalidArg).map(|v| v.to_string());
    let invalid_value = err.get(ContextKind::InvalidValue).map(|v| v.to_string());

    let env_name = invalid_arg.as_deref().and_then(|invalid| {
        Cli::command().get_arguments().find_map(|arg| {
            let long = format!("--{}", arg.get_long()?);
            let matches = invalid == long || invalid.starts_with(&format!("{} ", long));
            if matches {
                arg.get_env().map(|env| env.to_string_lossy().into_owned())
            } else {
                None
            }
        })
    });

    match (env_name, invalid_value) {
        (Some(env), Some(value)) => format!("invalid value '{}' for {}", value, env),
        (Some(env), None) => format!("invalid setting in {}", env),
        _ => format!("invalid settings: {}", err.kind()),
    }
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "geom-part-agent")]
#[command(about = "Delete partition 1 of ada1 through the GEOM PART control interface")]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Confirmation token, must be `doit`
    #[arg(value_name = "CONFIRM")]
    pub confirm: String,

    #[arg(long, env = "GEOM_PART_VERBOSE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new(), hide = true)]
    pub verbose: bool,

    #[arg(long, env = "GEOM_PART_QUIET", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new(), hide = true)]
    pub quiet: bool,

    #[arg(long, env = "GEOM_PART_LOG_JSON", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new(), hide = true)]
    pub log_json: bool,

    #[arg(long, env = "GEOM_PART_BACKEND", value_enum, hide = true)]
    pub backend: Option<BackendArg>,

    #[arg(long, env = "GEOM_PART_LIBRARY", hide = true)]
    pub library: Option<String>,

    #[arg(long, env = "GEOM_PART_DRY_RUN_ERROR", hide = true)]
    pub dry_run_error: Option<String>,

    #[arg(long, env = "GEOM_PART_CONFIG", hide = true)]
    pub config: Option<PathBuf>,
}

/// Backend argument for CLI
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    Libgeom,
    DryRun,
}

impl From<BackendArg> for BackendKind {
    fn from(backend: BackendArg) -> Self {
        match backend {
            BackendArg::Libgeom => BackendKind::Libgeom,
            BackendArg::DryRun => BackendKind::DryRun,
        }
    }
}

impl From<BackendKind> for BackendArg {
    fn from(backend: BackendKind) -> Self {
        match backend {
            BackendKind::Libgeom => BackendArg::Libgeom,
            BackendKind::DryRun => BackendArg::DryRun,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_confirmed_requires_exact_token() {
        assert!(confirmed(&os(&["doit"])));
        assert!(!confirmed(&os(&[])));
        assert!(!confirmed(&os(&["DOIT"])));
        assert!(!confirmed(&os(&["doit", "doit"])));
        assert!(!confirmed(&os(&["--", "doit"])));
        assert!(!confirmed(&os(&["doit "])));
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "geom-part-agent",
            "--backend",
            "dry-run",
            "--dry-run-error",
            "Device busy",
            "--verbose",
            "doit",
        ])
        .unwrap();

        assert_eq!(cli.confirm, "doit");
        assert_eq!(cli.backend, Some(BackendArg::DryRun));
        assert_eq!(cli.dry_run_error.as_deref(), Some("Device busy"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_error_names_environment_variable() {
        let err = Cli::try_parse_from(["geom-part-agent", "--backend", "bogus", "doit"])
            .unwrap_err();

        let text = describe_parse_error(&err);

        assert_eq!(text, "invalid value 'bogus' for GEOM_PART_BACKEND");
    }

    #[test]
    fn test_backend_arg_round_trip() {
        assert_eq!(BackendKind::from(BackendArg::DryRun), BackendKind::DryRun);
        assert_eq!(BackendArg::from(BackendKind::Libgeom), BackendArg::Libgeom);
    }
}
