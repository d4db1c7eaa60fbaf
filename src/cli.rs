// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::runcard::RunArgs;
use crate::types::ProcessKind;

/// Command-line arguments for `powhegctl`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "powhegctl",
    version,
    about = "Write a POWHEG-BOX run-card and supervise pwhg_main.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the job file (TOML).
    ///
    /// Default: `powheg.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Process family (bb, dijet, ggh, vbfh, w, z, ww, wz, zz, tt).
    ///
    /// Overrides `[generation].process` in the job file.
    #[arg(long, value_name = "NAME")]
    pub process: Option<ProcessKind>,

    /// Centre-of-mass energy in GeV; each beam gets half.
    #[arg(long, value_name = "GEV")]
    pub ecm_energy: Option<f64>,

    /// Number of events. Values <= 0 keep the configured `numevts`.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_events: Option<i64>,

    #[arg(long, value_name = "SEED")]
    pub random_seed: Option<i64>,

    /// Working directory for pwhg_main. Default: `$PWD`.
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `POWHEGCTL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Render and print the run-card, but don't run the generator.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Run arguments given on the command line, or `None` if there are none.
    pub fn run_args(&self) -> Option<RunArgs> {
        let args = RunArgs {
            ecm_energy: self.ecm_energy,
            max_events: self.max_events,
            random_seed: self.random_seed,
        };
        (!args.is_empty()).then_some(args)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_absent_without_flags() {
        let args = CliArgs::parse_from(["powhegctl", "--process", "zz"]);
        assert_eq!(args.process, Some(ProcessKind::Zz));
        assert!(args.run_args().is_none());
    }

    #[test]
    fn run_args_collected() {
        let args = CliArgs::parse_from([
            "powhegctl",
            "--ecm-energy",
            "13000",
            "--max-events",
            "-1",
            "--random-seed",
            "42",
        ]);
        assert_eq!(
            args.run_args(),
            Some(RunArgs {
                ecm_energy: Some(13000.0),
                max_events: Some(-1),
                random_seed: Some(42),
            })
        );
    }

    #[test]
    fn unknown_process_is_rejected() {
        assert!(CliArgs::try_parse_from(["powhegctl", "--process", "higgs"]).is_err());
    }
}
