// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod runcard;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_job, validate_process_overrides, JobFile, PowhegEnvironment};
use crate::exec::{
    FilterOptions, GenerationSession, SessionOptions, GRIDS_FILE, UBOUND_FILE,
};
use crate::fs::{FileSystem, RealFileSystem};
use crate::runcard::{
    render, RunArgs, RunCard, RunConfiguration, RunConfigurationBuilder,
};
use crate::types::ProcessKind;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - job file loading and the CLI overrides
/// - run configuration and the `powheg.input` run-card
/// - the generation session (plain or filtered)
pub async fn run(args: CliArgs) -> Result<()> {
    let job = load_job(args.config.as_deref())?;

    let kind = match args.process {
        Some(kind) => {
            // The job file was validated against its own process.
            validate_process_overrides(kind, &job.process)?;
            kind
        }
        None => job.generation.process,
    };

    let env = PowhegEnvironment::from_env();
    let workdir = args.workdir.clone().unwrap_or_else(|| env.workdir.clone());
    let run_args = args.run_args();

    let config = build_configuration(kind, &job, run_args.as_ref());
    let executable = env.generator_executable(&config.process, job.generation.executable.as_deref());

    if args.dry_run {
        let card = render(&config);
        print_dry_run(
            &config,
            executable.as_ref().ok().map(PathBuf::as_path),
            &workdir,
            &card,
        );
        return Ok(());
    }
    let executable = executable?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let options = SessionOptions {
        workdir,
        executable,
        args: Vec::new(),
        heartbeat_interval: job.generation.heartbeat_interval(),
        reweight: job.generation.reweight,
        expected_events: config.numevts,
    };

    let mut session = GenerationSession::new(options, fs).with_run_card(config);
    if let Some(filter) = &job.filter {
        session = session.filtered(FilterOptions {
            executable: env.filter_executable(&filter.executable),
            args: filter.args.clone(),
            output: filter.output.clone(),
        });
    }

    let report = session.run().await?;
    info!(
        output = %report.output.display(),
        elapsed_secs = report.elapsed.as_secs_f64(),
        heartbeats = report.heartbeats,
        exit_code = ?report.exit_code,
        generator_terminated = report.generator_terminated,
        "generation complete"
    );
    Ok(())
}

/// Layer the job file and run arguments onto the defaults of `kind`.
pub fn build_configuration(
    kind: ProcessKind,
    job: &JobFile,
    run_args: Option<&RunArgs>,
) -> RunConfiguration {
    RunConfigurationBuilder::new(kind)
        .apply_group_overrides(&job.groups)
        .apply_overrides(&job.runcard)
        .apply_process_overrides(&job.process)
        .reweight(job.generation.reweight)
        .apply_run_args(run_args)
        .build()
}

fn print_dry_run(
    config: &RunConfiguration,
    executable: Option<&Path>,
    workdir: &Path,
    card: &RunCard,
) {
    println!("powhegctl dry-run");
    println!("  process = {}", config.process.kind());
    match executable {
        Some(exe) => println!("  executable = {}", exe.display()),
        None => println!("  executable = <unresolved: POWHEGPATH not set>"),
    }
    println!("  workdir = {}", workdir.display());
    for cache in [GRIDS_FILE, UBOUND_FILE] {
        let present = workdir.join(cache).is_file();
        println!("  {cache}: {}", if present { "present" } else { "absent" });
    }
    println!("  digest = {}", card.digest());
    for warning in &card.warnings {
        println!("  warning: {warning}");
    }
    println!();
    print!("{}", card.to_text());

    debug!("dry-run complete (no execution)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationSection, RunCardOverrides};

    #[test]
    fn run_arguments_override_job_file() {
        let job = JobFile {
            generation: GenerationSection {
                process: ProcessKind::Z,
                ..GenerationSection::default()
            },
            runcard: RunCardOverrides {
                numevts: Some(200),
                iseed: Some(7),
                ..RunCardOverrides::default()
            },
            ..JobFile::default()
        };
        let args = RunArgs {
            ecm_energy: Some(13000.0),
            max_events: Some(1000),
            random_seed: None,
        };

        let cfg = build_configuration(ProcessKind::Z, &job, Some(&args));
        assert_eq!(cfg.numevts, 1000);
        assert_eq!(cfg.iseed, 7);
        assert_eq!(cfg.ebeam1, 6500.0);
        assert_eq!(cfg.ebeam2, 6500.0);
    }

    #[test]
    fn reweight_flag_reaches_the_card() {
        let mut job = JobFile::default();
        job.generation.reweight = true;

        let cfg = build_configuration(ProcessKind::W, &job, None);
        assert!(cfg.compute_rwgt);
    }
}
