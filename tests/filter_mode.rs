mod common;

use std::fs;
use std::time::Duration;

use powhegctl::errors::PowhegError;
use powhegctl::exec::{GenerationSession, SessionEvent, SessionState, FINAL_OUTPUT_FILE};
use powhegctl_test_utils::scripts::{
    copy_filter, endless_fifo_generator, finite_fifo_generator, head_filter, sh_script,
};
use tokio::sync::mpsc;

use common::{collect_events, init_tracing, real_fs, with_interval, with_timeout};

#[tokio::test]
async fn filter_exit_terminates_the_generator() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let generator = endless_fifo_generator(dir.path());
    let filter = head_filter(dir.path()).with_args(&["5", "accepted.lhe"]);

    let opts = with_interval(generator.session_options(dir.path()), Duration::from_secs(60));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = GenerationSession::new(opts, real_fs())
        .filtered(filter.filter_options("accepted.lhe"))
        .with_events(tx);

    let report = with_timeout(session.run()).await.unwrap();
    let events = collect_events(&mut rx);

    assert_eq!(session.state(), SessionState::Done);
    assert!(report.generator_terminated);
    assert_eq!(report.exit_code, None);

    let accepted = fs::read_to_string(&report.output).unwrap();
    assert_eq!(accepted.lines().count(), 5);
    assert!(accepted.starts_with("<event> 1 </event>"));

    // FIFO removed, filter output moved.
    assert!(!dir.path().join("pwgevents.lhe").exists());
    assert!(!dir.path().join("accepted.lhe").exists());

    assert!(events.contains(&SessionEvent::GeneratorTerminated));
    assert!(matches!(events.last(), Some(SessionEvent::Finished { .. })));
}

#[tokio::test]
async fn generator_finishing_first_is_not_killed_twice() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let generator = finite_fifo_generator(dir.path(), 20);
    let filter = copy_filter(dir.path()).with_args(&["all.lhe"]);

    let mut session = GenerationSession::new(generator.session_options(dir.path()), real_fs())
        .filtered(filter.filter_options("all.lhe"));

    let report = with_timeout(session.run()).await.unwrap();

    let events = fs::read_to_string(&report.output).unwrap();
    assert_eq!(events.lines().count(), 20);
}

#[tokio::test]
async fn filter_without_output_is_an_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let generator = endless_fifo_generator(dir.path());
    // Drains the FIFO but never writes the configured output.
    let filter = powhegctl_test_utils::scripts::sh_script(
        dir.path(),
        "lossy_filter.sh",
        "head -n 1 pwgevents.lhe > /dev/null",
    );

    let mut session = GenerationSession::new(generator.session_options(dir.path()), real_fs())
        .filtered(filter.filter_options("never_written.lhe"));

    let err = with_timeout(session.run()).await.unwrap_err();
    assert!(matches!(
        err,
        powhegctl::errors::PowhegError::MissingOutput { .. }
    ));
    assert!(!dir.path().join("pwgevents.lhe").exists());
}

#[tokio::test]
async fn generator_failing_before_writing_releases_the_filter() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    // Never opens the FIFO, so the filter is left blocked in open().
    let generator = sh_script(
        dir.path(),
        "broken_pwhg.sh",
        "echo 'cannot read powheg.input'\nexit 1",
    );
    let filter = copy_filter(dir.path()).with_args(&["all.lhe"]);

    let mut session = GenerationSession::new(generator.session_options(dir.path()), real_fs())
        .filtered(filter.filter_options("all.lhe"));

    let err = with_timeout(session.run()).await.unwrap_err();
    assert!(
        matches!(err, PowhegError::GeneratorFailed { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(session.state(), SessionState::Finalizing);
    assert!(!dir.path().join("pwgevents.lhe").exists());
    assert!(!dir.path().join(FINAL_OUTPUT_FILE).exists());
}

#[tokio::test]
async fn undecodable_generator_output_does_not_stop_filtering() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let generator = sh_script(
        dir.path(),
        "latin1_pwhg.sh",
        "printf 'caf\\351\\n'\nfor i in 1 2 3; do echo \"<event> $i </event>\"; done > pwgevents.lhe",
    );
    let filter = copy_filter(dir.path()).with_args(&["all.lhe"]);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = GenerationSession::new(generator.session_options(dir.path()), real_fs())
        .filtered(filter.filter_options("all.lhe"))
        .with_events(tx);

    let report = with_timeout(session.run()).await.unwrap();
    let events = collect_events(&mut rx);

    assert_eq!(report.output_lines, 1);
    assert_eq!(fs::read_to_string(&report.output).unwrap().lines().count(), 3);
    assert!(events.contains(&SessionEvent::Output {
        line: "caf\u{FFFD}".to_string()
    }));
}
