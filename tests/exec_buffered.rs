#![cfg(unix)]

mod common;
use crate::common::{Collected, OptionsBuilder, TestResult, init_tracing, with_timeout};

use shellexec::errors::ExecError;
use shellexec::exec::{BufferedRun, CommandOptions, ProcessControl, exec_buffered, run_buffered};

#[tokio::test]
async fn captures_stdout_without_trailing_newline() -> TestResult {
    init_tracing();

    let out = with_timeout(exec_buffered("echo hello", CommandOptions::new(), None)).await?;

    assert_eq!(out.stdout, "hello");
    assert_eq!(out.stderr, "");
    Ok(())
}

#[tokio::test]
async fn captures_stderr_on_success() -> TestResult {
    init_tracing();

    let out = with_timeout(exec_buffered(
        "echo out; echo warn 1>&2",
        CommandOptions::new(),
        None,
    ))
    .await?;

    assert_eq!(out.stdout, "out");
    assert_eq!(out.stderr, "warn");
    Ok(())
}

#[tokio::test]
async fn shell_operators_work() -> TestResult {
    init_tracing();

    let out = with_timeout(exec_buffered(
        "printf 'b\\na\\n' | sort && echo done",
        CommandOptions::new(),
        None,
    ))
    .await?;

    assert_eq!(out.stdout, "a\nb\ndone");
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_carries_code_and_stderr() {
    init_tracing();

    let err = with_timeout(exec_buffered(
        "echo 'bad flag' >&2; exit 3",
        CommandOptions::new(),
        None,
    ))
    .await
    .unwrap_err();

    match err {
        ExecError::NonZeroExit {
            ref message,
            code,
            signal,
            ref stderr,
            stderr_handled,
            ..
        } => {
            assert_eq!(code, Some(3));
            assert_eq!(signal, None);
            assert_eq!(stderr.as_deref(), Some("bad flag"));
            assert!(!stderr_handled);
            assert!(message.contains("exited with code 3"), "{message}");
            assert!(message.ends_with("\nError: bad flag"), "{message}");
        }
        ref other => panic!("expected NonZeroExit, got {other:?}"),
    }
    assert_eq!(err.exit_code(), Some(3));
}

#[tokio::test]
async fn failure_without_stderr_has_plain_message() {
    init_tracing();

    let err = with_timeout(exec_buffered("exit 1", CommandOptions::new(), None))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Process 'exit 1' exited with code 1");
}

#[tokio::test]
async fn output_is_truncated_at_capacity() -> TestResult {
    init_tracing();

    let options = OptionsBuilder::new().max_buffer(4).build().options;
    let out = with_timeout(exec_buffered("printf abcdefgh", options, None)).await?;

    assert_eq!(out.stdout, "abcd");
    Ok(())
}

#[tokio::test]
async fn zero_capacity_discards_output() -> TestResult {
    init_tracing();

    let run = BufferedRun::new(CommandOptions::new()).capacities(0, 0);
    let out = with_timeout(run_buffered("echo hidden; echo hidden >&2", run)).await?;

    assert_eq!(out.stdout, "");
    assert_eq!(out.stderr, "");
    Ok(())
}

#[tokio::test]
async fn control_characters_are_stripped() -> TestResult {
    init_tracing();

    let out = with_timeout(exec_buffered(
        "printf 'a\\033[1mb\\tc\\r\\n'",
        CommandOptions::new(),
        None,
    ))
    .await?;

    assert_eq!(out.stdout, "a[1mb\tc");
    Ok(())
}

#[tokio::test]
async fn progress_sees_every_chunk() -> TestResult {
    init_tracing();

    let seen = Collected::default();
    let sink = seen.clone();

    let out = with_timeout(exec_buffered(
        "echo one; echo two",
        CommandOptions::new(),
        Some(Box::new(move |text: &str, _: &ProcessControl| sink.push(text))),
    ))
    .await?;

    assert_eq!(seen.joined(), "one\ntwo\n");
    assert_eq!(out.stdout, "one\ntwo");
    Ok(())
}

#[tokio::test]
async fn stderr_callback_marks_failure_as_handled() {
    init_tracing();

    let seen = Collected::default();
    let sink = seen.clone();
    let run = BufferedRun::new(CommandOptions::new()).on_stderr(move |text, _| sink.push(text));

    let err = with_timeout(run_buffered("echo boom >&2; exit 2", run))
        .await
        .unwrap_err();

    assert_eq!(seen.joined(), "boom\n");
    match err {
        ExecError::NonZeroExit { stderr_handled, stderr, .. } => {
            assert!(stderr_handled);
            assert_eq!(stderr.as_deref(), Some("boom"));
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}

#[tokio::test]
async fn input_is_written_then_stdin_closed() -> TestResult {
    init_tracing();

    let options = CommandOptions::new().input("first\nsecond\n");
    let out = with_timeout(exec_buffered("cat", options, None)).await?;

    assert_eq!(out.stdout, "first\nsecond");
    Ok(())
}

#[tokio::test]
async fn runs_in_requested_directory() -> TestResult {
    init_tracing();

    let built = OptionsBuilder::new().with_file("data.txt", "from file").build();
    let out = with_timeout(exec_buffered("cat data.txt", built.options.clone(), None)).await?;

    assert_eq!(out.stdout, "from file");
    Ok(())
}

#[tokio::test]
async fn env_overrides_reach_the_child() -> TestResult {
    init_tracing();

    let options = CommandOptions::new().env("SHELLEXEC_GREETING", "hi there");
    let out = with_timeout(exec_buffered("echo \"$SHELLEXEC_GREETING\"", options, None)).await?;

    assert_eq!(out.stdout, "hi there");
    Ok(())
}

#[tokio::test]
async fn local_bin_is_appended_to_path() -> TestResult {
    init_tracing();

    let options = CommandOptions::new().env("PATH", "/bin:/usr/bin");
    let out = with_timeout(exec_buffered("echo \"$PATH\"", options, None)).await?;

    assert_eq!(out.stdout, "/bin:/usr/bin:/usr/local/bin");
    Ok(())
}

#[tokio::test]
async fn missing_directory_is_a_launch_error() {
    init_tracing();

    let options = CommandOptions::new().cwd("/definitely/not/a/real/dir");
    let err = with_timeout(exec_buffered("echo never", options, None))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::Launch(_)), "{err:?}");
}

#[tokio::test]
async fn callback_can_answer_a_prompt() -> TestResult {
    init_tracing();

    let run = BufferedRun::new(CommandOptions::new()).on_stdout(|text, control| {
        if text.contains("ready") {
            control.write_stdin("yes\n");
        }
    });

    let out = with_timeout(run_buffered(
        "echo ready; read answer; echo \"got $answer\"",
        run,
    ))
    .await?;

    assert_eq!(out.stdout, "ready\ngot yes");
    Ok(())
}

#[tokio::test]
async fn callback_terminate_ends_the_run_as_success() -> TestResult {
    init_tracing();

    let run = BufferedRun::new(CommandOptions::new()).on_stdout(|text, control| {
        if text.contains("started") {
            control.terminate();
        }
    });

    // Killed by a signal without cancellation: no exit code, so no failure.
    let out = with_timeout(run_buffered("echo started; exec sleep 30", run)).await?;

    assert_eq!(out.stdout, "started");
    Ok(())
}
