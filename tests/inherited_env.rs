#![cfg(unix)]

// Kept in its own test binary: it mutates the process environment, which
// must not race with other tests spawning children.

mod common;
use crate::common::{TestResult, init_tracing, with_timeout};

use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;

use shellexec::exec::{CommandOptions, exec_buffered};

#[tokio::test]
async fn child_inherits_non_utf8_variables() -> TestResult {
    init_tracing();

    // SAFETY: this is the only test in the binary and nothing else reads or
    // writes the environment concurrently.
    unsafe {
        std::env::set_var("SHELLEXEC_RAW_BYTES", OsString::from_vec(b"caf\xe9".to_vec()));
    }

    let out = with_timeout(exec_buffered(
        "printf '%s' \"${SHELLEXEC_RAW_BYTES-UNSET}\" | od -An -tx1",
        CommandOptions::new().env("SHELLEXEC_OTHER", "set"),
        None,
    ))
    .await?;

    let bytes: Vec<&str> = out.stdout.split_whitespace().collect();
    assert_eq!(bytes, ["63", "61", "66", "e9"]);
    Ok(())
}
