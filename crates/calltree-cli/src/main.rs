//! CLI entrypoint for the `calltree` caller tree tool.
//!
//! The binary delegates to [`calltree_cli::run`], which loads configuration,
//! installs telemetry, opens the configured index and renders the forest.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    calltree_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
