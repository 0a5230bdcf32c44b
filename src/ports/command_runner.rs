use std::path::Path;

use crate::domain::AppError;

/// External process execution, the unit of side effect for every step.
///
/// Each call blocks until the command exits. Implementations report a
/// non-zero exit status as `AppError::CommandFailed`; the one deliberate
/// exception is [`probe`](CommandRunner::probe), whose "no match" status is
/// a normal answer rather than a failure.
pub trait CommandRunner {
    /// Run a command, streaming its output to the operator's terminal.
    fn run(&self, program: &str, args: &[&str]) -> Result<(), AppError>;

    /// Run a command in a specific working directory, streaming output.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<(), AppError>;

    /// Run a command and capture its trimmed stdout.
    fn output(&self, program: &str, args: &[&str]) -> Result<String, AppError>;

    /// Run a command wired to the operator's terminal, for tools that
    /// prompt on their own (e.g. `mysql_secure_installation`).
    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<(), AppError>;

    /// Run a command with a file's content fed to its stdin.
    fn run_with_stdin(&self, input: &Path, program: &str, args: &[&str]) -> Result<(), AppError>;

    /// Run a pre-check command where exit status 1 means "pattern not
    /// found". Returns `Ok(true)` on a match, `Ok(false)` on status 1, and
    /// an error for anything else.
    fn probe(&self, program: &str, args: &[&str]) -> Result<bool, AppError>;
}
