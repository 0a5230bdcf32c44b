use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::domain::AppError;
use crate::ports::CommandRunner;

/// Command executor backed by `std::process::Command`.
///
/// Output-streaming calls inherit the operator's terminal so package
/// managers and service tools show their own progress.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }

    fn describe(program: &str, args: &[&str]) -> String {
        if args.is_empty() { program.to_string() } else { format!("{} {}", program, args.join(" ")) }
    }

    fn wait_streaming(mut command: Command, description: String) -> Result<(), AppError> {
        let status = command.status().map_err(|e| AppError::CommandFailed {
            command: description.clone(),
            details: e.to_string(),
        })?;

        if !status.success() {
            return Err(AppError::CommandFailed {
                command: description,
                details: status.to_string(),
            });
        }
        Ok(())
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), AppError> {
        let mut command = Command::new(program);
        command.args(args).stdout(Stdio::inherit()).stderr(Stdio::inherit());
        Self::wait_streaming(command, Self::describe(program, args))
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<(), AppError> {
        let mut command = Command::new(program);
        command.args(args).current_dir(dir).stdout(Stdio::inherit()).stderr(Stdio::inherit());
        Self::wait_streaming(command, Self::describe(program, args))
    }

    fn output(&self, program: &str, args: &[&str]) -> Result<String, AppError> {
        let description = Self::describe(program, args);

        let output = Command::new(program).args(args).output().map_err(|e| {
            AppError::CommandFailed { command: description.clone(), details: e.to_string() }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AppError::CommandFailed {
                command: description,
                details: if stderr.is_empty() { output.status.to_string() } else { stderr },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<(), AppError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        Self::wait_streaming(command, Self::describe(program, args))
    }

    fn run_with_stdin(&self, input: &Path, program: &str, args: &[&str]) -> Result<(), AppError> {
        let description = Self::describe(program, args);

        let file = File::open(input).map_err(|e| AppError::CommandFailed {
            command: description.clone(),
            details: format!("cannot open {}: {}", input.display(), e),
        })?;

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::from(file)).stdout(Stdio::inherit()).stderr(Stdio::inherit());
        Self::wait_streaming(command, description)
    }

    fn probe(&self, program: &str, args: &[&str]) -> Result<bool, AppError> {
        let description = Self::describe(program, args);

        let output = Command::new(program).args(args).output().map_err(|e| {
            AppError::CommandFailed { command: description.clone(), details: e.to_string() }
        })?;

        if output.status.success() {
            return Ok(true);
        }

        // Exit status 1 is the conventional "no match" answer from search
        // tools; anything else is a real failure.
        if output.status.code() == Some(1) {
            return Ok(false);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(AppError::CommandFailed {
            command: description,
            details: if stderr.is_empty() { output.status.to_string() } else { stderr },
        })
    }
}
