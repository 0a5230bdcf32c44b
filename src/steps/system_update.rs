//! System package update.

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, StepOutcome};
use crate::ports::{CommandRunner, Prompt};

/// Refresh package lists and upgrade installed packages. Both operations
/// are naturally idempotent, so no re-run guard is needed.
pub fn run<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<StepOutcome, AppError> {
    console::status("Updating system packages...");

    ctx.runner().run("sudo", &["apt", "update"])?;
    ctx.runner().run("sudo", &["apt", "upgrade", "-y"])?;

    console::status("System update completed successfully");
    Ok(StepOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingRunner, ScriptedPrompt, test_context};

    #[test]
    fn updates_then_upgrades() {
        let runner = RecordingRunner::new();
        let prompt = ScriptedPrompt::new();
        let (settings, env) = test_context();

        let outcome = run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();

        assert_eq!(outcome, StepOutcome::Completed);
        assert_eq!(runner.calls(), vec!["sudo apt update", "sudo apt upgrade -y"]);
    }

    #[test]
    fn halts_on_first_failure() {
        let runner = RecordingRunner::new();
        runner.fail_matching("apt update");
        let prompt = ScriptedPrompt::new();
        let (settings, env) = test_context();

        let result = run(&StepContext::new(&settings, &env, &runner, &prompt));

        assert!(matches!(result, Err(AppError::CommandFailed { .. })));
        assert_eq!(runner.calls(), vec!["sudo apt update"]);
    }
}
