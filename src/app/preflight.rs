//! Startup privilege checks.
//!
//! The tool must run as a regular user who can elevate: everything
//! system-facing goes through sudo, while reports and SSH material land in
//! the invoking user's home.

use crate::console;
use crate::domain::AppError;
use crate::ports::CommandRunner;

/// Refuse to run as root.
pub fn ensure_not_root<R: CommandRunner>(runner: &R) -> Result<(), AppError> {
    let uid = runner.output("id", &["-u"]).map_err(|_| {
        console::error("Failed to check user ID");
        AppError::config_error("Failed to check user ID")
    })?;

    if uid == "0" {
        console::error("This tool should not be run as root for security reasons");
        console::warn("Please create a regular user first:");
        console::warn("  adduser username");
        console::warn("  usermod -aG sudo username");
        console::warn("  su - username");
        console::warn("Then run this tool as that user");
        return Err(AppError::RootUser);
    }

    Ok(())
}

/// Require working passwordless-capable sudo before any step starts.
pub fn ensure_sudo<R: CommandRunner>(runner: &R) -> Result<(), AppError> {
    if runner.run("sudo", &["-n", "true"]).is_err() {
        console::error("This user doesn't have sudo privileges");
        console::warn("Please add this user to the sudo group:");
        console::warn("  sudo usermod -aG sudo $USER");
        return Err(AppError::SudoUnavailable);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    #[test]
    fn regular_user_passes() {
        let runner = RecordingRunner::new();
        runner.set_output("id -u", "1000");
        assert!(ensure_not_root(&runner).is_ok());
    }

    #[test]
    fn root_is_refused() {
        let runner = RecordingRunner::new();
        runner.set_output("id -u", "0");
        assert!(matches!(ensure_not_root(&runner), Err(AppError::RootUser)));
    }

    #[test]
    fn unreadable_uid_is_an_error() {
        let runner = RecordingRunner::new();
        runner.fail_matching("id -u");
        assert!(matches!(ensure_not_root(&runner), Err(AppError::Configuration(_))));
    }

    #[test]
    fn sudo_probe_must_succeed() {
        let runner = RecordingRunner::new();
        assert!(ensure_sudo(&runner).is_ok());

        let failing = RecordingRunner::new();
        failing.fail_matching("sudo -n true");
        assert!(matches!(ensure_sudo(&failing), Err(AppError::SudoUnavailable)));
    }
}
