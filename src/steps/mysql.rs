//! MySQL installation, database bootstrap, and Redis cache tuning.

use std::fs;

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, StepOutcome, artifacts};
use crate::ports::{CommandRunner, Prompt};
use crate::render;
use crate::steps::write_private;

const REDIS_CONF: &str = "/etc/redis/redis.conf";

pub fn run<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<StepOutcome, AppError> {
    console::header("Installing MySQL 8.0");
    console::status("Installing MySQL server and client...");

    ctx.runner().run("sudo", &["apt", "install", "-y", "mysql-server", "mysql-client"])?;

    console::status("MySQL installed successfully");

    console::header("Securing MySQL Installation");
    console::warn("Please set a strong root password when prompted");
    ctx.runner().run_interactive("sudo", &["mysql_secure_installation"])?;

    bootstrap_database(ctx)?;
    save_credentials(ctx)?;
    configure_redis(ctx)?;

    Ok(StepOutcome::Completed)
}

/// Create the application database and users by feeding the bootstrap
/// script to the server over stdin.
fn bootstrap_database<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    let settings = ctx.settings();

    console::header("Configuring MySQL for Laravel");
    console::status("Configuring MySQL database and user...");
    console::status(&format!("Creating database: {}", settings.db_name));
    console::status(&format!("Creating user: {}", settings.db_user));

    let script = render::mysql_bootstrap(
        &settings.db_name,
        &settings.db_user,
        &settings.db_password,
        &settings.db_root_password,
    )?;

    // The script carries both passwords, so the staged copy is owner-only.
    let temp = ctx.temp_path(artifacts::MYSQL_BOOTSTRAP);
    write_private(&temp, &script)?;

    ctx.runner().run_with_stdin(&temp, "sudo", &["mysql"])?;
    fs::remove_file(&temp)?;

    console::status("MySQL configured successfully");
    Ok(())
}

/// Persist the generated credentials where only the operator can read them.
fn save_credentials<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    let settings = ctx.settings();

    let report = render::mysql_credentials(
        &settings.db_name,
        &settings.db_user,
        &settings.db_password,
        &settings.db_root_password,
    )?;

    write_private(&ctx.home().join("mysql_credentials.txt"), &report)?;

    console::status("MySQL credentials saved to ~/mysql_credentials.txt");
    Ok(())
}

/// Cap Redis memory and switch to LRU eviction; Laravel uses it for
/// caching, sessions, and the queue.
fn configure_redis<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    console::header("Configuring Redis");
    console::status("Optimizing Redis configuration...");

    ctx.runner().run("sudo", &["sed", "-i", "s/# maxmemory <bytes>/maxmemory 256mb/", REDIS_CONF])?;
    ctx.runner().run(
        "sudo",
        &["sed", "-i", "s/# maxmemory-policy noeviction/maxmemory-policy allkeys-lru/", REDIS_CONF],
    )?;
    ctx.runner().run("sudo", &["systemctl", "enable", "redis-server"])?;
    ctx.runner().run("sudo", &["systemctl", "restart", "redis-server"])?;

    console::status("Redis configured successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StepContext;
    use crate::testing::{RecordingRunner, ScriptedPrompt, test_env, test_settings};

    #[test]
    fn bootstraps_database_and_saves_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompt = ScriptedPrompt::new();
        let settings = test_settings();
        let env = test_env(dir.path());

        let outcome = run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();
        assert_eq!(outcome, StepOutcome::Completed);

        let calls = runner.calls();
        assert_eq!(calls[0], "sudo apt install -y mysql-server mysql-client");
        assert!(calls.iter().any(|call| call.starts_with("sudo mysql <")));
        assert!(calls.contains(&"sudo systemctl restart redis-server".to_string()));

        // The SQL script is consumed and removed once applied.
        assert!(!env.work_dir.join(artifacts::MYSQL_BOOTSTRAP).exists());

        let credentials = env.home.join("mysql_credentials.txt");
        let report = fs::read_to_string(&credentials).unwrap();
        assert!(report.contains(&settings.db_password));

        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&credentials).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn secure_installation_runs_interactively() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompt = ScriptedPrompt::new();
        let settings = test_settings();
        let env = test_env(dir.path());

        run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();

        assert!(runner.interactive_calls().contains(&"sudo mysql_secure_installation".to_string()));
    }

    #[test]
    fn failed_bootstrap_leaves_temp_script_for_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        runner.fail_matching("sudo mysql <");
        let prompt = ScriptedPrompt::new();
        let settings = test_settings();
        let env = test_env(dir.path());

        let result = run(&StepContext::new(&settings, &env, &runner, &prompt));

        assert!(matches!(result, Err(AppError::CommandFailed { .. })));
        assert!(env.work_dir.join(artifacts::MYSQL_BOOTSTRAP).exists());
    }
}
