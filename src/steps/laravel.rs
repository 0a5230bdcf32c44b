//! Laravel application deployment: clone, dependencies, environment,
//! queue workers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, StepOutcome, artifacts};
use crate::ports::{CommandRunner, Prompt};
use crate::render;
use crate::steps::install_artifact;

pub fn run<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<StepOutcome, AppError> {
    // Checked before anything runs: a missing repository URL must fail the
    // step without a single external command.
    if ctx.settings().repo_url.is_empty() {
        console::error("Repository URL cannot be empty");
        return Err(AppError::MissingRepoUrl);
    }

    console::header("Setting Up Laravel Application");

    configure_git(ctx)?;
    clone_repository(ctx)?;
    install_dependencies(ctx)?;
    configure_environment(ctx)?;
    configure_supervisor(ctx)?;

    let settings = ctx.settings();
    console::header("Laravel Application Setup Complete");
    console::status(&format!(
        "Laravel application has been set up successfully at {}",
        settings.web_root
    ));
    console::status(&format!("You can now access your application at http://{}", settings.domain));
    console::warn("Remember to set up SSL certificate for HTTPS access");

    Ok(StepOutcome::Completed)
}

/// Prepare SSH so the clone can authenticate against GitHub, optionally
/// generating a deployment key.
fn configure_git<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    console::header("Configuring Git for Deployment");
    console::status("Setting up SSH for Git...");

    let ssh_dir = ctx.home().join(".ssh");
    let ssh_dir_str = ssh_dir.to_string_lossy().into_owned();

    ctx.runner().run("mkdir", &["-p", ssh_dir_str.as_str()])?;
    ctx.runner().run("chmod", &["700", ssh_dir_str.as_str()])?;

    // The redirect needs a shell; ssh-keyscan itself cannot append.
    let keyscan = format!("ssh-keyscan -H github.com >> {ssh_dir_str}/known_hosts");
    ctx.runner().run("bash", &["-c", keyscan.as_str()])?;

    console::warn("Please add your SSH public key to GitHub before proceeding");

    if ctx.prompt().confirm("Do you want to generate a new SSH key?")? {
        let comment = format!("deployment@{}", ctx.user());
        ctx.runner().run_interactive("ssh-keygen", &["-t", "ed25519", "-C", comment.as_str()])?;
        console::status("SSH key generated");
    }

    console::warn("Add the public key (~/.ssh/id_ed25519.pub) to your GitHub account");

    if ctx.prompt().confirm("Print the public key?")? {
        let public_key = fs::read_to_string(ssh_dir.join("id_ed25519.pub"))?;
        console::info_block(public_key.trim_end());
    }

    ctx.prompt().pause("Press Enter when you've added your SSH key to GitHub...")?;
    Ok(())
}

/// Clone the repository into the web root and set Laravel's expected
/// ownership and permissions.
fn clone_repository<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    let settings = ctx.settings();
    let web_root = settings.web_root.as_str();

    console::header("Cloning Laravel Repository");
    console::status(&format!("Cloning repository to {web_root}..."));

    if Path::new(web_root).exists() {
        console::warn(&format!("Directory {web_root} already exists. Removing..."));
        ctx.runner().run("sudo", &["rm", "-rf", web_root])?;
    }

    ctx.runner().run("sudo", &["git", "clone", settings.repo_url.as_str(), web_root])?;

    console::status("Setting proper ownership and permissions...");
    let ownership = format!("{}:{}", ctx.user(), settings.web_user);
    ctx.runner().run("sudo", &["chown", "-R", ownership.as_str(), web_root])?;
    ctx.runner().run("sudo", &["chmod", "-R", "755", web_root])?;

    // storage/ and bootstrap/cache must stay writable by the web server.
    let storage = format!("{web_root}/storage");
    ctx.runner().run("sudo", &["chmod", "-R", "775", storage.as_str()])?;

    let bootstrap_cache = format!("{web_root}/bootstrap/cache");
    ctx.runner().run("sudo", &["mkdir", "-p", bootstrap_cache.as_str()])?;
    ctx.runner().run("sudo", &["chmod", "-R", "775", bootstrap_cache.as_str()])?;

    Ok(())
}

fn install_dependencies<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    console::header("Installing Composer Dependencies");
    console::status("Installing Composer dependencies...");

    let web_root = PathBuf::from(&ctx.settings().web_root);
    ctx.runner().run_in(&web_root, "composer", &["install", "--no-dev", "--optimize-autoloader"])?;

    Ok(())
}

/// Wire the application's `.env` to the provisioned database and Redis,
/// then run key generation and migrations.
fn configure_environment<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    let settings = ctx.settings();
    let web_root = PathBuf::from(&settings.web_root);

    console::header("Configuring Laravel Environment");
    console::status("Setting up .env file...");

    if web_root.join(".env.example").exists() {
        ctx.runner().run_in(&web_root, "cp", &[".env.example", ".env"])?;
    } else {
        console::warn("No .env.example file found. Creating empty .env file...");
        ctx.runner().run_in(&web_root, "touch", &[".env"])?;
    }

    let substitutions = [
        format!("s/DB_DATABASE=laravel/DB_DATABASE={}/", settings.db_name),
        format!("s/DB_USERNAME=root/DB_USERNAME={}/", settings.db_user),
        format!("s|^DB_PASSWORD=.*|DB_PASSWORD=\"{}\"|", settings.db_password),
        "s/CACHE_DRIVER=file/CACHE_DRIVER=redis/".to_string(),
        "s/SESSION_DRIVER=file/SESSION_DRIVER=redis/".to_string(),
        "s/QUEUE_CONNECTION=sync/QUEUE_CONNECTION=redis/".to_string(),
    ];
    for substitution in &substitutions {
        ctx.runner().run_in(&web_root, "sed", &["-i", substitution.as_str(), ".env"])?;
    }

    console::status("Generating application key...");
    ctx.runner().run_in(&web_root, "php", &["artisan", "key:generate"])?;

    console::status("Running database migrations...");
    ctx.runner().run_in(&web_root, "php", &["artisan", "migrate", "--force"])?;

    Ok(())
}

/// Supervisor keeps the queue workers alive across failures and reboots.
fn configure_supervisor<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    let settings = ctx.settings();

    console::header("Configuring Supervisor for Laravel Queue");
    console::status("Setting up Supervisor for Laravel queue workers...");

    let worker = render::supervisor_worker(&settings.web_root, &settings.web_user)?;
    install_artifact(
        ctx,
        artifacts::SUPERVISOR_WORKER,
        &worker,
        "/etc/supervisor/conf.d/laravel-worker.conf",
    )?;

    ctx.runner().run("sudo", &["supervisorctl", "reread"])?;
    ctx.runner().run("sudo", &["supervisorctl", "update"])?;
    ctx.runner().run("sudo", &["supervisorctl", "start", "laravel-worker:*"])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StepContext;
    use crate::testing::{RecordingRunner, ScriptedPrompt, test_env, test_settings};

    #[test]
    fn empty_repo_url_fails_before_any_command() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompt = ScriptedPrompt::new();
        let mut settings = test_settings();
        settings.repo_url = String::new();
        let env = test_env(dir.path());

        let result = run(&StepContext::new(&settings, &env, &runner, &prompt));

        assert!(matches!(result, Err(AppError::MissingRepoUrl)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn deploys_clone_env_and_workers() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompt = ScriptedPrompt::new();
        // Decline key generation and key display.
        prompt.push_confirm(false);
        prompt.push_confirm(false);

        let mut settings = test_settings();
        // Point the web root into the sandbox so the .env.example check
        // sees a real directory.
        let web_root = dir.path().join("app");
        fs::create_dir_all(&web_root).unwrap();
        fs::write(web_root.join(".env.example"), "DB_DATABASE=laravel\n").unwrap();
        settings.web_root = web_root.to_string_lossy().into_owned();

        let env = test_env(dir.path());

        let outcome = run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();
        assert_eq!(outcome, StepOutcome::Completed);

        let calls = runner.calls();
        assert!(calls.iter().any(|call| call.contains("ssh-keyscan -H github.com")));
        assert!(
            calls
                .iter()
                .any(|call| call.contains("git clone https://github.com/acme/shop.git"))
        );
        assert!(calls.contains(&"cp .env.example .env".to_string()));
        assert!(calls.iter().any(|call| call.contains("DB_PASSWORD")));
        assert!(calls.contains(&"php artisan migrate --force".to_string()));
        assert!(calls.contains(&"sudo supervisorctl start laravel-worker:*".to_string()));

        // The existing web root is wiped before cloning.
        assert!(calls.iter().any(|call| call.starts_with("sudo rm -rf")));
    }

    #[test]
    fn missing_env_example_creates_empty_env() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompt = ScriptedPrompt::new();
        prompt.push_confirm(false);
        prompt.push_confirm(false);

        let mut settings = test_settings();
        let web_root = dir.path().join("bare");
        fs::create_dir_all(&web_root).unwrap();
        settings.web_root = web_root.to_string_lossy().into_owned();

        let env = test_env(dir.path());

        run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();

        assert!(runner.calls().contains(&"touch .env".to_string()));
    }
}
