//! Service finalization: boot enablement, optional SSL, deployment summary.

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, StepOutcome};
use crate::ports::{CommandRunner, Prompt};
use crate::render;
use crate::steps::write_private;

const MANAGED_SERVICES: [&str; 5] =
    ["nginx", "php8.3-fpm", "mysql", "redis-server", "supervisor"];

pub fn run<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<StepOutcome, AppError> {
    console::header("Configuring and Starting Services");

    for service in MANAGED_SERVICES {
        enable_service(ctx, service)?;
    }

    let mut warnings = Vec::new();
    setup_ssl(ctx, &mut warnings)?;
    create_server_info(ctx)?;

    console::header("Services Configuration Complete");
    console::status("All services have been configured and started");
    console::status(&format!(
        "Server information saved to: {}",
        ctx.home().join("server_info.txt").display()
    ));

    if warnings.is_empty() {
        Ok(StepOutcome::Completed)
    } else {
        Ok(StepOutcome::Warned(warnings))
    }
}

/// Enable a service at boot and restart it to pick up configuration.
fn enable_service<R: CommandRunner, P: Prompt>(
    ctx: &StepContext<R, P>,
    service: &str,
) -> Result<(), AppError> {
    console::status(&format!("Enabling and starting {service}..."));

    ctx.runner().run("sudo", &["systemctl", "enable", service])?;
    ctx.runner().run("sudo", &["systemctl", "restart", service])?;

    Ok(())
}

/// Obtain a Let's Encrypt certificate if the operator wants one now.
///
/// A certbot failure is expected when DNS has not propagated yet, so it
/// degrades to a warning instead of halting the pipeline; this is the one
/// non-fail-fast branch in the whole setup.
fn setup_ssl<R: CommandRunner, P: Prompt>(
    ctx: &StepContext<R, P>,
    warnings: &mut Vec<String>,
) -> Result<(), AppError> {
    let domain = &ctx.settings().domain;
    let www_domain = format!("www.{domain}");
    let retry_hint = format!("You can try again later with: sudo certbot --nginx -d {domain} -d {www_domain}");

    console::header("Setting up SSL Certificate");
    console::warn("Make sure your domain DNS is pointing to this server before running SSL setup");

    if !ctx.prompt().confirm("Do you want to setup SSL certificate now?")? {
        console::warn("SSL certificate setup skipped");
        console::warn(&retry_hint);
        return Ok(());
    }

    match ctx.runner().run(
        "sudo",
        &["certbot", "--nginx", "-d", domain.as_str(), "-d", www_domain.as_str()],
    ) {
        Ok(()) => {
            console::status("SSL certificate installed successfully");

            // Renewal runs from root's crontab at noon.
            ctx.runner().run(
                "sudo",
                &["bash", "-c", "echo \"0 12 * * * /usr/bin/certbot renew --quiet\" | sudo crontab -"],
            )?;
            console::status("SSL auto-renewal configured");
        }
        Err(err) => {
            console::error("Failed to install SSL certificate");
            console::warn(&retry_hint);
            warnings.push(format!("SSL certificate installation failed: {err}"));
            warnings.push(retry_hint.clone());
        }
    }

    Ok(())
}

/// Write the deployment summary where only the operator can read it.
fn create_server_info<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    let settings = ctx.settings();

    console::header("Creating Server Information File");
    console::status("Saving server information to file...");

    let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let report = render::server_info(
        &settings.domain,
        &settings.web_root,
        &settings.db_name,
        &settings.db_user,
        &settings.ssh_port,
        ctx.user(),
        &generated_at,
    )?;

    write_private(&ctx.home().join("server_info.txt"), &report)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StepContext;
    use crate::testing::{RecordingRunner, ScriptedPrompt, test_env, test_settings};

    #[test]
    fn enables_services_and_writes_summary_without_ssl() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompt = ScriptedPrompt::new();
        prompt.push_confirm(false); // decline SSL
        let settings = test_settings();
        let env = test_env(dir.path());

        let outcome = run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();
        assert_eq!(outcome, StepOutcome::Completed);

        let calls = runner.calls();
        for service in MANAGED_SERVICES {
            assert!(calls.contains(&format!("sudo systemctl enable {service}")));
            assert!(calls.contains(&format!("sudo systemctl restart {service}")));
        }
        assert!(!calls.iter().any(|call| call.contains("certbot --nginx")));

        let report = std::fs::read_to_string(env.home.join("server_info.txt")).unwrap();
        assert!(report.contains("Domain: example.com"));
    }

    #[test]
    fn certbot_failure_is_a_warning_not_a_halt() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        runner.fail_matching("certbot --nginx");
        let prompt = ScriptedPrompt::new();
        prompt.push_confirm(true); // accept SSL
        let settings = test_settings();
        let env = test_env(dir.path());

        let outcome = run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();

        match outcome {
            StepOutcome::Warned(warnings) => {
                assert!(warnings.iter().any(|w| w.contains("SSL certificate installation failed")));
            }
            other => panic!("expected a warned outcome, got {other:?}"),
        }

        // The summary is still produced after the failed certificate attempt.
        assert!(env.home.join("server_info.txt").exists());
        // And no renewal job was scheduled.
        assert!(!runner.calls().iter().any(|call| call.contains("crontab")));
    }

    #[test]
    fn successful_certbot_schedules_renewal() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompt = ScriptedPrompt::new();
        prompt.push_confirm(true);
        let settings = test_settings();
        let env = test_env(dir.path());

        let outcome = run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();
        assert_eq!(outcome, StepOutcome::Completed);

        let calls = runner.calls();
        assert!(calls.iter().any(|call| call.contains("certbot --nginx -d example.com -d www.example.com")));
        assert!(calls.iter().any(|call| call.contains("certbot renew --quiet")));
    }
}
