//! Nginx installation and site configuration.

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, StepOutcome, artifacts};
use crate::ports::{CommandRunner, Prompt};
use crate::render;
use crate::steps::install_artifact;

const NGINX_CONF: &str = "/etc/nginx/nginx.conf";

/// Rate-limiting zones shared by every site block. Inserted into the http
/// context at most once; the `a` command text uses sed's `\n` escapes.
const RATE_LIMIT_ZONES: &str = "/http {/a \\    # Rate limiting zones\\n    limit_req_zone $binary_remote_addr zone=login:10m rate=10r/m;\\n    limit_req_zone $binary_remote_addr zone=api:10m rate=100r/m;";

pub fn run<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<StepOutcome, AppError> {
    let settings = ctx.settings();

    console::header("Installing Nginx");
    console::status("Installing Nginx web server...");

    ctx.runner().run("sudo", &["apt", "install", "-y", "nginx"])?;

    console::status("Nginx installed successfully");

    console::header("Configuring Nginx for Laravel");
    console::status(&format!("Setting up Nginx configuration for domain: {}", settings.domain));

    ensure_rate_limit_zones(ctx)?;

    let site = render::nginx_site(&settings.domain, &settings.web_root)?;
    let destination = format!("/etc/nginx/sites-available/{}", settings.domain);
    install_artifact(ctx, artifacts::NGINX_SITE, &site, &destination)?;

    ctx.runner().run("sudo", &["ln", "-sf", destination.as_str(), "/etc/nginx/sites-enabled/"])?;
    ctx.runner().run("sudo", &["rm", "-f", "/etc/nginx/sites-enabled/default"])?;

    console::status("Testing Nginx configuration...");
    ctx.runner().run("sudo", &["nginx", "-t"])?;
    console::status("Nginx configuration is valid");

    ctx.runner().run("sudo", &["systemctl", "restart", "nginx"])?;

    prepare_web_root(ctx)?;

    console::status(&format!("Nginx configured successfully for {}", settings.domain));
    Ok(StepOutcome::Completed)
}

/// Insert the shared rate-limiting zones unless a previous run already
/// did. A "not found" probe answer means apply; only an unexpected probe
/// failure is fatal.
fn ensure_rate_limit_zones<R: CommandRunner, P: Prompt>(
    ctx: &StepContext<R, P>,
) -> Result<(), AppError> {
    let present =
        ctx.runner().probe("sudo", &["grep", "limit_req_zone.*zone=login", NGINX_CONF])?;

    if present {
        console::status("Rate limiting zones already exist in nginx.conf");
        return Ok(());
    }

    ctx.runner().run("sudo", &["sed", "-i", RATE_LIMIT_ZONES, NGINX_CONF])?;
    console::status("Added rate limiting zones to nginx.conf");
    Ok(())
}

/// Create the document root and hand it to the deploying user and the web
/// server's group.
fn prepare_web_root<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    let settings = ctx.settings();

    console::status("Setting up web directory...");
    ctx.runner().run("sudo", &["mkdir", "-p", settings.web_root.as_str()])?;

    let ownership = format!("{}:{}", ctx.user(), settings.web_user);
    ctx.runner().run("sudo", &["chown", "-R", ownership.as_str(), settings.web_root.as_str()])?;
    ctx.runner().run("sudo", &["chmod", "-R", "755", settings.web_root.as_str()])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StepContext;
    use crate::testing::{RecordingRunner, ScriptedPrompt, test_env, test_settings};

    #[test]
    fn inserts_rate_limit_zones_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        runner.probe_answer(Ok(false));
        let prompt = ScriptedPrompt::new();
        let settings = test_settings();
        let env = test_env(dir.path());

        run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();

        let calls = runner.calls();
        assert!(calls.iter().any(|call| call.contains("limit_req_zone $binary_remote_addr")));
        assert!(calls.iter().any(|call| call.ends_with("/etc/nginx/sites-available/example.com")));
        assert!(calls.contains(&"sudo nginx -t".to_string()));
        assert!(calls.iter().any(|call| call.contains("chown -R deploy:www-data /var/www/example.com")));
    }

    #[test]
    fn skips_insertion_when_zones_exist() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        runner.probe_answer(Ok(true));
        let prompt = ScriptedPrompt::new();
        let settings = test_settings();
        let env = test_env(dir.path());

        run(&StepContext::new(&settings, &env, &runner, &prompt)).unwrap();

        assert!(!runner.calls().iter().any(|call| call.contains("limit_req_zone $binary_remote_addr")));
    }

    #[test]
    fn unexpected_probe_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        runner.probe_answer(Err("grep: /etc/nginx/nginx.conf: No such file or directory"));
        let prompt = ScriptedPrompt::new();
        let settings = test_settings();
        let env = test_env(dir.path());

        let result = run(&StepContext::new(&settings, &env, &runner, &prompt));

        assert!(matches!(result, Err(AppError::CommandFailed { .. })));
        // Nothing was mutated after the failed pre-check.
        assert!(!runner.calls().iter().any(|call| call.contains("sed")));
    }
}
