//! Host security: firewall, fail2ban, SSH hardening.

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, StepOutcome, artifacts};
use crate::ports::{CommandRunner, Prompt};
use crate::render;
use crate::steps::install_artifact;

pub fn run<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<StepOutcome, AppError> {
    configure_firewall(ctx)?;
    configure_fail2ban(ctx)?;
    configure_ssh(ctx)?;

    console::header("Security Configuration Complete");
    console::status("Firewall, fail2ban, and SSH security have been configured");

    Ok(StepOutcome::Completed)
}

/// Default-deny firewall with openings for SSH (custom port), HTTP, HTTPS.
fn configure_firewall<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    console::header("Configuring UFW Firewall");
    console::status("Setting up firewall rules...");

    ctx.runner().run("sudo", &["ufw", "default", "deny", "incoming"])?;
    ctx.runner().run("sudo", &["ufw", "default", "allow", "outgoing"])?;

    let ssh_rule = format!("{}/tcp", ctx.settings().ssh_port);
    ctx.runner().run("sudo", &["ufw", "allow", ssh_rule.as_str()])?;
    ctx.runner().run("sudo", &["ufw", "allow", "80/tcp"])?;
    ctx.runner().run("sudo", &["ufw", "allow", "443/tcp"])?;

    console::status("Enabling firewall...");
    ctx.runner().run("sudo", &["ufw", "--force", "enable"])?;

    console::status("Firewall configured and enabled successfully");
    ctx.runner().run("sudo", &["ufw", "status"])?;

    Ok(())
}

/// Jail overrides for sshd and the Nginx filters.
fn configure_fail2ban<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    console::header("Configuring Fail2ban");
    console::status("Setting up fail2ban for intrusion prevention...");

    ctx.runner().run("sudo", &["cp", "/etc/fail2ban/jail.conf", "/etc/fail2ban/jail.local"])?;

    let jail = render::fail2ban_jail(&ctx.settings().ssh_port)?;
    install_artifact(ctx, artifacts::FAIL2BAN_JAIL, &jail, "/etc/fail2ban/jail.d/custom.conf")?;

    ctx.runner().run("sudo", &["systemctl", "enable", "fail2ban"])?;
    ctx.runner().run("sudo", &["systemctl", "restart", "fail2ban"])?;

    console::status("Fail2ban configured and started successfully");
    Ok(())
}

/// Move sshd to the custom port and lock down authentication. The stock
/// config is backed up first.
fn configure_ssh<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    let ssh_port = &ctx.settings().ssh_port;

    console::header("Configuring SSH Security");
    console::status("Hardening SSH configuration...");

    ctx.runner().run("sudo", &["cp", "/etc/ssh/sshd_config", "/etc/ssh/sshd_config.backup"])?;

    let hardening = render::sshd_hardening(ssh_port)?;
    ctx.runner().run("sudo", &["mkdir", "-p", "/etc/ssh/sshd_config.d"])?;
    install_artifact(ctx, artifacts::SSH_HARDENING, &hardening, "/etc/ssh/sshd_config.d/security.conf")?;

    console::status("Restarting SSH service to apply changes...");
    ctx.runner().run("sudo", &["systemctl", "restart", "ssh"])?;

    console::status("SSH security configured successfully");
    console::warn(&format!("SSH port has been changed to: {ssh_port}"));
    console::warn("Make sure to update your SSH client configuration");

    Ok(())
}
