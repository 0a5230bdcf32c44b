//! Essential package installation: base tooling, Composer, Node.js.

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, StepOutcome};
use crate::ports::{CommandRunner, Prompt};

/// Base packages every later step leans on: transport and archive tools,
/// the firewall and fail2ban, supervisor, Redis, and certbot.
const BASE_PACKAGES: [&str; 18] = [
    "curl",
    "wget",
    "git",
    "unzip",
    "software-properties-common",
    "apt-transport-https",
    "ca-certificates",
    "gnupg",
    "lsb-release",
    "ufw",
    "fail2ban",
    "htop",
    "tree",
    "vim",
    "supervisor",
    "redis-server",
    "certbot",
    "python3-certbot-nginx",
];

pub fn run<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<StepOutcome, AppError> {
    console::status("Installing essential system packages...");

    let mut args = vec!["apt", "install", "-y"];
    args.extend(BASE_PACKAGES);
    ctx.runner().run("sudo", &args)?;

    console::status("Essential packages installed successfully");

    install_composer(ctx)?;
    install_nodejs(ctx)?;

    Ok(StepOutcome::Completed)
}

/// Install the Composer dependency manager into the PATH.
fn install_composer<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    console::header("Installing Composer");
    console::status("Downloading and installing Composer...");

    ctx.runner().run(
        "curl",
        &["-sS", "https://getcomposer.org/installer", "-o", "composer-setup.php"],
    )?;
    ctx.runner().run("php", &["composer-setup.php"])?;
    ctx.runner().run("sudo", &["mv", "composer.phar", "/usr/local/bin/composer"])?;
    ctx.runner().run("sudo", &["chmod", "+x", "/usr/local/bin/composer"])?;

    console::status("Composer installed successfully");
    Ok(())
}

/// Install Node.js 20 and npm from the NodeSource repository.
fn install_nodejs<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    console::header("Installing Node.js and npm");
    console::status("Adding Node.js repository and installing Node.js...");

    ctx.runner().run(
        "curl",
        &["-fsSL", "https://deb.nodesource.com/setup_20.x", "-o", "nodejs-setup.sh"],
    )?;
    ctx.runner().run("sudo", &["bash", "nodejs-setup.sh"])?;
    ctx.runner().run("sudo", &["apt", "install", "-y", "nodejs"])?;

    let node_version = ctx.runner().output("node", &["-v"])?;
    let npm_version = ctx.runner().output("npm", &["-v"])?;

    console::status("Node.js and npm installed successfully");
    console::status(&format!("Node.js version: {node_version}"));
    console::status(&format!("npm version: {npm_version}"));

    Ok(())
}
