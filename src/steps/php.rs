//! PHP 8.3 installation and FPM tuning.

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, StepOutcome, artifacts};
use crate::ports::{CommandRunner, Prompt};
use crate::render;
use crate::steps::install_artifact;

const PHP_INI: &str = "/etc/php/8.3/fpm/php.ini";

const PHP_PACKAGES: [&str; 16] = [
    "php8.3",
    "php8.3-fpm",
    "php8.3-mysql",
    "php8.3-mbstring",
    "php8.3-xml",
    "php8.3-bcmath",
    "php8.3-curl",
    "php8.3-gd",
    "php8.3-zip",
    "php8.3-intl",
    "php8.3-soap",
    "php8.3-redis",
    "php8.3-imagick",
    "php8.3-cli",
    "php8.3-common",
    "php8.3-opcache",
];

pub fn run<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<StepOutcome, AppError> {
    console::header("Installing PHP 8.3 and Extensions");
    console::status("Adding PHP repository and installing PHP 8.3 with extensions...");

    // Ondrej's PPA carries current PHP releases for Ubuntu.
    ctx.runner().run("sudo", &["add-apt-repository", "ppa:ondrej/php", "-y"])?;
    ctx.runner().run("sudo", &["apt", "update"])?;

    let mut args = vec!["apt", "install", "-y"];
    args.extend(PHP_PACKAGES);
    ctx.runner().run("sudo", &args)?;

    console::status("PHP 8.3 and extensions installed successfully");

    configure_fpm(ctx)?;

    ctx.runner().run("php", &["-v"])?;

    Ok(StepOutcome::Completed)
}

/// Tune PHP-FPM for Laravel and enable OPcache.
fn configure_fpm<R: CommandRunner, P: Prompt>(ctx: &StepContext<R, P>) -> Result<(), AppError> {
    console::header("Configuring PHP-FPM");
    console::status("Optimizing PHP configuration for Laravel...");

    let substitutions = [
        // Path info fixing stays off so crafted URLs cannot reach other scripts.
        "s/;cgi.fix_pathinfo=1/cgi.fix_pathinfo=0/",
        "s/upload_max_filesize = 2M/upload_max_filesize = 64M/",
        "s/post_max_size = 8M/post_max_size = 64M/",
        "s/max_execution_time = 30/max_execution_time = 300/",
        "s/memory_limit = 128M/memory_limit = 512M/",
    ];
    for substitution in substitutions {
        ctx.runner().run("sudo", &["sed", "-i", substitution, PHP_INI])?;
    }

    console::status("Configuring OPcache for better performance...");
    install_artifact(
        ctx,
        artifacts::OPCACHE_INI,
        render::opcache_config()?,
        "/etc/php/8.3/fpm/conf.d/10-opcache.ini",
    )?;

    ctx.runner().run("sudo", &["systemctl", "restart", "php8.3-fpm"])?;

    console::status("PHP-FPM configured successfully");
    Ok(())
}
