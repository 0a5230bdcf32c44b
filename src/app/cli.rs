//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

use crate::adapters::{ShellRunner, TerminalPrompt};
use crate::app::{HostEnv, StepContext, cleanup, pipeline, preflight, resolver};
use crate::console;
use crate::domain::{AppError, ProvisionSettings, SkipFlags};
use crate::ports::Prompt;

#[derive(Parser)]
#[command(name = "laraforge")]
#[command(version)]
#[command(
    about = "Provision a production server for a Laravel application",
    long_about = None
)]
struct Cli {
    /// Remove temporary files left behind by an interrupted run, then exit
    #[arg(long)]
    cleanup: bool,

    /// Path to the settings file (default: ~/.config/laraforge/config.toml)
    #[arg(long, value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// Skip the system update step
    #[arg(long)]
    skip_system_update: bool,
    /// Skip installing essential packages
    #[arg(long)]
    skip_essentials: bool,
    /// Skip PHP installation
    #[arg(long)]
    skip_php: bool,
    /// Skip MySQL installation
    #[arg(long)]
    skip_mysql: bool,
    /// Skip Nginx installation
    #[arg(long)]
    skip_nginx: bool,
    /// Skip security configuration
    #[arg(long)]
    skip_security: bool,
    /// Skip Laravel setup
    #[arg(long)]
    skip_laravel: bool,
    /// Skip services configuration
    #[arg(long)]
    skip_services: bool,
}

impl Cli {
    fn skip_flags(&self) -> SkipFlags {
        SkipFlags {
            system_update: self.skip_system_update,
            essentials: self.skip_essentials,
            php: self.skip_php,
            mysql: self.skip_mysql,
            nginx: self.skip_nginx,
            security: self.skip_security,
            laravel: self.skip_laravel,
            services: self.skip_services,
        }
    }
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<(), AppError> {
    if cli.cleanup {
        let dir = std::env::current_dir()?;
        return cleanup::run_cleanup(&dir);
    }

    console::header("Laravel Production Server Setup");

    let runner = ShellRunner::new();
    let prompt = TerminalPrompt::new();
    let env = HostEnv::detect()?;

    preflight::ensure_not_root(&runner)?;
    preflight::ensure_sudo(&runner)?;

    let settings =
        resolver::resolve(cli.config_path.as_deref(), cli.skip_flags(), &env, &runner, &prompt)?;

    console::status(&format!("Setting up server for domain: {}", settings.domain));
    console::status(&format!("Running as user: {}", env.user));

    print_plan(&settings);
    prompt.pause("Press Enter to begin the setup process...")?;

    let ctx = StepContext::new(&settings, &env, &runner, &prompt);
    let steps = pipeline::provisioning_steps();
    pipeline::run_pipeline(&ctx, &steps)?;

    print_completion(&settings, &env);
    Ok(())
}

fn skip_marker(skip: bool) -> &'static str {
    if skip { " (will be skipped)" } else { "" }
}

fn print_plan(settings: &ProvisionSettings) {
    let skip = &settings.skip;

    console::header("Starting Laravel Server Setup Process");
    console::status("This tool will set up a complete Laravel production server");
    console::status("The setup process is divided into several steps:");
    console::status(&format!("1. System update{}", skip_marker(skip.system_update)));
    console::status(&format!("2. Installing essential packages{}", skip_marker(skip.essentials)));
    console::status(&format!("3. Installing PHP 8.3 and extensions{}", skip_marker(skip.php)));
    console::status(&format!("4. Installing and configuring MySQL{}", skip_marker(skip.mysql)));
    console::status(&format!("5. Installing and configuring Nginx{}", skip_marker(skip.nginx)));
    console::status(&format!(
        "6. Configuring security (firewall, fail2ban, SSH){}",
        skip_marker(skip.security)
    ));
    console::status(&format!("7. Setting up Laravel application{}", skip_marker(skip.laravel)));
    console::status(&format!(
        "8. Configuring and starting services{}",
        skip_marker(skip.services)
    ));
    console::status("");
    console::warn("This process may take some time. Please be patient.");
    console::warn("You will be prompted for input at certain stages.");
    console::status("");
    console::status("Note: You can skip any step with the corresponding command-line flag:");
    console::status("  --skip-system-update, --skip-essentials, --skip-php, --skip-mysql,");
    console::status("  --skip-nginx, --skip-security, --skip-laravel, --skip-services");
    console::status("");
}

fn print_completion(settings: &ProvisionSettings, env: &HostEnv) {
    console::header("Setup Complete!");
    console::status("Laravel production server has been successfully set up");
    console::status(&format!(
        "Server information has been saved to: {}",
        env.home.join("server_info.txt").display()
    ));
    console::status(&format!(
        "MySQL credentials have been saved to: {}",
        env.home.join("mysql_credentials.txt").display()
    ));
    console::warn("Remember to:");
    console::warn("1. Point your domain DNS to this server");
    console::warn("2. Set up SSL certificate if you haven't already");
    console::warn(&format!("3. Change SSH port in your SSH client to: {}", settings.ssh_port));
    console::status("");
    console::status("You can clean up temporary files by running: laraforge --cleanup");
    println!("Your Laravel production server is ready!");
}
