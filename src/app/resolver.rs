//! Settings resolution: defaults, persisted file, prompts, secrets.
//!
//! Resolution is the only phase allowed to mutate the settings record; the
//! value handed to the pipeline is final.

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::HostEnv;
use crate::console;
use crate::domain::{AppError, ProvisionSettings, SkipFlags, parse_settings_content};
use crate::ports::{CommandRunner, Prompt};

/// Placeholder used when secret generation fails. Documented weak spot:
/// completing setup is preferred over halting on a missing random source,
/// but the operator is warned loudly.
const FALLBACK_PASSWORD: &str = "defaultpassword";

/// Build the settings record.
///
/// Precedence: seeded defaults, then the persisted file (explicit path or
/// the default location), then interactive prompts for the required fields
/// still empty, then generated secrets, then the derived web root.
/// Command-line skip flags are OR-combined with the file's.
pub fn resolve<R: CommandRunner, P: Prompt>(
    explicit_path: Option<&Path>,
    cli_skips: SkipFlags,
    env: &HostEnv,
    runner: &R,
    prompt: &P,
) -> Result<ProvisionSettings, AppError> {
    let mut settings = ProvisionSettings::default();

    match explicit_path {
        Some(path) => apply_settings_file(&mut settings, path)?,
        None => {
            let default_path = default_settings_path(env);
            // Absence of the default file is not an error, just a
            // default-configuration run.
            if default_path.exists() {
                apply_settings_file(&mut settings, &default_path)?;
            }
        }
    }

    if settings.domain.is_empty() {
        settings.domain =
            prompt.input("Enter the domain for your Laravel project")?.trim().to_string();
    }
    if settings.domain.is_empty() {
        return Err(AppError::config_error("Domain cannot be empty"));
    }

    if settings.repo_url.is_empty() {
        settings.repo_url = prompt
            .input("Enter the Git repository URL for your Laravel project")?
            .trim()
            .to_string();
    }

    if settings.db_password.is_empty() {
        settings.db_password = generate_password(runner);
    }
    if settings.db_root_password.is_empty() {
        settings.db_root_password = generate_password(runner);
    }

    settings.derive_web_root();
    settings.skip = settings.skip.combine(cli_skips);
    settings.script_dir = env.script_dir.to_string_lossy().into_owned();

    Ok(settings)
}

/// `~/.config/laraforge/config.toml`
pub fn default_settings_path(env: &HostEnv) -> PathBuf {
    env.home.join(".config").join("laraforge").join("config.toml")
}

fn apply_settings_file(settings: &mut ProvisionSettings, path: &Path) -> Result<(), AppError> {
    let content = fs::read_to_string(path).map_err(|e| AppError::SettingsParse {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    let file = parse_settings_content(&content).map_err(|e| AppError::SettingsParse {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    settings.apply_file(file);
    Ok(())
}

/// Generate a random password via openssl, falling back to the fixed
/// placeholder when generation fails.
fn generate_password<R: CommandRunner>(runner: &R) -> String {
    match runner.output("openssl", &["rand", "-base64", "16"]) {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            console::warn("Random password generation failed; using the built-in fallback password");
            console::warn("Change the database passwords immediately after setup");
            FALLBACK_PASSWORD.to_string()
        }
    }
}
