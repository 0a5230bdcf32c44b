//! The eight provisioning steps.
//!
//! Every step is a sequence of external commands against the shared
//! settings; a step that mutates a configuration file renders the text,
//! writes it to a registered working-directory name, and installs it with
//! a privileged move followed by a service reload. The first failing
//! command aborts the step, and the orchestrator halts the pipeline.

pub mod essentials;
pub mod laravel;
pub mod mysql;
pub mod nginx;
pub mod php;
pub mod security;
pub mod services;
pub mod system_update;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::app::StepContext;
use crate::domain::AppError;
use crate::ports::{CommandRunner, Prompt};

/// Write a rendered artifact to its working-directory temp name, then
/// install it at its system destination with a privileged move. The temp
/// file only survives when the move fails; cleanup picks it up later.
pub(crate) fn install_artifact<R: CommandRunner, P: Prompt>(
    ctx: &StepContext<R, P>,
    temp_name: &str,
    content: &str,
    destination: &str,
) -> Result<(), AppError> {
    let temp = ctx.temp_path(temp_name);
    fs::write(&temp, content)?;
    let temp = temp.to_string_lossy().into_owned();
    ctx.runner().run("sudo", &["mv", temp.as_str(), destination])?;
    Ok(())
}

/// Write a file containing secret material, readable by the owner only.
pub(crate) fn write_private(path: &Path, content: &str) -> Result<(), AppError> {
    fs::write(path, content)?;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o600);
    fs::set_permissions(path, permissions)?;
    Ok(())
}
