use std::env;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, ProvisionSettings};
use crate::ports::{CommandRunner, Prompt};

/// Facts about the invoking user's environment, detected once at startup.
#[derive(Debug, Clone)]
pub struct HostEnv {
    /// The invoking user's home directory. Reports land here.
    pub home: PathBuf,
    /// The invoking user's name, used for ownership of deployed files.
    pub user: String,
    /// Working directory; intermediate rendered artifacts are written here.
    pub work_dir: PathBuf,
    /// Directory of the running executable.
    pub script_dir: PathBuf,
}

impl HostEnv {
    pub fn detect() -> Result<Self, AppError> {
        let home = env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| AppError::config_error("HOME environment variable not set"))?;
        let user = env::var("USER")
            .map_err(|_| AppError::config_error("USER environment variable not set"))?;
        let work_dir = env::current_dir()?;
        let script_dir = env::current_exe()?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(HostEnv { home, user, work_dir, script_dir })
    }
}

/// Everything a provisioning step needs: the resolved settings, the host
/// environment, and the execution/prompting ports.
pub struct StepContext<'a, R: CommandRunner, P: Prompt> {
    settings: &'a ProvisionSettings,
    env: &'a HostEnv,
    runner: &'a R,
    prompt: &'a P,
}

impl<'a, R: CommandRunner, P: Prompt> StepContext<'a, R, P> {
    pub fn new(
        settings: &'a ProvisionSettings,
        env: &'a HostEnv,
        runner: &'a R,
        prompt: &'a P,
    ) -> Self {
        Self { settings, env, runner, prompt }
    }

    pub fn settings(&self) -> &ProvisionSettings {
        self.settings
    }

    pub fn runner(&self) -> &R {
        self.runner
    }

    pub fn prompt(&self) -> &P {
        self.prompt
    }

    pub fn home(&self) -> &Path {
        &self.env.home
    }

    pub fn user(&self) -> &str {
        &self.env.user
    }

    /// Working-directory location of an intermediate rendered artifact.
    pub fn temp_path(&self, name: &str) -> PathBuf {
        self.env.work_dir.join(name)
    }
}
