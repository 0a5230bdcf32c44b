use std::io;

use thiserror::Error;

/// Library-wide error type for laraforge operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Persisted settings file failed to parse.
    #[error("Failed to parse settings file '{path}': {details}")]
    SettingsParse { path: String, details: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// External command exited with a failure status or could not be spawned.
    #[error("Command '{command}' failed: {details}")]
    CommandFailed { command: String, details: String },

    /// Running as root is refused.
    #[error("This tool should not be run as root for security reasons")]
    RootUser,

    /// The invoking user cannot elevate privileges.
    #[error("This user doesn't have sudo privileges")]
    SudoUnavailable,

    /// Application deploy was started without a repository URL.
    #[error("Repository URL cannot be empty")]
    MissingRepoUrl,

    /// Template rendering failed.
    #[error("Failed to render template '{template}': {details}")]
    TemplateRender { template: String, details: String },

    /// Reading operator input failed.
    #[error("Failed to read input: {0}")]
    PromptFailed(String),

    /// A provisioning step failed; the pipeline halts here.
    #[error("Step {step} failed: {details}")]
    StepFailed { step: String, details: String },
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}
