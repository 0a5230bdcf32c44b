//! Pipeline orchestration: the fixed step order and fail-fast execution.

use crate::app::StepContext;
use crate::console;
use crate::domain::{AppError, SkipFlags, StepOutcome};
use crate::ports::{CommandRunner, Prompt};
use crate::steps;

/// One named unit of the provisioning pipeline.
pub struct StepDescriptor<R: CommandRunner, P: Prompt> {
    pub name: &'static str,
    /// Reads the step's effective skip flag out of the combined set.
    pub skip: fn(&SkipFlags) -> bool,
    pub run: Box<dyn Fn(&StepContext<R, P>) -> Result<StepOutcome, AppError>>,
}

/// The eight steps in their fixed order. Later steps assume the packages
/// and services installed by earlier ones, so the order is not
/// configurable.
pub fn provisioning_steps<R: CommandRunner + 'static, P: Prompt + 'static>() -> Vec<StepDescriptor<R, P>> {
    vec![
        StepDescriptor {
            name: "System Update",
            skip: |flags| flags.system_update,
            run: Box::new(steps::system_update::run::<R, P>),
        },
        StepDescriptor {
            name: "Install Essentials",
            skip: |flags| flags.essentials,
            run: Box::new(steps::essentials::run::<R, P>),
        },
        StepDescriptor {
            name: "Install PHP",
            skip: |flags| flags.php,
            run: Box::new(steps::php::run::<R, P>),
        },
        StepDescriptor {
            name: "Install MySQL",
            skip: |flags| flags.mysql,
            run: Box::new(steps::mysql::run::<R, P>),
        },
        StepDescriptor {
            name: "Install Nginx",
            skip: |flags| flags.nginx,
            run: Box::new(steps::nginx::run::<R, P>),
        },
        StepDescriptor {
            name: "Configure Security",
            skip: |flags| flags.security,
            run: Box::new(steps::security::run::<R, P>),
        },
        StepDescriptor {
            name: "Setup Laravel",
            skip: |flags| flags.laravel,
            run: Box::new(steps::laravel::run::<R, P>),
        },
        StepDescriptor {
            name: "Configure Services",
            skip: |flags| flags.services,
            run: Box::new(steps::services::run::<R, P>),
        },
    ]
}

/// Run the steps strictly in order against one settings record.
///
/// The first failing step halts everything; no later step runs and no
/// rollback is attempted. Re-running the tool is the recovery path, which
/// the steps' own existence checks and duplicate guards make survivable.
pub fn run_pipeline<R: CommandRunner, P: Prompt>(
    ctx: &StepContext<R, P>,
    steps: &[StepDescriptor<R, P>],
) -> Result<(), AppError> {
    for step in steps {
        if (step.skip)(&ctx.settings().skip) {
            console::status(&format!("Skipping {} step as requested", step.name));
            continue;
        }

        console::header(&format!("Running {}", step.name));

        match (step.run)(ctx) {
            Ok(outcome) => {
                for warning in outcome.warnings() {
                    console::warn(warning);
                }
            }
            Err(err) => {
                return Err(AppError::StepFailed {
                    step: step.name.to_string(),
                    details: err.to_string(),
                });
            }
        }
    }

    Ok(())
}
