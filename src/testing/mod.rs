//! Test doubles for the execution and prompting ports, plus context
//! builders shared by the step tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::app::HostEnv;
use crate::domain::{AppError, ProvisionSettings};
use crate::ports::{CommandRunner, Prompt};

/// Command runner that records every invocation instead of executing it.
///
/// Failures and captured output are scripted by substring match against
/// the formatted command line; probe answers are a FIFO queue.
pub(crate) struct RecordingRunner {
    calls: RefCell<Vec<String>>,
    interactive: RefCell<Vec<String>>,
    failures: RefCell<Vec<String>>,
    outputs: RefCell<Vec<(String, String)>>,
    probe_answers: RefCell<VecDeque<Result<bool, String>>>,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            interactive: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
            outputs: RefCell::new(Vec::new()),
            probe_answers: RefCell::new(VecDeque::new()),
        }
    }

    /// Make any command whose formatted line contains `fragment` fail.
    pub(crate) fn fail_matching(&self, fragment: &str) {
        self.failures.borrow_mut().push(fragment.to_string());
    }

    /// Script captured stdout for commands matching `fragment`.
    pub(crate) fn set_output(&self, fragment: &str, value: &str) {
        self.outputs.borrow_mut().push((fragment.to_string(), value.to_string()));
    }

    /// Queue the answer for the next probe call.
    pub(crate) fn probe_answer(&self, answer: Result<bool, &str>) {
        self.probe_answers.borrow_mut().push_back(answer.map_err(str::to_string));
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn interactive_calls(&self) -> Vec<String> {
        self.interactive.borrow().clone()
    }

    fn describe(program: &str, args: &[&str]) -> String {
        if args.is_empty() { program.to_string() } else { format!("{} {}", program, args.join(" ")) }
    }

    fn record(&self, description: String) -> Result<String, AppError> {
        self.calls.borrow_mut().push(description.clone());

        let failing = self
            .failures
            .borrow()
            .iter()
            .any(|fragment| description.contains(fragment.as_str()));
        if failing {
            return Err(AppError::CommandFailed {
                command: description,
                details: "scripted failure".to_string(),
            });
        }

        Ok(description)
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), AppError> {
        self.record(Self::describe(program, args)).map(|_| ())
    }

    fn run_in(&self, _dir: &Path, program: &str, args: &[&str]) -> Result<(), AppError> {
        self.record(Self::describe(program, args)).map(|_| ())
    }

    fn output(&self, program: &str, args: &[&str]) -> Result<String, AppError> {
        let description = self.record(Self::describe(program, args))?;

        let outputs = self.outputs.borrow();
        let value = outputs
            .iter()
            .find(|(fragment, _)| description.contains(fragment.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        Ok(value)
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<(), AppError> {
        let description = self.record(Self::describe(program, args))?;
        self.interactive.borrow_mut().push(description);
        Ok(())
    }

    fn run_with_stdin(&self, input: &Path, program: &str, args: &[&str]) -> Result<(), AppError> {
        let description = format!("{} < {}", Self::describe(program, args), input.display());
        self.record(description).map(|_| ())
    }

    fn probe(&self, program: &str, args: &[&str]) -> Result<bool, AppError> {
        let description = Self::describe(program, args);
        self.calls.borrow_mut().push(description.clone());

        match self.probe_answers.borrow_mut().pop_front() {
            Some(Ok(found)) => Ok(found),
            Some(Err(details)) => Err(AppError::CommandFailed { command: description, details }),
            None => Ok(false),
        }
    }
}

/// Prompt whose answers are queued up front.
pub(crate) struct ScriptedPrompt {
    inputs: RefCell<VecDeque<String>>,
    confirms: RefCell<VecDeque<bool>>,
    inputs_consumed: Cell<usize>,
}

impl ScriptedPrompt {
    pub(crate) fn new() -> Self {
        Self {
            inputs: RefCell::new(VecDeque::new()),
            confirms: RefCell::new(VecDeque::new()),
            inputs_consumed: Cell::new(0),
        }
    }

    pub(crate) fn push_input(&self, value: &str) {
        self.inputs.borrow_mut().push_back(value.to_string());
    }

    pub(crate) fn push_confirm(&self, value: bool) {
        self.confirms.borrow_mut().push_back(value);
    }

    pub(crate) fn inputs_consumed(&self) -> usize {
        self.inputs_consumed.get()
    }
}

impl Prompt for ScriptedPrompt {
    fn input(&self, _message: &str) -> Result<String, AppError> {
        match self.inputs.borrow_mut().pop_front() {
            Some(value) => {
                self.inputs_consumed.set(self.inputs_consumed.get() + 1);
                Ok(value)
            }
            None => Err(AppError::PromptFailed("no scripted input available".to_string())),
        }
    }

    fn confirm(&self, _message: &str) -> Result<bool, AppError> {
        Ok(self.confirms.borrow_mut().pop_front().unwrap_or(false))
    }

    fn pause(&self, _message: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Settings with everything resolved, as the pipeline would see them.
pub(crate) fn test_settings() -> ProvisionSettings {
    let mut settings = ProvisionSettings {
        domain: "example.com".to_string(),
        repo_url: "https://github.com/acme/shop.git".to_string(),
        db_password: "s3cret-pass".to_string(),
        db_root_password: "r00t-s3cret".to_string(),
        ..Default::default()
    };
    settings.derive_web_root();
    settings
}

/// Host environment rooted in a sandbox directory; `home/` and `work/`
/// are created so steps can write reports and staged artifacts.
pub(crate) fn test_env(root: &Path) -> HostEnv {
    let home = root.join("home");
    let work_dir = root.join("work");
    fs::create_dir_all(&home).expect("failed to create test home");
    fs::create_dir_all(&work_dir).expect("failed to create test work dir");

    HostEnv { home, user: "deploy".to_string(), work_dir, script_dir: root.to_path_buf() }
}

/// Settings plus an environment for tests that never touch the
/// filesystem.
pub(crate) fn test_context() -> (ProvisionSettings, HostEnv) {
    let root = std::env::temp_dir();
    let env = HostEnv {
        home: root.clone(),
        user: "deploy".to_string(),
        work_dir: root.clone(),
        script_dir: root,
    };
    (test_settings(), env)
}
