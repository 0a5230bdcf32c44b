//! Concrete implementations of the execution and prompting ports.

mod shell_runner;
mod terminal_prompt;

pub use shell_runner::ShellRunner;
pub use terminal_prompt::TerminalPrompt;
