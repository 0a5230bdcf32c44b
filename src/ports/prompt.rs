use crate::domain::AppError;

/// Interactive operator input.
///
/// Every method is a blocking, unbounded wait; an operator who never
/// answers stalls the pipeline by design.
pub trait Prompt {
    /// Ask for a line of free-form text.
    fn input(&self, message: &str) -> Result<String, AppError>;

    /// Ask a yes/no question.
    fn confirm(&self, message: &str) -> Result<bool, AppError>;

    /// Wait for the operator to press Enter.
    fn pause(&self, message: &str) -> Result<(), AppError>;
}
