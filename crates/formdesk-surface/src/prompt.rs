//! Delete confirmation seam.

use async_trait::async_trait;

/// Answer to a delete confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Go ahead and delete.
    Confirm,
    /// Leave the form alone.
    Cancel,
}

/// Asks the user whether a form should be deleted.
#[async_trait]
pub trait DeletePrompt: Send {
    /// Ask about `name` and wait for the answer.
    async fn confirm(&mut self, name: &str) -> Confirmation;
}

/// How a delete request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The file was removed.
    Deleted,
    /// Confirmed, but nothing was removed.
    Failed,
    /// The user declined.
    Cancelled,
    /// No form was selected.
    NothingSelected,
}
