use thiserror::Error;

/// Failure to recover structured fields from commit message text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
   #[error("No end-of-message marker after {limit} lines without content")]
   LineLimit { limit: usize },

   #[error("Commit message is incomplete, missing: {}", missing.join(", "))]
   Incomplete { missing: Vec<&'static str> },
}

#[derive(Debug, Error)]
pub enum DocCommitError {
   #[error("Git command failed: {0}")]
   GitError(String),

   #[error("Commit message validation failed ({} problem(s))", problems.len())]
   ValidationFailed { problems: Vec<String> },

   #[error("No changes found: {0}")]
   NoChanges(String),

   #[error("Could not parse commit message: {0}")]
   Parse(#[from] ParseError),

   #[error("Template error: {0}")]
   Template(String),

   #[error("Prompt failed: {0}")]
   Prompt(String),

   #[error("Invalid configuration: {0}")]
   Config(String),

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("JSON error: {0}")]
   JsonError(#[from] serde_json::Error),

   #[error("{0}")]
   Other(String),
}

pub type Result<T> = std::result::Result<T, DocCommitError>;
