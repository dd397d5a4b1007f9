//! Documentation commit message library
//!
//! Validates, formats and parses the structured commit messages from which
//! doc update sections of DocBook documentation are generated.
pub mod compose;
pub mod config;
pub mod docbook;
pub mod docupdate;
pub mod error;
pub mod git;
pub mod interactive;
pub mod normalization;
pub mod parse;
pub mod prompt;
pub mod session;
pub mod style;
pub mod templates;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::DocCommitConfig;
pub use error::{DocCommitError, ParseError, Result};
pub use session::{CommitOutcome, CommitSession};
pub use types::{CommitFields, Field, Problem};
