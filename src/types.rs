use std::{fmt, path::PathBuf};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::normalization::normalize_text;

/// Sentinel accepted in place of references for changes that stay out of
/// the doc update section
pub const MINOR: &str = "MINOR";

/// The structured fields of a documentation commit message.
///
/// List-like fields keep the raw comma-separated text the user entered; use
/// [`split_list`] to iterate their entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFields {
   pub subject:       String,
   pub body:          String,
   pub references:    String,
   pub xml_ids:       String,
   pub merge_commits: String,
}

impl CommitFields {
   /// Build fields from optional inputs; absent values become empty strings
   pub fn from_parts(
      subject: Option<&str>,
      body: Option<&str>,
      references: Option<&str>,
      xml_ids: Option<&str>,
      merge_commits: Option<&str>,
   ) -> Self {
      Self {
         subject:       normalize_text(subject.unwrap_or_default().trim()),
         body:          normalize_text(body.unwrap_or_default().trim_end()),
         references:    references.unwrap_or_default().trim().to_string(),
         xml_ids:       xml_ids.unwrap_or_default().trim().to_string(),
         merge_commits: merge_commits.unwrap_or_default().trim().to_string(),
      }
   }

   pub fn get(&self, field: Field) -> &str {
      match field {
         Field::Subject => &self.subject,
         Field::Body => &self.body,
         Field::References => &self.references,
         Field::XmlIds => &self.xml_ids,
         Field::MergeCommits => &self.merge_commits,
      }
   }

   /// Replace one field, applying the same normalization as [`Self::from_parts`]
   pub fn set(&mut self, field: Field, value: &str) {
      match field {
         Field::Subject => self.subject = normalize_text(value.trim()),
         Field::Body => self.body = normalize_text(value.trim_end()),
         Field::References => self.references = value.trim().to_string(),
         Field::XmlIds => self.xml_ids = value.trim().to_string(),
         Field::MergeCommits => self.merge_commits = value.trim().to_string(),
      }
   }

   /// Whether this commit opted out of the doc update section
   pub fn is_minor(&self) -> bool {
      self.references.trim() == MINOR
   }
}

/// Split a comma-separated field into trimmed, non-empty entries
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
   value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// A field of [`CommitFields`]; `ALL` is the fixed validation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
   Subject,
   Body,
   References,
   XmlIds,
   MergeCommits,
}

impl Field {
   pub const ALL: [Self; 5] =
      [Self::Subject, Self::Body, Self::References, Self::XmlIds, Self::MergeCommits];

   pub const fn as_str(&self) -> &'static str {
      match self {
         Self::Subject => "subject",
         Self::Body => "body",
         Self::References => "references",
         Self::XmlIds => "XML IDs",
         Self::MergeCommits => "merge commits",
      }
   }

   /// Name of the instruction template for this field
   pub const fn template(&self) -> &'static str {
      match self {
         Self::Subject => "subject.md",
         Self::Body => "body.md",
         Self::References => "references.md",
         Self::XmlIds => "xml_ids.md",
         Self::MergeCommits => "merge_commits.md",
      }
   }
}

impl fmt::Display for Field {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

/// A validation finding attributed to the field that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
   pub field:   Field,
   pub message: String,
}

impl fmt::Display for Problem {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(&self.message)
   }
}

/// A file with uncommitted changes in the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
   pub path:   String,
   pub staged: bool,
}

// CLI Args
#[derive(Parser, Debug)]
#[command(
   name = "git-doccommit",
   author,
   version,
   about = "Create well formatted git commits that can be turned into doc update sections"
)]
pub struct Cli {
   /// Directory to run git commands in
   #[arg(long, default_value = ".", global = true)]
   pub dir: String,

   /// Path to config file (default: ~/.config/git-doccommit/config.toml)
   #[arg(long, global = true)]
   pub config: Option<PathBuf>,

   #[command(subcommand)]
   pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
   /// Validate, format and commit a documentation change
   Commit(CommitArgs),
   /// Write a doc update section built from commit history
   Docupdate(DocUpdateArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct CommitArgs {
   /// Commit message body (the doc update text)
   #[arg(short = 'm', long)]
   pub message: Option<String>,

   /// Commit subject
   #[arg(short = 's', long)]
   pub subject: Option<String>,

   /// Comma separated references, e.g. bsc#1234,FATE#567 or MINOR
   #[arg(short = 'r', long)]
   pub references: Option<String>,

   /// Comma separated list of affected XML IDs
   #[arg(short = 'l', long)]
   pub xml_ids: Option<String>,

   /// Comma separated commit hashes whose doc update text is merged into
   /// this one
   #[arg(short = 'c', long)]
   pub merge_commits: Option<String>,

   /// Attach the message to an existing commit as a git note
   #[arg(short = 'u', long)]
   pub update: Option<String>,

   /// Collect all fields interactively
   #[arg(short = 'i', long)]
   pub interactive: bool,

   /// Review and edit the final message in an editor
   #[arg(short = 'e', long)]
   pub editor: bool,

   /// Show the message without committing
   #[arg(long)]
   pub dry_run: bool,

   /// GPG sign the commit (equivalent to git commit -S)
   #[arg(long, short = 'S')]
   pub sign: bool,
}

#[derive(clap::Args, Debug)]
pub struct DocUpdateArgs {
   /// Path to the XML file containing the doc update section
   #[arg(long)]
   pub file: PathBuf,

   /// Only include commits after this ref (exclusive, e.g. v1.2)
   #[arg(long)]
   pub since: Option<String>,

   /// Print the section instead of writing it
   #[arg(long)]
   pub dry_run: bool,
}
