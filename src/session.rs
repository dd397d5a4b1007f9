//! Commit session: owns the fields of one commit message and drives
//! validation, composition, parsing and the final commit.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
   compose::{Composed, format_message, format_rejected},
   config::DocCommitConfig,
   docbook::DocIdLookup,
   error::{DocCommitError, Result},
   git::Repository,
   parse::parse_message,
   style,
   types::{CommitFields, Field, Problem},
   validation::{
      Findings, validate_body, validate_merge_commits, validate_references, validate_subject,
      validate_xml_ids,
   },
};

/// What [`CommitSession::commit`] did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitOutcome {
   /// New commit created
   Committed { id: String },
   /// Message attached to an existing commit as a note
   Noted { hash: String },
   /// Valid message, nothing persisted
   DryRun { message: String },
   /// Validation failed, nothing persisted; `text` carries the problem report
   Rejected { problems: Vec<Problem>, text: String },
   /// User cancelled, staging was reset
   Cancelled,
}

pub struct CommitSession<R> {
   fields:        CommitFields,
   problems:      Vec<Problem>,
   final_message: Option<String>,
   update:        Option<String>,
   stage_all:     bool,
   config:        DocCommitConfig,
   lookup:        DocIdLookup,
   repo:          R,
}

impl<R: Repository> CommitSession<R> {
   pub fn new(config: DocCommitConfig, repo: R, lookup: DocIdLookup) -> Self {
      Self {
         fields: CommitFields::default(),
         problems: Vec::new(),
         final_message: None,
         update: None,
         stage_all: false,
         config,
         lookup,
         repo,
      }
   }

   #[must_use]
   pub fn with_fields(mut self, fields: CommitFields) -> Self {
      self.fields = fields;
      self
   }

   /// Attach the message to `hash` as a note instead of creating a commit
   #[must_use]
   pub fn updating(mut self, hash: Option<String>) -> Self {
      self.update = hash.filter(|h| !h.trim().is_empty());
      self
   }

   /// Stage every change before committing when nothing is staged yet.
   /// Staging happens only after the message validated.
   #[must_use]
   pub fn staging_all(mut self, stage_all: bool) -> Self {
      self.stage_all = stage_all;
      self
   }

   pub const fn fields(&self) -> &CommitFields {
      &self.fields
   }

   pub fn set_field(&mut self, field: Field, value: &str) {
      self.fields.set(field, value);
   }

   pub const fn config(&self) -> &DocCommitConfig {
      &self.config
   }

   pub const fn repo(&self) -> &R {
      &self.repo
   }

   pub const fn lookup(&self) -> &DocIdLookup {
      &self.lookup
   }

   /// Problems found by the most recent validation
   pub fn problems(&self) -> &[Problem] {
      &self.problems
   }

   pub fn problem_messages(&self) -> Vec<String> {
      self.problems.iter().map(|p| p.message.clone()).collect()
   }

   /// Problems grouped by field in validation order, identical messages
   /// within a field collapsed with their count
   pub fn problem_summary(&self) -> IndexMap<Field, Vec<(String, usize)>> {
      let mut summary: IndexMap<Field, Vec<(String, usize)>> = IndexMap::new();
      for problem in &self.problems {
         let entries = summary.entry(problem.field).or_default();
         match entries.iter_mut().find(|(message, _)| *message == problem.message) {
            Some((_, count)) => *count += 1,
            None => entries.push((problem.message.clone(), 1)),
         }
      }
      summary
   }

   /// Fields that produced problems in the most recent validation
   pub fn failing_fields(&self) -> Vec<Field> {
      self.problem_summary().into_keys().collect()
   }

   /// Last message that composed successfully
   pub fn final_message(&self) -> Option<&str> {
      self.final_message.as_deref()
   }

   /// Run one validator without touching the stored problems
   pub fn check_field(&self, field: Field) -> Result<Findings> {
      let fields = &self.fields;
      Ok(match field {
         Field::Subject => validate_subject(&fields.subject, &self.config),
         Field::Body => validate_body(&fields.body, &fields.subject, &self.config),
         Field::References => validate_references(&fields.references, &self.config),
         Field::XmlIds => validate_xml_ids(&fields.xml_ids, &self.lookup),
         Field::MergeCommits => validate_merge_commits(&fields.merge_commits, &self.repo)?,
      })
   }

   /// Validate a single field, replacing the stored problems with its
   /// findings. Returns whether the field is valid.
   pub fn validate_field(&mut self, field: Field) -> Result<bool> {
      self.problems.clear();
      let findings = self.check_field(field)?;
      self.record(field, findings);
      Ok(self.problems.is_empty())
   }

   /// Validate every field in order. Returns whether the message is valid.
   pub fn validate(&mut self) -> Result<bool> {
      self.problems.clear();
      for field in Field::ALL {
         let findings = self.check_field(field)?;
         self.record(field, findings);
      }
      Ok(self.problems.is_empty())
   }

   fn record(&mut self, field: Field, findings: Findings) {
      self
         .problems
         .extend(findings.into_iter().map(|message| Problem { field, message }));
   }

   /// Validate, then lay out the message. Only a successful composition
   /// updates [`Self::final_message`].
   pub fn compose(&mut self, include_comments: bool) -> Result<Composed> {
      if self.validate()? {
         let text = format_message(&self.fields, include_comments, &self.config)?;
         self.final_message = Some(text.clone());
         Ok(Composed { success: true, text })
      } else {
         let text = format_rejected(
            &self.fields,
            &self.problem_messages(),
            include_comments,
            &self.config,
         )?;
         Ok(Composed { success: false, text })
      }
   }

   /// Replace the fields with those parsed from `text`. On failure the fields
   /// stay untouched.
   pub fn parse(&mut self, text: &str) -> Result<()> {
      self.fields = parse_message(text)?;
      Ok(())
   }

   /// Compose the final message and persist it unless `persist` is false.
   ///
   /// Nothing is written when validation fails.
   pub fn commit(&mut self, persist: bool) -> Result<CommitOutcome> {
      let composed = self.compose(false)?;
      if !composed.success {
         return Ok(CommitOutcome::Rejected {
            problems: self.problems.clone(),
            text:     composed.text,
         });
      }
      if !persist {
         return Ok(CommitOutcome::DryRun { message: composed.text });
      }

      match &self.update {
         Some(hash) => {
            if !self.repo.commit_exists(hash)? {
               return Err(DocCommitError::GitError(format!("{hash} is not a valid commit ID")));
            }
            self.repo.add_note(hash, &composed.text)?;
            Ok(CommitOutcome::Noted { hash: hash.clone() })
         },
         None => {
            if self.stage_all {
               self.stage_if_needed()?;
            }
            let id = self.repo.commit(&composed.text)?;
            Ok(CommitOutcome::Committed { id })
         },
      }
   }

   fn stage_if_needed(&self) -> Result<()> {
      let files = self.repo.changed_files()?;
      if files.is_empty() {
         return Err(DocCommitError::NoChanges("working directory (nothing to commit)".to_string()));
      }
      if !files.iter().any(|file| file.staged) {
         style::print_info("No staged changes, staging all...");
         self.repo.stage_all()?;
      }
      Ok(())
   }

   /// Give up on this commit and unstage everything
   pub fn abort(&mut self) -> Result<CommitOutcome> {
      self.repo.reset_staging()?;
      Ok(CommitOutcome::Cancelled)
   }
}
