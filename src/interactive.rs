//! Interactive commit flow: pick files, read the diff, enter each field until
//! it validates, then review the whole message.
//!
//! Cancelling at any prompt resets the staging area.

use crate::{
   error::{DocCommitError, Result},
   git::Repository,
   prompt::{ChecklistItem, Prompter},
   session::{CommitOutcome, CommitSession},
   style,
   templates::render_instructions,
   types::Field,
};

/// Order in which fields are asked for
const ENTRY_ORDER: [Field; 5] =
   [Field::Subject, Field::Body, Field::XmlIds, Field::References, Field::MergeCommits];

/// Drop comment lines from text returned by the editor
pub fn strip_comment_lines(text: &str) -> String {
   text
      .lines()
      .filter(|line| !line.starts_with('#'))
      .collect::<Vec<_>>()
      .join("\n")
}

/// Run the full interactive flow
pub fn run<R: Repository, P: Prompter>(
   session: &mut CommitSession<R>,
   prompter: &mut P,
   editor: bool,
   persist: bool,
) -> Result<CommitOutcome> {
   if !select_files(session, prompter)? {
      return session.abort();
   }

   let diff = session.repo().diff(true)?;
   if prompter.show_text("Staged changes", &diff)?.is_none() {
      return session.abort();
   }

   if !enter_fields(session, prompter, &ENTRY_ORDER, false)? {
      return session.abort();
   }

   review(session, prompter, editor, persist)
}

/// Offer all changed files with the staged ones preselected and stage exactly
/// the chosen ones. Returns false when the user cancelled or chose nothing.
fn select_files<R: Repository, P: Prompter>(
   session: &mut CommitSession<R>,
   prompter: &mut P,
) -> Result<bool> {
   let files = session.repo().changed_files()?;
   if files.is_empty() {
      return Err(DocCommitError::NoChanges("No changed files in repository".to_string()));
   }

   let items: Vec<ChecklistItem> = files
      .iter()
      .map(|file| ChecklistItem { label: file.path.clone(), checked: file.staged })
      .collect();
   let Some(selected) = prompter.checklist("Files to commit", &items)? else {
      return Ok(false);
   };
   if selected.is_empty() {
      style::warn("No files selected.");
      return Ok(false);
   }

   session.repo().reset_staging()?;
   for path in &selected {
      session.repo().stage_file(path)?;
   }
   Ok(true)
}

/// Ask for each of `fields` until it validates. With `show_findings` the
/// current findings are listed from the first prompt on, otherwise only after
/// an invalid answer. Returns false when the user cancelled.
fn enter_fields<R: Repository, P: Prompter>(
   session: &mut CommitSession<R>,
   prompter: &mut P,
   fields: &[Field],
   show_findings: bool,
) -> Result<bool> {
   for &field in fields {
      let mut findings = if show_findings { session.check_field(field)? } else { Vec::new() };
      loop {
         let instructions = render_instructions(field, session.config(), &findings)?;
         let current = session.fields().get(field).to_string();

         let answer = if field == Field::Body {
            prompter
               .edit(&instructions, &current)?
               .map(|text| strip_comment_lines(&text))
         } else {
            prompter.input(&instructions, &current)?
         };
         let Some(value) = answer else {
            return Ok(false);
         };

         session.set_field(field, &value);
         if session.validate_field(field)? {
            break;
         }
         findings = session.problem_messages();
      }
   }
   Ok(true)
}

/// Let the user confirm the composed message, fixing whatever fails
/// validation first.
///
/// With `editor` the whole message, comments included, is edited and parsed
/// back; otherwise only the failing fields are asked for again.
pub fn review<R: Repository, P: Prompter>(
   session: &mut CommitSession<R>,
   prompter: &mut P,
   editor: bool,
   persist: bool,
) -> Result<CommitOutcome> {
   loop {
      if editor {
         let composed = session.compose(true)?;
         let Some(edited) = prompter.edit("", &composed.text)? else {
            return session.abort();
         };
         if let Err(e) = session.parse(&edited) {
            let DocCommitError::Parse(parse_error) = e else {
               return Err(e);
            };
            style::warn(&parse_error.to_string());
            match prompter.confirm("The message could not be read. Edit it again?", true)? {
               Some(true) => continue,
               _ => return session.abort(),
            }
         }
      }

      let composed = session.compose(false)?;
      if composed.success {
         let question = format!("{}\n\nCommit this message?", composed.text);
         return match prompter.confirm(&question, true)? {
            Some(true) => session.commit(persist),
            _ => session.abort(),
         };
      }

      let question = format!("{}\n\nFix these problems?", composed.text);
      match prompter.confirm(&question, true)? {
         Some(true) => {},
         _ => return session.abort(),
      }
      if !editor {
         let failing = session.failing_fields();
         if !enter_fields(session, prompter, &failing, true)? {
            return session.abort();
         }
      }
   }
}
