//! User interaction used by the interactive and editor flows.
//!
//! Every method returns `Ok(None)` when the user cancels the prompt.

use inquire::{Confirm, Editor, InquireError, MultiSelect, Text};

use crate::{
   error::{DocCommitError, Result},
   style,
};

/// Entry of a checklist, `checked` marks it preselected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
   pub label:   String,
   pub checked: bool,
}

pub trait Prompter {
   /// Let the user pick any number of items, returning the chosen labels
   fn checklist(&mut self, title: &str, items: &[ChecklistItem]) -> Result<Option<Vec<String>>>;

   /// Show a longer text and wait for the user to move on
   fn show_text(&mut self, title: &str, text: &str) -> Result<Option<()>>;

   /// Single-line input preceded by `instructions`
   fn input(&mut self, instructions: &str, initial: &str) -> Result<Option<String>>;

   /// Multi-line editing of `instructions` followed by `initial`; returns the
   /// whole edited text, instructions included
   fn edit(&mut self, instructions: &str, initial: &str) -> Result<Option<String>>;

   fn confirm(&mut self, question: &str, default: bool) -> Result<Option<bool>>;
}

fn answer<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
   match result {
      Ok(value) => Ok(Some(value)),
      Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
      Err(e) => Err(DocCommitError::Prompt(e.to_string())),
   }
}

/// [`Prompter`] for a terminal, multi-line editing goes through `$EDITOR`
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
   fn checklist(&mut self, title: &str, items: &[ChecklistItem]) -> Result<Option<Vec<String>>> {
      let labels: Vec<String> = items.iter().map(|item| item.label.clone()).collect();
      let defaults: Vec<usize> = items
         .iter()
         .enumerate()
         .filter(|(_, item)| item.checked)
         .map(|(idx, _)| idx)
         .collect();
      answer(
         MultiSelect::new(title, labels)
            .with_default(&defaults)
            .prompt(),
      )
   }

   fn show_text(&mut self, title: &str, text: &str) -> Result<Option<()>> {
      println!("{}", style::section_header(title, style::term_width()));
      println!("{text}");
      println!("{}", style::separator(style::term_width()));
      Ok(answer(Confirm::new("Continue?").with_default(true).prompt())?
         .and_then(|go_on| go_on.then_some(())))
   }

   fn input(&mut self, instructions: &str, initial: &str) -> Result<Option<String>> {
      println!("\n{}", style::dim(instructions));
      answer(Text::new(">").with_initial_value(initial).prompt())
   }

   fn edit(&mut self, instructions: &str, initial: &str) -> Result<Option<String>> {
      let predefined = if instructions.is_empty() {
         initial.to_string()
      } else {
         format!("{instructions}\n{initial}")
      };
      answer(
         Editor::new("Edit the text, then save and close the editor")
            .with_predefined_text(&predefined)
            .with_file_extension(".txt")
            .prompt(),
      )
   }

   fn confirm(&mut self, question: &str, default: bool) -> Result<Option<bool>> {
      answer(Confirm::new(question).with_default(default).prompt())
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_cancel_maps_to_none() {
      let result: Result<Option<String>> = answer(Err(InquireError::OperationCanceled));
      assert!(result.unwrap().is_none());
      let result: Result<Option<String>> = answer(Err(InquireError::OperationInterrupted));
      assert!(result.unwrap().is_none());
   }

   #[test]
   fn test_other_errors_propagate() {
      let result: Result<Option<bool>> = answer(Err(InquireError::NotTTY));
      assert!(matches!(result, Err(DocCommitError::Prompt(_))));
   }

   #[test]
   fn test_answer_passes_value() {
      assert_eq!(answer::<u8>(Ok(3)).unwrap(), Some(3));
   }
}
