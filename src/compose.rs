//! Canonical commit message layout

use crate::{
   config::DocCommitConfig,
   error::Result,
   normalization::normalize_references,
   templates::{render_instructions, render_report},
   types::{CommitFields, Field},
};

pub const REFERENCES_PREFIX: &str = "References: ";
pub const XML_IDS_PREFIX: &str = "XML IDs: ";
pub const MERGE_PREFIX: &str = "DocUpdate Merge: ";

/// Start of the last line of every composed message
pub const MARKER_PREFIX: &str = "~~ created by git-doccommit";

/// Trailing line identifying the tool and format version
pub fn marker_line() -> String {
   format!("{MARKER_PREFIX} version {}", env!("CARGO_PKG_VERSION"))
}

/// Result of composing a message. `text` is only committable when `success`
/// is set; otherwise it starts with a comment block listing the problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
   pub success: bool,
   pub text:    String,
}

/// Lay out `fields` as commit message text without validating them.
///
/// With `include_comments` every section is preceded by its instructions and
/// the merge line is always present; otherwise the merge line only appears
/// when merge commits were given.
pub fn format_message(
   fields: &CommitFields,
   include_comments: bool,
   config: &DocCommitConfig,
) -> Result<String> {
   let mut sections = Vec::with_capacity(6);

   let mut push = |field: Field, content: String| -> Result<()> {
      if include_comments {
         let instructions = render_instructions(field, config, &[])?;
         sections.push(format!("{instructions}\n{content}"));
      } else {
         sections.push(content);
      }
      Ok(())
   };

   push(Field::Subject, fields.subject.clone())?;
   push(Field::Body, fields.body.clone())?;
   push(
      Field::References,
      format!("{REFERENCES_PREFIX}{}", normalize_references(&fields.references)),
   )?;
   push(Field::XmlIds, format!("{XML_IDS_PREFIX}{}", fields.xml_ids))?;
   if include_comments || !fields.merge_commits.is_empty() {
      push(Field::MergeCommits, format!("{MERGE_PREFIX}{}", fields.merge_commits))?;
   }

   sections.push(marker_line());
   Ok(sections.join("\n\n"))
}

/// Message text prefixed with the list of problems that prevent committing it
pub fn format_rejected(
   fields: &CommitFields,
   problems: &[String],
   include_comments: bool,
   config: &DocCommitConfig,
) -> Result<String> {
   let report = render_report(problems)?;
   let message = format_message(fields, include_comments, config)?;
   Ok(format!("{report}\n\n{message}"))
}

#[cfg(test)]
mod tests {
   use super::*;

   fn sample() -> CommitFields {
      CommitFields {
         subject:       "Add network chapter".to_string(),
         body:          "Explains network setup.\nCovers firewall basics.".to_string(),
         references:    "BSC#1111, fate#22".to_string(),
         xml_ids:       "sec.network, sec.firewall".to_string(),
         merge_commits: String::new(),
      }
   }

   #[test]
   fn test_final_layout() {
      let config = DocCommitConfig::default();
      let text = format_message(&sample(), false, &config).unwrap();
      let expected = format!(
         "Add network chapter\n\nExplains network setup.\nCovers firewall basics.\n\nReferences: \
          bsc#1111,FATE#22\n\nXML IDs: sec.network, sec.firewall\n\n{}",
         marker_line()
      );
      assert_eq!(text, expected);
   }

   #[test]
   fn test_final_layout_includes_merge_when_set() {
      let config = DocCommitConfig::default();
      let mut fields = sample();
      fields.merge_commits = "abc1234".to_string();
      let text = format_message(&fields, false, &config).unwrap();
      assert!(text.contains("\n\nDocUpdate Merge: abc1234\n\n"));
   }

   #[test]
   fn test_authoring_layout_always_has_merge_line() {
      let config = DocCommitConfig::default();
      let text = format_message(&sample(), true, &config).unwrap();
      assert!(text.lines().any(|line| line == "DocUpdate Merge: "));
   }

   #[test]
   fn test_authoring_layout_content_lines_unchanged() {
      let config = DocCommitConfig::default();
      let plain = format_message(&sample(), false, &config).unwrap();
      let commented = format_message(&sample(), true, &config).unwrap();
      let stripped: Vec<&str> = commented
         .lines()
         .filter(|line| !line.starts_with('#') && !line.is_empty())
         .filter(|line| *line != "DocUpdate Merge: ")
         .collect();
      let plain_lines: Vec<&str> = plain.lines().filter(|line| !line.is_empty()).collect();
      assert_eq!(stripped, plain_lines);
   }

   #[test]
   fn test_marker_is_last_line() {
      let config = DocCommitConfig::default();
      let text = format_message(&sample(), true, &config).unwrap();
      let last = text.lines().last().unwrap();
      assert!(last.starts_with(MARKER_PREFIX));
      assert!(last.ends_with(env!("CARGO_PKG_VERSION")));
   }

   #[test]
   fn test_rejected_text_starts_with_problem_report() {
      let config = DocCommitConfig::default();
      let problems = vec!["No XML IDs entered.".to_string()];
      let text = format_rejected(&sample(), &problems, false, &config).unwrap();
      assert!(text.starts_with("# The following problems have been found:\n# * No XML IDs entered."));
      assert!(text.contains("\n\nAdd network chapter\n\n"));
   }
}
