//! Recover structured fields from composed commit message text

use crate::{
   compose::{MARKER_PREFIX, MERGE_PREFIX, REFERENCES_PREFIX, XML_IDS_PREFIX},
   error::ParseError,
   types::CommitFields,
};

/// Consecutive lines without content tolerated before giving up on finding
/// the end-of-message marker
pub const LINE_LIMIT: usize = 100;

/// Older messages label the merge line without the `Doc` prefix
const LEGACY_MERGE_PREFIX: &str = "Update Merge: ";

/// Value of a `Label: value` line. Matches the label with or without the
/// trailing space, since editors strip it from lines with an empty value.
fn labeled<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
   line.strip_prefix(prefix.trim_end()).map(str::trim)
}

#[derive(Default)]
struct Seen {
   subject:    bool,
   references: bool,
   xml_ids:    bool,
}

impl Seen {
   fn missing(&self, marker: bool) -> Vec<&'static str> {
      let mut missing = Vec::new();
      if !self.subject {
         missing.push("subject");
      }
      if !self.references {
         missing.push("references");
      }
      if !self.xml_ids {
         missing.push("XML IDs");
      }
      if !marker {
         missing.push("end-of-message marker");
      }
      missing
   }
}

/// Parse text produced by [`crate::compose::format_message`], possibly after
/// a human edited it.
///
/// Lines starting with `#` or `~~` are instructions and skipped. The first
/// remaining line is the subject and everything up to the `References:` line
/// is the body. Parsing succeeds at the end-of-message marker once subject,
/// references and XML IDs were seen; an absent merge line means no merge
/// commits, which is how final messages without merges are composed.
///
/// Only lines that carry nothing (comments, separators, stray text after the
/// body) count towards [`LINE_LIMIT`], and the count restarts at every line
/// that does.
pub fn parse_message(text: &str) -> Result<CommitFields, ParseError> {
   let mut subject = "";
   let mut references = "";
   let mut xml_ids = "";
   let mut merge_commits = "";
   let mut seen = Seen::default();
   let mut body_done = false;
   let mut body_lines: Vec<&str> = Vec::new();
   let mut idle = 0;

   for raw in text.lines() {
      if idle >= LINE_LIMIT {
         return Err(ParseError::LineLimit { limit: LINE_LIMIT });
      }
      let line = raw.trim_end();

      if line.starts_with(MARKER_PREFIX) {
         let missing = seen.missing(true);
         if !missing.is_empty() {
            return Err(ParseError::Incomplete { missing });
         }
         while body_lines.last().is_some_and(|l| l.is_empty()) {
            body_lines.pop();
         }
         let body = body_lines.join("\n");
         return Ok(CommitFields::from_parts(
            Some(subject),
            Some(&body),
            Some(references),
            Some(xml_ids),
            Some(merge_commits),
         ));
      }

      idle += 1;
      if line.starts_with('#') || line.starts_with("~~") {
         continue;
      }

      if let Some(value) = labeled(line, REFERENCES_PREFIX) {
         references = value;
         seen.references = true;
         body_done = true;
      } else if let Some(value) = labeled(line, XML_IDS_PREFIX) {
         xml_ids = value;
         seen.xml_ids = true;
      } else if let Some(value) =
         labeled(line, MERGE_PREFIX).or_else(|| labeled(line, LEGACY_MERGE_PREFIX))
      {
         merge_commits = value;
      } else if line.trim().is_empty() {
         // Paragraph breaks inside the body survive, leading blanks do not
         if seen.subject && !body_done && !body_lines.is_empty() {
            body_lines.push("");
         } else {
            continue;
         }
      } else if !seen.subject {
         subject = line.trim();
         seen.subject = true;
      } else if !body_done {
         body_lines.push(raw);
      } else {
         continue;
      }
      idle = 0;
   }

   Err(ParseError::Incomplete { missing: seen.missing(false) })
}
