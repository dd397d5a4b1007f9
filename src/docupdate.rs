//! Doc update section built from commit history.
//!
//! Every parsable, non-`MINOR` commit becomes one list entry. Commits named
//! in another commit's merge line are folded into that commit's entry.

use std::{path::Path, sync::LazyLock};

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::{
   compose::MARKER_PREFIX,
   docbook::DocIds,
   error::{DocCommitError, Result},
   normalization::normalize_references,
   parse::parse_message,
   style,
   types::{CommitFields, split_list},
};

pub const BEGIN_MARKER: &str = "<!-- doccommit:begin -->";
pub const END_MARKER: &str = "<!-- doccommit:end -->";

static XREF: LazyLock<Regex> =
   LazyLock::new(|| Regex::new(r"@([A-Za-z_][\w.\-]*)").expect("valid xref regex"));

/// One item of the doc update list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocUpdateEntry {
   pub hash:       String,
   pub body:       String,
   pub references: IndexSet<String>,
   pub xml_ids:    IndexSet<String>,
   /// Commits folded into this entry
   pub merged:     Vec<String>,
}

impl DocUpdateEntry {
   fn new(hash: &str, fields: &CommitFields) -> Self {
      let references = normalize_references(&fields.references);
      Self {
         hash:       hash.to_string(),
         body:       fields.body.clone(),
         references: split_list(&references).map(str::to_string).collect(),
         xml_ids:    split_list(&fields.xml_ids).map(str::to_string).collect(),
         merged:     Vec::new(),
      }
   }

   fn absorb(&mut self, other: Self) {
      if !other.body.is_empty() {
         if !self.body.is_empty() {
            self.body.push_str("\n\n");
         }
         self.body.push_str(&other.body);
      }
      self.references.extend(other.references);
      self.xml_ids.extend(other.xml_ids);
      self.merged.push(other.hash);
      self.merged.extend(other.merged);
   }
}

/// Key of the entry whose hash starts with the possibly abbreviated `hash`
fn find_entry<V>(entries: &IndexMap<String, V>, hash: &str) -> Option<String> {
   entries.keys().find(|key| key.starts_with(hash)).cloned()
}

/// Turn `(hash, message)` pairs, newest first, into doc update entries.
///
/// Messages that do not parse and `MINOR` commits are skipped. A skipped
/// message that carries the end-of-message marker gets a warning.
pub fn collect_entries(log: &[(String, String)]) -> Vec<DocUpdateEntry> {
   let mut parsed: IndexMap<String, CommitFields> = IndexMap::new();
   for (hash, message) in log {
      match parse_message(message) {
         Ok(fields) if !fields.is_minor() => {
            parsed.insert(hash.clone(), fields);
         },
         Ok(_) => {},
         Err(e) if message.lines().any(|line| line.starts_with(MARKER_PREFIX)) => {
            let short = hash.get(..12).unwrap_or(hash);
            style::warn(&format!("Skipping commit {short}: {e}"));
         },
         Err(_) => {},
      }
   }

   let mut entries: IndexMap<String, DocUpdateEntry> = parsed
      .iter()
      .map(|(hash, fields)| (hash.clone(), DocUpdateEntry::new(hash, fields)))
      .collect();

   let hashes: Vec<String> = entries.keys().cloned().collect();
   for hash in hashes {
      let Some(fields) = parsed.get(&hash) else {
         continue;
      };
      if !entries.contains_key(&hash) {
         continue;
      }

      let mut pending: Vec<String> = split_list(&fields.merge_commits).map(str::to_string).collect();
      while let Some(merge) = pending.pop() {
         let Some(key) = find_entry(&entries, &merge) else {
            continue;
         };
         if key == hash {
            continue;
         }
         if let Some(merged_fields) = parsed.get(&key) {
            pending.extend(split_list(&merged_fields.merge_commits).map(str::to_string));
         }
         if let Some(merged) = entries.shift_remove(&key)
            && let Some(entry) = entries.get_mut(&hash)
         {
            entry.absorb(merged);
         }
      }
   }

   entries.into_values().collect()
}

fn escape(text: &str) -> String {
   text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn xref(id: &str) -> String {
   format!("<xref linkend=\"{id}\"/>")
}

/// Body text with `##` replaced by the references, `@@` by links to all XML
/// IDs and `@id` by a link to `id` when that ID exists
fn expand(entry: &DocUpdateEntry, known: &DocIds) -> String {
   let references = entry.references.iter().cloned().collect::<Vec<_>>().join(", ");
   let links = entry.xml_ids.iter().map(|id| xref(id)).collect::<Vec<_>>().join(", ");

   let text = escape(&entry.body).replace("##", &references).replace("@@", &links);
   XREF
      .replace_all(&text, |caps: &Captures| {
         let id = caps[1].trim_end_matches('.');
         if known.contains_key(id) {
            format!("{}{}", xref(id), &caps[1][id.len()..])
         } else {
            caps[0].to_string()
         }
      })
      .into_owned()
}

/// DocBook section listing `entries`, dated `date`
pub fn render_section(entries: &[DocUpdateEntry], known: &DocIds, date: NaiveDate) -> String {
   let mut out = String::new();
   out.push_str(BEGIN_MARKER);
   out.push('\n');
   out.push_str("<sect1 xml:id=\"sec.doc-updates\">\n");
   out.push_str(" <title>Documentation Updates</title>\n");
   out.push_str(&format!(" <para>Last updated on {}.</para>\n", date.format("%B %-d, %Y")));

   if entries.is_empty() {
      out.push_str(" <para>No changes.</para>\n");
   } else {
      out.push_str(" <itemizedlist>\n");
      for entry in entries {
         out.push_str("  <listitem>\n");
         for paragraph in expand(entry, known).split("\n\n") {
            let paragraph = paragraph.trim();
            if !paragraph.is_empty() {
               out.push_str(&format!("   <para>{paragraph}</para>\n"));
            }
         }
         out.push_str("  </listitem>\n");
      }
      out.push_str(" </itemizedlist>\n");
   }

   out.push_str("</sect1>\n");
   out.push_str(END_MARKER);
   out
}

/// Put `section` into `existing` file content: replaces the marked region,
/// or goes before the closing tag of the root element when there is none
pub fn replace_section(existing: &str, section: &str) -> String {
   if let Some(begin) = existing.find(BEGIN_MARKER)
      && let Some(end_rel) = existing[begin..].find(END_MARKER)
   {
      let end = begin + end_rel + END_MARKER.len();
      return format!("{}{section}{}", &existing[..begin], &existing[end..]);
   }

   match existing.trim_end().rfind("</") {
      Some(closing) => {
         format!("{}{section}\n{}", &existing[..closing], &existing[closing..])
      },
      None if existing.trim().is_empty() => {
         format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{section}\n")
      },
      None => format!("{}\n{section}\n", existing.trim_end()),
   }
}

/// Write `section` into the file at `path`, creating it when missing
pub fn write_section(path: &Path, section: &str) -> Result<()> {
   let existing = match std::fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
      Err(e) => return Err(e.into()),
   };
   std::fs::write(path, replace_section(&existing, section))
      .map_err(|e| DocCommitError::Other(format!("Failed to write {}: {e}", path.display())))
}
