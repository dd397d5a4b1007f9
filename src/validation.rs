//! Field validators.
//!
//! Every validator returns its findings as human-readable strings; an empty
//! list means the field is valid. Bad input is never an error, only a
//! repository that cannot be queried is.

use crate::{
   config::DocCommitConfig,
   docbook::DocIdLookup,
   error::Result,
   git::Repository,
   normalization::normalize_references,
   types::{MINOR, split_list},
};

pub type Findings = Vec<String>;

/// Check subject length and that it names the kind of change
pub fn validate_subject(subject: &str, config: &DocCommitConfig) -> Findings {
   let mut findings = Findings::new();

   if subject.chars().count() > config.subject_max_len {
      findings.push(format!("Subject longer than {} characters.", config.subject_max_len));
   }

   if !config
      .subject_keywords
      .iter()
      .any(|keyword| subject.contains(keyword.as_str()))
   {
      findings.push("No keyword found in subject.".to_string());
   }

   findings
}

/// Check that the body outweighs the subject and respects the line limit.
/// Every over-long line is reported on its own.
pub fn validate_body(body: &str, subject: &str, config: &DocCommitConfig) -> Findings {
   let mut findings = Findings::new();

   if body.chars().count() < subject.chars().count() {
      findings.push("Subject is longer than description text.".to_string());
   }

   for line in body.lines() {
      if line.chars().count() > config.body_line_max_len {
         findings
            .push(format!("Message line longer than {} characters.", config.body_line_max_len));
      }
   }

   findings
}

/// Check one `PREFIX#ID` token
fn validate_reference_token(token: &str, config: &DocCommitConfig, findings: &mut Findings) {
   let Some((prefix, id)) = token.split_once('#') else {
      findings.push(format!("{token}: Reference does not contain a number (#) sign."));
      return;
   };

   if !config.is_reference_type(prefix) {
      findings.push(format!("{token}: Unknown reference type."));
   }
   if id.trim().parse::<u64>().is_err() {
      findings.push(format!("{token}: Reference ID is not a number."));
   }
}

/// Normalize, then check every reference token. `MINOR` on its own is valid.
pub fn validate_references(references: &str, config: &DocCommitConfig) -> Findings {
   let normalized = normalize_references(references);
   let normalized = normalized.trim();

   if normalized == MINOR {
      return Findings::new();
   }
   if !normalized.contains('#') {
      return vec!["Reference does not contain a number (#) sign.".to_string()];
   }

   let mut findings = Findings::new();
   for token in split_list(normalized) {
      validate_reference_token(token, config, &mut findings);
   }
   findings
}

/// Check that every XML ID exists in the documentation sources.
///
/// Blocks until the identifier scan behind `lookup` has finished.
pub fn validate_xml_ids(xml_ids: &str, lookup: &DocIdLookup) -> Findings {
   if split_list(xml_ids).next().is_none() {
      return vec!["No XML IDs entered.".to_string()];
   }

   match lookup.wait() {
      Ok(known) => split_list(xml_ids)
         .filter(|id| !known.contains_key(*id))
         .map(|id| format!("{id} does not exist."))
         .collect(),
      Err(reason) => split_list(xml_ids)
         .map(|id| format!("{id} could not be checked: {reason}"))
         .collect(),
   }
}

/// Check that every listed merge commit exists. The field is optional.
pub fn validate_merge_commits(merge_commits: &str, repo: &dyn Repository) -> Result<Findings> {
   let mut findings = Findings::new();
   for hash in split_list(merge_commits) {
      if !repo.commit_exists(hash)? {
         findings.push(format!("{hash} is not a valid commit ID."));
      }
   }
   Ok(findings)
}

#[cfg(test)]
mod tests {
   use std::collections::HashSet;

   use super::*;
   use crate::{
      docbook::DocIds,
      error::DocCommitError,
      types::ChangedFile,
   };

   struct KnownCommits(HashSet<&'static str>);

   impl Repository for KnownCommits {
      fn commit_exists(&self, hash: &str) -> Result<bool> {
         if hash == "unreachable" {
            return Err(DocCommitError::GitError("repository unavailable".to_string()));
         }
         Ok(self.0.contains(hash))
      }

      fn changed_files(&self) -> Result<Vec<ChangedFile>> {
         Ok(vec![])
      }

      fn diff(&self, _staged_only: bool) -> Result<String> {
         Ok(String::new())
      }

      fn stage_file(&self, _path: &str) -> Result<()> {
         Ok(())
      }

      fn stage_all(&self) -> Result<()> {
         Ok(())
      }

      fn reset_staging(&self) -> Result<()> {
         Ok(())
      }

      fn commit(&self, _message: &str) -> Result<String> {
         Ok("0000000".to_string())
      }

      fn add_note(&self, _hash: &str, _message: &str) -> Result<()> {
         Ok(())
      }
   }

   fn lookup(ids: &[&str]) -> DocIdLookup {
      DocIdLookup::ready(ids.iter().map(|id| ((*id).to_string(), String::new())).collect::<DocIds>())
   }

   // ========== Subject ==========

   #[test]
   fn test_subject_valid() {
      let config = DocCommitConfig::default();
      assert!(validate_subject("Add network chapter", &config).is_empty());
   }

   #[test]
   fn test_subject_too_long() {
      let config = DocCommitConfig::default();
      let subject = format!("Add {}", "x".repeat(47));
      assert_eq!(validate_subject(&subject, &config), vec!["Subject longer than 50 characters."]);
   }

   #[test]
   fn test_subject_exactly_at_limit() {
      let config = DocCommitConfig::default();
      let subject = format!("Add {}", "x".repeat(46));
      assert_eq!(subject.chars().count(), 50);
      assert!(validate_subject(&subject, &config).is_empty());
   }

   #[test]
   fn test_subject_length_counts_characters() {
      let config = DocCommitConfig::default();
      let subject = format!("Change {}", "ü".repeat(43));
      assert!(validate_subject(&subject, &config).is_empty());
   }

   #[test]
   fn test_subject_keywords() {
      let config = DocCommitConfig::default();
      for subject in ["Add section", "Remove typo", "Change wording", "Added image"] {
         assert!(
            !validate_subject(subject, &config).contains(&"No keyword found in subject.".to_string()),
            "'{subject}' should contain a keyword"
         );
      }
      assert_eq!(validate_subject("Fix typo", &config), vec!["No keyword found in subject."]);
      assert_eq!(validate_subject("add lowercase", &config), vec!["No keyword found in subject."]);
   }

   #[test]
   fn test_subject_reports_both_findings() {
      let config = DocCommitConfig::default();
      let findings = validate_subject(&"x".repeat(60), &config);
      assert_eq!(findings, vec![
         "Subject longer than 50 characters.",
         "No keyword found in subject."
      ]);
   }

   // ========== Body ==========

   #[test]
   fn test_body_valid() {
      let config = DocCommitConfig::default();
      let body = "Explains network setup.\nCovers firewall basics.";
      assert!(validate_body(body, "Add network chapter", &config).is_empty());
   }

   #[test]
   fn test_body_shorter_than_subject() {
      let config = DocCommitConfig::default();
      assert_eq!(validate_body("Short.", "Add network chapter", &config), vec![
         "Subject is longer than description text."
      ]);
   }

   #[test]
   fn test_body_equal_length_to_subject_passes() {
      let config = DocCommitConfig::default();
      assert!(validate_body("abcdefghij", "Add 123456", &config).is_empty());
   }

   #[test]
   fn test_body_one_finding_per_long_line() {
      let config = DocCommitConfig::default();
      let long = "y".repeat(73);
      let body = format!("{long}\nshort line\n{long}");
      let findings = validate_body(&body, "Add x", &config);
      assert_eq!(findings.len(), 2);
      assert!(findings.iter().all(|f| f == "Message line longer than 72 characters."));
   }

   #[test]
   fn test_body_line_at_limit_passes() {
      let config = DocCommitConfig::default();
      assert!(validate_body(&"z".repeat(72), "Add x", &config).is_empty());
   }

   // ========== References ==========

   #[test]
   fn test_references_minor() {
      let config = DocCommitConfig::default();
      assert!(validate_references("MINOR", &config).is_empty());
      assert!(validate_references(" MINOR ", &config).is_empty());
   }

   #[test]
   fn test_references_empty() {
      let config = DocCommitConfig::default();
      assert_eq!(validate_references("", &config), vec![
         "Reference does not contain a number (#) sign."
      ]);
   }

   #[test]
   fn test_references_without_hash() {
      let config = DocCommitConfig::default();
      assert_eq!(validate_references("minor", &config), vec![
         "Reference does not contain a number (#) sign."
      ]);
   }

   #[test]
   fn test_references_valid_mixed_forms() {
      let config = DocCommitConfig::default();
      let refs = "BSC#1,boo#2, Fate#3,dc#4,gh#5,trello#6,https://bugzilla.suse.com/show_bug.cgi?id=7";
      assert!(validate_references(refs, &config).is_empty());
   }

   #[test]
   fn test_references_report_every_bad_token() {
      let config = DocCommitConfig::default();
      let findings = validate_references("jira#12,bsc#abc,bsc#3,nohash", &config);
      assert_eq!(findings, vec![
         "jira#12: Unknown reference type.",
         "bsc#abc: Reference ID is not a number.",
         "nohash: Reference does not contain a number (#) sign.",
      ]);
   }

   #[test]
   fn test_references_token_failing_both_checks() {
      let config = DocCommitConfig::default();
      assert_eq!(validate_references("foo#bar", &config), vec![
         "foo#bar: Unknown reference type.",
         "foo#bar: Reference ID is not a number.",
      ]);
   }

   #[test]
   fn test_references_minor_mixed_with_tokens() {
      let config = DocCommitConfig::default();
      assert_eq!(validate_references("bsc#1,MINOR", &config), vec![
         "MINOR: Reference does not contain a number (#) sign."
      ]);
   }

   // ========== XML IDs ==========

   #[test]
   fn test_xml_ids_empty() {
      assert_eq!(validate_xml_ids("", &lookup(&["sec.foo"])), vec!["No XML IDs entered."]);
      assert_eq!(validate_xml_ids(" , ", &lookup(&["sec.foo"])), vec!["No XML IDs entered."]);
   }

   #[test]
   fn test_xml_ids_unknown_reported() {
      let findings = validate_xml_ids("sec.foo,sec.bar", &lookup(&["sec.foo"]));
      assert_eq!(findings, vec!["sec.bar does not exist."]);
   }

   #[test]
   fn test_xml_ids_whitespace_trimmed() {
      assert!(validate_xml_ids(" sec.foo , sec.bar ", &lookup(&["sec.foo", "sec.bar"])).is_empty());
   }

   #[test]
   fn test_xml_ids_lookup_failure_is_a_finding() {
      let failed =
         DocIdLookup::spawn(|| Err(DocCommitError::Other("xml directory missing".to_string())));
      let findings = validate_xml_ids("sec.a,sec.b", &failed);
      assert_eq!(findings, vec![
         "sec.a could not be checked: xml directory missing",
         "sec.b could not be checked: xml directory missing",
      ]);
   }

   // ========== Merge commits ==========

   #[test]
   fn test_merge_commits_optional() {
      let repo = KnownCommits(HashSet::new());
      assert!(validate_merge_commits("", &repo).unwrap().is_empty());
   }

   #[test]
   fn test_merge_commits_unknown_reported() {
      let repo = KnownCommits(HashSet::from(["abc1234"]));
      let findings = validate_merge_commits("abc1234, deadbeef,cafe", &repo).unwrap();
      assert_eq!(findings, vec![
         "deadbeef is not a valid commit ID.",
         "cafe is not a valid commit ID."
      ]);
   }

   #[test]
   fn test_merge_commits_repository_failure_propagates() {
      let repo = KnownCommits(HashSet::new());
      let result = validate_merge_commits("unreachable", &repo);
      assert!(matches!(result, Err(DocCommitError::GitError(_))));
   }
}
