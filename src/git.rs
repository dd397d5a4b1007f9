use std::process::{Command, Output};

use crate::{
   error::{DocCommitError, Result},
   types::ChangedFile,
};

/// Version-control operations a commit session depends on
pub trait Repository {
   /// Whether `hash` names an existing commit
   fn commit_exists(&self, hash: &str) -> Result<bool>;

   /// Files with uncommitted changes; `staged` marks those already in the
   /// index
   fn changed_files(&self) -> Result<Vec<ChangedFile>>;

   /// Unified diff of the index (`staged_only`) or of the working tree
   fn diff(&self, staged_only: bool) -> Result<String>;

   fn stage_file(&self, path: &str) -> Result<()>;

   fn stage_all(&self) -> Result<()>;

   /// Unstage everything, leaving the working tree untouched
   fn reset_staging(&self) -> Result<()>;

   /// Create a commit whose message is exactly `message`, returning its hash
   fn commit(&self, message: &str) -> Result<String>;

   /// Attach `message` to an existing commit as a note
   fn add_note(&self, hash: &str, message: &str) -> Result<()>;
}

/// [`Repository`] backed by the `git` command line
#[derive(Debug, Clone)]
pub struct GitRepo {
   dir:  String,
   sign: bool,
}

impl GitRepo {
   pub fn new(dir: impl Into<String>, sign: bool) -> Self {
      Self { dir: dir.into(), sign }
   }

   fn run(&self, args: &[&str]) -> Result<Output> {
      Command::new("git")
         .args(args)
         .current_dir(&self.dir)
         .output()
         .map_err(|e| DocCommitError::GitError(format!("Failed to run git {}: {e}", args[0])))
   }

   /// Run git and return stdout, failing on a non-zero exit status
   fn run_checked(&self, args: &[&str]) -> Result<String> {
      let output = self.run(args)?;
      if !output.status.success() {
         let stderr = String::from_utf8_lossy(&output.stderr);
         return Err(DocCommitError::GitError(format!("git {} failed: {stderr}", args[0])));
      }
      Ok(String::from_utf8_lossy(&output.stdout).to_string())
   }

   /// Root directory of the working tree
   pub fn toplevel(&self) -> Result<String> {
      Ok(self.run_checked(&["rev-parse", "--show-toplevel"])?.trim().to_string())
   }

   /// Full messages of commits reachable from HEAD, newest first, optionally
   /// stopping at `since` (exclusive)
   pub fn log_messages(&self, since: Option<&str>) -> Result<Vec<(String, String)>> {
      let range;
      let mut args = vec!["log", "-z", "--format=%H%x00%B"];
      if let Some(since) = since {
         range = format!("{since}..HEAD");
         args.push(&range);
      }

      let stdout = self.run_checked(&args)?;
      Ok(parse_log_records(&stdout))
   }
}

/// Split `git log -z --format=%H%x00%B` output into (hash, message) pairs
fn parse_log_records(stdout: &str) -> Vec<(String, String)> {
   let mut records = Vec::new();
   let mut parts = stdout.split('\0');
   while let Some(hash) = parts.next() {
      let hash = hash.trim();
      if hash.is_empty() {
         continue;
      }
      let message = parts.next().unwrap_or_default();
      records.push((hash.to_string(), message.trim().to_string()));
   }
   records
}

/// Whether `hash` looks like a full or abbreviated commit hash
fn is_commit_hash(hash: &str) -> bool {
   (4..=40).contains(&hash.len()) && hash.chars().all(|c| c.is_ascii_hexdigit())
}

/// Arguments for `git commit` storing `message` unchanged
fn commit_args(sign: bool, message: &str) -> Vec<&str> {
   let mut args = vec!["commit", "-q", "--cleanup=verbatim"];
   if sign {
      args.push("-S");
   }
   args.push("-m");
   args.push(message);
   args
}

/// Parse `git status --porcelain` output into changed files
fn parse_porcelain(stdout: &str) -> Vec<ChangedFile> {
   stdout
      .lines()
      .filter(|line| line.len() > 3)
      .map(|line| {
         let (status, path) = line.split_at(3);
         let index = status.chars().next().unwrap_or(' ');
         // Renames are reported as "old -> new"
         let path = path.rsplit(" -> ").next().unwrap_or(path);
         ChangedFile {
            path:   path.trim_matches('"').to_string(),
            staged: !matches!(index, ' ' | '?' | '!'),
         }
      })
      .collect()
}

impl Repository for GitRepo {
   fn commit_exists(&self, hash: &str) -> Result<bool> {
      // Ref names resolve too, but only hashes can be folded by prefix later
      if !is_commit_hash(hash) {
         return Ok(false);
      }
      let object = format!("{hash}^{{commit}}");
      let output = self.run(&["cat-file", "-e", &object])?;
      Ok(output.status.success())
   }

   fn changed_files(&self) -> Result<Vec<ChangedFile>> {
      let stdout = self.run_checked(&["status", "--porcelain", "--untracked-files=all"])?;
      Ok(parse_porcelain(&stdout))
   }

   fn diff(&self, staged_only: bool) -> Result<String> {
      if staged_only {
         self.run_checked(&["diff", "--cached"])
      } else {
         self.run_checked(&["diff", "HEAD"])
      }
   }

   fn stage_file(&self, path: &str) -> Result<()> {
      self.run_checked(&["add", "--", path]).map(|_| ())
   }

   fn stage_all(&self) -> Result<()> {
      self.run_checked(&["add", "-A"]).map(|_| ())
   }

   fn reset_staging(&self) -> Result<()> {
      let output = self.run(&["reset", "-q", "HEAD"])?;
      if output.status.success() {
         return Ok(());
      }
      // Without a HEAD (fresh repository) empty the index instead
      self.run_checked(&["rm", "-r", "-q", "--cached", "--ignore-unmatch", "."]).map(|_| ())
   }

   fn commit(&self, message: &str) -> Result<String> {
      let output = self.run(&commit_args(self.sign, message))?;
      if !output.status.success() {
         let stderr = String::from_utf8_lossy(&output.stderr);
         let stdout = String::from_utf8_lossy(&output.stdout);
         return Err(DocCommitError::GitError(format!(
            "Git commit failed:\nstderr: {stderr}\nstdout: {stdout}"
         )));
      }

      Ok(self.run_checked(&["rev-parse", "HEAD"])?.trim().to_string())
   }

   fn add_note(&self, hash: &str, message: &str) -> Result<()> {
      self
         .run_checked(&["notes", "add", "-f", "-m", message, hash])
         .map(|_| ())
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_parse_porcelain_staged_and_unstaged() {
      let stdout = "M  xml/a.xml\n M xml/b.xml\n?? xml/new.xml\nMM xml/c.xml\n";
      let files = parse_porcelain(stdout);
      assert_eq!(files, vec![
         ChangedFile { path: "xml/a.xml".to_string(), staged: true },
         ChangedFile { path: "xml/b.xml".to_string(), staged: false },
         ChangedFile { path: "xml/new.xml".to_string(), staged: false },
         ChangedFile { path: "xml/c.xml".to_string(), staged: true },
      ]);
   }

   #[test]
   fn test_parse_porcelain_rename_uses_new_path() {
      let files = parse_porcelain("R  xml/old.xml -> xml/new.xml\n");
      assert_eq!(files.len(), 1);
      assert_eq!(files[0].path, "xml/new.xml");
      assert!(files[0].staged);
   }

   #[test]
   fn test_parse_porcelain_empty() {
      assert!(parse_porcelain("").is_empty());
   }

   #[test]
   fn test_parse_log_records() {
      let stdout = "abc123\0Add chapter\n\nBody text\n\0\ndef456\0Remove section\n\0\n";
      let records = parse_log_records(stdout);
      assert_eq!(records, vec![
         ("abc123".to_string(), "Add chapter\n\nBody text".to_string()),
         ("def456".to_string(), "Remove section".to_string()),
      ]);
   }

   #[test]
   fn test_commit_exists_rejects_option_like_input() {
      let repo = GitRepo::new(".", false);
      assert!(!repo.commit_exists("--all").unwrap());
      assert!(!repo.commit_exists("").unwrap());
   }

   #[test]
   fn test_commit_exists_rejects_ref_names() {
      // Never reaches git, so the directory does not matter
      let repo = GitRepo::new("/nonexistent/doccommit", false);
      for name in ["HEAD", "main", "HEAD~2", "abc", "v1.0"] {
         assert!(!repo.commit_exists(name).unwrap(), "{name} accepted");
      }
   }

   #[test]
   fn test_is_commit_hash() {
      assert!(is_commit_hash("abc1"));
      assert!(is_commit_hash("ABC1234"));
      assert!(is_commit_hash(&"f".repeat(40)));
      assert!(!is_commit_hash(&"f".repeat(41)));
      assert!(!is_commit_hash("abcg123"));
   }

   #[test]
   fn test_commit_args_keep_message_verbatim() {
      let message = "Add intro\n\n\nLine with trailing space \n";
      assert_eq!(commit_args(false, message), vec![
         "commit",
         "-q",
         "--cleanup=verbatim",
         "-m",
         message
      ]);
      assert_eq!(commit_args(true, message)[3], "-S");
   }
}
