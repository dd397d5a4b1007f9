//! DocBook identifier lookup
//!
//! Collects every `xml:id` in the documentation sources together with the
//! title of the element carrying it. The scan runs on a background thread
//! started by [`DocIdLookup::spawn`]; validation blocks on it only when XML
//! IDs are checked.

use std::{
   collections::HashMap,
   path::{Path, PathBuf},
   sync::{LazyLock, OnceLock},
   thread::{self, JoinHandle},
};

use parking_lot::Mutex;
use rayon::prelude::*;
use regex::Regex;

use crate::error::{DocCommitError, Result};

/// Identifier to title
pub type DocIds = HashMap<String, String>;

static XML_ID: LazyLock<Regex> =
   LazyLock::new(|| Regex::new(r#"\bxml:id\s*=\s*["']([^"']+)["']"#).expect("xml:id pattern"));

static TITLE: LazyLock<Regex> =
   LazyLock::new(|| Regex::new(r"(?s)<title(?:\s[^>]*)?>(.*?)</title>").expect("title pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

/// Extract identifiers and titles from one DocBook document.
///
/// The title of an identifier is the first `<title>` after it and before the
/// next identifier; elements without one map to an empty title.
pub fn extract_ids(content: &str) -> DocIds {
   let matches: Vec<_> = XML_ID.captures_iter(content).collect();
   let mut ids = DocIds::with_capacity(matches.len());

   for (idx, caps) in matches.iter().enumerate() {
      let Some(whole) = caps.get(0) else { continue };
      let end = matches
         .get(idx + 1)
         .and_then(|next| next.get(0))
         .map_or(content.len(), |m| m.start());
      let title = TITLE
         .captures(&content[whole.end()..end])
         .map(|t| clean_title(&t[1]))
         .unwrap_or_default();
      ids.entry(caps[1].to_string()).or_insert(title);
   }

   ids
}

fn clean_title(raw: &str) -> String {
   TAG.replace_all(raw, "")
      .split_whitespace()
      .collect::<Vec<_>>()
      .join(" ")
}

/// Scan all `*.xml` files directly inside `xml_dir` in parallel
pub fn collect_ids(xml_dir: &Path) -> Result<DocIds> {
   let entries = std::fs::read_dir(xml_dir).map_err(|e| {
      DocCommitError::Other(format!("Failed to read XML directory {}: {e}", xml_dir.display()))
   })?;

   let files: Vec<PathBuf> = entries
      .filter_map(|entry| entry.ok().map(|e| e.path()))
      .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("xml"))
      .collect();

   let per_file: Vec<DocIds> = files
      .par_iter()
      .map(|path| {
         std::fs::read_to_string(path)
            .map(|content| extract_ids(&content))
            .map_err(|e| {
               DocCommitError::Other(format!("Failed to read {}: {e}", path.display()))
            })
      })
      .collect::<Result<_>>()?;

   Ok(per_file.into_iter().flatten().collect())
}

/// Handle on an identifier scan that may still be running.
///
/// [`DocIdLookup::wait`] is the only way to read the result.
pub struct DocIdLookup {
   pending: Mutex<Option<JoinHandle<Result<DocIds>>>>,
   result:  OnceLock<std::result::Result<DocIds, String>>,
}

impl DocIdLookup {
   /// Start `scan` on a background thread
   pub fn spawn<F>(scan: F) -> Self
   where
      F: FnOnce() -> Result<DocIds> + Send + 'static,
   {
      Self { pending: Mutex::new(Some(thread::spawn(scan))), result: OnceLock::new() }
   }

   /// Start scanning the DocBook sources in `xml_dir`
   pub fn scan_dir(xml_dir: PathBuf) -> Self {
      Self::spawn(move || collect_ids(&xml_dir))
   }

   /// A lookup whose result is already known
   pub fn ready(ids: DocIds) -> Self {
      let result = OnceLock::new();
      let _ = result.set(Ok(ids));
      Self { pending: Mutex::new(None), result }
   }

   /// Block until the scan has finished. A failed or panicked scan yields
   /// its error message.
   pub fn wait(&self) -> std::result::Result<&DocIds, &str> {
      let outcome = self.result.get_or_init(|| {
         let handle = self.pending.lock().take();
         match handle.map(JoinHandle::join) {
            Some(Ok(Ok(ids))) => Ok(ids),
            Some(Ok(Err(e))) => Err(e.to_string()),
            Some(Err(_)) => Err("XML ID scan panicked".to_string()),
            None => Err("XML ID scan was never started".to_string()),
         }
      });
      outcome.as_ref().map_err(String::as_str)
   }
}

impl std::fmt::Debug for DocIdLookup {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("DocIdLookup")
         .field("finished", &self.result.get().is_some())
         .finish()
   }
}
