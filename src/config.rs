use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DocCommitError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocCommitConfig {
   /// Maximum subject length in characters
   pub subject_max_len: usize,

   /// Maximum length of a single body line in characters
   pub body_line_max_len: usize,

   /// At least one of these must appear in the subject
   pub subject_keywords: Vec<String>,

   /// Accepted reference prefixes (matched case-insensitively)
   pub reference_types: Vec<String>,

   /// Directory holding the DocBook sources, relative to the repository root
   /// (overridden by `DOCCOMMIT_XML_DIR` env var)
   pub xml_dir: PathBuf,

   /// GPG sign commits by default (can be overridden by --sign CLI flag)
   #[serde(default = "default_gpg_sign")]
   pub gpg_sign: bool,
}

const fn default_gpg_sign() -> bool {
   false
}

impl Default for DocCommitConfig {
   fn default() -> Self {
      Self {
         subject_max_len:   50,
         body_line_max_len: 72,
         subject_keywords:  vec!["Add".to_string(), "Remove".to_string(), "Change".to_string()],
         reference_types:   vec![
            "bsc".to_string(),
            "boo".to_string(),
            "bnc".to_string(),
            "fate".to_string(),
            "dc".to_string(),
            "gh".to_string(),
            "trello".to_string(),
         ],
         xml_dir:           PathBuf::from("xml"),
         gpg_sign:          default_gpg_sign(),
      }
   }
}

impl DocCommitConfig {
   /// Load config from default location (~/.config/git-doccommit/config.toml)
   /// Falls back to Default if file doesn't exist or no home directory is
   /// known. `DOCCOMMIT_CONFIG` points at an alternative file.
   pub fn load() -> Result<Self> {
      let config_path = if let Ok(custom_path) = std::env::var("DOCCOMMIT_CONFIG") {
         PathBuf::from(custom_path)
      } else {
         Self::default_config_path().unwrap_or_else(|_| PathBuf::new())
      };

      let mut config = if config_path.exists() {
         Self::from_file(&config_path)?
      } else {
         Self::default()
      };

      Self::apply_env_overrides(&mut config);
      Ok(config)
   }

   fn apply_env_overrides(config: &mut Self) {
      if let Ok(xml_dir) = std::env::var("DOCCOMMIT_XML_DIR") {
         config.xml_dir = PathBuf::from(xml_dir);
      }
   }

   /// Load config from specific file
   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path)
         .map_err(|e| DocCommitError::Config(format!("Failed to read {}: {e}", path.display())))?;
      let mut config = Self::from_toml(&contents)?;

      Self::apply_env_overrides(&mut config);
      Ok(config)
   }

   fn from_toml(contents: &str) -> Result<Self> {
      let config: Self = toml::from_str(contents)
         .map_err(|e| DocCommitError::Config(format!("Failed to parse config: {e}")))?;

      if config.subject_keywords.is_empty() {
         return Err(DocCommitError::Config("subject_keywords must not be empty".to_string()));
      }
      if config.reference_types.is_empty() {
         return Err(DocCommitError::Config("reference_types must not be empty".to_string()));
      }
      Ok(config)
   }

   /// Get default config path (platform-safe)
   /// Tries HOME (Unix/Linux/macOS) then USERPROFILE (Windows)
   pub fn default_config_path() -> Result<PathBuf> {
      if let Ok(home) = std::env::var("HOME") {
         return Ok(PathBuf::from(home).join(".config/git-doccommit/config.toml"));
      }

      if let Ok(home) = std::env::var("USERPROFILE") {
         return Ok(PathBuf::from(home).join(".config/git-doccommit/config.toml"));
      }

      Err(DocCommitError::Config("No home directory found (tried HOME and USERPROFILE)".to_string()))
   }

   /// Whether `prefix` names a known reference type (case-insensitive)
   pub fn is_reference_type(&self, prefix: &str) -> bool {
      self
         .reference_types
         .iter()
         .any(|t| t.eq_ignore_ascii_case(prefix))
   }
}
