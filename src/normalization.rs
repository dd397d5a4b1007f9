//! Normalization of user-entered text and issue references
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Compose typed text to NFC so that character counts match what the user
/// sees, and drop zero-width characters.
pub fn normalize_text(text: &str) -> String {
   text
      .nfc()
      .filter(|c| !matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}'))
      .collect()
}

/// Rewrite rule: pattern with the ID in capture group `id`, canonical prefix
struct ReferenceRule {
   pattern: Regex,
   prefix:  &'static str,
}

impl ReferenceRule {
   fn new(pattern: &str, prefix: &'static str) -> Self {
      Self {
         pattern: Regex::new(pattern).expect("reference pattern must compile"),
         prefix,
      }
   }
}

static REFERENCE_RULES: LazyLock<Vec<ReferenceRule>> = LazyLock::new(|| {
   vec![
      ReferenceRule::new(r"(?i)^(?:bsc|boo|bnc)#(?<id>\d+)$", "bsc"),
      ReferenceRule::new(
         r"(?i)^https?://(?:www\.)?bugzilla\.(?:opensuse\.org|suse\.com|novell\.com)/show_bug\.cgi\?id=(?<id>\d+)(?:[&#].*)?$",
         "bsc",
      ),
      ReferenceRule::new(r"(?i)^fate#(?<id>\d+)$", "FATE"),
      ReferenceRule::new(r"(?i)^https?://fate\.suse\.com/(?<id>\d+)/?$", "FATE"),
      ReferenceRule::new(r"(?i)^(?:doccomments?|dc)#(?<id>\d+)$", "dc"),
      ReferenceRule::new(r"(?i)^https?://\S+/33098/(?<id>\d+)(?:/\S*)?$", "dc"),
   ]
});

/// Rewrite a single reference token into canonical `PREFIX#ID` form.
/// Unrecognized tokens are returned unchanged.
pub fn normalize_reference(token: &str) -> String {
   let token = token.trim();
   for rule in REFERENCE_RULES.iter() {
      if let Some(caps) = rule.pattern.captures(token) {
         return format!("{}#{}", rule.prefix, &caps["id"]);
      }
   }
   token.to_string()
}

/// Normalize a comma-separated reference list token by token, keeping the
/// token count and order.
pub fn normalize_references(references: &str) -> String {
   references
      .split(',')
      .map(normalize_reference)
      .collect::<Vec<_>>()
      .join(",")
}
