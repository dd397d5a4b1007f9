//! Terminal output helpers. Colors are off under `NO_COLOR` or when stdout
//! cannot show them.

use std::sync::OnceLock;

use owo_colors::OwoColorize;

pub mod icons {
   pub const SUCCESS: &str = "\u{2713}";
   pub const WARNING: &str = "\u{26A0}";
   pub const ERROR: &str = "\u{2717}";
   pub const INFO: &str = "\u{2139}";
   pub const BULLET: &str = "\u{2022}";
}

const RULE: char = '\u{2500}';

pub fn colors_enabled() -> bool {
   static ENABLED: OnceLock<bool> = OnceLock::new();
   *ENABLED.get_or_init(|| {
      std::env::var_os("NO_COLOR").is_none()
         && supports_color::on(supports_color::Stream::Stdout).is_some_and(|level| level.has_basic)
   })
}

fn paint(s: &str, f: impl FnOnce(&str) -> String) -> String {
   if colors_enabled() { f(s) } else { s.to_string() }
}

pub fn success(s: &str) -> String {
   paint(s, |s| s.green().bold().to_string())
}

pub fn error(s: &str) -> String {
   paint(s, |s| s.red().bold().to_string())
}

pub fn dim(s: &str) -> String {
   paint(s, |s| s.dimmed().to_string())
}

pub fn bold(s: &str) -> String {
   paint(s, |s| s.bold().to_string())
}

pub fn warn(msg: &str) {
   eprintln!("{}", paint(&format!("{} {msg}", icons::WARNING), |s| s.yellow().to_string()));
}

pub fn print_info(msg: &str) {
   eprintln!("{} {msg}", paint(icons::INFO, |s| s.cyan().to_string()));
}

/// Terminal width, capped at 120 columns
pub fn term_width() -> usize {
   terminal_size::terminal_size()
      .map_or(80, |(w, _)| w.0 as usize)
      .min(120)
}

fn rule(len: usize) -> String {
   RULE.to_string().repeat(len)
}

pub fn separator(width: usize) -> String {
   dim(&rule(width))
}

/// `title` centered between two rules
pub fn section_header(title: &str, width: usize) -> String {
   let side = rule(width.saturating_sub(title.chars().count() + 2) / 2);
   format!("{} {} {}", dim(&side), bold(title), dim(&side))
}

/// Greedy word wrap; a word longer than `max_width` gets a line of its own
fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
   let mut lines = Vec::new();
   let mut current = String::new();
   for word in line.split_whitespace() {
      if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_width {
         lines.push(std::mem::take(&mut current));
      }
      if !current.is_empty() {
         current.push(' ');
      }
      current.push_str(word);
   }
   if !current.is_empty() || lines.is_empty() {
      lines.push(current);
   }
   lines
}

/// `content` word-wrapped inside a rounded frame with `title` in the top edge
pub fn boxed_message(title: &str, content: &str, width: usize) -> String {
   let inner = width.saturating_sub(4);
   let edge = width.saturating_sub(2);
   let padding = edge.saturating_sub(title.chars().count() + 2);

   let mut out = format!(
      "\u{256D}{} {} {}\u{256E}\n",
      rule(padding / 2),
      bold(title),
      rule(padding - padding / 2)
   );
   for line in content.lines().flat_map(|line| wrap_line(line, inner)) {
      let pad = inner.saturating_sub(line.chars().count());
      out.push_str(&format!("\u{2502} {line}{} \u{2502}\n", " ".repeat(pad)));
   }
   out.push_str(&format!("\u{2570}{}\u{256F}", rule(edge)));
   out
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_wrap_line_keeps_words() {
      assert_eq!(wrap_line("one two three", 7), vec!["one two", "three"]);
      assert_eq!(wrap_line("", 10), vec![String::new()]);
   }

   #[test]
   fn test_wrap_line_overlong_word_stays_whole() {
      assert_eq!(wrap_line("abcdefghij k", 4), vec!["abcdefghij", "k"]);
   }

   #[test]
   fn test_boxed_message_frames_content() {
      let boxed = boxed_message("Title", "line\n\nother", 20);
      let lines: Vec<&str> = boxed.lines().collect();
      assert_eq!(lines.len(), 5);
      assert!(lines[0].starts_with('\u{256D}'));
      assert!(lines[1].starts_with('\u{2502}') && lines[1].contains("line"));
      assert_eq!(lines[1].chars().count(), 20);
      assert_eq!(lines[2].trim_matches(|c| c == '\u{2502}' || c == ' '), "");
      assert!(lines[4].ends_with('\u{256F}'));
   }
}
