//! Instructional text shown next to each field.
//!
//! Templates are immutable once loaded; every render builds its text from a
//! fresh context holding the current findings.

use std::{path::PathBuf, sync::LazyLock};

use rust_embed::RustEmbed;
use tera::{Context, Tera};

use crate::{
   config::DocCommitConfig,
   error::{DocCommitError, Result},
   types::Field,
};

/// Embedded templates folder (compiled into binary)
#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

static TERA: LazyLock<Tera> = LazyLock::new(|| {
   let mut tera = Tera::default();

   // User overrides first so they take precedence
   if let Some(dir) = user_templates_dir()
      && let Ok(entries) = std::fs::read_dir(&dir)
   {
      for entry in entries.flatten() {
         let path = entry.path();
         if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
         }
         let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
         if let Err(e) = tera.add_template_file(&path, Some(&name)) {
            crate::style::warn(&format!("Failed to load template {}: {e}", path.display()));
         }
      }
   }

   for file in Templates::iter() {
      if tera.get_template_names().any(|name| name == file.as_ref()) {
         continue;
      }
      let Some(embedded) = Templates::get(file.as_ref()) else {
         continue;
      };
      match std::str::from_utf8(embedded.data.as_ref()) {
         Ok(content) => {
            if let Err(e) = tera.add_raw_template(file.as_ref(), content) {
               crate::style::warn(&format!(
                  "Failed to register embedded template {}: {e}",
                  file.as_ref()
               ));
            }
         },
         Err(e) => {
            crate::style::warn(&format!(
               "Embedded template {} is not valid UTF-8: {e}",
               file.as_ref()
            ));
         },
      }
   }

   tera.autoescape_on(vec![]);
   tera
});

/// User template overrides (~/.config/git-doccommit/templates/) if a home dir
/// exists
fn user_templates_dir() -> Option<PathBuf> {
   std::env::var("HOME")
      .or_else(|_| std::env::var("USERPROFILE"))
      .ok()
      .map(|home| PathBuf::from(home).join(".config/git-doccommit/templates"))
}

/// Turn rendered template output into comment lines: blank lines are dropped
/// and every remaining line starts with `#`.
fn comment_block(rendered: &str) -> String {
   rendered
      .lines()
      .map(str::trim_end)
      .filter(|line| !line.is_empty())
      .map(|line| {
         if line.starts_with('#') {
            line.to_string()
         } else {
            format!("# {line}")
         }
      })
      .collect::<Vec<_>>()
      .join("\n")
}

fn render(name: &str, context: &Context) -> Result<String> {
   TERA
      .render(name, context)
      .map(|rendered| comment_block(&rendered))
      .map_err(|e| DocCommitError::Template(format!("Failed to render {name}: {e}")))
}

/// Instructions for entering `field`, followed by any findings for it
pub fn render_instructions(
   field: Field,
   config: &DocCommitConfig,
   problems: &[String],
) -> Result<String> {
   let mut context = Context::new();
   context.insert("max_len", &config.subject_max_len);
   context.insert("line_max", &config.body_line_max_len);
   context.insert("keywords", &config.subject_keywords);
   context.insert("reference_types", &config.reference_types);
   context.insert("problems", problems);
   render(field.template(), &context)
}

/// Comment header listing validation problems
pub fn render_report(problems: &[String]) -> Result<String> {
   let mut context = Context::new();
   context.insert("problems", problems);
   render("report.md", &context)
}
