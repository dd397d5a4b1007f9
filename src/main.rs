use std::path::{Path, PathBuf};

use clap::Parser;
use git_doccommit::{
   CommitFields, CommitOutcome, CommitSession, DocCommitConfig, DocCommitError, Result,
   docbook::{DocIdLookup, DocIds},
   docupdate::{collect_entries, render_section, write_section},
   git::GitRepo,
   interactive,
   prompt::TerminalPrompter,
   style::{self, icons},
   types::{Cli, Command, CommitArgs, DocUpdateArgs},
};

/// Load config from args or default
fn load_config(cli: &Cli) -> Result<DocCommitConfig> {
   if let Some(ref config_path) = cli.config {
      DocCommitConfig::from_file(config_path)
   } else {
      DocCommitConfig::load()
   }
}

fn verbose() -> bool {
   std::env::var("DOCCOMMIT_VERBOSE").is_ok()
}

/// Start scanning the documentation sources of the repository at `repo`
fn start_lookup(repo: &GitRepo, config: &DocCommitConfig) -> Result<DocIdLookup> {
   let root = PathBuf::from(repo.toplevel()?);
   Ok(DocIdLookup::scan_dir(root.join(&config.xml_dir)))
}

fn run_commit(cli: &Cli, args: &CommitArgs, config: DocCommitConfig) -> Result<()> {
   let sign = args.sign || config.gpg_sign;
   let repo = GitRepo::new(cli.dir.as_str(), sign);
   let lookup = start_lookup(&repo, &config)?;
   let persist = !args.dry_run;

   let fields = CommitFields::from_parts(
      args.subject.as_deref(),
      args.message.as_deref(),
      args.references.as_deref(),
      args.xml_ids.as_deref(),
      args.merge_commits.as_deref(),
   );
   let mut session = CommitSession::new(config, repo, lookup)
      .with_fields(fields)
      .updating(args.update.clone())
      .staging_all(!args.interactive);

   let outcome = if args.interactive {
      interactive::run(&mut session, &mut TerminalPrompter, args.editor, persist)?
   } else {
      style::print_info("Scanning documentation for XML IDs...");
      // A failed scan shows up as XML ID findings
      let _ = session.lookup().wait();
      if args.editor {
         interactive::review(&mut session, &mut TerminalPrompter, true, persist)?
      } else {
         session.commit(persist)?
      }
   };

   if verbose() {
      println!("\nJSON Structure:");
      println!("{}", serde_json::to_string_pretty(session.fields())?);
      println!("{}", serde_json::to_string_pretty(&outcome)?);
   }

   report(&session, outcome)
}

fn report(session: &CommitSession<GitRepo>, outcome: CommitOutcome) -> Result<()> {
   match outcome {
      CommitOutcome::Committed { id } => {
         println!("{} Committed {}", style::success(icons::SUCCESS), style::bold(&id));
      },
      CommitOutcome::Noted { hash } => {
         println!(
            "{} Attached doc update note to {}",
            style::success(icons::SUCCESS),
            style::bold(&hash)
         );
      },
      CommitOutcome::DryRun { message } => {
         println!("{}", style::boxed_message("Commit message", &message, style::term_width()));
         style::print_info("Dry run, nothing was committed");
      },
      CommitOutcome::Rejected { problems, .. } => {
         eprintln!(
            "{} {}",
            style::error(icons::ERROR),
            style::error("The following problems have been found:")
         );
         for (field, messages) in session.problem_summary() {
            eprintln!("  {}", style::bold(field.as_str()));
            for (message, count) in messages {
               let repeat = if count > 1 { format!(" ({count}x)") } else { String::new() };
               eprintln!("    {} {message}{}", icons::BULLET, style::dim(&repeat));
            }
         }
         return Err(DocCommitError::ValidationFailed {
            problems: problems.into_iter().map(|p| p.message).collect(),
         });
      },
      CommitOutcome::Cancelled => {},
   }
   Ok(())
}

fn run_docupdate(cli: &Cli, args: &DocUpdateArgs, config: &DocCommitConfig) -> Result<()> {
   let repo = GitRepo::new(cli.dir.as_str(), false);
   let lookup = start_lookup(&repo, config)?;
   let log = repo.log_messages(args.since.as_deref())?;
   let entries = collect_entries(&log);

   let empty = DocIds::new();
   let known = match lookup.wait() {
      Ok(ids) => ids,
      Err(reason) => {
         style::warn(&format!("XML IDs could not be scanned, links are left as text: {reason}"));
         &empty
      },
   };
   let section = render_section(&entries, known, chrono::Local::now().date_naive());

   if verbose() {
      println!("\nJSON Structure:");
      println!("{}", serde_json::to_string_pretty(&entries)?);
   }

   if args.dry_run {
      println!("{section}");
      return Ok(());
   }

   let path = if args.file.is_absolute() {
      args.file.clone()
   } else {
      Path::new(&cli.dir).join(&args.file)
   };
   write_section(&path, &section)?;
   println!(
      "{} Wrote {} doc update entries to {}",
      style::success(icons::SUCCESS),
      entries.len(),
      style::dim(&path.display().to_string())
   );
   Ok(())
}

fn main() -> Result<()> {
   let cli = Cli::parse();
   let config = load_config(&cli)?;

   match &cli.command {
      Command::Commit(args) => run_commit(&cli, args, config),
      Command::Docupdate(args) => run_docupdate(&cli, args, &config),
   }
}
