use std::io::{BufRead, Write};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::persist::{self, Record, RecordKeys};
use crate::io::storage::DirStorage;
use crate::model::config::Config;
use crate::model::filter::{Filters, PriorityFilter, SectionFilter};
use crate::model::section::ALL;
use crate::ops::check::{self, CheckError};
use crate::ops::section_ops::{CreateOutcome, SectionError};
use crate::session::{ConfirmGate, Feedback, FeedbackSink, Session};

type CliSession = Session<DirStorage, PrintFeedback>;
type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let dir = config_io::data_dir(cli.data_dir.as_deref());
    let config = config_io::read_config(&dir)?;
    tracing::debug!(dir = %dir.display(), "using data directory");

    // Check reads the raw records; opening a session would already repair them
    if let Commands::Check(args) = &cli.command {
        return cmd_check(&dir, &config, args.fix, json);
    }

    // Filters are applied at open so the completion watch is primed for them
    let feedback = PrintFeedback { quiet: cli.quiet };
    let filters = start_filters(&cli.command);
    let mut session = Session::open_with(DirStorage::new(&dir), feedback, &config, filters)?;

    match cli.command {
        // Read commands
        Commands::List(_) => cmd_list(&session, &config, json),
        Commands::Stats(_) => cmd_stats(&session, json),

        // Task commands
        Commands::Add(args) => cmd_add(&mut session, args, json),
        Commands::Toggle(args) => cmd_toggle(&mut session, args, json),
        Commands::Rm(args) => cmd_rm(&mut session, args, json),
        Commands::Pin(args) => cmd_pin(&mut session, args, json),
        Commands::Prio(args) => cmd_prio(&mut session, args),
        Commands::Note(args) => cmd_note(&mut session, args, json),

        // Section management
        Commands::Section(cmd) => cmd_section(&mut session, cmd, json),

        // Maintenance
        Commands::Check(_) => Ok(()),
        Commands::Reset(args) => cmd_reset(&mut session, args),
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Prints feedback signals to stderr so they never mix with --json output.
pub struct PrintFeedback {
    quiet: bool,
}

impl FeedbackSink for PrintFeedback {
    fn signal(&mut self, feedback: Feedback) {
        if self.quiet {
            return;
        }
        match feedback {
            Feedback::TaskCompleted => eprintln!("\u{2713} completed"),
            Feedback::TaskDeleted => eprintln!("deleted"),
            Feedback::AllComplete => eprintln!("All done! Every visible task is complete."),
        }
    }
}

/// Asks on stderr, reads one line from stdin. Anything but y/yes declines.
struct StdinConfirm;

impl ConfirmGate for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The view a command starts on: `-s` / `-p` for read commands, `-s` for add.
fn start_filters(command: &Commands) -> Filters {
    let section = |s: &Option<String>| {
        s.as_deref()
            .map(SectionFilter::from_id)
            .unwrap_or_default()
    };
    match command {
        Commands::List(args) | Commands::Stats(args) => Filters {
            section: section(&args.section),
            priority: args.priority.into(),
        },
        Commands::Add(args) => Filters {
            section: section(&args.section),
            priority: PriorityFilter::All,
        },
        _ => Filters::default(),
    }
}

fn today() -> String {
    chrono::Local::now().format("%A, %B %-d, %Y").to_string()
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_task(session: &CliSession, id: &str, json: bool) -> CmdResult {
    let task = session
        .board()
        .task(id)
        .ok_or_else(|| format!("task not found: {}", id))?;
    if json {
        print_json(&task_to_json(task))
    } else {
        println!("{}", format_task_line(task, false));
        Ok(())
    }
}

/// The section-limit rejection keeps the attempted name so it can be shown again.
fn section_error(e: SectionError) -> Box<dyn std::error::Error> {
    match e {
        SectionError::LimitReached { attempted, limit } => format!(
            "sorry, you can't add more than {} sections (\"{}\" was not created)",
            limit, attempted
        )
        .into(),
        other => other.into(),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &CliSession, config: &Config, json: bool) -> CmdResult {
    let filters = session.filters().clone();
    let view = session.view();

    if json {
        let out = ListJson {
            section: filters.section.id().to_string(),
            priority: filters.priority,
            stats: view.stats(),
            tasks: view.tasks.iter().map(|t| task_to_json(t)).collect(),
        };
        return print_json(&out);
    }

    let date = config.ui.show_date.then(today);
    println!(
        "{}",
        format_view_header(filters.section.id(), filters.priority, date.as_deref())
    );
    println!("{}", format_stats(&view.stats()));
    if view.tasks.is_empty() {
        println!("No tasks in this section yet");
        return Ok(());
    }
    let show_section = filters.section.id() == ALL;
    for task in &view.tasks {
        println!("{}", format_task_line(task, show_section));
    }
    Ok(())
}

fn cmd_stats(session: &CliSession, json: bool) -> CmdResult {
    let stats = session.view().stats();
    if json {
        print_json(&stats)
    } else {
        println!("{}", format_stats(&stats));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(session: &mut CliSession, args: AddArgs, json: bool) -> CmdResult {
    let id = session.add_task(&args.text.join(" "))?;
    if json {
        print_task(session, &id, true)
    } else {
        println!("{}", id);
        Ok(())
    }
}

fn cmd_toggle(session: &mut CliSession, args: IdArgs, json: bool) -> CmdResult {
    session.toggle_task(&args.id)?;
    print_task(session, &args.id, json)
}

fn cmd_rm(session: &mut CliSession, args: IdArgs, json: bool) -> CmdResult {
    let task = session.delete_task(&args.id)?;
    if json {
        print_json(&task_to_json(&task))
    } else {
        println!("Deleted: {}", task.text);
        Ok(())
    }
}

fn cmd_pin(session: &mut CliSession, args: IdArgs, json: bool) -> CmdResult {
    session.toggle_pin(&args.id)?;
    print_task(session, &args.id, json)
}

fn cmd_prio(session: &mut CliSession, args: PrioArgs) -> CmdResult {
    let priority = args.level.into();
    session.set_priority(&args.id, priority)?;
    println!("{} \u{2192} {}", args.id, priority);
    Ok(())
}

fn cmd_note(session: &mut CliSession, args: NoteArgs, json: bool) -> CmdResult {
    match args.text {
        Some(text) => {
            session.set_note(&args.id, &text)?;
            print_task(session, &args.id, json)
        }
        None => {
            let task = session
                .board()
                .task(&args.id)
                .ok_or_else(|| format!("task not found: {}", args.id))?;
            if json {
                print_json(&serde_json::json!({ "id": task.id, "note": task.note }))
            } else {
                if !task.note.is_empty() {
                    println!("{}", task.note);
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Section management
// ---------------------------------------------------------------------------

fn cmd_section(session: &mut CliSession, cmd: SectionCmd, json: bool) -> CmdResult {
    match cmd.action.unwrap_or(SectionAction::List) {
        SectionAction::List => cmd_section_list(session, json),
        SectionAction::New(args) => {
            match session.create_section(&args.name).map_err(section_error)? {
                CreateOutcome::Added(id) => println!("Created section: {}", id),
                CreateOutcome::Selected(id) => println!("Section already exists: {}", id),
            }
            Ok(())
        }
        SectionAction::Rename(args) => {
            let new_id = session
                .rename_section(&args.old, &args.new)
                .map_err(section_error)?;
            println!("Renamed {} \u{2192} {}", label_of(&args.old), new_id);
            Ok(())
        }
        SectionAction::Rm(args) => {
            let moved = session.delete_section(&args.name).map_err(section_error)?;
            println!("Deleted section {}", args.name);
            if moved > 0 {
                println!("Moved {} task(s) to General", moved);
            }
            Ok(())
        }
        SectionAction::Mv(args) => {
            session
                .reorder_section(&args.section, &args.target)
                .map_err(section_error)?;
            let order: Vec<&str> = session.board().sections().iter().map(|s| label_of(s)).collect();
            println!("{}", order.join(", "));
            Ok(())
        }
    }
}

fn cmd_section_list(session: &CliSession, json: bool) -> CmdResult {
    let rows: Vec<_> = session
        .section_stats()
        .into_iter()
        .map(|stats| {
            let color = session.color_of(&stats.id).to_string();
            (stats, color)
        })
        .collect();
    if json {
        let out: Vec<SectionJson> = rows
            .iter()
            .map(|(stats, color)| section_to_json(stats, color))
            .collect();
        return print_json(&out);
    }
    for line in format_section_listing(&rows) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_check(dir: &std::path::Path, config: &Config, fix: bool, json: bool) -> CmdResult {
    let mut storage = DirStorage::new(dir);
    let keys = RecordKeys::new(&config.store.key_prefix);
    let loaded = persist::load_board(&storage, &keys, &config.palette);
    let mut board = loaded.board;
    let mut result = check::check_board(&board);
    for &record in &loaded.damaged {
        result.push_error(CheckError::UnreadableRecord {
            key: keys.key(record),
        });
    }

    let mut fixed: Vec<String> = Vec::new();
    if fix {
        fixed.extend(
            check::repair(&mut board, &config.palette)
                .iter()
                .map(|r| r.to_string()),
        );
        fixed.extend(
            loaded
                .damaged
                .iter()
                .map(|&r| format!("rewrote {} without its unreadable entries", keys.key(r))),
        );
        if !fixed.is_empty() {
            for record in Record::EVERY {
                persist::save_record(&mut storage, &keys, &board, record)?;
            }
        }
    }

    if json {
        print_json(&serde_json::json!({
            "check": result,
            "repairs": fixed,
        }))?;
    } else {
        for line in format_check_result(&result) {
            println!("{}", line);
        }
        for line in &fixed {
            println!("fixed: {}", line);
        }
    }

    if !result.valid && !fix {
        return Err("check found errors (run `tl check --fix` to repair)".into());
    }
    Ok(())
}

fn cmd_reset(session: &mut CliSession, args: ResetArgs) -> CmdResult {
    let done = if args.yes {
        session.reset_all(&mut true)
    } else {
        session.reset_all(&mut StdinConfirm)
    };
    if done {
        println!("Reset: back to an empty General section");
    } else {
        println!("Aborted");
    }
    Ok(())
}
