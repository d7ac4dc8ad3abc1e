use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::filter::PriorityFilter;
use crate::model::task::Priority;

#[derive(Parser)]
#[command(name = "tl", about = concat!("tasklane v", env!("CARGO_PKG_VERSION"), " - sectioned tasks, kept locally"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Don't print feedback lines (completed, deleted, all complete)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List visible tasks (pinned first)
    List(ViewArgs),
    /// Show done / left / total and progress
    Stats(ViewArgs),
    /// Add a task to a section (default: general)
    Add(AddArgs),
    /// Mark a task done, or open again
    Toggle(IdArgs),
    /// Delete a task
    Rm(IdArgs),
    /// Pin or unpin a task
    Pin(IdArgs),
    /// Set task priority
    Prio(PrioArgs),
    /// Show or set a task's note
    Note(NoteArgs),
    /// Section management
    Section(SectionCmd),
    /// Validate stored data
    Check(CheckArgs),
    /// Delete everything and start over
    Reset(ResetArgs),
}

// ---------------------------------------------------------------------------
// View args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ViewArgs {
    /// Section to show (default: all)
    #[arg(short, long)]
    pub section: Option<String>,
    /// Priority filter
    #[arg(short, long, value_enum, default_value_t = PriorityArg::All)]
    pub priority: PriorityArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    All,
    Urgent,
    Low,
}

impl From<PriorityArg> for PriorityFilter {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::All => PriorityFilter::All,
            PriorityArg::Urgent => PriorityFilter::Urgent,
            PriorityArg::Low => PriorityFilter::Low,
        }
    }
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Section to add to (default: general)
    #[arg(short, long)]
    pub section: Option<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct PrioArgs {
    /// Task ID
    pub id: String,
    /// New priority
    #[arg(value_enum)]
    pub level: PrioLevel,
}

/// Priorities a task can be moved to. There is no way back to normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PrioLevel {
    Urgent,
    Low,
}

impl From<PrioLevel> for Priority {
    fn from(level: PrioLevel) -> Self {
        match level {
            PrioLevel::Urgent => Priority::Urgent,
            PrioLevel::Low => Priority::Low,
        }
    }
}

#[derive(Args)]
pub struct NoteArgs {
    /// Task ID
    pub id: String,
    /// New note text (omit to print the current note)
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// Section management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SectionCmd {
    #[command(subcommand)]
    pub action: Option<SectionAction>,
}

#[derive(Subcommand)]
pub enum SectionAction {
    /// List sections in order (default)
    List,
    /// Create a section
    New(SectionNewArgs),
    /// Rename a section; its tasks follow
    Rename(SectionRenameArgs),
    /// Delete a section; its tasks move to general
    Rm(SectionRmArgs),
    /// Move a section to another section's position
    Mv(SectionMvArgs),
}

#[derive(Args)]
pub struct SectionNewArgs {
    /// Section name
    pub name: String,
}

#[derive(Args)]
pub struct SectionRenameArgs {
    /// Current section name
    pub old: String,
    /// New section name
    pub new: String,
}

#[derive(Args)]
pub struct SectionRmArgs {
    /// Section name
    pub name: String,
}

#[derive(Args)]
pub struct SectionMvArgs {
    /// Section to move
    pub section: String,
    /// Section whose position it takes
    pub target: String,
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CheckArgs {
    /// Repair problems and write the fixed records back
    #[arg(long)]
    pub fix: bool,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}
