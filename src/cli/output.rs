use serde::Serialize;

use crate::model::filter::PriorityFilter;
use crate::model::section::{ALL, GENERAL};
use crate::model::task::{Priority, Task};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::view::{SectionStats, ViewStats};
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Longest task text shown on one list line
const TEXT_CELLS: usize = 60;
const BAR_CELLS: usize = 20;

/// Display label for a section id. The engine itself always compares raw ids.
pub fn label_of(id: &str) -> &str {
    match id {
        GENERAL => "General",
        ALL => "All",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub section: String,
    pub priority: Priority,
    pub pinned: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

#[derive(Serialize)]
pub struct ListJson {
    pub section: String,
    pub priority: PriorityFilter,
    pub stats: ViewStats,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct SectionJson {
    pub id: String,
    pub label: String,
    pub color: String,
    pub done: usize,
    pub total: usize,
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        text: task.text.clone(),
        done: task.done,
        section: task.section.clone(),
        priority: task.priority,
        pinned: task.pinned,
        note: task.note.clone(),
    }
}

pub fn section_to_json(stats: &SectionStats, color: &str) -> SectionJson {
    SectionJson {
        id: stats.id.clone(),
        label: label_of(&stats.id).to_string(),
        color: color.to_string(),
        done: stats.done,
        total: stats.total,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One-line task summary. `show_section` adds the section label, as the
/// `all` view does.
pub fn format_task_line(task: &Task, show_section: bool) -> String {
    let mut line = format!(
        "[{}] {}  {}",
        if task.done { 'x' } else { ' ' },
        task.id,
        truncate_to_width(&task.text, TEXT_CELLS)
    );
    match task.priority {
        Priority::Urgent => line.push_str("  !urgent"),
        Priority::Low => line.push_str("  low"),
        Priority::Normal => {}
    }
    if task.pinned {
        line.push_str("  ^pinned");
    }
    if !task.note.is_empty() {
        line.push_str("  +note");
    }
    if show_section {
        line.push_str(&format!("  @{}", label_of(&task.section)));
    }
    line
}

/// `2 done • 1 left • 3 total  [█████████████░░░░░░░] 67%`
pub fn format_stats(stats: &ViewStats) -> String {
    format!(
        "{} done \u{2022} {} left \u{2022} {} total  {} {}%",
        stats.done,
        stats.left,
        stats.total,
        progress_bar(stats.progress, BAR_CELLS),
        stats.progress
    )
}

pub fn progress_bar(percent: u8, cells: usize) -> String {
    let filled = (usize::from(percent.min(100)) * cells + 50) / 100;
    format!(
        "[{}{}]",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(cells - filled)
    )
}

/// Header line: view label, optional date.
pub fn format_view_header(section_id: &str, priority: PriorityFilter, date: Option<&str>) -> String {
    let mut header = label_of(section_id).to_string();
    match priority {
        PriorityFilter::All => {}
        PriorityFilter::Urgent => header.push_str(" (urgent)"),
        PriorityFilter::Low => header.push_str(" (low)"),
    }
    if let Some(date) = date {
        header.push_str(&format!(" \u{2022} {}", date));
    }
    header
}

/// Sections listing, one per line, labels aligned.
pub fn format_section_listing(rows: &[(SectionStats, String)]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|(s, _)| display_width(label_of(&s.id)))
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|(s, color)| {
            format!(
                "{}  {}/{}  ({})",
                pad_to_width(label_of(&s.id), width),
                s.done,
                s.total,
                color
            )
        })
        .collect()
}

pub fn format_check_result(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    for e in &result.errors {
        lines.push(format!("error: {}", describe_error(e)));
    }
    for w in &result.warnings {
        lines.push(format!("warning: {}", describe_warning(w)));
    }
    if result.valid && result.warnings.is_empty() {
        lines.push("ok".to_string());
    }
    lines
}

fn describe_error(e: &CheckError) -> String {
    match e {
        CheckError::MissingGeneral => "sections record has no \"general\"".to_string(),
        CheckError::ReservedInRegistry { id } => format!("reserved id \"{}\" stored as a section", id),
        CheckError::DuplicateSection { id } => format!("section \"{}\" listed twice", id),
        CheckError::DanglingSection { task_id, section } => {
            format!("task {} is in unknown section \"{}\"", task_id, section)
        }
        CheckError::DuplicateTaskId { task_id } => format!("task id {} used twice", task_id),
        CheckError::UnreadableRecord { key } => {
            format!("record {} could not be read in full", key)
        }
    }
}

fn describe_warning(w: &CheckWarning) -> String {
    match w {
        CheckWarning::TooManySections { count, limit } => {
            format!("{} custom sections (limit {})", count, limit)
        }
        CheckWarning::MissingColor { id } => format!("section \"{}\" has no color", id),
        CheckWarning::EmptyText { task_id } => format!("task {} has no text", task_id),
    }
}
