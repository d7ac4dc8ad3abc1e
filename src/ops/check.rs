use std::collections::HashSet;

use serde::Serialize;

use crate::model::board::Board;
use crate::model::section::{ALL, GENERAL, MAX_CUSTOM_SECTIONS, Palette};
use crate::util::sanitize::new_unique_id;

/// Structured result from `tl check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

impl CheckResult {
    /// Record an error found outside `check_board`.
    pub fn push_error(&mut self, error: CheckError) {
        self.valid = false;
        self.errors.push(error);
    }
}

/// A broken invariant in stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckError {
    /// The sections record does not contain `general`
    MissingGeneral,
    /// The virtual `all` id was stored as a real section
    ReservedInRegistry { id: String },
    /// The same section id appears twice
    DuplicateSection { id: String },
    /// A task points at a section that is not in the registry
    DanglingSection { task_id: String, section: String },
    /// Two tasks share an id
    DuplicateTaskId { task_id: String },
    /// A stored record, or some of its entries, could not be decoded
    UnreadableRecord { key: String },
}

/// Something odd but harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckWarning {
    /// More custom sections than can be created
    TooManySections { count: usize, limit: usize },
    /// A section has no color entry
    MissingColor { id: String },
    /// A task has no text
    EmptyText { task_id: String },
}

/// One change made by `repair`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Repair {
    AddedGeneral,
    RemovedSection { id: String },
    MovedToGeneral { task_id: String, section: String },
    AssignedColor { id: String, color: String },
    ReassignedId { old: String, new: String },
}

impl std::fmt::Display for Repair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Repair::AddedGeneral => write!(f, "added missing \"general\" section"),
            Repair::RemovedSection { id } => write!(f, "removed section entry \"{}\"", id),
            Repair::MovedToGeneral { task_id, section } => write!(
                f,
                "moved task {} from unknown section \"{}\" to general",
                task_id, section
            ),
            Repair::AssignedColor { id, color } => {
                write!(f, "assigned color {} to section \"{}\"", color, id)
            }
            Repair::ReassignedId { old, new } => {
                write!(f, "gave duplicate task id {} the new id {}", old, new)
            }
        }
    }
}

/// Validate a board and return structured results.
///
/// Read-only. Errors are invariant violations; warnings are not.
pub fn check_board(board: &Board) -> CheckResult {
    let mut result = CheckResult::default();
    let sections = board.sections();

    if !sections.iter().any(|s| s == GENERAL) {
        result.errors.push(CheckError::MissingGeneral);
    }

    let mut seen = HashSet::new();
    for id in sections {
        if id == ALL {
            result
                .errors
                .push(CheckError::ReservedInRegistry { id: id.clone() });
        } else if !seen.insert(id.as_str()) {
            result
                .errors
                .push(CheckError::DuplicateSection { id: id.clone() });
        } else if board.registry().color(id).is_none() {
            result
                .warnings
                .push(CheckWarning::MissingColor { id: id.clone() });
        }
    }

    let custom = seen.iter().filter(|s| **s != GENERAL).count();
    if custom > MAX_CUSTOM_SECTIONS {
        result.warnings.push(CheckWarning::TooManySections {
            count: custom,
            limit: MAX_CUSTOM_SECTIONS,
        });
    }

    let mut task_ids = HashSet::new();
    for task in board.tasks() {
        if task.section == ALL || !seen.contains(task.section.as_str()) {
            result.errors.push(CheckError::DanglingSection {
                task_id: task.id.clone(),
                section: task.section.clone(),
            });
        }
        if !task_ids.insert(task.id.as_str()) {
            result.errors.push(CheckError::DuplicateTaskId {
                task_id: task.id.clone(),
            });
        }
        if task.text.is_empty() {
            result.warnings.push(CheckWarning::EmptyText {
                task_id: task.id.clone(),
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}

/// True when every task resolves to a section and `general` exists.
pub fn is_referentially_sound(board: &Board) -> bool {
    check_board(board).errors.iter().all(|e| {
        !matches!(
            e,
            CheckError::MissingGeneral | CheckError::DanglingSection { .. }
        )
    })
}

/// Fix every `CheckError` and missing color in place. Never drops a task or a
/// custom section.
pub fn repair(board: &mut Board, palette: &Palette) -> Vec<Repair> {
    let mut repairs = Vec::new();

    // Sections: drop `all` and duplicates, keep first occurrence
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(board.registry.order.len());
    for id in board.registry.order.drain(..) {
        if id == ALL || !seen.insert(id.clone()) {
            repairs.push(Repair::RemovedSection { id });
        } else {
            kept.push(id);
        }
    }
    board.registry.order = kept;
    board.registry.colors.shift_remove(ALL);

    if !board.registry.contains(GENERAL) {
        board.registry.order.insert(0, GENERAL.to_string());
        repairs.push(Repair::AddedGeneral);
    }

    for id in board.registry.order.clone() {
        if board.registry.color(&id).is_none() {
            let color = if id == GENERAL {
                palette.general_default().to_string()
            } else {
                palette.swatch(board.registry.colors.len()).to_string()
            };
            board.registry.colors.insert(id.clone(), color.clone());
            repairs.push(Repair::AssignedColor { id, color });
        }
    }

    let mut task_ids: HashSet<String> = HashSet::new();
    let all_ids: HashSet<String> = board.tasks.iter().map(|t| t.id.clone()).collect();
    for i in 0..board.tasks.len() {
        let section = board.tasks[i].section.clone();
        if !board.registry.contains(&section) {
            board.tasks[i].section = GENERAL.to_string();
            repairs.push(Repair::MovedToGeneral {
                task_id: board.tasks[i].id.clone(),
                section,
            });
        }
        let id = board.tasks[i].id.clone();
        if !task_ids.insert(id.clone()) {
            let new = new_unique_id(|c| all_ids.contains(c) || task_ids.contains(c));
            task_ids.insert(new.clone());
            board.tasks[i].id = new.clone();
            repairs.push(Repair::ReassignedId { old: id, new });
        }
    }

    repairs
}
