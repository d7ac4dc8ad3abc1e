use crate::model::board::Board;
use crate::model::filter::{Filters, SectionFilter};
use crate::model::section::GENERAL;
use crate::model::task::{Priority, Task};
use crate::util::sanitize::{new_unique_id, sanitize};

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task text is empty")]
    EmptyText,
    #[error("task not found: {0}")]
    NotFound(String),
}

/// Section a new task lands in: the active section, or `general` when the
/// view is the virtual `all`.
pub fn target_section(filters: &Filters) -> &str {
    match &filters.section {
        SectionFilter::All => GENERAL,
        SectionFilter::Section(id) => id,
    }
}

/// Append a task to the active section. Returns the new id.
pub fn add_task(board: &mut Board, filters: &Filters, raw_text: &str) -> Result<String, TaskError> {
    let text = sanitize(raw_text);
    if text.is_empty() {
        return Err(TaskError::EmptyText);
    }
    let id = new_unique_id(|candidate| board.tasks.iter().any(|t| t.id == candidate));
    let section = target_section(filters).to_string();
    board.tasks.push(Task::new(id.clone(), text, section));
    Ok(id)
}

/// Flip `done`. Returns the new value.
pub fn toggle_task(board: &mut Board, id: &str) -> Result<bool, TaskError> {
    let task = find_mut(board, id)?;
    task.done = !task.done;
    Ok(task.done)
}

/// Remove a task, returning it.
pub fn delete_task(board: &mut Board, id: &str) -> Result<Task, TaskError> {
    let pos = board
        .tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    Ok(board.tasks.remove(pos))
}

pub fn set_priority(board: &mut Board, id: &str, priority: Priority) -> Result<(), TaskError> {
    find_mut(board, id)?.priority = priority;
    Ok(())
}

/// Flip `pinned`. Returns the new value.
pub fn toggle_pin(board: &mut Board, id: &str) -> Result<bool, TaskError> {
    let task = find_mut(board, id)?;
    task.pinned = !task.pinned;
    Ok(task.pinned)
}

/// Replace the note verbatim; notes are not sanitized.
pub fn set_note(board: &mut Board, id: &str, note: &str) -> Result<(), TaskError> {
    find_mut(board, id)?.note = note.to_string();
    Ok(())
}

fn find_mut<'a>(board: &'a mut Board, id: &str) -> Result<&'a mut Task, TaskError> {
    board
        .task_mut(id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))
}
