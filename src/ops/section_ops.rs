use crate::model::board::Board;
use crate::model::filter::{Filters, SectionFilter};
use crate::model::section::{
    ALL, GENERAL, MAX_CUSTOM_SECTIONS, Palette, SectionRegistry, is_reserved,
};
use crate::util::sanitize::sanitize;

/// Error type for section operations
///
/// Everything except `LimitReached` is a plain validation rejection that a
/// caller may treat as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SectionError {
    #[error("section name is empty")]
    EmptyName,
    #[error("\"{0}\" is a reserved section name")]
    Reserved(String),
    #[error("can't add more than {limit} sections")]
    LimitReached { attempted: String, limit: usize },
    #[error("section already exists: {0}")]
    AlreadyExists(String),
    #[error("new name is the same as the old one")]
    Unchanged,
    #[error("section \"{0}\" cannot be changed")]
    Permanent(String),
    #[error("section not found: {0}")]
    NotFound(String),
}

impl SectionError {
    /// The one rejection the UI reports specifically.
    pub fn is_limit(&self) -> bool {
        matches!(self, SectionError::LimitReached { .. })
    }
}

/// Result of a successful `create_section`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new section was appended
    Added(String),
    /// The name already existed; it was only selected
    Selected(String),
}

impl CreateOutcome {
    pub fn id(&self) -> &str {
        match self {
            CreateOutcome::Added(id) | CreateOutcome::Selected(id) => id,
        }
    }
}

/// Create a section (or select it if it already exists) and make it the
/// active filter.
///
/// The limit is checked before the existence check, so at the cap even an
/// existing name is rejected with `LimitReached`.
pub fn create_section(
    board: &mut Board,
    filters: &mut Filters,
    palette: &Palette,
    raw_name: &str,
) -> Result<CreateOutcome, SectionError> {
    let name = sanitize(raw_name);
    if name.is_empty() {
        return Err(SectionError::EmptyName);
    }
    if is_reserved(&name) {
        return Err(SectionError::Reserved(name));
    }
    if board.registry.custom_count() >= MAX_CUSTOM_SECTIONS {
        return Err(SectionError::LimitReached {
            attempted: name,
            limit: MAX_CUSTOM_SECTIONS,
        });
    }

    let outcome = if board.registry.contains(&name) {
        CreateOutcome::Selected(name.clone())
    } else {
        // Round-robin over colors already handed out, not over sections
        let color = palette.swatch(board.registry.colors.len()).to_string();
        board.registry.order.push(name.clone());
        board.registry.colors.insert(name.clone(), color);
        CreateOutcome::Added(name.clone())
    };
    filters.section = SectionFilter::Section(name);
    Ok(outcome)
}

/// Rename a section in place, carrying its color, its tasks and the active
/// filter along. Returns the new id.
pub fn rename_section(
    board: &mut Board,
    filters: &mut Filters,
    palette: &Palette,
    old_id: &str,
    raw_new_name: &str,
) -> Result<String, SectionError> {
    let name = sanitize(raw_new_name);
    if name.is_empty() {
        return Err(SectionError::EmptyName);
    }
    if name == old_id {
        return Err(SectionError::Unchanged);
    }
    if is_reserved(old_id) {
        return Err(SectionError::Permanent(old_id.to_string()));
    }
    if is_reserved(&name) {
        return Err(SectionError::Reserved(name));
    }
    if board.registry.contains(&name) {
        return Err(SectionError::AlreadyExists(name));
    }
    let pos = board
        .registry
        .position(old_id)
        .ok_or_else(|| SectionError::NotFound(old_id.to_string()))?;

    board.registry.order[pos] = name.clone();
    rekey_color(&mut board.registry, palette, old_id, &name);
    for task in board.tasks.iter_mut().filter(|t| t.section == old_id) {
        task.section = name.clone();
    }
    if filters.section.is_section(old_id) {
        filters.section = SectionFilter::Section(name.clone());
    }
    Ok(name)
}

/// Move the color entry from `old_id` to `new_id`, keeping its slot in the
/// map. A section that somehow had no color gets the first swatch.
fn rekey_color(registry: &mut SectionRegistry, palette: &Palette, old_id: &str, new_id: &str) {
    match registry.colors.get_index_of(old_id) {
        Some(idx) => {
            if let Some((_, color)) = registry.colors.shift_remove_index(idx) {
                registry.colors.shift_insert(idx, new_id.to_string(), color);
            }
        }
        None => {
            registry
                .colors
                .insert(new_id.to_string(), palette.swatch(0).to_string());
        }
    }
}

/// Delete a section. Its tasks move to `general`; if it was the active
/// filter the view falls back to `all`. Returns how many tasks moved.
pub fn delete_section(
    board: &mut Board,
    filters: &mut Filters,
    id: &str,
) -> Result<usize, SectionError> {
    if is_reserved(id) {
        return Err(SectionError::Permanent(id.to_string()));
    }
    let pos = board
        .registry
        .position(id)
        .ok_or_else(|| SectionError::NotFound(id.to_string()))?;

    board.registry.order.remove(pos);
    board.registry.colors.shift_remove(id);
    let mut moved = 0;
    for task in board.tasks.iter_mut().filter(|t| t.section == id) {
        task.section = GENERAL.to_string();
        moved += 1;
    }
    if filters.section.is_section(id) {
        filters.section = SectionFilter::All;
    }
    Ok(moved)
}

/// Drag-and-drop reorder: `dragged` is removed and reinserted at the index
/// `target` held before the removal.
pub fn reorder_section(
    board: &mut Board,
    dragged: &str,
    target: &str,
) -> Result<(), SectionError> {
    if dragged == ALL || target == ALL {
        return Err(SectionError::Permanent(ALL.to_string()));
    }
    if dragged == target {
        return Err(SectionError::Unchanged);
    }
    let from = board
        .registry
        .position(dragged)
        .ok_or_else(|| SectionError::NotFound(dragged.to_string()))?;
    let to = board
        .registry
        .position(target)
        .ok_or_else(|| SectionError::NotFound(target.to_string()))?;

    let id = board.registry.order.remove(from);
    board.registry.order.insert(to, id);
    Ok(())
}

/// Color for any id, falling back to the palette's fallback swatch.
pub fn color_of<'a>(registry: &'a SectionRegistry, palette: &'a Palette, id: &str) -> &'a str {
    registry.color(id).unwrap_or(&palette.fallback)
}
