//! The mutation API: one owned board, its filters, and the collaborators
//! (storage, feedback, confirmation) it reports to.
//!
//! Every mutation validates, applies its whole change to the board, writes
//! the records it touched, and then recomputes the view so the completion
//! signal can fire. Nothing here blocks or retries.

use serde::Serialize;
use tracing::{debug, warn};

use crate::io::persist::{self, Record, RecordKeys};
use crate::io::storage::Storage;
use crate::model::board::Board;
use crate::model::config::Config;
use crate::model::filter::{Filters, PriorityFilter, SectionFilter};
use crate::model::section::Palette;
use crate::model::task::{Priority, Task};
use crate::ops::check;
use crate::ops::section_ops::{self, CreateOutcome, SectionError};
use crate::ops::task_ops::{self, TaskError};
use crate::ops::view::{self, CompletionWatch, SectionStats, View};

/// Advisory signals for audio/visual feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feedback {
    /// A task went from open to done
    TaskCompleted,
    /// A task was deleted
    TaskDeleted,
    /// The visible list just became 100 % done
    AllComplete,
}

/// Receives `Feedback`. Return values are not expected.
pub trait FeedbackSink {
    fn signal(&mut self, feedback: Feedback);
}

/// Sink that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn signal(&mut self, _feedback: Feedback) {}
}

/// Records signals in order.
impl FeedbackSink for Vec<Feedback> {
    fn signal(&mut self, feedback: Feedback) {
        self.push(feedback);
    }
}

impl<T: FeedbackSink + ?Sized> FeedbackSink for &mut T {
    fn signal(&mut self, feedback: Feedback) {
        (**self).signal(feedback);
    }
}

/// Yes/no prompt guarding destructive operations.
pub trait ConfirmGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// A fixed answer.
impl ConfirmGate for bool {
    fn confirm(&mut self, _prompt: &str) -> bool {
        *self
    }
}

pub const RESET_PROMPT: &str = "Delete all tasks and sections and start over?";

/// A loaded board plus everything needed to mutate and persist it.
pub struct Session<S: Storage, F: FeedbackSink> {
    board: Board,
    filters: Filters,
    palette: Palette,
    keys: RecordKeys,
    storage: S,
    feedback: F,
    watch: CompletionWatch,
    /// Records that loaded only in part; never written back implicitly
    held: Vec<Record>,
}

impl<S: Storage, F: FeedbackSink> Session<S, F> {
    /// Load the three records from `storage`, repair anything inconsistent,
    /// and start on the `all` / `all` view.
    ///
    /// The completion watch starts primed with the initial progress, so
    /// opening a fully done list does not signal.
    pub fn open(storage: S, feedback: F, config: &Config) -> Self {
        let mut session = Self::load(storage, feedback, config);
        session.prime();
        session
    }

    /// Like `open`, but start on `filters`. The watch is primed for that
    /// view, so no signal fires for the starting state.
    pub fn open_with(
        storage: S,
        feedback: F,
        config: &Config,
        filters: Filters,
    ) -> Result<Self, SectionError> {
        let mut session = Self::load(storage, feedback, config);
        session.ensure_section(&filters.section)?;
        session.filters = filters;
        session.prime();
        Ok(session)
    }

    fn load(storage: S, feedback: F, config: &Config) -> Self {
        let keys = RecordKeys::new(&config.store.key_prefix);
        let palette = config.palette.clone();
        let loaded = persist::load_board(&storage, &keys, &palette);
        let mut board = loaded.board;
        let repairs = check::repair(&mut board, &palette);

        let mut session = Session {
            board,
            filters: Filters::default(),
            palette,
            keys,
            storage,
            feedback,
            watch: CompletionWatch::default(),
            held: loaded.damaged,
        };
        if !repairs.is_empty() {
            for repair in &repairs {
                warn!(%repair, "repaired stored data");
            }
            session.persist(&Record::EVERY);
        }
        session
    }

    fn prime(&mut self) {
        self.watch = CompletionWatch::primed(self.view().progress());
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Records that could not be read in full and are left as stored.
    pub fn damaged(&self) -> &[Record] {
        &self.held
    }

    /// The derived view under the current filters.
    pub fn view(&self) -> View<'_> {
        view::derive_view(self.board.tasks(), &self.filters)
    }

    pub fn section_stats(&self) -> Vec<SectionStats> {
        view::section_stats(&self.board)
    }

    pub fn color_of(&self, id: &str) -> &str {
        section_ops::color_of(self.board.registry(), &self.palette, id)
    }

    // -----------------------------------------------------------------------
    // Filters
    // -----------------------------------------------------------------------

    /// Show `all` or one existing section.
    pub fn select_section(&mut self, id: &str) -> Result<(), SectionError> {
        let filter = SectionFilter::from_id(id);
        self.ensure_section(&filter)?;
        self.filters.section = filter;
        self.refresh();
        Ok(())
    }

    pub fn set_priority_filter(&mut self, priority: PriorityFilter) {
        self.filters.priority = priority;
        self.refresh();
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Add a task to the active section (`general` under `all`).
    pub fn add_task(&mut self, raw_text: &str) -> Result<String, TaskError> {
        let id = task_ops::add_task(&mut self.board, &self.filters, raw_text)?;
        debug!(%id, section = task_ops::target_section(&self.filters), "task added");
        self.commit(&[Record::Tasks]);
        Ok(id)
    }

    /// Flip a task's done flag. Signals `TaskCompleted` only on open -> done.
    pub fn toggle_task(&mut self, id: &str) -> Result<bool, TaskError> {
        let done = task_ops::toggle_task(&mut self.board, id)?;
        debug!(%id, done, "task toggled");
        if done {
            self.feedback.signal(Feedback::TaskCompleted);
        }
        self.commit(&[Record::Tasks]);
        Ok(done)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, TaskError> {
        let task = task_ops::delete_task(&mut self.board, id)?;
        debug!(%id, "task deleted");
        self.feedback.signal(Feedback::TaskDeleted);
        self.commit(&[Record::Tasks]);
        Ok(task)
    }

    pub fn set_priority(&mut self, id: &str, priority: Priority) -> Result<(), TaskError> {
        task_ops::set_priority(&mut self.board, id, priority)?;
        debug!(%id, %priority, "priority set");
        self.commit(&[Record::Tasks]);
        Ok(())
    }

    pub fn toggle_pin(&mut self, id: &str) -> Result<bool, TaskError> {
        let pinned = task_ops::toggle_pin(&mut self.board, id)?;
        debug!(%id, pinned, "pin toggled");
        self.commit(&[Record::Tasks]);
        Ok(pinned)
    }

    pub fn set_note(&mut self, id: &str, note: &str) -> Result<(), TaskError> {
        task_ops::set_note(&mut self.board, id, note)?;
        debug!(%id, len = note.len(), "note set");
        self.commit(&[Record::Tasks]);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    /// Create or select a section; it becomes the active filter either way.
    pub fn create_section(&mut self, raw_name: &str) -> Result<CreateOutcome, SectionError> {
        let outcome = section_ops::create_section(
            &mut self.board,
            &mut self.filters,
            &self.palette,
            raw_name,
        )?;
        match &outcome {
            CreateOutcome::Added(id) => {
                debug!(%id, "section created");
                self.commit(&[Record::Sections, Record::Colors]);
            }
            CreateOutcome::Selected(id) => {
                debug!(%id, "section exists; selected");
                self.refresh();
            }
        }
        Ok(outcome)
    }

    pub fn rename_section(&mut self, old_id: &str, raw_new_name: &str) -> Result<String, SectionError> {
        let new_id = section_ops::rename_section(
            &mut self.board,
            &mut self.filters,
            &self.palette,
            old_id,
            raw_new_name,
        )?;
        debug!(from = old_id, to = %new_id, "section renamed");
        self.commit(&Record::EVERY);
        Ok(new_id)
    }

    /// Delete a section, moving its tasks to `general`. Returns how many moved.
    pub fn delete_section(&mut self, id: &str) -> Result<usize, SectionError> {
        let moved = section_ops::delete_section(&mut self.board, &mut self.filters, id)?;
        debug!(%id, moved, "section deleted");
        self.commit(&Record::EVERY);
        Ok(moved)
    }

    pub fn reorder_section(&mut self, dragged: &str, target: &str) -> Result<(), SectionError> {
        section_ops::reorder_section(&mut self.board, dragged, target)?;
        debug!(dragged, target, "section moved");
        self.commit(&[Record::Sections]);
        Ok(())
    }

    /// Wipe every record back to its default, if `gate` agrees. Returns
    /// whether the reset happened. Held records are overwritten too.
    pub fn reset_all(&mut self, gate: &mut impl ConfirmGate) -> bool {
        if !gate.confirm(RESET_PROMPT) {
            return false;
        }
        self.board = Board::new(&self.palette);
        self.filters = Filters::default();
        self.held.clear();
        debug!("board reset");
        self.commit(&Record::EVERY);
        true
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure_section(&self, filter: &SectionFilter) -> Result<(), SectionError> {
        match filter {
            SectionFilter::Section(id) if !self.board.registry().contains(id) => {
                Err(SectionError::NotFound(id.clone()))
            }
            _ => Ok(()),
        }
    }

    fn commit(&mut self, records: &[Record]) {
        debug_assert!(
            check::is_referentially_sound(&self.board),
            "task references a missing section: {:?}",
            check::check_board(&self.board).errors
        );
        self.persist(records);
        self.refresh();
    }

    /// Best-effort write; in-memory state stays authoritative on failure.
    /// Held records are skipped.
    fn persist(&mut self, records: &[Record]) {
        for &record in records {
            if self.held.contains(&record) {
                warn!(?record, "leaving partly unreadable record as stored");
                continue;
            }
            if let Err(e) = persist::save_record(&mut self.storage, &self.keys, &self.board, record)
            {
                warn!(?record, error = %e, "could not persist record");
            }
        }
    }

    fn refresh(&mut self) {
        let view = view::derive_view(self.board.tasks(), &self.filters);
        let (progress, total) = (view.progress(), view.total());
        if self.watch.observe(progress, total) {
            debug!("all visible tasks complete");
            self.feedback.signal(Feedback::AllComplete);
        }
    }
}
