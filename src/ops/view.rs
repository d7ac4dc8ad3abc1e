use serde::Serialize;

use crate::model::board::Board;
use crate::model::filter::Filters;
use crate::model::task::Task;

/// The derived, filtered list the user sees plus its completion numbers.
///
/// Recomputed from scratch on every read; it holds nothing that is not a
/// function of the task list and the filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    pub tasks: Vec<&'a Task>,
    pub done: usize,
}

impl<'a> View<'a> {
    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn left(&self) -> usize {
        self.total() - self.done
    }

    pub fn progress(&self) -> u8 {
        progress(self.done, self.total())
    }

    pub fn stats(&self) -> ViewStats {
        ViewStats {
            done: self.done,
            left: self.left(),
            total: self.total(),
            progress: self.progress(),
        }
    }
}

/// Plain numbers from a `View`, for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewStats {
    pub done: usize,
    pub left: usize,
    pub total: usize,
    pub progress: u8,
}

/// Run the full pipeline: section filter, priority filter, pinned-first
/// stable partition, then count.
pub fn derive_view<'a>(tasks: &'a [Task], filters: &Filters) -> View<'a> {
    let filtered = tasks
        .iter()
        .filter(|t| filters.section.matches(t))
        .filter(|t| filters.priority.matches(t.priority));
    let (mut visible, rest): (Vec<&Task>, Vec<&Task>) = filtered.partition(|t| t.pinned);
    visible.extend(rest);
    let done = visible.iter().filter(|t| t.done).count();
    View {
        tasks: visible,
        done,
    }
}

/// `round(done / total * 100)`, 0 for an empty list. Halves round up.
pub fn progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (done * 200 + total) / (2 * total);
    pct.min(100) as u8
}

/// Done/total for one section, ignoring the filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    pub id: String,
    pub done: usize,
    pub total: usize,
}

/// Per-section counts in registry order.
pub fn section_stats(board: &Board) -> Vec<SectionStats> {
    board
        .sections()
        .iter()
        .map(|id| {
            let (done, total) = board
                .tasks()
                .iter()
                .filter(|t| t.section == *id)
                .fold((0, 0), |(d, n), t| (d + usize::from(t.done), n + 1));
            SectionStats {
                id: id.clone(),
                done,
                total,
            }
        })
        .collect()
}

/// Edge detector for the "everything visible is done" signal.
///
/// Fires when a non-empty view reaches 100 % and the previously observed
/// progress was anything else. Staying at 100 does not fire again.
#[derive(Debug, Clone, Default)]
pub struct CompletionWatch {
    last: Option<u8>,
}

impl CompletionWatch {
    /// Watch that treats `progress` as already seen.
    pub fn primed(progress: u8) -> Self {
        CompletionWatch {
            last: Some(progress),
        }
    }

    /// Record a recomputation. Returns true exactly on the transition into 100.
    pub fn observe(&mut self, progress: u8, total: usize) -> bool {
        let fire = progress == 100 && total > 0 && self.last != Some(100);
        self.last = Some(progress);
        fire
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::filter::{PriorityFilter, SectionFilter};
    use crate::model::task::Priority;
    use pretty_assertions::assert_eq;

    fn task(id: &str, section: &str) -> Task {
        Task::new(id.into(), id.into(), section.into())
    }

    fn ids(view: &View) -> Vec<String> {
        view.tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn pinned_first_keeps_relative_order() {
        let mut tasks = vec![
            task("A", "general"),
            task("B", "general"),
            task("C", "general"),
            task("D", "general"),
        ];
        tasks[0].pinned = true;
        tasks[2].pinned = true;
        let view = derive_view(&tasks, &Filters::default());
        assert_eq!(ids(&view), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn section_then_priority_filter() {
        let mut tasks = vec![
            task("1", "work"),
            task("2", "home"),
            task("3", "work"),
            task("4", "work"),
        ];
        tasks[0].priority = Priority::Urgent;
        tasks[1].priority = Priority::Urgent;
        tasks[3].priority = Priority::Low;

        let mut filters = Filters {
            section: SectionFilter::Section("work".into()),
            priority: PriorityFilter::All,
        };
        assert_eq!(ids(&derive_view(&tasks, &filters)), vec!["1", "3", "4"]);

        filters.priority = PriorityFilter::Urgent;
        assert_eq!(ids(&derive_view(&tasks, &filters)), vec!["1"]);

        filters.priority = PriorityFilter::Low;
        assert_eq!(ids(&derive_view(&tasks, &filters)), vec!["4"]);

        filters.section = SectionFilter::All;
        filters.priority = PriorityFilter::Urgent;
        assert_eq!(ids(&derive_view(&tasks, &filters)), vec!["1", "2"]);
    }

    #[test]
    fn counts_and_progress() {
        let mut tasks = vec![
            task("1", "general"),
            task("2", "general"),
            task("3", "general"),
            task("4", "general"),
        ];
        tasks[1].done = true;
        tasks[3].done = true;
        let view = derive_view(&tasks, &Filters::default());
        assert_eq!(
            view.stats(),
            ViewStats {
                done: 2,
                left: 2,
                total: 4,
                progress: 50
            }
        );

        let empty = derive_view(&[], &Filters::default());
        assert_eq!(empty.progress(), 0);
        assert_eq!(empty.total(), 0);
    }

    #[test]
    fn progress_rounding() {
        assert_eq!(progress(0, 0), 0);
        assert_eq!(progress(1, 3), 33);
        assert_eq!(progress(2, 3), 67);
        assert_eq!(progress(1, 8), 13);
        assert_eq!(progress(1, 200), 1);
        assert_eq!(progress(199, 200), 100);
        assert_eq!(progress(5, 5), 100);
    }

    #[test]
    fn completion_fires_on_each_entry_into_100() {
        let mut watch = CompletionWatch::default();
        let fired: Vec<bool> = [80, 100, 100, 90, 100]
            .into_iter()
            .map(|p| watch.observe(p, 10))
            .collect();
        assert_eq!(fired, vec![false, true, false, false, true]);
    }

    #[test]
    fn completion_needs_tasks() {
        let mut watch = CompletionWatch::default();
        assert!(!watch.observe(100, 0));
        assert!(!watch.observe(0, 0));
        assert!(watch.observe(100, 1));
    }

    #[test]
    fn primed_watch_does_not_fire_on_current_state() {
        let mut watch = CompletionWatch::primed(100);
        assert!(!watch.observe(100, 3));
        assert!(!watch.observe(50, 4));
        assert!(watch.observe(100, 4));
        watch.reset();
        assert!(watch.observe(100, 4));
    }

    #[test]
    fn per_section_counts() {
        let palette = crate::model::section::Palette::default();
        let mut board = Board::new(&palette);
        let mut filters = Filters::default();
        crate::ops::section_ops::create_section(&mut board, &mut filters, &palette, "work")
            .unwrap();
        board.tasks.push(task("1", "work"));
        board.tasks.push(task("2", "work"));
        board.tasks.push(task("3", "general"));
        board.tasks[0].done = true;

        let stats = section_stats(&board);
        assert_eq!(
            stats,
            vec![
                SectionStats {
                    id: "general".into(),
                    done: 0,
                    total: 1
                },
                SectionStats {
                    id: "work".into(),
                    done: 1,
                    total: 2
                },
            ]
        );
    }
}
