//! Engine-level behavior through the public `Session` API, backed by
//! in-memory storage.

use pretty_assertions::assert_eq;

use tasklane::io::storage::MemoryStorage;
use tasklane::model::config::Config;
use tasklane::model::filter::{Filters, PriorityFilter, SectionFilter};
use tasklane::model::section::{GENERAL, MAX_CUSTOM_SECTIONS};
use tasklane::model::task::{Priority, Task};
use tasklane::ops::check;
use tasklane::ops::section_ops::{CreateOutcome, SectionError};
use tasklane::ops::view::{self, CompletionWatch};
use tasklane::session::{Feedback, NoFeedback, Session};
use tasklane::util::sanitize::sanitize;

fn session() -> Session<MemoryStorage, Vec<Feedback>> {
    Session::open(MemoryStorage::new(), Vec::new(), &Config::default())
}

fn count_in(s: &Session<MemoryStorage, Vec<Feedback>>, section: &str) -> usize {
    s.board().tasks().iter().filter(|t| t.section == section).count()
}

#[test]
fn every_task_resolves_to_a_section() {
    let mut s = session();
    s.create_section("work").unwrap();
    s.add_task("w1").unwrap();
    s.create_section("home").unwrap();
    let h = s.add_task("h1").unwrap();
    s.select_section("all").unwrap();
    s.add_task("g1").unwrap();
    s.rename_section("work", "job").unwrap();
    s.delete_section("home").unwrap();
    s.toggle_task(&h).unwrap();
    s.reorder_section("job", GENERAL).unwrap();

    assert!(check::is_referentially_sound(s.board()));
    assert!(check::check_board(s.board()).valid);
    for task in s.board().tasks() {
        assert!(s.board().registry().contains(&task.section), "{:?}", task);
    }
}

#[test]
fn general_is_permanent_and_custom_sections_are_capped() {
    let mut s = session();
    for i in 0..MAX_CUSTOM_SECTIONS {
        s.create_section(&format!("s{}", i)).unwrap();
    }
    let err = s.create_section("one more").unwrap_err();
    assert_eq!(
        err,
        SectionError::LimitReached {
            attempted: "one more".into(),
            limit: 5
        }
    );
    assert!(err.is_limit());
    assert_eq!(s.board().registry().custom_count(), 5);

    assert_eq!(
        s.delete_section(GENERAL),
        Err(SectionError::Permanent(GENERAL.into()))
    );
    assert!(s.rename_section(GENERAL, "main").is_err());
    assert!(s.board().registry().contains(GENERAL));
}

#[test]
fn creating_an_existing_section_selects_it() {
    let mut s = session();
    s.create_section("work").unwrap();
    s.select_section("all").unwrap();
    let writes = s.storage().writes();

    let outcome = s.create_section("  work ").unwrap();
    assert_eq!(outcome, CreateOutcome::Selected("work".into()));
    assert_eq!(s.board().sections(), ["general", "work"]);
    assert_eq!(s.filters().section, SectionFilter::Section("work".into()));
    assert_eq!(s.storage().writes(), writes);
}

#[test]
fn rename_moves_tasks_and_color() {
    let mut s = session();
    s.create_section("work").unwrap();
    for text in ["a", "b", "c"] {
        s.add_task(text).unwrap();
    }
    s.select_section("all").unwrap();
    s.add_task("in general").unwrap();
    let color = s.color_of("work").to_string();

    assert_eq!(s.rename_section("work", "job").unwrap(), "job");
    assert_eq!(count_in(&s, "job"), 3);
    assert_eq!(count_in(&s, "work"), 0);
    assert_eq!(count_in(&s, GENERAL), 1);
    assert_eq!(s.color_of("job"), color);
    assert_eq!(s.board().registry().color("work"), None);
    let keys: Vec<&String> = s.board().registry().colors().keys().collect();
    assert_eq!(keys, ["general", "job"]);
}

#[test]
fn delete_cascades_to_general_and_resets_filter() {
    let mut s = session();
    s.create_section("work").unwrap();
    s.add_task("a").unwrap();
    s.add_task("b").unwrap();
    assert_eq!(s.filters().section, SectionFilter::Section("work".into()));

    assert_eq!(s.delete_section("work").unwrap(), 2);
    assert_eq!(count_in(&s, GENERAL), 2);
    assert_eq!(s.filters().section, SectionFilter::All);
    assert_eq!(s.board().sections(), ["general"]);
}

#[test]
fn deleting_an_inactive_section_keeps_the_filter() {
    let mut s = session();
    s.create_section("work").unwrap();
    s.create_section("home").unwrap();
    s.delete_section("work").unwrap();
    assert_eq!(s.filters().section, SectionFilter::Section("home".into()));
}

#[test]
fn progress_rounds_and_handles_empty() {
    assert_eq!(view::progress(2, 4), 50);
    assert_eq!(view::progress(1, 3), 33);
    assert_eq!(view::progress(2, 3), 67);
    assert_eq!(view::progress(0, 0), 0);

    let mut s = session();
    let ids: Vec<String> = (0..4).map(|i| s.add_task(&format!("t{}", i)).unwrap()).collect();
    s.toggle_task(&ids[0]).unwrap();
    s.toggle_task(&ids[1]).unwrap();
    let v = s.view();
    assert_eq!((v.done, v.left(), v.total(), v.progress()), (2, 2, 4, 50));
}

#[test]
fn completion_signal_is_edge_triggered() {
    let mut watch = CompletionWatch::default();
    let fired: Vec<bool> = [80, 100, 100, 90, 100]
        .into_iter()
        .map(|p| watch.observe(p, 10))
        .collect();
    assert_eq!(fired, [false, true, false, false, true]);
}

#[test]
fn empty_view_never_signals() {
    let mut watch = CompletionWatch::default();
    assert!(!watch.observe(0, 0));
    assert!(!watch.observe(100, 0));
}

#[test]
fn pinned_first_keeps_insertion_order() {
    let mut tasks: Vec<Task> = ["A", "B", "C", "D"]
        .into_iter()
        .map(|id| Task::new(id.into(), id.to_lowercase(), GENERAL.into()))
        .collect();
    tasks[0].pinned = true;
    tasks[2].pinned = true;

    let v = view::derive_view(&tasks, &Filters::default());
    let ids: Vec<&str> = v.tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["A", "C", "B", "D"]);
}

#[test]
fn filters_combine() {
    let mut s = session();
    let g = s.add_task("general urgent").unwrap();
    s.set_priority(&g, Priority::Urgent).unwrap();
    s.create_section("work").unwrap();
    let w = s.add_task("work urgent").unwrap();
    s.set_priority(&w, Priority::Urgent).unwrap();
    s.add_task("work normal").unwrap();

    s.set_priority_filter(PriorityFilter::Urgent);
    let ids: Vec<&str> = s.view().tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, [w.as_str()]);

    s.select_section("all").unwrap();
    assert_eq!(s.view().total(), 2);
}

#[test]
fn sanitization_is_exact() {
    assert_eq!(
        sanitize("  <script>alert(1)</script>\n "),
        "scriptalert(1)/script"
    );
}

#[test]
fn reorder_takes_the_target_slot() {
    let mut s = session();
    for name in ["a", "b", "c", "d"] {
        s.create_section(name).unwrap();
    }
    s.reorder_section("a", "c").unwrap();
    assert_eq!(s.board().sections(), ["general", "b", "c", "a", "d"]);
    assert_eq!(
        s.reorder_section("a", "all"),
        Err(SectionError::Permanent("all".into()))
    );
}

#[test]
fn session_state_survives_reopen() {
    let mut s = Session::open(MemoryStorage::new(), NoFeedback, &Config::default());
    s.create_section("work").unwrap();
    let id = s.add_task("persist me").unwrap();
    s.toggle_pin(&id).unwrap();
    s.set_note(&id, "line one\nline two").unwrap();
    let board = s.board().clone();

    // Reuse the written records in a fresh session
    let mut storage = MemoryStorage::new();
    for key in ["todo:categories", "todo:tasks", "todo:catColors"] {
        storage.insert(key, s.storage().get(key).unwrap());
    }
    let reopened = Session::open(storage, NoFeedback, &Config::default());
    assert_eq!(reopened.board(), &board);
    assert_eq!(reopened.filters(), &Filters::default());
}
