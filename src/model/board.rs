use super::section::{Palette, SectionRegistry};
use super::task::Task;

/// The owned aggregate: sections, their colors, and every task.
///
/// All mutation goes through `ops`; each op validates first and then applies
/// its whole change before returning, so no caller ever sees a task whose
/// section is missing from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) registry: SectionRegistry,
    pub(crate) tasks: Vec<Task>,
}

impl Board {
    /// Fresh board: only `general`, no tasks.
    pub fn new(palette: &Palette) -> Self {
        Board {
            registry: SectionRegistry::new(palette),
            tasks: Vec::new(),
        }
    }

    /// Assemble from stored records without validation.
    pub fn from_parts(registry: SectionRegistry, tasks: Vec<Task>) -> Self {
        Board { registry, tasks }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn sections(&self) -> &[String] {
        self.registry.ids()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}
