use serde::{Deserialize, Serialize};

use super::section::ALL;
use super::task::{Priority, Task};

/// Which section the view is narrowed to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SectionFilter {
    /// The virtual `all` view
    #[default]
    All,
    Section(String),
}

impl SectionFilter {
    /// `"all"` maps to the virtual view, anything else to a concrete section.
    pub fn from_id(id: &str) -> Self {
        if id == ALL {
            SectionFilter::All
        } else {
            SectionFilter::Section(id.to_string())
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SectionFilter::All => ALL,
            SectionFilter::Section(id) => id,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            SectionFilter::All => true,
            SectionFilter::Section(id) => task.section == *id,
        }
    }

    /// True when the filter points at exactly this section id.
    pub fn is_section(&self, id: &str) -> bool {
        matches!(self, SectionFilter::Section(s) if s == id)
    }
}

/// Secondary filter over priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFilter {
    #[default]
    All,
    Urgent,
    Low,
}

impl PriorityFilter {
    pub fn matches(self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Urgent => priority == Priority::Urgent,
            PriorityFilter::Low => priority == Priority::Low,
        }
    }
}

/// Session filter state. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub section: SectionFilter,
    pub priority: PriorityFilter,
}
