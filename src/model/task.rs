use serde::{Deserialize, Deserializer, Serialize};

/// Task priority. Records written without one, or with a value other than
/// `urgent`/`low`, read back as `Normal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::Urgent => "urgent",
            Priority::Low => "low",
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("urgent") => Priority::Urgent,
            Some("low") => Priority::Low,
            _ => Priority::Normal,
        })
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single task as stored in the tasks record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque id, immutable after creation
    pub id: String,
    /// Sanitized, non-empty title
    pub text: String,
    #[serde(default)]
    pub done: bool,
    /// Owning section id (never `all`)
    #[serde(alias = "category")]
    pub section: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub pinned: bool,
    /// Free text, stored verbatim
    #[serde(default)]
    pub note: String,
}

impl Task {
    /// Create a task with default flags in the given section
    pub fn new(id: String, text: String, section: String) -> Self {
        Task {
            id,
            text,
            done: false,
            section,
            priority: Priority::Normal,
            pinned: false,
            note: String::new(),
        }
    }
}
