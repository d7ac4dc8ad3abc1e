use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::io::storage::{Storage, StorageError};
use crate::model::board::Board;
use crate::model::section::{GENERAL, Palette, SectionRegistry};
use crate::model::task::Task;

/// The three independently stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Record {
    Sections,
    Tasks,
    Colors,
}

impl Record {
    pub const EVERY: [Record; 3] = [Record::Sections, Record::Tasks, Record::Colors];

    fn suffix(self) -> &'static str {
        match self {
            Record::Sections => "categories",
            Record::Tasks => "tasks",
            Record::Colors => "catColors",
        }
    }
}

/// Maps records to storage keys under a common prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    prefix: String,
}

impl RecordKeys {
    pub fn new(prefix: &str) -> Self {
        RecordKeys {
            prefix: prefix.to_string(),
        }
    }

    pub fn key(&self, record: Record) -> String {
        format!("{}:{}", self.prefix, record.suffix())
    }
}

impl Default for RecordKeys {
    fn default() -> Self {
        RecordKeys::new("todo")
    }
}

/// A record as found in storage.
enum Stored<T> {
    Absent,
    Read(T),
    /// Present but not decodable; already logged
    Unreadable,
}

fn load_record<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Stored<T> {
    let Some(raw) = storage.load(key) else {
        return Stored::Absent;
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Stored::Read(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable record");
            Stored::Unreadable
        }
    }
}

/// Decode tasks one element at a time, dropping those that do not decode.
/// Returns the tasks and how many were dropped.
fn decode_tasks(key: &str, values: Vec<Value>) -> (Vec<Task>, usize) {
    let mut tasks = Vec::with_capacity(values.len());
    let mut skipped = 0;
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(task) => tasks.push(task),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "skipping unreadable task");
                skipped += 1;
            }
        }
    }
    (tasks, skipped)
}

/// A loaded board plus the records that were present but could not be read
/// in full. Writing a damaged record back would lose what was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub board: Board,
    pub damaged: Vec<Record>,
}

/// Load the board, substituting each missing or unreadable record's
/// default on its own.
///
/// No validation happens here; see `ops::check::repair`.
pub fn load_board(storage: &impl Storage, keys: &RecordKeys, palette: &Palette) -> Loaded {
    let mut damaged = Vec::new();

    let order: Vec<String> = match load_record(storage, &keys.key(Record::Sections)) {
        Stored::Read(order) => order,
        Stored::Absent => vec![GENERAL.to_string()],
        Stored::Unreadable => {
            damaged.push(Record::Sections);
            vec![GENERAL.to_string()]
        }
    };

    let tasks_key = keys.key(Record::Tasks);
    let tasks = match load_record::<Vec<Value>>(storage, &tasks_key) {
        Stored::Read(values) => {
            let (tasks, skipped) = decode_tasks(&tasks_key, values);
            if skipped > 0 {
                damaged.push(Record::Tasks);
            }
            tasks
        }
        Stored::Absent => Vec::new(),
        Stored::Unreadable => {
            damaged.push(Record::Tasks);
            Vec::new()
        }
    };

    let colors: IndexMap<String, String> = match load_record(storage, &keys.key(Record::Colors)) {
        Stored::Read(colors) => colors,
        Stored::Absent => default_colors(palette),
        Stored::Unreadable => {
            damaged.push(Record::Colors);
            default_colors(palette)
        }
    };

    Loaded {
        board: Board::from_parts(SectionRegistry::from_parts(order, colors), tasks),
        damaged,
    }
}

fn default_colors(palette: &Palette) -> IndexMap<String, String> {
    let mut colors = IndexMap::new();
    colors.insert(GENERAL.to_string(), palette.general_default().to_string());
    colors
}

/// Serialize one record of the board.
pub fn encode(board: &Board, record: Record, key: &str) -> Result<String, StorageError> {
    let encoded = match record {
        Record::Sections => serde_json::to_string(board.sections()),
        Record::Tasks => serde_json::to_string(board.tasks()),
        Record::Colors => serde_json::to_string(board.registry().colors()),
    };
    encoded.map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })
}

/// Rewrite one record in full.
pub fn save_record(
    storage: &mut impl Storage,
    keys: &RecordKeys,
    board: &Board,
    record: Record,
) -> Result<(), StorageError> {
    let key = keys.key(record);
    let raw = encode(board, record, &key)?;
    storage.save(&key, &raw)
}
