use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("item {0} not found")]
    NotFound(i64),
    #[error("migration {name} failed: {source}")]
    Migration {
        name: &'static str,
        source: rusqlite::Error,
    },
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid stored json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Case-insensitive; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }

    /// Display order for the terminal view: high first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<String>,
}

/// Sorts high → medium → low, keeping id order within a priority.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (task.priority.rank(), task.id));
}

/// Raw task fields as a client sends them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Validated task fields ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<String>,
}

impl NewTask {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            priority: Priority::default(),
            due_date: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<String>) -> Self {
        self.due_date = due_date.filter(|value| !value.is_empty());
        self
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.description.trim().is_empty() {
            return Err(StoreError::validation("Description is required"));
        }
        Ok(())
    }
}

impl TaskInput {
    /// Trims the description, rejects it when empty, and coerces an
    /// unrecognised priority to medium.
    pub fn normalize(self) -> StoreResult<NewTask> {
        let description = self.description.unwrap_or_default().trim().to_string();
        let task = NewTask::new(description)
            .with_priority(Priority::parse_or_default(self.priority.as_deref()))
            .with_due_date(self.due_date);
        task.validate()?;
        Ok(task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Wishlist,
    Watchlist,
    Halloween,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Wishlist,
        Collection::Watchlist,
        Collection::Halloween,
    ];

    /// Table name and JSON file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wishlist => "wishlist",
            Self::Watchlist => "watchlist",
            Self::Halloween => "halloween",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }

    pub fn required_key(&self) -> &'static str {
        match self {
            Self::Wishlist => "name",
            Self::Watchlist | Self::Halloween => "title",
        }
    }

    /// Checks a new item and returns its fields without any client `id`.
    pub fn prepare_item(&self, item: Value) -> StoreResult<Map<String, Value>> {
        let mut fields = into_object(item)?;
        let key = self.required_key();
        if !has_text(fields.get(key)) {
            return Err(StoreError::validation(format!("{key} is required")));
        }
        fields.remove("id");
        Ok(fields)
    }

    /// Checks a patch. Only the required key, when present, is constrained.
    pub fn prepare_patch(&self, patch: Value) -> StoreResult<Map<String, Value>> {
        let mut fields = into_object(patch)?;
        let key = self.required_key();
        if fields.contains_key(key) && !has_text(fields.get(key)) {
            return Err(StoreError::validation(format!("{key} cannot be empty")));
        }
        fields.remove("id");
        Ok(fields)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copies `patch` over `base`, key by key.
pub fn shallow_merge(base: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        base.insert(key, value);
    }
}

/// Returns the stored fields with the row key injected as `id`.
pub fn with_id(mut fields: Map<String, Value>, id: i64) -> Value {
    fields.insert("id".to_string(), Value::from(id));
    Value::Object(fields)
}

fn into_object(value: Value) -> StoreResult<Map<String, Value>> {
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::validation("expected a JSON object")),
    }
}

fn has_text(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.trim().is_empty())
}
