use std::path::Path;

use nook_core::{NewTask, Priority, StoreError, StoreResult, Task, TaskInput};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::migrations::{self, TASK_MIGRATIONS};
use crate::open_connection;

pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    /// Opens the database and runs the task migration chain. Call once at startup.
    pub fn initialize(db_path: &Path) -> StoreResult<Self> {
        let store = Self::open(db_path)?;
        migrations::run(&store.conn, TASK_MIGRATIONS)?;
        Ok(store)
    }

    pub fn open(db_path: &Path) -> StoreResult<Self> {
        Ok(Self {
            conn: open_connection(db_path)?,
        })
    }

    pub fn list(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, completed, priority, due_date
             FROM tasks
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], task_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Task>> {
        let task = self
            .conn
            .query_row(
                "SELECT id, description, completed, priority, due_date
                 FROM tasks
                 WHERE id = ?1",
                params![id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    pub fn create(&self, task: &NewTask) -> StoreResult<Task> {
        task.validate()?;
        self.conn.execute(
            "INSERT INTO tasks (description, priority, due_date) VALUES (?1, ?2, ?3)",
            params![task.description, task.priority.as_str(), task.due_date],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Full replace of description, priority and due date. A missing task is
    /// reported before the input is validated.
    pub fn update(&self, id: i64, input: TaskInput) -> StoreResult<Task> {
        if self.get(id)?.is_none() {
            return Err(StoreError::NotFound(id));
        }
        let task = input.normalize()?;
        self.conn.execute(
            "UPDATE tasks SET description = ?1, priority = ?2, due_date = ?3 WHERE id = ?4",
            params![task.description, task.priority.as_str(), task.due_date, id],
        )?;
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Changes description and priority, leaving the due date alone.
    pub fn edit(&self, id: i64, description: &str, priority: Priority) -> StoreResult<Task> {
        let description = description.trim();
        if description.is_empty() {
            return Err(StoreError::validation("Description is required"));
        }
        let changed = self.conn.execute(
            "UPDATE tasks SET description = ?1, priority = ?2 WHERE id = ?3",
            params![description, priority.as_str(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    pub fn toggle_complete(&self, id: i64) -> StoreResult<Task> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = NOT completed WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Returns false when the task is missing or already done.
    pub fn mark_complete(&self, id: i64) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = 1 WHERE id = ?1 AND completed = 0",
            params![id],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority: Option<String> = row.get(3)?;
    Ok(Task {
        id: row.get(0)?,
        description: row.get(1)?,
        completed: row.get(2)?,
        priority: Priority::parse_or_default(priority.as_deref()),
        due_date: row.get(4)?,
    })
}
