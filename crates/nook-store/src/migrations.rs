use nook_core::{StoreError, StoreResult};
use rusqlite::Connection;
use tracing::debug;

/// One additive schema step. Steps are re-run on every startup, so each must
/// either be a no-op on an up-to-date schema or fail with a duplicate column.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Applied,
    AlreadyApplied,
}

/// Order matters: columns are added in the order they were introduced.
pub const TASK_MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_tasks",
        sql: "CREATE TABLE IF NOT EXISTS tasks (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              description TEXT NOT NULL,
              completed INTEGER NOT NULL DEFAULT 0,
              priority TEXT NOT NULL DEFAULT 'medium'
            )",
    },
    Migration {
        name: "add_tasks_priority",
        sql: "ALTER TABLE tasks ADD COLUMN priority TEXT NOT NULL DEFAULT 'medium'",
    },
    Migration {
        name: "add_tasks_due_date",
        sql: "ALTER TABLE tasks ADD COLUMN due_date TEXT DEFAULT NULL",
    },
];

pub const COLLECTION_MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_wishlist",
        sql: "CREATE TABLE IF NOT EXISTS wishlist (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              data TEXT NOT NULL,
              created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
    },
    Migration {
        name: "create_watchlist",
        sql: "CREATE TABLE IF NOT EXISTS watchlist (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              data TEXT NOT NULL,
              created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
    },
    Migration {
        name: "create_halloween",
        sql: "CREATE TABLE IF NOT EXISTS halloween (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              data TEXT NOT NULL,
              created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
    },
];

pub fn apply(conn: &Connection, migration: &Migration) -> StoreResult<MigrationOutcome> {
    match conn.execute_batch(migration.sql) {
        Ok(()) => Ok(MigrationOutcome::Applied),
        Err(err) if is_duplicate_column(&err) => Ok(MigrationOutcome::AlreadyApplied),
        Err(source) => Err(StoreError::Migration {
            name: migration.name,
            source,
        }),
    }
}

pub fn run(conn: &Connection, chain: &[Migration]) -> StoreResult<Vec<MigrationOutcome>> {
    let mut outcomes = Vec::with_capacity(chain.len());
    for migration in chain {
        let outcome = apply(conn, migration)?;
        debug!(migration = migration.name, ?outcome, "schema step");
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(message))
            if message.starts_with("duplicate column name")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::MigrationOutcome::{AlreadyApplied, Applied};

    fn column_names(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{table}')"))
            .expect("prepare");
        stmt.query_map([], |row| row.get(0))
            .expect("query")
            .collect::<rusqlite::Result<Vec<String>>>()
            .expect("collect")
    }

    #[test]
    fn task_chain_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open");
        let first = run(&conn, TASK_MIGRATIONS).expect("first run");
        assert_eq!(first, vec![Applied, AlreadyApplied, Applied]);
        let second = run(&conn, TASK_MIGRATIONS).expect("second run");
        assert_eq!(second, vec![Applied, AlreadyApplied, AlreadyApplied]);
        assert_eq!(
            column_names(&conn, "tasks"),
            vec!["id", "description", "completed", "priority", "due_date"]
        );
    }

    #[test]
    fn each_task_step_is_safe_to_repeat() {
        let conn = Connection::open_in_memory().expect("open");
        run(&conn, TASK_MIGRATIONS).expect("run");
        for migration in TASK_MIGRATIONS {
            apply(&conn, migration).expect("repeat step");
        }
    }

    #[test]
    fn legacy_tasks_table_gains_new_columns() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(
            "CREATE TABLE tasks (
               id INTEGER PRIMARY KEY AUTOINCREMENT,
               description TEXT NOT NULL,
               completed INTEGER NOT NULL DEFAULT 0
             );
             INSERT INTO tasks (description) VALUES ('old row');",
        )
        .expect("legacy schema");

        let outcomes = run(&conn, TASK_MIGRATIONS).expect("migrate");
        assert_eq!(outcomes, vec![Applied, Applied, Applied]);

        let (priority, due_date): (String, Option<String>) = conn
            .query_row(
                "SELECT priority, due_date FROM tasks WHERE description = 'old row'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("row");
        assert_eq!(priority, "medium");
        assert_eq!(due_date, None);
    }

    #[test]
    fn unrelated_failure_propagates() {
        let conn = Connection::open_in_memory().expect("open");
        let broken = Migration {
            name: "add_to_missing_table",
            sql: "ALTER TABLE nowhere ADD COLUMN note TEXT",
        };
        let err = apply(&conn, &broken).expect_err("must fail");
        assert!(matches!(
            err,
            StoreError::Migration {
                name: "add_to_missing_table",
                ..
            }
        ));
    }

    #[test]
    fn collection_chain_creates_three_tables() {
        let conn = Connection::open_in_memory().expect("open");
        run(&conn, COLLECTION_MIGRATIONS).expect("first run");
        run(&conn, COLLECTION_MIGRATIONS).expect("second run");
        for table in ["wishlist", "watchlist", "halloween"] {
            assert_eq!(column_names(&conn, table), vec!["id", "data", "created_at"]);
        }
    }
}
