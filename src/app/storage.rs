// Communication with SQLite
// All task CRUD lives here; the database is in-memory and lives as long as the process
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::app::models::{ListQuery, SortField, Task, TaskDraft, TaskStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("task store lock poisoned")]
    LockPoisoned,
}

pub struct TaskStore {
    db_con: Mutex<Connection>,
}

const SELECT_TASK: &str =
    "SELECT id, title, description, due_date, notes, status, created_at FROM tasks";

impl TaskStore {
    // Open a fresh in-memory database with an empty tasks table
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = TaskStore {
            db_con: Mutex::new(Connection::open_in_memory()?),
        };
        store.create_table_if_not_exists()?;
        Ok(store)
    }

    fn create_table_if_not_exists(&self) -> Result<(), StoreError> {
        // AUTOINCREMENT keeps ids of deleted rows from being handed out again
        self.connection()?.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                due_date TEXT,
                notes TEXT,
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'done')),
                created_at TEXT NOT NULL
            );",
            (),
        )?;
        Ok(())
    }

    // Insert the two sample tasks a fresh server starts with
    pub fn seed_sample_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let samples = [
            TaskDraft {
                title: "Plan sprint tasks".to_string(),
                description: Some("Prepare task breakdown for the week".to_string()),
                due_date: Some("2026-02-22".to_string()),
                notes: Some("Align with team goals".to_string()),
                status: TaskStatus::Active,
            },
            TaskDraft {
                title: "Review pull request".to_string(),
                description: Some("Check coding guidelines adherence".to_string()),
                due_date: Some("2026-02-21".to_string()),
                notes: Some(String::new()),
                status: TaskStatus::Done,
            },
        ];

        samples.iter().map(|draft| self.create(draft)).collect()
    }

    // CREATE
    pub fn create(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let connection = self.connection()?;
        connection.execute(
            "INSERT INTO tasks (title, description, due_date, notes, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.title,
                draft.description,
                draft.due_date,
                draft.notes,
                draft.status,
                Utc::now()
            ],
        )?;
        let id = connection.last_insert_rowid();
        fetch(&connection, id)
    }

    // READ
    pub fn get(&self, id: i64) -> Result<Task, StoreError> {
        let connection = self.connection()?;
        fetch(&connection, id)
    }

    pub fn exists(&self, id: i64) -> Result<bool, StoreError> {
        let found = self
            .connection()?
            .query_row("SELECT 1 FROM tasks WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn list(&self, query: &ListQuery) -> Result<Vec<Task>, StoreError> {
        let order_by = order_by_clause(query);
        let connection = self.connection()?;

        let tasks = match query.status {
            Some(status) => {
                let mut stmt =
                    connection.prepare(&format!("{SELECT_TASK} WHERE status = ?1 {order_by}"))?;
                let rows = stmt.query_map([status], task_from_row)?;
                let tasks = rows.collect::<Result<Vec<_>, _>>()?;
                tasks
            }
            None => {
                let mut stmt = connection.prepare(&format!("{SELECT_TASK} {order_by}"))?;
                let rows = stmt.query_map([], task_from_row)?;
                let tasks = rows.collect::<Result<Vec<_>, _>>()?;
                tasks
            }
        };

        Ok(tasks)
    }

    // UPDATE
    pub fn update(&self, id: i64, draft: &TaskDraft) -> Result<Task, StoreError> {
        let connection = self.connection()?;
        let changed = connection.execute(
            "UPDATE tasks SET title = ?1, description = ?2, due_date = ?3, notes = ?4, status = ?5
             WHERE id = ?6;",
            params![
                draft.title,
                draft.description,
                draft.due_date,
                draft.notes,
                draft.status,
                id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        fetch(&connection, id)
    }

    pub fn update_status(&self, id: i64, status: TaskStatus) -> Result<Task, StoreError> {
        let connection = self.connection()?;
        let changed = connection.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2;",
            params![status, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        fetch(&connection, id)
    }

    // DELETE
    pub fn delete(&self, id: i64) -> Result<i64, StoreError> {
        let changed = self
            .connection()?
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(id)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.db_con.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn fetch(connection: &Connection, id: i64) -> Result<Task, StoreError> {
    connection
        .query_row(&format!("{SELECT_TASK} WHERE id = ?1"), [id], task_from_row)
        .optional()?
        .ok_or(StoreError::NotFound(id))
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: row.get(3)?,
        notes: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

// Build the ORDER BY clause for a listing.
// The trailing id keeps rows created within the same instant in a stable order.
fn order_by_clause(query: &ListQuery) -> String {
    let direction = query.direction.as_sql();
    match query.sort {
        SortField::Title => {
            format!("ORDER BY title COLLATE NOCASE {direction}, created_at DESC, id DESC")
        }
        SortField::DueDate => format!(
            "ORDER BY CASE WHEN due_date IS NULL THEN 1 ELSE 0 END ASC, \
             due_date {direction}, created_at DESC, id DESC"
        ),
        SortField::Created => format!("ORDER BY created_at {direction}, id {direction}"),
    }
}
