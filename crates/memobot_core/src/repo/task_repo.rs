//! Task store contract and SQLite implementation.
//!
//! # Invariants
//! - Every write is a single SQL statement, so a record is never
//!   half-updated.
//! - `put_task` upserts by id; it never changes another record.
//! - `delete_task` reports `NotFound` when nothing was removed.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::{Task, TaskId, TaskValidationError};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    url,
    due_date,
    interval_days,
    streak
FROM tasks";

const REQUIRED_COLUMNS: &[&str] = &["uuid", "name", "url", "due_date", "interval_days", "streak"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error for task persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter for `scan_tasks`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskScan {
    /// Keep only tasks with `due_date <= day`.
    pub due_on_or_before: Option<NaiveDate>,
}

impl TaskScan {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn due_on_or_before(day: NaiveDate) -> Self {
        Self {
            due_on_or_before: Some(day),
        }
    }
}

/// Durable mapping from task id to task record.
///
/// Implementations hold no scheduling logic.
pub trait TaskStore {
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn put_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Returns matching tasks ordered by `due_date ASC, id ASC`.
    fn scan_tasks(&self, scan: &TaskScan) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task store.
///
/// The connection lock is held for one statement at a time.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Wraps a migrated connection after checking schema shape.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` differs from the
    ///   latest migration.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for schema drift.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (or creates) the database file at `path` and wraps it.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskStore for SqliteTaskStore {
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn put_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        self.conn().execute(
            "INSERT INTO tasks (
                uuid,
                name,
                url,
                due_date,
                interval_days,
                streak
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (uuid) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                due_date = excluded.due_date,
                interval_days = excluded.interval_days,
                streak = excluded.streak,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                task.id.to_string(),
                task.name.as_str(),
                task.url.as_deref(),
                format_date(task.due_date),
                i64::from(task.interval_days),
                i64::from(task.streak),
            ],
        )?;

        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn scan_tasks(&self, scan: &TaskScan) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(day) = scan.due_on_or_before {
            sql.push_str(" AND due_date <= ?");
            bind_values.push(Value::Text(format_date(day)));
        }
        sql.push_str(" ORDER BY due_date ASC, uuid ASC;");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('tasks');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }
    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }
    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let due_text: String = row.get("due_date")?;
    let due_date = NaiveDate::parse_from_str(&due_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{due_text}` in tasks.due_date"))
    })?;

    let task = Task {
        id,
        name: row.get("name")?,
        url: row.get("url")?,
        due_date,
        interval_days: non_negative(row.get("interval_days")?, "interval_days")?,
        streak: non_negative(row.get("streak")?, "streak")?,
    };
    task.validate().map_err(|err| {
        RepoError::InvalidData(format!("task {} failed validation: {err}", task.id))
    })?;
    Ok(task)
}

fn non_negative(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("out-of-range value `{value}` in tasks.{column}"))
    })
}

fn format_date(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}
