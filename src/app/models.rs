use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

// A stored task, as returned by the store and sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Active,
    Done,
}

impl TaskStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Done => "done",
        }
    }

    // The status a task moves to when its toggle is pressed
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Done,
            Self::Done => Self::Active,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown task status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "done" => Ok(Self::Done),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: UnknownStatus| FromSqlError::Other(Box::new(error)))
    }
}

// Columns a task list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "title")]
    Title,
    #[default]
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "dueDate")]
    DueDate,
}

impl SortField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Created => "created",
            Self::DueDate => "dueDate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "created" => Some(Self::Created),
            "dueDate" => Some(Self::DueDate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

// Filter and ordering for a task listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListQuery {
    pub status: Option<TaskStatus>,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl ListQuery {
    // Query string pairs understood by `GET /api/tasks`
    pub fn to_params(&self) -> Vec<(&'static str, &'static str)> {
        let mut params = Vec::with_capacity(3);
        if let Some(status) = self.status {
            params.push(("status", status.as_str()));
        }
        params.push(("sort", self.sort.as_str()));
        params.push(("direction", self.direction.as_str()));
        params
    }
}

/// Body of `POST /api/tasks` and `PUT /api/tasks/{id}` as the client sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Task fields that passed validation and are ready to be written.
///
/// Built by [`crate::app::validation::validate_task_body`]; the title is
/// always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) due_date: Option<String>,
    pub(crate) notes: Option<String>,
    pub(crate) status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTask {
    pub message: String,
    pub id: i64,
}
