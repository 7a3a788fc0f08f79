use chrono::{Local, NaiveDateTime, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Timestamp format used both on disk and in the `list` table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid status: {0}")]
pub struct InvalidStatus(pub String);

#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// Every status a task may hold, in display order.
    pub const ALLOWED: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Status::ALLOWED
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| InvalidStatus(value.to_string()))
    }
}

/// Narrows which tasks `list` displays; `All` matches every status.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Todo,
    InProgress,
    Done,
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Todo => status == Status::Todo,
            StatusFilter::InProgress => status == Status::InProgress,
            StatusFilter::Done => status == Status::Done,
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Todo => Status::Todo.fmt(f),
            StatusFilter::InProgress => Status::InProgress.fmt(f),
            StatusFilter::Done => Status::Done.fmt(f),
        }
    }
}

/// A single unit of work. The task's ID is the key it is stored under in the
/// repository, not a field of the record.
#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
pub struct Task {
    pub description: String,
    pub status: Status,
    #[serde(rename = "createdAt", with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "updatedAt", with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

impl Task {
    pub fn new(description: String) -> Self {
        let now = now();
        Self {
            description,
            status: Status::Todo,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current local wall-clock time, truncated to whole seconds so that a task
/// in memory compares equal to its persisted form.
pub(crate) fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod task_tests {
    use super::*;

    #[test]
    fn test_new_task_starts_as_todo_with_equal_timestamps() {
        let task = Task::new("buy milk".to_string());

        assert_eq!(task.description, "buy milk");
        assert_eq!(task.status, Status::Todo);
        assert_eq!(
            task.created_at, task.updated_at,
            "A fresh task should have identical creation and update times"
        );
    }

    #[test]
    fn test_task_serializes_with_documented_field_names() {
        // Arrange
        let created = NaiveDateTime::parse_from_str("2024-05-01 09:30:00", TIMESTAMP_FORMAT)
            .expect("valid timestamp");
        let task = Task {
            description: "write report".to_string(),
            status: Status::InProgress,
            created_at: created,
            updated_at: created,
        };

        // Act
        let json = serde_json::to_string(&task).expect("task should serialize");

        // Assert
        assert!(json.contains("\"description\":\"write report\""));
        assert!(json.contains("\"status\":\"in-progress\""));
        assert!(json.contains("\"createdAt\":\"2024-05-01 09:30:00\""));
        assert!(json.contains("\"updatedAt\":\"2024-05-01 09:30:00\""));
    }

    #[test]
    fn test_task_deserializes_from_documented_format() {
        let json = r#"
        {
            "description": "water plants",
            "status": "done",
            "createdAt": "2024-05-01 09:30:00",
            "updatedAt": "2024-05-02 10:00:00"
        }
        "#;

        let task: Task = serde_json::from_str(json).expect("task should deserialize");

        assert_eq!(task.description, "water plants");
        assert_eq!(task.status, Status::Done);
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn test_task_with_unknown_status_fails_to_deserialize() {
        let json = r#"
        {
            "description": "water plants",
            "status": "blocked",
            "createdAt": "2024-05-01 09:30:00",
            "updatedAt": "2024-05-01 09:30:00"
        }
        "#;

        let result: Result<Task, _> = serde_json::from_str(json);

        assert!(result.is_err(), "Only the three documented statuses are valid");
    }

    #[test]
    fn test_now_is_whole_seconds() {
        let stamp = now();
        assert_eq!(stamp.nanosecond(), 0);
    }
}
