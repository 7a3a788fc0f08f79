use crate::task::{self, Status, StatusFilter, Task, TIMESTAMP_FORMAT};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the persisted task file, resolved next to the executable.
pub const TASK_FILE: &str = "tasks.json";

/// Environment variable overriding the task file location.
pub const TASK_FILE_ENV: &str = "TASK_TRACKER_FILE";

/// A user-facing outcome message, printed verbatim by the dispatcher.
pub type Reply = String;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read task file {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write task file {}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize task list")]
    Serialize(#[from] serde_json::Error),
}

/// Resolves where the task file lives: the `TASK_TRACKER_FILE` environment
/// variable if set, otherwise `tasks.json` next to the executable, falling
/// back to the current directory when the executable path is unavailable.
pub fn task_file_path() -> PathBuf {
    if let Ok(path) = std::env::var(TASK_FILE_ENV) {
        return PathBuf::from(path);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(TASK_FILE)))
        .unwrap_or_else(|| PathBuf::from(TASK_FILE))
}

/// The full task collection, keyed by ID.
///
/// Serializes transparently as one JSON object whose keys are decimal task
/// IDs. Keys are contiguous `1..N` after every save; `add` hands out
/// `max key + 1` in the meantime. IDs are therefore not stable references
/// across invocations once other tasks have been deleted.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRepository {
    tasks: BTreeMap<u32, Task>,
}

impl TaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Reads the collection from `path`. A missing file is an empty
    /// collection; a malformed file is warned about and discarded, to be
    /// replaced on the next save.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                debug!("no task file at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::ReadFile {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        match Self::from_json(&contents) {
            Ok(tasks) => {
                debug!("loaded {} tasks from {}", tasks.len(), path.display());
                Ok(tasks)
            }
            Err(err) => {
                warn!(
                    "task file {} is empty or malformed ({}); it will be replaced with a new task list",
                    path.display(),
                    err
                );
                Ok(Self::default())
            }
        }
    }

    /// Renumbers to contiguous IDs, then overwrites `path` with the
    /// pretty-printed collection. Plain overwrite; last writer wins.
    pub fn save(&mut self, path: &Path) -> Result<(), Error> {
        self.renumber();
        let json = self.to_pretty_json()?;
        std::fs::write(path, json).map_err(|source| Error::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("saved {} tasks to {}", self.len(), path.display());
        Ok(())
    }

    /// Reassigns contiguous IDs `1..N` in iteration order.
    pub fn renumber(&mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        self.tasks = tasks
            .into_values()
            .zip(1u32..)
            .map(|(task, id)| (id, task))
            .collect();
    }

    /// Inserts a new `todo` task and returns its ID.
    pub fn add(&mut self, description: String) -> u32 {
        let next_id = self.tasks.keys().next_back().copied().unwrap_or(0) + 1;
        self.tasks.insert(next_id, Task::new(description));
        next_id
    }

    /// Removes the task with the given ID. A missing (or non-numeric) ID is
    /// a reported outcome, not an error.
    pub fn delete(&mut self, task_id: &str) -> Reply {
        let removed = task_id
            .parse::<u32>()
            .ok()
            .and_then(|id| self.tasks.remove(&id));
        if removed.is_some() {
            format!("Task (ID: {}) deleted successfully", task_id)
        } else {
            format!("Task (ID: {}) does not exist", task_id)
        }
    }

    /// Empties the collection.
    pub fn clean(&mut self) -> Reply {
        self.tasks.clear();
        "Task list cleaned up".to_string()
    }

    /// Moves a task to a new status and refreshes its update time. The
    /// status value is validated here again even though the dispatcher only
    /// admits the allowed set.
    pub fn update_status(&mut self, task_id: &str, new_status: &str) -> Reply {
        let Ok(status) = new_status.parse::<Status>() else {
            let allowed = Status::ALLOWED
                .iter()
                .map(Status::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            return format!("Invalid status. Allowed statuses are: {}", allowed);
        };
        match task_id
            .parse::<u32>()
            .ok()
            .and_then(|id| self.tasks.get_mut(&id))
        {
            Some(task) => {
                task.status = status;
                task.updated_at = task::now();
                format!("Task (ID: {}) updated successfully", task_id)
            }
            None => format!("Task (ID: {}) does not exist", task_id),
        }
    }

    /// Renders the fixed-width task table for every task matching the
    /// filter. Display only; never mutates the collection.
    pub fn list(&self, status_filter: StatusFilter) -> Reply {
        let mut lines = Vec::new();
        if self.tasks.is_empty() {
            lines.push("No tasks found".to_string());
        }
        lines.push(format!(
            "{:<5} {:<12} {:<30} {:<20} {:<20}",
            "ID", "Status", "Description", "Created At", "Updated At"
        ));
        lines.push("-".repeat(90));
        let mut matched = false;
        for (id, task) in &self.tasks {
            if status_filter.matches(task.status) {
                matched = true;
                lines.push(format!(
                    "{:<5} {:<12} {:<30} {:<20} {:<20}",
                    id,
                    task.status.as_str(),
                    task.description,
                    task.created_at.format(TIMESTAMP_FORMAT).to_string(),
                    task.updated_at.format(TIMESTAMP_FORMAT).to_string(),
                ));
            }
        }
        if !matched {
            lines.push(format!("No tasks found with status: {}", status_filter));
        }
        lines.push("-".repeat(90));
        lines.join("\n")
    }
}
