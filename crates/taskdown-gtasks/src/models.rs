//! Wire types for the Tasks REST API (v1).
//!
//! Request and response bodies use the API's camelCase field names. Note the
//! quirks honored here: `position` is a zero-padded decimal string ordered
//! lexicographically, `status` is a free-form string, and a task referencing
//! a `parent` is a subtask whose attachment is deferred until every page has
//! been fetched.

use serde::{Deserialize, Serialize};
use taskdown_core::{Task, TaskList, TaskStatus};

pub const TASK_KIND: &str = "tasks#task";
pub const TASK_LIST_KIND: &str = "tasks#taskList";

/// A task resource on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiTask {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub position: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent: String,
}

impl ApiTask {
    /// Build the request body for creating or patching `task`.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            kind: TASK_KIND.to_string(),
            id: task.id.clone(),
            title: task.title.clone(),
            notes: task.notes.clone(),
            status: task.status.as_wire().to_string(),
            position: String::new(),
            parent: String::new(),
        }
    }

    /// Convert a fetched resource into the core model. Titles arrive with
    /// stray whitespace from some clients and are trimmed; subtasks are
    /// attached later by the fetch assembly.
    #[must_use]
    pub fn into_task(self) -> Task {
        Task {
            id: self.id,
            title: self.title.trim().to_string(),
            notes: self.notes,
            position: parse_position(&self.position),
            status: TaskStatus::from_wire(&self.status),
            subtasks: Vec::new(),
        }
    }
}

/// A task-list resource on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiTaskList {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
}

impl ApiTaskList {
    #[must_use]
    pub fn from_list(list: &TaskList) -> Self {
        Self {
            kind: TASK_LIST_KIND.to_string(),
            id: list.id.clone(),
            title: list.title.clone(),
        }
    }

    #[must_use]
    pub fn into_list(self) -> TaskList {
        TaskList {
            id: self.id,
            title: self.title.trim().to_string(),
            tasks: Vec::new(),
        }
    }
}

/// One page of task lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskListsPage {
    pub items: Vec<ApiTaskList>,
    pub next_page_token: String,
}

/// One page of tasks within a list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TasksPage {
    pub items: Vec<ApiTask>,
    pub next_page_token: String,
}

/// Positions are 20-digit zero-padded strings; values that do not fit sort
/// last rather than failing the whole fetch.
fn parse_position(position: &str) -> u64 {
    let digits = position.trim_start_matches('0');
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}
