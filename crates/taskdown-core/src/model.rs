//! Task hierarchy data model.
//!
//! A [`Snapshot`] is the full three-level hierarchy (task lists, tasks,
//! subtasks) at one point in time: either the remote state at fetch time or
//! the desired state parsed from an edited document. Snapshots are plain
//! values; the only state carried between runs is the remote identifiers
//! embedded in them.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Completion state of a task.
///
/// The string forms match the remote API (`needsAction` / `completed`);
/// anything else maps to [`TaskStatus::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
    #[default]
    Unknown,
}

impl TaskStatus {
    /// The wire name used by the remote API.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Pending => "needsAction",
            Self::Completed => "completed",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a wire value, case-insensitively. Unrecognized values become
    /// [`TaskStatus::Unknown`] rather than an error because the remote API
    /// may omit or extend the field.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        if value.eq_ignore_ascii_case("needsAction") {
            Self::Pending
        } else if value.eq_ignore_ascii_case("completed") {
            Self::Completed
        } else {
            Self::Unknown
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Error returned when a user-supplied status string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl Display for ParseStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unrecognized task status '{}' (expected needsAction/pending or completed)",
            self.0
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    /// Strict parse for user input (CLI flags). Accepts the wire names plus
    /// the friendlier `pending`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("needsAction") || s.eq_ignore_ascii_case("pending") {
            Ok(Self::Pending)
        } else if s.eq_ignore_ascii_case("completed") {
            Ok(Self::Completed)
        } else {
            Err(ParseStatusError(s.to_string()))
        }
    }
}

/// One task, possibly with subtasks.
///
/// `id` is the remote identifier and is empty for items that have not been
/// created yet. `position` is the desired rank within the sibling group;
/// both are identity/order metadata and are excluded from [`Task::content_eq`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub notes: String,
    pub position: u64,
    pub status: TaskStatus,
    pub subtasks: Vec<Task>,
}

impl Task {
    /// Convenience constructor for a pending task with just a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: TaskStatus::Pending,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Whether two tasks carry the same content.
    ///
    /// Compares `title`, `notes`, `status` and the subtask sequences
    /// recursively, in order. `id` and `position` do not participate: they
    /// describe where an item lives, not what it says.
    #[must_use]
    pub fn content_eq(&self, other: &Task) -> bool {
        self.title == other.title
            && self.notes == other.notes
            && self.status == other.status
            && self.subtasks.len() == other.subtasks.len()
            && self
                .subtasks
                .iter()
                .zip(&other.subtasks)
                .all(|(a, b)| a.content_eq(b))
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{}: {} ({}): {}, {} subtasks",
            self.position,
            self.title,
            self.id,
            self.status,
            self.subtasks.len()
        )
    }
}

/// One task list with its top-level tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    pub id: String,
    pub title: String,
    pub tasks: Vec<Task>,
}

impl TaskList {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Content equality for lists: title plus the task sequence, by
    /// [`Task::content_eq`].
    #[must_use]
    pub fn content_eq(&self, other: &TaskList) -> bool {
        self.title == other.title
            && self.tasks.len() == other.tasks.len()
            && self.tasks.iter().zip(&other.tasks).all(|(a, b)| a.content_eq(b))
    }
}

impl Display for TaskList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {} tasks", self.title, self.id, self.tasks.len())
    }
}

/// An ordered sequence of task lists: the unit the reconciler consumes and
/// produces.
pub type Snapshot = Vec<TaskList>;
