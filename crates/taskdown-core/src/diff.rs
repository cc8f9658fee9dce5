//! Title-keyed diff of sibling sequences.
//!
//! Items are matched purely on title; content and position never factor into
//! matching. The result order is: all retained/deleted old items in their
//! original relative order, then brand-new items appended at the end. Final
//! sibling order is not restored here; the reconciler's move phase does that
//! once every item has a remote identifier.

use crate::model::{Task, TaskList};

/// One mutation against a sibling group of tasks.
///
/// `index` is the item's rank in the desired (new) sequence and is what the
/// move phase later re-establishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOp {
    Insert { task: Task, index: usize },
    Update { old: Task, new: Task, index: usize },
    Delete { old: Task },
}

/// One mutation against the top-level sequence of task lists.
///
/// Lists carry no remote ordering, so list operations have no target index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp {
    Insert { list: TaskList },
    Update { old: TaskList, new: TaskList },
    Delete { old: TaskList },
}

/// An insertion-ordered map from title to operation.
///
/// Sibling groups are small, so linear lookup beats hashing and keeps the
/// first-insertion iteration order that the diff result depends on. A second
/// entry for an existing title overwrites the value in place, which is also
/// the documented duplicate-title policy: only the last sibling with a given
/// title survives the diff.
struct OpSlots<T>(Vec<(String, Option<T>)>);

impl<T> OpSlots<T> {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn upsert(&mut self, title: &str, op: T) {
        match self.0.iter_mut().find(|(t, _)| t == title) {
            Some(slot) => slot.1 = Some(op),
            None => self.0.push((title.to_string(), Some(op))),
        }
    }

    /// Remove and return the value for `title`, keeping the slot (and its
    /// position) so a follow-up [`OpSlots::upsert`] lands in the same place.
    fn take(&mut self, title: &str) -> Option<T> {
        self.0
            .iter_mut()
            .find(|(t, _)| t == title)
            .and_then(|slot| slot.1.take())
    }

    fn into_ops(self) -> Vec<T> {
        self.0.into_iter().filter_map(|(_, op)| op).collect()
    }
}

impl TaskOp {
    /// The item a later sibling with the same title matches against when it
    /// overwrites this slot.
    fn into_matched(self) -> Task {
        match self {
            TaskOp::Delete { old } | TaskOp::Update { old, .. } => old,
            TaskOp::Insert { task, .. } => task,
        }
    }
}

impl ListOp {
    fn into_matched(self) -> TaskList {
        match self {
            ListOp::Delete { old } | ListOp::Update { old, .. } => old,
            ListOp::Insert { list } => list,
        }
    }
}

/// Diff one sibling group of tasks.
///
/// Every old item starts out marked for deletion; new items either reclaim
/// the entry with the same title as an update or append as an insert.
#[must_use]
pub fn diff_tasks(old: &[Task], new: &[Task]) -> Vec<TaskOp> {
    let mut slots = OpSlots::new();

    for task in old {
        slots.upsert(&task.title, TaskOp::Delete { old: task.clone() });
    }

    for (index, task) in new.iter().enumerate() {
        match slots.take(&task.title) {
            Some(existing) => slots.upsert(
                &task.title,
                TaskOp::Update {
                    old: existing.into_matched(),
                    new: task.clone(),
                    index,
                },
            ),
            None => slots.upsert(&task.title, TaskOp::Insert { task: task.clone(), index }),
        }
    }

    slots.into_ops()
}

/// Diff the top-level sequence of task lists. Same algorithm as
/// [`diff_tasks`], without target indices.
#[must_use]
pub fn diff_task_lists(old: &[TaskList], new: &[TaskList]) -> Vec<ListOp> {
    let mut slots = OpSlots::new();

    for list in old {
        slots.upsert(&list.title, ListOp::Delete { old: list.clone() });
    }

    for list in new {
        match slots.take(&list.title) {
            Some(existing) => slots.upsert(
                &list.title,
                ListOp::Update {
                    old: existing.into_matched(),
                    new: list.clone(),
                },
            ),
            None => slots.upsert(&list.title, ListOp::Insert { list: list.clone() }),
        }
    }

    slots.into_ops()
}
