//! Three-level reconciliation of an edited snapshot against the remote state.
//!
//! Given the snapshot fetched before editing (`old`) and the snapshot parsed
//! from the edited document (`new`), this module applies the minimal set of
//! remote mutations so the service matches `new`:
//!
//! 1. Diff the task-list level and process every list operation concurrently;
//!    lists are independent aggregates with no remote ordering.
//! 2. Within a list, diff each sibling group, issue the insert/patch/delete
//!    calls for the group as one concurrent flight, and recurse into the
//!    subtasks of every surviving item once its identifier is known.
//! 3. Once a sibling group is fully resolved, restore order with sequential
//!    move-after-predecessor calls: pending tasks first, then completed
//!    tasks, as two separate order spaces.
//!
//! Failures stay item-scoped. A rejected insert or patch abandons that
//! item's subtree before ordering; every sibling and every other list
//! proceeds, and the run reports what happened instead of failing.

use crate::client::TasksClient;
use crate::models::{ApiTask, ApiTaskList};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use taskdown_core::{diff_task_lists, diff_tasks, ListOp, Task, TaskList, TaskOp};
use tokio::task::JoinSet;
use tracing::{error, info};

/// Outcome of one reconciliation run.
///
/// Per-item failures are collected here rather than raised; a partially
/// applied run is an accepted outcome, and the next fetch/reconcile cycle
/// sees the actual remote state.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub lists_created: u32,
    pub lists_deleted: u32,
    pub tasks_created: u32,
    pub tasks_updated: u32,
    pub tasks_deleted: u32,
    pub tasks_moved: u32,
    /// One entry per failed remote operation, in no particular order.
    pub failures: Vec<String>,
}

impl ReconcileReport {
    fn absorb(&mut self, other: ReconcileReport) {
        self.lists_created += other.lists_created;
        self.lists_deleted += other.lists_deleted;
        self.tasks_created += other.tasks_created;
        self.tasks_updated += other.tasks_updated;
        self.tasks_deleted += other.tasks_deleted;
        self.tasks_moved += other.tasks_moved;
        self.failures.extend(other.failures);
    }

    /// Whether every remote operation succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Display for ReconcileReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lists: {} created, {} deleted; tasks: {} created, {} updated, {} deleted, {} moved; {} failed operation(s)",
            self.lists_created,
            self.lists_deleted,
            self.tasks_created,
            self.tasks_updated,
            self.tasks_deleted,
            self.tasks_moved,
            self.failures.len()
        )
    }
}

/// Reconcile the remote state from `old` to `new`.
///
/// Never fails as a whole: each list subtree runs to completion on its own
/// and per-item errors are collected into the returned report.
pub async fn reconcile(client: &TasksClient, old: &[TaskList], new: &[TaskList]) -> ReconcileReport {
    let ops = diff_task_lists(old, new);
    info!(operations = ops.len(), "Reconciling task lists");

    let mut join = JoinSet::new();
    for op in ops {
        let client = client.clone();
        join.spawn(async move { apply_list_op(&client, op).await });
    }

    let mut report = ReconcileReport::default();
    while let Some(joined) = join.join_next().await {
        match joined {
            Ok(branch) => report.absorb(branch),
            Err(e) => {
                error!(error = %e, "List reconciliation worker panicked");
                report
                    .failures
                    .push(format!("internal: list worker panicked: {e}"));
            }
        }
    }

    info!(%report, "Reconciliation finished");
    report
}

/// Process one list-level operation and everything beneath it.
async fn apply_list_op(client: &TasksClient, op: ListOp) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    match op {
        ListOp::Delete { old } => match client.delete_task_list(&old.id).await {
            Ok(()) => {
                report.lists_deleted += 1;
                info!(list = %old.title, "Deleted task list");
            }
            Err(e) => {
                error!(list = %old.title, error = %e, "Failed to delete task list");
                report
                    .failures
                    .push(format!("delete list '{}': {e}", old.title));
            }
        },
        ListOp::Insert { list } => {
            match client.insert_task_list(&ApiTaskList::from_list(&list)).await {
                Ok(created) => {
                    report.lists_created += 1;
                    info!(list = %list.title, id = %created.id, "Inserted task list");
                    let (_, subtree) =
                        reconcile_tasks(client, &created.id, &[], &list.tasks, "").await;
                    report.absorb(subtree);
                }
                Err(e) => {
                    error!(list = %list.title, error = %e, "Failed to insert task list");
                    report
                        .failures
                        .push(format!("insert list '{}': {e}", list.title));
                }
            }
        }
        ListOp::Update { old, new } => {
            // The title is the match key, so a retained list's only possible
            // change lives in its tasks; there is nothing to patch here.
            if !old.content_eq(&new) {
                let (_, subtree) =
                    reconcile_tasks(client, &old.id, &old.tasks, &new.tasks, "").await;
                report.absorb(subtree);
                info!(list = %old.title, "Updated task list");
            }
        }
    }
    report
}

type ResolvedGroup = (Vec<Task>, ReconcileReport);

/// Reconcile one sibling group, recursively.
///
/// Returns the group in desired order with remote identifiers resolved
/// (items whose insert or patch failed are absent), plus the accumulated
/// report. Boxed because the future recurses through itself for subtasks.
fn reconcile_tasks<'a>(
    client: &'a TasksClient,
    list_id: &'a str,
    old: &'a [Task],
    new: &'a [Task],
    parent_id: &'a str,
) -> Pin<Box<dyn Future<Output = ResolvedGroup> + Send + 'a>> {
    Box::pin(async move {
        let ops = diff_tasks(old, new);
        let (resolved, mut report) = apply_task_ops(client, list_id, ops, new.len()).await;

        // Pending and completed tasks form two separate order spaces; each
        // pass is internally sequential.
        let pending: Vec<&Task> = resolved.iter().filter(|t| !t.completed()).collect();
        let completed: Vec<&Task> = resolved.iter().filter(|t| t.completed()).collect();
        fix_order(client, list_id, &pending, parent_id, &mut report).await;
        fix_order(client, list_id, &completed, parent_id, &mut report).await;

        (resolved, report)
    })
}

/// Apply a sibling group's operations as one concurrent flight.
///
/// Each operation runs independently; results land in their target slot so
/// the returned sequence follows the desired order regardless of completion
/// order. Deletes and failed operations leave no slot behind.
async fn apply_task_ops(
    client: &TasksClient,
    list_id: &str,
    ops: Vec<TaskOp>,
    new_len: usize,
) -> ResolvedGroup {
    let mut join = JoinSet::new();
    for op in ops {
        let client = client.clone();
        let list_id = list_id.to_string();
        join.spawn(async move { apply_task_op(&client, &list_id, op).await });
    }

    let mut slots: Vec<Option<Task>> = Vec::new();
    slots.resize_with(new_len, || None);
    let mut report = ReconcileReport::default();

    while let Some(joined) = join.join_next().await {
        match joined {
            Ok((resolved, branch)) => {
                report.absorb(branch);
                if let Some((index, task)) = resolved {
                    slots[index] = Some(task);
                }
            }
            Err(e) => {
                error!(error = %e, "Task operation worker panicked");
                report
                    .failures
                    .push(format!("internal: task worker panicked: {e}"));
            }
        }
    }

    (slots.into_iter().flatten().collect(), report)
}

/// Apply a single operation and, for surviving items, reconcile its subtasks.
async fn apply_task_op(
    client: &TasksClient,
    list_id: &str,
    op: TaskOp,
) -> (Option<(usize, Task)>, ReconcileReport) {
    let mut report = ReconcileReport::default();
    match op {
        TaskOp::Delete { old } => {
            match client.delete_task(list_id, &old.id).await {
                Ok(()) => {
                    report.tasks_deleted += 1;
                    info!(task = %old.title, "Deleted task");
                }
                Err(e) => {
                    // The item is gone from the desired state either way;
                    // report and move on.
                    error!(task = %old.title, error = %e, "Failed to delete task");
                    report
                        .failures
                        .push(format!("delete task '{}': {e}", old.title));
                }
            }
            (None, report)
        }

        TaskOp::Insert { task, index } => {
            match client.insert_task(list_id, &ApiTask::from_task(&task)).await {
                Ok(created) => {
                    report.tasks_created += 1;
                    info!(task = %task.title, id = %created.id, "Inserted task");

                    let mut resolved = task;
                    resolved.id = created.id;
                    let subtasks = std::mem::take(&mut resolved.subtasks);
                    let (resolved_subtasks, subtree) =
                        reconcile_tasks(client, list_id, &[], &subtasks, &resolved.id).await;
                    resolved.subtasks = resolved_subtasks;
                    report.absorb(subtree);
                    (Some((index, resolved)), report)
                }
                Err(e) => {
                    error!(task = %task.title, error = %e, "Failed to insert task");
                    report
                        .failures
                        .push(format!("insert task '{}': {e}", task.title));
                    (None, report)
                }
            }
        }

        TaskOp::Update { old, new, index } => {
            let mut resolved = new;
            resolved.id = old.id.clone();

            if !old.content_eq(&resolved) {
                match client
                    .patch_task(list_id, &resolved.id, &ApiTask::from_task(&resolved))
                    .await
                {
                    Ok(_) => {
                        report.tasks_updated += 1;
                        info!(task = %resolved.title, "Updated task");
                    }
                    Err(e) => {
                        // Abandon the subtree before ordering; the next run
                        // picks it up from actual remote state.
                        error!(task = %resolved.title, error = %e, "Failed to update task");
                        report
                            .failures
                            .push(format!("update task '{}': {e}", resolved.title));
                        return (None, report);
                    }
                }
            }

            let subtasks = std::mem::take(&mut resolved.subtasks);
            let (resolved_subtasks, subtree) =
                reconcile_tasks(client, list_id, &old.subtasks, &subtasks, &resolved.id).await;
            resolved.subtasks = resolved_subtasks;
            report.absorb(subtree);
            (Some((index, resolved)), report)
        }
    }
}

/// Restore sibling order with one move call per item.
///
/// Calls are strictly sequential within a group: every move positions an
/// item relative to the current placement of its predecessor, so no two
/// moves for the same parent may be in flight at once. A failed move is
/// reported and the pass continues; the predecessor chain stays anchored to
/// the intended item either way.
async fn fix_order(
    client: &TasksClient,
    list_id: &str,
    tasks: &[&Task],
    parent_id: &str,
    report: &mut ReconcileReport,
) {
    let mut previous_id = "";
    for task in tasks {
        match client
            .move_task(list_id, &task.id, parent_id, previous_id)
            .await
        {
            Ok(_) => {
                report.tasks_moved += 1;
                let after = if previous_id.is_empty() { "NONE" } else { previous_id };
                info!(task = %task.title, after = %after, parent = %parent_id, "Moved task");
            }
            Err(e) => {
                error!(task = %task.title, error = %e, "Failed to move task");
                report
                    .failures
                    .push(format!("move task '{}': {e}", task.title));
            }
        }
        previous_id = &task.id;
    }
}
