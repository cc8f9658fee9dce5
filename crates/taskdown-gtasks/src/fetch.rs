//! Snapshot fetch: assemble the full task hierarchy from the API.
//!
//! Task lists are fetched page by page, then every list's pending and
//! completed tasks are fetched concurrently (one worker per list and
//! completion bucket). Subtasks arrive interleaved with their parents in no
//! guaranteed order, so parent attachment is deferred until every page of a
//! list has landed.

use crate::client::{TaskQuery, TasksClient};
use crate::error::ApiResult;
use crate::models::{ApiTask, ApiTaskList};
use crate::retry::RetryPolicy;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use taskdown_core::{Snapshot, Task, TaskStatus};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Filters narrowing what the snapshot contains.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Only include completed tasks finished after this instant.
    pub completed_after: Option<DateTime<Utc>>,
    /// Only include completed tasks finished before this instant.
    pub completed_before: Option<DateTime<Utc>>,
    /// Restrict the fetch to one completion bucket entirely.
    pub status: Option<TaskStatus>,
}

/// Fetch every task list with its tasks and subtasks.
///
/// Fails only if the task-list listing itself cannot be fetched; a list whose
/// task fetch fails is logged and included with no tasks, as the original
/// state for that list is unknown rather than empty.
pub async fn fetch_snapshot(
    client: &TasksClient,
    retry: &RetryPolicy,
    options: &FetchOptions,
) -> ApiResult<Snapshot> {
    // Task lists, following pagination.
    let mut lists: Vec<ApiTaskList> = Vec::new();
    let mut page_token = String::new();
    loop {
        let token = page_token.clone();
        let page = retry
            .execute("list_task_lists", || client.list_task_lists(&token))
            .await?;
        lists.extend(page.items);
        page_token = page.next_page_token;
        if page_token.is_empty() {
            break;
        }
    }
    debug!(count = lists.len(), "Fetched task lists");

    let fetch_pending = options.status.map_or(true, |s| s == TaskStatus::Pending);
    let fetch_completed = options.status.map_or(true, |s| s == TaskStatus::Completed);

    // One worker per list and completion bucket. Completed tasks are hidden
    // from default views, hence showHidden; the completion window only
    // applies to the completed bucket.
    let mut join = JoinSet::new();
    for list in &lists {
        for completed in [false, true] {
            if (completed && !fetch_completed) || (!completed && !fetch_pending) {
                continue;
            }
            let client = client.clone();
            let retry = retry.clone();
            let list_id = list.id.clone();
            let query = TaskQuery {
                show_completed: completed,
                show_hidden: completed,
                completed_min: completed.then_some(options.completed_after).flatten(),
                completed_max: completed.then_some(options.completed_before).flatten(),
            };
            join.spawn(async move {
                let result = fetch_all_tasks(&client, &retry, &list_id, &query).await;
                (list_id, result)
            });
        }
    }

    let mut tasks_by_list: HashMap<String, Vec<ApiTask>> = HashMap::new();
    while let Some(joined) = join.join_next().await {
        match joined {
            Ok((list_id, Ok(items))) => {
                tasks_by_list.entry(list_id).or_default().extend(items);
            }
            Ok((list_id, Err(e))) => {
                error!(list = %list_id, error = %e, "Failed to fetch tasks for list");
            }
            Err(e) => {
                error!(error = %e, "Task fetch worker panicked");
            }
        }
    }

    // Assemble the hierarchy list by list.
    let mut snapshot: Snapshot = Vec::with_capacity(lists.len());
    for api_list in lists {
        let mut list = api_list.into_list();
        list.tasks = assemble_tasks(tasks_by_list.remove(&list.id).unwrap_or_default());
        snapshot.push(list);
    }
    snapshot.sort_by(|a, b| a.title.cmp(&b.title));

    Ok(snapshot)
}

/// Fetch every page of one list/bucket combination.
async fn fetch_all_tasks(
    client: &TasksClient,
    retry: &RetryPolicy,
    list_id: &str,
    query: &TaskQuery,
) -> ApiResult<Vec<ApiTask>> {
    let mut items = Vec::new();
    let mut page_token = String::new();
    loop {
        let token = page_token.clone();
        let page = retry
            .execute("list_tasks", || client.list_tasks(list_id, query, &token))
            .await?;
        items.extend(page.items);
        page_token = page.next_page_token;
        if page_token.is_empty() {
            break;
        }
    }
    Ok(items)
}

/// Attach subtasks to their parents and restore sibling order.
///
/// Positions from the wire are only meaningful relative to siblings; after
/// sorting they are renumbered densely so downstream consumers see ranks.
fn assemble_tasks(fetched: Vec<ApiTask>) -> Vec<Task> {
    let mut top_level: Vec<Task> = Vec::new();
    let mut subtasks_by_parent: HashMap<String, Vec<Task>> = HashMap::new();

    for api_task in fetched {
        let parent = api_task.parent.clone();
        let task = api_task.into_task();
        if parent.is_empty() {
            top_level.push(task);
        } else {
            subtasks_by_parent.entry(parent).or_default().push(task);
        }
    }

    for task in &mut top_level {
        if let Some(mut subtasks) = subtasks_by_parent.remove(&task.id) {
            subtasks.sort_by_key(|t| t.position);
            renumber(&mut subtasks);
            task.subtasks = subtasks;
        }
    }

    for (parent, orphans) in &subtasks_by_parent {
        warn!(
            parent = %parent,
            count = orphans.len(),
            "Dropping subtasks whose parent was not fetched"
        );
    }

    top_level.sort_by_key(|t| t.position);
    renumber(&mut top_level);
    top_level
}

fn renumber(tasks: &mut [Task]) {
    for (rank, task) in tasks.iter_mut().enumerate() {
        task.position = rank as u64;
    }
}
