//! taskdown core library
//!
//! Shared types for the task hierarchy and the title-keyed diff that drives
//! reconciliation.
//!
//! # Modules
//!
//! - [`model`] - Task lists, tasks, statuses and content equality
//! - [`diff`] - Sibling-level diff producing insert/update/delete operations

pub mod diff;
pub mod model;

pub use diff::{diff_task_lists, diff_tasks, ListOp, TaskOp};
pub use model::{Snapshot, Task, TaskList, TaskStatus};
