//! Google Tasks API client and reconciliation engine.
//!
//! This crate talks to the Tasks REST API (v1) and keeps it in step with an
//! edited snapshot of the task hierarchy:
//!
//! - [`auth`] - bearer tokens and the OAuth2 refresh-token grant
//! - [`client`] - the HTTP client, one method per endpoint
//! - [`retry`] - exponential backoff for read paths
//! - [`fetch`] - paginated snapshot assembly (lists, tasks, subtasks)
//! - [`reconcile`] - the three-level diff/apply/reorder engine
//!
//! Reconciliation tolerates per-item failures: a rejected create, patch,
//! delete or move is logged and reported, its subtree is abandoned, and every
//! other branch proceeds. Only an unreachable service fails a run outright.

pub mod auth;
pub mod client;
pub mod error;
pub mod fetch;
pub mod models;
pub mod reconcile;
pub mod retry;

pub use client::TasksClient;
pub use error::{ApiError, ApiResult};
pub use fetch::{fetch_snapshot, FetchOptions};
pub use reconcile::{reconcile, ReconcileReport};
pub use retry::RetryPolicy;

use std::time::Duration;

/// Build a [`TasksClient`] from stored credentials.
///
/// The single shared construction path used by every CLI entry point: one
/// HTTP client for token refresh, one for the API itself, both with the same
/// timeout.
pub fn build_client(credentials: auth::Credentials, timeout: Duration) -> ApiResult<TasksClient> {
    let token_http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

    let auth = auth::Authenticator::new(credentials, token_http);
    TasksClient::new(auth, timeout)
}
