//! Tasks API HTTP client (reqwest-based).
//!
//! One method per endpoint; all responses funnel through shared status
//! handling that maps the API's failure modes onto [`ApiError`].

use crate::auth::Authenticator;
use crate::error::{ApiError, ApiResult};
use crate::models::{ApiTask, ApiTaskList, TaskListsPage, TasksPage};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Production endpoint of the Tasks API.
pub const DEFAULT_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// The API caps page sizes at 100 results.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Filters applied when listing tasks within a list.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    /// Include completed tasks in the response.
    pub show_completed: bool,
    /// Include hidden tasks (completed tasks disappear from default views).
    pub show_hidden: bool,
    /// Lower bound on completion time.
    pub completed_min: Option<DateTime<Utc>>,
    /// Upper bound on completion time.
    pub completed_max: Option<DateTime<Utc>>,
}

/// HTTP client for the Tasks API.
///
/// Cheap to clone; clones share the underlying connection pool and the
/// cached access token.
#[derive(Debug, Clone)]
pub struct TasksClient {
    base_url: String,
    auth: Authenticator,
    http: Client,
}

impl TasksClient {
    /// Create a client against the production endpoint.
    pub fn new(auth: Authenticator, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("taskdown/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_base_url(DEFAULT_BASE_URL, auth, http))
    }

    /// Create a client against an arbitrary endpoint (tests point this at a
    /// mock server).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, auth: Authenticator, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, auth, http }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Task lists ────────────────────────────────────────────────────

    /// List task lists (GET /users/@me/lists), one page at a time.
    pub async fn list_task_lists(&self, page_token: &str) -> ApiResult<TaskListsPage> {
        let url = format!("{}/users/@me/lists", self.base_url);
        let mut params = vec![("maxResults", MAX_PAGE_SIZE.to_string())];
        if !page_token.is_empty() {
            params.push(("pageToken", page_token.to_string()));
        }
        self.get(&url, &params).await
    }

    /// Create a task list (POST /users/@me/lists).
    pub async fn insert_task_list(&self, list: &ApiTaskList) -> ApiResult<ApiTaskList> {
        let url = format!("{}/users/@me/lists", self.base_url);
        self.post(&url, list).await
    }

    /// Patch a task list (PATCH /users/@me/lists/:id).
    pub async fn patch_task_list(&self, id: &str, list: &ApiTaskList) -> ApiResult<ApiTaskList> {
        let url = format!("{}/users/@me/lists/{id}", self.base_url);
        self.patch(&url, list).await
    }

    /// Delete a task list (DELETE /users/@me/lists/:id).
    pub async fn delete_task_list(&self, id: &str) -> ApiResult<()> {
        let url = format!("{}/users/@me/lists/{id}", self.base_url);
        self.delete(&url).await
    }

    // ── Tasks ─────────────────────────────────────────────────────────

    /// List tasks in a list (GET /lists/:list/tasks), one page at a time.
    pub async fn list_tasks(
        &self,
        list_id: &str,
        query: &TaskQuery,
        page_token: &str,
    ) -> ApiResult<TasksPage> {
        let url = format!("{}/lists/{list_id}/tasks", self.base_url);
        let mut params = vec![
            ("maxResults", MAX_PAGE_SIZE.to_string()),
            ("showCompleted", query.show_completed.to_string()),
            ("showHidden", query.show_hidden.to_string()),
        ];
        if let Some(min) = query.completed_min {
            params.push(("completedMin", rfc3339(min)));
        }
        if let Some(max) = query.completed_max {
            params.push(("completedMax", rfc3339(max)));
        }
        if !page_token.is_empty() {
            params.push(("pageToken", page_token.to_string()));
        }
        self.get(&url, &params).await
    }

    /// Create a task (POST /lists/:list/tasks).
    pub async fn insert_task(&self, list_id: &str, task: &ApiTask) -> ApiResult<ApiTask> {
        let url = format!("{}/lists/{list_id}/tasks", self.base_url);
        self.post(&url, task).await
    }

    /// Patch a task's content (PATCH /lists/:list/tasks/:id).
    pub async fn patch_task(
        &self,
        list_id: &str,
        task_id: &str,
        task: &ApiTask,
    ) -> ApiResult<ApiTask> {
        let url = format!("{}/lists/{list_id}/tasks/{task_id}", self.base_url);
        self.patch(&url, task).await
    }

    /// Delete a task (DELETE /lists/:list/tasks/:id).
    pub async fn delete_task(&self, list_id: &str, task_id: &str) -> ApiResult<()> {
        let url = format!("{}/lists/{list_id}/tasks/{task_id}", self.base_url);
        self.delete(&url).await
    }

    /// Reposition a task (POST /lists/:list/tasks/:id/move).
    ///
    /// The API expresses sibling order only through this call: the task lands
    /// immediately after `previous` under `parent`. Empty `parent` means
    /// top level; empty `previous` means first among its siblings.
    pub async fn move_task(
        &self,
        list_id: &str,
        task_id: &str,
        parent: &str,
        previous: &str,
    ) -> ApiResult<ApiTask> {
        let url = format!("{}/lists/{list_id}/tasks/{task_id}/move", self.base_url);
        let mut params = Vec::new();
        if !parent.is_empty() {
            params.push(("parent", parent.to_string()));
        }
        if !previous.is_empty() {
            params.push(("previous", previous.to_string()));
        }

        debug!("POST {} ({:?})", url, params);
        let builder = self.http.post(&url).query(&params);
        let builder = self.auth.apply(builder).await?;
        let response = builder.send().await?;
        self.handle_response(response).await
    }

    // ── Internal HTTP methods ─────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> ApiResult<T> {
        debug!("GET {} ({:?})", url, params);
        let builder = self.http.get(url).query(params);
        let builder = self.auth.apply(builder).await?;
        let response = builder.send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> ApiResult<T> {
        debug!("POST {}", url);
        let builder = self.http.post(url).json(body);
        let builder = self.auth.apply(builder).await?;
        let response = builder.send().await?;
        self.handle_response(response).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> ApiResult<T> {
        debug!("PATCH {}", url);
        let builder = self.http.patch(url).json(body);
        let builder = self.auth.apply(builder).await?;
        let response = builder.send().await?;
        self.handle_response(response).await
    }

    async fn delete(&self, url: &str) -> ApiResult<()> {
        debug!("DELETE {}", url);
        let builder = self.http.delete(url);
        let builder = self.auth.apply(builder).await?;
        let response = builder.send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response).await
        }
    }

    // ── Response handling ─────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ApiError::Parse(format!("unexpected response body: {e}")))
        } else {
            self.handle_error_response(response).await
        }
    }

    async fn handle_error_response<T>(&self, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(body)),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Tasks API rate limited, retry after {:?}s", retry_after);
                Err(ApiError::RateLimited { retry_after_secs: retry_after })
            }
            StatusCode::UNAUTHORIZED => {
                // A cached access token is no longer accepted; mint a fresh
                // one on the next request.
                self.auth.invalidate_cache().await;
                Err(ApiError::Auth(format!("authentication failed (401): {body}")))
            }
            _ => {
                let detail = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                Err(ApiError::Service { status: status.as_u16(), detail })
            }
        }
    }
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
