//! Mock Tasks API server using wiremock for integration testing.
//!
//! Keeps an in-memory model of task lists and tasks behind the real HTTP
//! surface, including the API's placement quirks: a fresh task lands at the
//! top of its list with no parent, and only a move call can assign a parent
//! or a position. Move calls are recorded verbatim so tests can assert the
//! exact sequencing the reconciler produced.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use taskdown_gtasks::auth::{Authenticator, Credentials};
use taskdown_gtasks::TasksClient;

/// One task as stored by the mock service.
#[derive(Debug, Clone, Default)]
pub struct StoredTask {
    pub id: String,
    pub list_id: String,
    pub title: String,
    pub notes: String,
    pub status: String,
    pub parent: String,
}

/// One recorded move call, in arrival order.
#[derive(Debug, Clone)]
pub struct MoveCall {
    pub list_id: String,
    pub task_id: String,
    pub parent: String,
    pub previous: String,
}

#[derive(Debug, Default)]
pub struct ServerState {
    /// (id, title) pairs in creation order.
    pub lists: Vec<(String, String)>,
    /// Tasks in sibling order: the vector order within one (list, parent)
    /// group is the remote order.
    pub tasks: Vec<StoredTask>,
    pub moves: Vec<MoveCall>,
    /// Ids of tasks that received a PATCH.
    pub patched: Vec<String>,
    /// Task titles whose insert fails with a 500.
    pub fail_insert_titles: Vec<String>,
    /// Task titles whose move fails with a 500.
    pub fail_move_titles: Vec<String>,
    next_id: u64,
}

impl ServerState {
    fn alloc_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn find_task(&self, list_id: &str, task_id: &str) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.list_id == list_id && t.id == task_id)
    }

    /// Reposition `task_id` directly after `previous` (or first among its
    /// siblings when `previous` is empty), assigning `parent` along the way.
    fn apply_move(&mut self, list_id: &str, task_id: &str, parent: &str, previous: &str) -> bool {
        let Some(index) = self.find_task(list_id, task_id) else {
            return false;
        };
        let mut task = self.tasks.remove(index);
        task.parent = parent.to_string();

        let insert_at = if previous.is_empty() {
            // First sibling: before any existing member of the group.
            self.tasks
                .iter()
                .position(|t| t.list_id == list_id && t.parent == parent)
                .unwrap_or(self.tasks.len())
        } else {
            match self.tasks.iter().position(|t| t.id == previous) {
                Some(prev_index) => prev_index + 1,
                None => self.tasks.len(),
            }
        };
        self.tasks.insert(insert_at, task);
        true
    }

    /// Sibling order of one group, as titles.
    pub fn sibling_titles(&self, list_id: &str, parent: &str) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.list_id == list_id && t.parent == parent)
            .map(|t| t.title.clone())
            .collect()
    }

    /// Sibling order of one group restricted to a status bucket.
    pub fn sibling_titles_with_status(
        &self,
        list_id: &str,
        parent: &str,
        status: &str,
    ) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.list_id == list_id && t.parent == parent && t.status == status)
            .map(|t| t.title.clone())
            .collect()
    }
}

pub struct MockTasksServer {
    server: MockServer,
    pub state: Arc<Mutex<ServerState>>,
}

impl MockTasksServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(ServerState::default()));
        mount_all(&server, &state).await;
        Self { server, state }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// A client wired to this mock server with a static bearer token.
    pub fn client(&self) -> TasksClient {
        let auth = Authenticator::new(
            Credentials::Bearer { token: "test-token".to_string() },
            reqwest::Client::new(),
        );
        TasksClient::with_base_url(self.uri(), auth, reqwest::Client::new())
    }

    // ── Seeding and assertions ────────────────────────────────────────

    pub fn seed_list(&self, title: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.alloc_id("list");
        state.lists.push((id.clone(), title.to_string()));
        id
    }

    /// Append a task at the end of its sibling group.
    pub fn seed_task(
        &self,
        list_id: &str,
        parent: &str,
        title: &str,
        status: &str,
        notes: &str,
    ) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.alloc_id("task");
        state.tasks.push(StoredTask {
            id: id.clone(),
            list_id: list_id.to_string(),
            title: title.to_string(),
            notes: notes.to_string(),
            status: status.to_string(),
            parent: parent.to_string(),
        });
        id
    }

    pub fn fail_inserts_titled(&self, title: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_insert_titles
            .push(title.to_string());
    }

    pub fn fail_moves_titled(&self, title: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_move_titles
            .push(title.to_string());
    }

    pub fn list_titles(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .lists
            .iter()
            .map(|(_, title)| title.clone())
            .collect()
    }

    pub fn list_id(&self, title: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .lists
            .iter()
            .find(|(_, t)| t == title)
            .map(|(id, _)| id.clone())
    }

    pub fn task_by_title(&self, title: &str) -> Option<StoredTask> {
        self.state
            .lock()
            .unwrap()
            .tasks
            .iter()
            .find(|t| t.title == title)
            .cloned()
    }

    pub fn moves(&self) -> Vec<MoveCall> {
        self.state.lock().unwrap().moves.clone()
    }

    pub fn patched_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().patched.clone()
    }
}

// ── HTTP surface ──────────────────────────────────────────────────────

async fn mount_all(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    mount_list_task_lists(server, state).await;
    mount_insert_task_list(server, state).await;
    mount_delete_task_list(server, state).await;
    mount_list_tasks(server, state).await;
    mount_insert_task(server, state).await;
    mount_move_task(server, state).await;
    mount_patch_task(server, state).await;
    mount_delete_task(server, state).await;
}

fn query_map(req: &Request) -> HashMap<String, String> {
    req.url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn path_segment(req: &Request, index: usize) -> String {
    req.url
        .path_segments()
        .and_then(|mut segments| segments.nth(index))
        .unwrap_or_default()
        .to_string()
}

fn task_json(state: &ServerState, task: &StoredTask) -> Value {
    // Position is the task's rank within its sibling group, zero-padded the
    // way the real API formats it.
    let rank = state
        .tasks
        .iter()
        .filter(|t| t.list_id == task.list_id && t.parent == task.parent)
        .position(|t| t.id == task.id)
        .unwrap_or(0);

    let mut body = json!({
        "kind": "tasks#task",
        "id": task.id,
        "title": task.title,
        "status": task.status,
        "position": format!("{rank:020}"),
    });
    if !task.notes.is_empty() {
        body["notes"] = json!(task.notes);
    }
    if !task.parent.is_empty() {
        body["parent"] = json!(task.parent);
    }
    body
}

async fn mount_list_task_lists(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    let state = state.clone();
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .respond_with(move |_req: &Request| {
            let state = state.lock().unwrap();
            let items: Vec<Value> = state
                .lists
                .iter()
                .map(|(id, title)| json!({"kind": "tasks#taskList", "id": id, "title": title}))
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({ "items": items }))
        })
        .mount(server)
        .await;
}

async fn mount_insert_task_list(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    let state = state.clone();
    Mock::given(method("POST"))
        .and(path("/users/@me/lists"))
        .respond_with(move |req: &Request| {
            let body: Value = serde_json::from_slice(&req.body).unwrap_or_default();
            let title = body["title"].as_str().unwrap_or("").to_string();

            let mut state = state.lock().unwrap();
            let id = state.alloc_id("list");
            state.lists.push((id.clone(), title.clone()));
            ResponseTemplate::new(200)
                .set_body_json(json!({"kind": "tasks#taskList", "id": id, "title": title}))
        })
        .mount(server)
        .await;
}

async fn mount_delete_task_list(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    let state = state.clone();
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/users/@me/lists/[^/]+$"))
        .respond_with(move |req: &Request| {
            let list_id = path_segment(req, 3);
            let mut state = state.lock().unwrap();
            let before = state.lists.len();
            state.lists.retain(|(id, _)| *id != list_id);
            if state.lists.len() == before {
                return ResponseTemplate::new(404).set_body_string("list not found");
            }
            state.tasks.retain(|t| t.list_id != list_id);
            ResponseTemplate::new(204)
        })
        .mount(server)
        .await;
}

async fn mount_list_tasks(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    let state = state.clone();
    Mock::given(method("GET"))
        .and(path_regex(r"^/lists/[^/]+/tasks$"))
        .respond_with(move |req: &Request| {
            let list_id = path_segment(req, 1);
            let query = query_map(req);
            let show_completed = query.get("showCompleted").map(String::as_str) == Some("true");

            let state = state.lock().unwrap();
            let items: Vec<Value> = state
                .tasks
                .iter()
                .filter(|t| t.list_id == list_id)
                .filter(|t| {
                    if show_completed {
                        t.status == "completed"
                    } else {
                        t.status != "completed"
                    }
                })
                .map(|t| task_json(&state, t))
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({ "items": items }))
        })
        .mount(server)
        .await;
}

async fn mount_insert_task(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    let state = state.clone();
    Mock::given(method("POST"))
        .and(path_regex(r"^/lists/[^/]+/tasks$"))
        .respond_with(move |req: &Request| {
            let list_id = path_segment(req, 1);
            let body: Value = serde_json::from_slice(&req.body).unwrap_or_default();
            let title = body["title"].as_str().unwrap_or("").to_string();

            let mut state = state.lock().unwrap();
            if state.fail_insert_titles.contains(&title) {
                return ResponseTemplate::new(500).set_body_string("insert refused");
            }

            let id = state.alloc_id("task");
            let task = StoredTask {
                id: id.clone(),
                list_id: list_id.clone(),
                title,
                notes: body["notes"].as_str().unwrap_or("").to_string(),
                status: body["status"].as_str().unwrap_or("needsAction").to_string(),
                parent: String::new(),
            };
            // The API places fresh tasks at the top of the list; order is
            // only fixed later by move calls.
            let insert_at = state
                .tasks
                .iter()
                .position(|t| t.list_id == list_id && t.parent.is_empty())
                .unwrap_or(state.tasks.len());
            state.tasks.insert(insert_at, task);

            let response = task_json(&state, &state.tasks[insert_at]);
            ResponseTemplate::new(200).set_body_json(response)
        })
        .mount(server)
        .await;
}

async fn mount_move_task(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    let state = state.clone();
    Mock::given(method("POST"))
        .and(path_regex(r"^/lists/[^/]+/tasks/[^/]+/move$"))
        .respond_with(move |req: &Request| {
            let list_id = path_segment(req, 1);
            let task_id = path_segment(req, 3);
            let query = query_map(req);
            let parent = query.get("parent").cloned().unwrap_or_default();
            let previous = query.get("previous").cloned().unwrap_or_default();

            let mut state = state.lock().unwrap();
            let failing = state
                .find_task(&list_id, &task_id)
                .map(|i| state.fail_move_titles.contains(&state.tasks[i].title))
                .unwrap_or(false);
            if failing {
                return ResponseTemplate::new(500).set_body_string("move refused");
            }

            state.moves.push(MoveCall {
                list_id: list_id.clone(),
                task_id: task_id.clone(),
                parent: parent.clone(),
                previous: previous.clone(),
            });

            if !state.apply_move(&list_id, &task_id, &parent, &previous) {
                return ResponseTemplate::new(404).set_body_string("task not found");
            }

            let index = state.find_task(&list_id, &task_id).unwrap();
            let response = task_json(&state, &state.tasks[index]);
            ResponseTemplate::new(200).set_body_json(response)
        })
        .mount(server)
        .await;
}

async fn mount_patch_task(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    let state = state.clone();
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/lists/[^/]+/tasks/[^/]+$"))
        .respond_with(move |req: &Request| {
            let list_id = path_segment(req, 1);
            let task_id = path_segment(req, 3);
            let body: Value = serde_json::from_slice(&req.body).unwrap_or_default();

            let mut state = state.lock().unwrap();
            let Some(index) = state.find_task(&list_id, &task_id) else {
                return ResponseTemplate::new(404).set_body_string("task not found");
            };

            if let Some(title) = body["title"].as_str() {
                state.tasks[index].title = title.to_string();
            }
            if let Some(notes) = body["notes"].as_str() {
                state.tasks[index].notes = notes.to_string();
            }
            if let Some(status) = body["status"].as_str() {
                state.tasks[index].status = status.to_string();
            }
            state.patched.push(task_id.clone());

            let response = task_json(&state, &state.tasks[index]);
            ResponseTemplate::new(200).set_body_json(response)
        })
        .mount(server)
        .await;
}

async fn mount_delete_task(server: &MockServer, state: &Arc<Mutex<ServerState>>) {
    let state = state.clone();
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/lists/[^/]+/tasks/[^/]+$"))
        .respond_with(move |req: &Request| {
            let list_id = path_segment(req, 1);
            let task_id = path_segment(req, 3);

            let mut state = state.lock().unwrap();
            let before = state.tasks.len();
            state
                .tasks
                .retain(|t| !(t.list_id == list_id && t.id == task_id));
            if state.tasks.len() == before {
                return ResponseTemplate::new(404).set_body_string("task not found");
            }
            // Children of a deleted task disappear with it.
            state
                .tasks
                .retain(|t| !(t.list_id == list_id && t.parent == task_id));
            ResponseTemplate::new(204)
        })
        .mount(server)
        .await;
}
