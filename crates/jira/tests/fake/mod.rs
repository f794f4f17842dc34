//! A fake Jira server.
//!
//! Serves a read-only subset of the REST v2 API from the JSON files under
//! `tests/testdata`: `project.json` holds the project list and
//! `issue/{KEY}.json` one issue each, comments included. Every request is
//! recorded so tests can assert on what the client sent.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as UrlPath, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use url::Url;

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct Logged {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

impl Logged {
    /// `HEAD /rest/api/2/issue/TEST-1` style summary
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Clone)]
struct AppState {
    projects: Arc<Vec<Value>>,
    issues: Arc<BTreeMap<String, Value>>,
    log: Arc<Mutex<Vec<Logged>>>,
    /// Expected `Authorization` header; None accepts anything
    auth: Option<String>,
}

pub struct FakeJira {
    pub api_root: Url,
    log: Arc<Mutex<Vec<Logged>>>,
    task: tokio::task::JoinHandle<()>,
}

impl FakeJira {
    pub async fn start() -> Self {
        Self::serve(None).await
    }

    /// Require HTTP basic auth with these credentials.
    pub async fn start_with_auth(header: &str) -> Self {
        Self::serve(Some(header.to_string())).await
    }

    async fn serve(auth: Option<String>) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let testdata = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/testdata");
        let state = AppState {
            projects: Arc::new(load_projects(&testdata)),
            issues: Arc::new(load_issues(&testdata)),
            log: Arc::new(Mutex::new(Vec::new())),
            auth,
        };
        let log = state.log.clone();

        let api = Router::new()
            .route("/project", get(list_projects))
            .route("/project/:key", get(get_project))
            .route("/search", get(search))
            .route("/issue/:key", get(get_issue))
            .route("/issue/:key/comment/:id", get(get_comment));
        let app = Router::new()
            .nest("/rest/api/2", api)
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            api_root: Url::parse(&format!("http://{}/rest/api/2", addr)).unwrap(),
            log,
            task,
        }
    }

    pub fn requests(&self) -> Vec<Logged> {
        self.log.lock().clone()
    }

    /// Request lines, e.g. `GET /rest/api/2/project`
    pub fn lines(&self) -> Vec<String> {
        self.log.lock().iter().map(Logged::line).collect()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

impl Drop for FakeJira {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn load_projects(testdata: &Path) -> Vec<Value> {
    let raw = std::fs::read_to_string(testdata.join("project.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn load_issues(testdata: &Path) -> BTreeMap<String, Value> {
    let mut issues = BTreeMap::new();
    for entry in std::fs::read_dir(testdata.join("issue")).unwrap() {
        let raw = std::fs::read_to_string(entry.unwrap().path()).unwrap();
        let issue: Value = serde_json::from_str(&raw).unwrap();
        let key = issue["key"].as_str().unwrap().to_string();
        issues.insert(key, issue);
    }
    issues
}

async fn record(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.log.lock().push(Logged {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        authorization: authorization.clone(),
    });

    if let Some(want) = &state.auth {
        if authorization.as_deref() != Some(want.as_str()) {
            return (StatusCode::UNAUTHORIZED, "authentication required").into_response();
        }
    }
    next.run(req).await
}

async fn list_projects(State(state): State<AppState>) -> Json<Value> {
    Json(Value::Array(state.projects.as_ref().clone()))
}

async fn get_project(State(state): State<AppState>, UrlPath(key): UrlPath<String>) -> Response {
    match state.projects.iter().find(|p| p["key"] == key.as_str()) {
        Some(p) => Json(p.clone()).into_response(),
        None => not_found(),
    }
}

/// Supports only `project = "KEY"` queries; anything else matches every
/// issue.
async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let project = params
        .get("jql")
        .and_then(|q| q.split('"').nth(1))
        .map(|p| format!("{}-", p));
    let issues: Vec<Value> = state
        .issues
        .iter()
        .filter(|(key, _)| project.as_ref().map_or(true, |p| key.starts_with(p.as_str())))
        .map(|(_, issue)| issue.clone())
        .collect();
    Json(json!({ "startAt": 0, "total": issues.len(), "issues": issues }))
}

async fn get_issue(State(state): State<AppState>, UrlPath(key): UrlPath<String>) -> Response {
    match state.issues.get(&key) {
        Some(issue) => Json(issue.clone()).into_response(),
        None => not_found(),
    }
}

async fn get_comment(
    State(state): State<AppState>,
    UrlPath((key, id)): UrlPath<(String, String)>,
) -> Response {
    let comment = state.issues.get(&key).and_then(|issue| {
        issue["fields"]["comment"]["comments"]
            .as_array()?
            .iter()
            .find(|c| c["id"] == id.as_str())
            .cloned()
    });
    match comment {
        Some(c) => Json(c).into_response(),
        None => not_found(),
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "errorMessages": ["Issue Does Not Exist"], "errors": {} })),
    )
        .into_response()
}
