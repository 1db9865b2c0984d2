//! In-process stand-in for the BFF, used by client and app tests.
//!
//! Mirrors the real BFF's routes and cookie behavior: login issues a
//! `session_id` cookie, protected routes answer 401 `{"detail": ...}`
//! without it. `fail` forces a canned response for a path so tests can
//! exercise each error class.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::net::types::{Item, User};

const SESSION_COOKIE: &str = "session_id";

#[derive(Default)]
pub struct FakeState {
    sessions: Mutex<HashMap<String, User>>,
    items: Mutex<Vec<Item>>,
    next_user_id: Mutex<u64>,
    overrides: Mutex<HashMap<String, (StatusCode, Value)>>,
    hits: Mutex<Vec<String>>,
}

pub struct FakeBff {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeBff {
    /// Start on an ephemeral port with the backend's two seed items.
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());
        *state.items.lock().unwrap() = vec![
            Item { id: 1, name: "Item 1".into(), description: Some("This is item 1".into()) },
            Item { id: 2, name: "Item 2".into(), description: Some("This is item 2".into()) },
        ];

        let app = Router::new()
            .route("/", get(root))
            .route("/auth/login", axum::routing::post(login))
            .route("/auth/logout", get(logout))
            .route("/auth/me", get(me))
            .route("/api/items", get(list_items).post(create_item))
            .route("/api/items/{id}", get(read_item))
            .route("/echo-headers", get(echo_headers))
            .route("/plain", get(plain))
            .route("/broken-json", get(broken_json))
            .layer(middleware::from_fn_with_state(state.clone(), intercept))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}"), state }
    }

    /// Answer every request to `path` with `status` and `body` from now on.
    pub fn fail(&self, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap();
        self.state.overrides.lock().unwrap().insert(path.to_owned(), (status, body));
    }

    /// `"METHOD /path"` for every request received, oldest first.
    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn active_sessions(&self) -> usize {
        self.state.sessions.lock().unwrap().len()
    }
}

/// A base URL nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn intercept(State(state): State<Arc<FakeState>>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    state.hits.lock().unwrap().push(format!("{} {path}", req.method()));
    let forced = state.overrides.lock().unwrap().get(&path).cloned();
    match forced {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => next.run(req).await,
    }
}

fn session_user(state: &FakeState, jar: &CookieJar) -> Option<User> {
    let id = jar.get(SESSION_COOKIE)?.value().to_owned();
    state.sessions.lock().unwrap().get(&id).cloned()
}

fn not_authenticated() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Not authenticated" }))).into_response()
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "BFF API is running" }))
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(State(state): State<Arc<FakeState>>, jar: CookieJar, Json(body): Json<LoginBody>) -> Response {
    if body.username.is_empty() || body.password.is_empty() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid credentials" }))).into_response();
    }
    let user_id = {
        let mut next = state.next_user_id.lock().unwrap();
        *next += 1;
        next.to_string()
    };
    let user = User { user_id, username: body.username, roles: BTreeSet::from(["user".into()]) };
    let session_id = uuid::Uuid::new_v4().to_string();
    state.sessions.lock().unwrap().insert(session_id.clone(), user.clone());

    let cookie = Cookie::build((SESSION_COOKIE, session_id)).path("/").http_only(true);
    (jar.add(cookie), Json(json!({ "message": "Login successful", "user": user }))).into_response()
}

async fn logout(State(state): State<Arc<FakeState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.lock().unwrap().remove(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(json!({ "message": "Logged out successfully" }))).into_response()
}

async fn me(State(state): State<Arc<FakeState>>, jar: CookieJar) -> Response {
    match session_user(&state, &jar) {
        Some(user) => Json(user).into_response(),
        None => not_authenticated(),
    }
}

async fn list_items(State(state): State<Arc<FakeState>>, jar: CookieJar) -> Response {
    if session_user(&state, &jar).is_none() {
        return not_authenticated();
    }
    Json(state.items.lock().unwrap().clone()).into_response()
}

async fn read_item(State(state): State<Arc<FakeState>>, jar: CookieJar, Path(id): Path<i64>) -> Response {
    if session_user(&state, &jar).is_none() {
        return not_authenticated();
    }
    let found = state.items.lock().unwrap().iter().find(|item| item.id == id).cloned();
    match found {
        Some(item) => Json(item).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Item not found" }))).into_response(),
    }
}

async fn create_item(State(state): State<Arc<FakeState>>, jar: CookieJar, Json(item): Json<Item>) -> Response {
    if session_user(&state, &jar).is_none() {
        return not_authenticated();
    }
    state.items.lock().unwrap().push(item.clone());
    Json(item).into_response()
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let map: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_str().unwrap_or_default().to_owned())))
        .collect();
    Json(Value::Object(map))
}

async fn plain() -> &'static str {
    "pong"
}

async fn broken_json() -> Response {
    ([(axum::http::header::CONTENT_TYPE, "application/json")], "{not json").into_response()
}
