//! HTTP layer for Redress.
//!
//! Exposes an axum [`Router`] with JSON REST endpoints backed by any
//! [`ComplaintStore`], plus HTTP Basic-auth actor resolution and the CSV
//! export projection.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use redress_core::{engine::LifecycleEngine, store::ComplaintStore};

use handlers::{
  actors, categories, complaints, export, feedback, notifications, stats,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` (and
/// `REDRESS_*` environment overrides).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Bootstrap admin: created at startup if missing.
  pub admin_username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub admin_password_hash: String,
  /// Passed through to [`EngineConfig`](redress_core::engine::EngineConfig).
  #[serde(default)]
  pub allow_reopen:        bool,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ComplaintStore> {
  pub engine: Arc<LifecycleEngine<S>>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the full API surface.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Actors
    .route("/api/register", post(actors::register::<S>))
    .route("/api/actors", post(actors::create::<S>))
    // Complaints
    .route(
      "/api/complaints",
      get(complaints::list::<S>).post(complaints::create::<S>),
    )
    .route("/api/complaints/{no}", get(complaints::get_one::<S>))
    .route("/api/complaints/{no}/assign", post(complaints::assign::<S>))
    .route("/api/complaints/{no}/status", post(complaints::set_status::<S>))
    .route("/api/complaints/{no}/reopen", post(complaints::reopen::<S>))
    .route("/api/complaints/{no}/history", get(complaints::history::<S>))
    .route(
      "/api/complaints/{no}/feedback",
      get(feedback::get_one::<S>).post(feedback::create::<S>),
    )
    // Categories
    .route(
      "/api/categories",
      get(categories::list::<S>).post(categories::create::<S>),
    )
    // Notifications
    .route("/api/notifications", get(notifications::list::<S>))
    .route(
      "/api/notifications/{id}/read",
      post(notifications::mark_read::<S>),
    )
    // Dashboards and reporting
    .route("/api/stats", get(stats::handler::<S>))
    .route("/api/export", get(export::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::body::Body;
  use axum::http::{Request, StatusCode, header};
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use redress_core::actor::{NewActor, Role};
  use redress_core::engine::EngineConfig;
  use redress_core::store::ComplaintStore as _;
  use redress_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use crate::auth::hash_password;

  const ADMIN: (&str, &str) = ("admin", "admin-secret");

  async fn make_state(allow_reopen: bool) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .add_actor(NewActor {
        username:      ADMIN.0.to_string(),
        display_name:  "Admin".to_string(),
        role:          Role::Admin,
        password_hash: hash_password(ADMIN.1).unwrap(),
      })
      .await
      .unwrap();

    AppState {
      engine: Arc::new(LifecycleEngine::new(
        Arc::new(store),
        EngineConfig { allow_reopen },
      )),
      config: Arc::new(ServerConfig {
        host:                "127.0.0.1".to_string(),
        port:                8080,
        store_path:          PathBuf::from(":memory:"),
        admin_username:      ADMIN.0.to_string(),
        admin_password_hash: hash_password(ADMIN.1).unwrap(),
        allow_reopen,
      }),
    }
  }

  fn basic(creds: (&str, &str)) -> String {
    format!("Basic {}", B64.encode(format!("{}:{}", creds.0, creds.1)))
  }

  async fn send(
    state: &AppState<SqliteStore>,
    method: &str,
    uri: &str,
    auth: Option<(&str, &str)>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(creds) = auth {
      builder = builder.header(header::AUTHORIZATION, basic(creds));
    }
    let request = match body {
      Some(value) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state.clone()).oneshot(request).await.unwrap()
  }

  async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  /// Register a student or faculty actor through the open endpoint.
  async fn register(state: &AppState<SqliteStore>, username: &str, role: &str) {
    let response = send(
      state,
      "POST",
      "/api/register",
      None,
      Some(json!({
        "username": username,
        "display_name": username,
        "password": format!("{username}-secret"),
        "role": role,
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
  }

  async fn seed_category(state: &AppState<SqliteStore>) -> String {
    let response = send(
      state,
      "POST",
      "/api/categories",
      Some(ADMIN),
      Some(json!({ "name": "Network" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["category_id"]
      .as_str()
      .unwrap()
      .to_string()
  }

  /// File a complaint as `creds` and return its identifier.
  async fn file_complaint(
    state: &AppState<SqliteStore>,
    creds: (&str, &str),
    category_id: &str,
  ) -> String {
    let response = send(
      state,
      "POST",
      "/api/complaints",
      Some(creds),
      Some(json!({
        "title": "Network Issue",
        "description": "Dorm wifi drops every few minutes",
        "category_id": category_id,
        "priority": "high",
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["complaint_no"]
      .as_str()
      .unwrap()
      .to_string()
  }

  // ── Auth ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let state = make_state(false).await;
    let response = send(&state, "GET", "/api/complaints", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn wrong_password_returns_401() {
    let state = make_state(false).await;
    let response = send(
      &state,
      "GET",
      "/api/complaints",
      Some(("admin", "wrong")),
      None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn registration_rejects_admin_role() {
    let state = make_state(false).await;
    let response = send(
      &state,
      "POST",
      "/api/register",
      None,
      Some(json!({
        "username": "mallory",
        "display_name": "Mallory",
        "password": "mallory-secret",
        "role": "admin",
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["kind"], "validation");
  }

  #[tokio::test]
  async fn duplicate_registration_conflicts() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;
    let response = send(
      &state,
      "POST",
      "/api/register",
      None,
      Some(json!({
        "username": "alice",
        "display_name": "Alice Again",
        "password": "alice-secret",
        "role": "student",
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["kind"], "conflict");
  }

  // ── Full workflow over HTTP ──────────────────────────────────────────────

  #[tokio::test]
  async fn complaint_workflow_end_to_end() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;
    register(&state, "bob", "faculty").await;
    let category = seed_category(&state).await;

    let alice = ("alice", "alice-secret");
    let bob = ("bob", "bob-secret");

    // Alice files; the identifier follows the public contract.
    let no = file_complaint(&state, alice, &category).await;
    let today = chrono::Utc::now().date_naive().format("%Y%m%d").to_string();
    assert_eq!(no, format!("CMP-{today}-000001"));

    // Admin assigns Bob (assignment is by actor id).
    let bob_id = state
      .engine
      .store()
      .actor_by_username("bob")
      .await
      .unwrap()
      .unwrap()
      .actor_id
      .to_string();

    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/assign"),
      Some(ADMIN),
      Some(json!({ "assignee_id": bob_id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let assigned = body_json(response).await;
    assert_eq!(assigned["status"], "in_progress");

    // Bob resolves with a remark.
    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/status"),
      Some(bob),
      Some(json!({ "status": "resolved", "remark": "Fixed router" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "resolved");

    // Bob cannot close.
    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/status"),
      Some(bob),
      Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["kind"], "permission");

    // Alice leaves feedback once; the second attempt conflicts.
    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/feedback"),
      Some(alice),
      Some(json!({ "rating": 4, "comment": "quick fix" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/feedback"),
      Some(alice),
      Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["kind"], "conflict");

    // Admin closes; the trail has exactly four entries, strictly forward.
    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/status"),
      Some(ADMIN),
      Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
      &state,
      "GET",
      &format!("/api/complaints/{no}/history"),
      Some(alice),
      None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let trail = body_json(response).await;
    let entries = trail.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    let to_statuses: Vec<&str> = entries
      .iter()
      .map(|e| e["to_status"].as_str().unwrap())
      .collect();
    assert_eq!(
      to_statuses,
      vec!["pending", "in_progress", "resolved", "closed"]
    );

    // Feedback reads back.
    let response = send(
      &state,
      "GET",
      &format!("/api/complaints/{no}/feedback"),
      Some(alice),
      None,
    )
    .await;
    assert_eq!(body_json(response).await["rating"], 4);
  }

  #[tokio::test]
  async fn skipping_a_state_returns_409_with_state_kind() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;
    let category = seed_category(&state).await;
    let no = file_complaint(&state, ("alice", "alice-secret"), &category).await;

    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/status"),
      Some(ADMIN),
      Some(json!({ "status": "resolved", "remark": "skip ahead" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["kind"], "state");
  }

  #[tokio::test]
  async fn stale_observed_status_returns_409_with_conflict_kind() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;
    let category = seed_category(&state).await;
    let no = file_complaint(&state, ("alice", "alice-secret"), &category).await;

    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/status"),
      Some(ADMIN),
      Some(json!({
        "status": "resolved",
        "remark": "late",
        "observed_status": "in_progress",
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["kind"], "conflict");
  }

  #[tokio::test]
  async fn foreign_complaints_read_as_missing() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;
    register(&state, "dana", "student").await;
    let category = seed_category(&state).await;
    let no = file_complaint(&state, ("alice", "alice-secret"), &category).await;

    let response = send(
      &state,
      "GET",
      &format!("/api/complaints/{no}"),
      Some(("dana", "dana-secret")),
      None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Dana's list is empty; Alice's is not.
    let response =
      send(&state, "GET", "/api/complaints", Some(("dana", "dana-secret")), None)
        .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
    let response = send(
      &state,
      "GET",
      "/api/complaints",
      Some(("alice", "alice-secret")),
      None,
    )
    .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn reopen_respects_configuration() {
    let state = make_state(true).await;
    register(&state, "alice", "student").await;
    register(&state, "bob", "faculty").await;
    let category = seed_category(&state).await;
    let no = file_complaint(&state, ("alice", "alice-secret"), &category).await;

    let bob_id = state
      .engine
      .store()
      .actor_by_username("bob")
      .await
      .unwrap()
      .unwrap()
      .actor_id
      .to_string();

    send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/assign"),
      Some(ADMIN),
      Some(json!({ "assignee_id": bob_id })),
    )
    .await;
    send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/status"),
      Some(("bob", "bob-secret")),
      Some(json!({ "status": "resolved", "remark": "done" })),
    )
    .await;

    // Faculty may not reopen.
    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/reopen"),
      Some(("bob", "bob-secret")),
      Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin may.
    let response = send(
      &state,
      "POST",
      &format!("/api/complaints/{no}/reopen"),
      Some(ADMIN),
      Some(json!({ "remark": "came back" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "in_progress");
  }

  #[tokio::test]
  async fn category_creation_is_admin_only() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;

    let response = send(
      &state,
      "POST",
      "/api/categories",
      Some(("alice", "alice-secret")),
      Some(json!({ "name": "Library" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["kind"], "permission");
  }

  #[tokio::test]
  async fn stats_reflect_the_actor_slice() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;
    register(&state, "dana", "student").await;
    let category = seed_category(&state).await;
    file_complaint(&state, ("alice", "alice-secret"), &category).await;
    file_complaint(&state, ("dana", "dana-secret"), &category).await;

    let response = send(&state, "GET", "/api/stats", Some(ADMIN), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["pending"], 2);

    let response = send(
      &state,
      "GET",
      "/api/stats",
      Some(("alice", "alice-secret")),
      None,
    )
    .await;
    assert_eq!(body_json(response).await["total"], 1);
  }

  #[tokio::test]
  async fn notifications_arrive_and_can_be_marked_read() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;
    let category = seed_category(&state).await;
    file_complaint(&state, ("alice", "alice-secret"), &category).await;

    let response = send(
      &state,
      "GET",
      "/api/notifications?unread=true",
      Some(ADMIN),
      None,
    )
    .await;
    let inbox = body_json(response).await;
    let entries = inbox.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    let id = entries[0]["notification_id"].as_str().unwrap().to_string();

    let response = send(
      &state,
      "POST",
      &format!("/api/notifications/{id}/read"),
      Some(ADMIN),
      None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
      &state,
      "GET",
      "/api/notifications?unread=true",
      Some(ADMIN),
      None,
    )
    .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn export_returns_csv_for_admins_only() {
    let state = make_state(false).await;
    register(&state, "alice", "student").await;
    let category = seed_category(&state).await;
    let no = file_complaint(&state, ("alice", "alice-secret"), &category).await;

    let response = send(
      &state,
      "GET",
      "/api/export",
      Some(("alice", "alice-secret")),
      None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
      send(&state, "GET", "/api/export?history=true", Some(ADMIN), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
      .headers()
      .get(header::CONTENT_TYPE)
      .unwrap()
      .to_str()
      .unwrap()
      .to_string();
    assert!(content_type.contains("text/csv"), "Content-Type: {content_type}");
    assert!(response.headers().contains_key(header::CONTENT_DISPOSITION));

    let body = body_text(response).await;
    assert!(body.starts_with("complaint_no,title,status"), "body: {body}");
    assert!(body.contains(&no), "body: {body}");
    // The history section follows after a blank line.
    assert!(body.contains("\n\n"), "body: {body}");
    assert!(body.contains("created"), "body: {body}");
  }
}
