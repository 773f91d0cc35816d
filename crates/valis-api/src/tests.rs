use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use valis_engine::Valis;
use valis_store_sqlite::SqliteStore;

use super::*;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(Valis::new(Arc::new(store))))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

async fn create_agent(app: &Router, name: &str) -> String {
  let (status, body) = call(app, "POST", "/agents", Some(json!({ "name": name }))).await;
  assert_eq!(status, StatusCode::CREATED);
  body["agent_id"].as_str().unwrap().to_owned()
}

// ── Agents ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_agent() {
  let app = app().await;
  let (status, created) =
    call(&app, "POST", "/agents", Some(json!({ "name": "Ada", "bio": "first" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  let id = created["agent_id"].as_str().unwrap();

  let (status, fetched) = call(&app, "GET", &format!("/agents/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched["name"], "Ada");
  assert_eq!(fetched["bio"], "first");
}

#[tokio::test]
async fn missing_agent_is_404_with_error_body() {
  let app = app().await;
  let (status, body) = call(&app, "GET", &format!("/agents/{}", uuid::Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn blank_agent_name_is_rejected() {
  let app = app().await;
  let (status, body) = call(&app, "POST", "/agents", Some(json!({ "name": "  " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

// ── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn lifecycle_over_http() {
  let app = app().await;
  let id = create_agent(&app, "Ada").await;
  let mortality = format!("/agents/{id}/mortality");

  let (status, body) =
    call(&app, "POST", &mortality, Some(json!({ "lifespan": 3, "units": "sessions" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["status"], "initialized");

  let (status, body) = call(&app, "POST", &mortality, Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "already_mortal");

  let (_, body) = call(&app, "GET", &mortality, None).await;
  assert_eq!(body["status"], "alive");

  let (status, body) =
    call(&app, "POST", &format!("{mortality}/decrement"), Some(json!({ "amount": 3 }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["lifespan_remaining"], 0);
  assert_eq!(body["death_triggered"], true);

  let (status, body) = call(&app, "POST", &format!("/agents/{id}/death"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "death_processed");
  assert_eq!(body["death_cause"], "natural");

  let (_, body) = call(&app, "POST", &format!("/agents/{id}/death"), Some(json!({}))).await;
  assert_eq!(body["status"], "already_dead");

  let (_, body) = call(&app, "GET", &mortality, None).await;
  assert_eq!(body["status"], "dead");

  let (status, body) = call(
    &app,
    "POST",
    &format!("/agents/{id}/rebirth"),
    Some(json!({ "inheritance_type": "partial_traits" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["status"], "reborn");
  assert_eq!(body["generation_number"], 2);

  let (status, body) =
    call(&app, "POST", &format!("/agents/{id}/rebirth"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "already_reborn");

  let (_, lineage) = call(&app, "GET", &format!("/agents/{id}/lineage"), None).await;
  assert_eq!(lineage["generation_number"], 1);
  assert_eq!(lineage["descendants"].as_array().unwrap().len(), 1);

  let today = Utc::now().date_naive();
  let (status, stats) = call(&app, "GET", &format!("/statistics/{today}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["total_births"], 2);
  assert_eq!(stats["total_deaths"], 1);
}

#[tokio::test]
async fn lifecycle_errors_map_to_status_codes() {
  let app = app().await;
  let id = create_agent(&app, "Iris").await;

  // No mortality record yet.
  let (status, _) =
    call(&app, "POST", &format!("/agents/{id}/mortality/decrement"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = call(&app, "POST", &format!("/agents/{id}/legacy"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  call(&app, "POST", &format!("/agents/{id}/mortality"), Some(json!({}))).await;
  let (status, body) = call(
    &app,
    "POST",
    &format!("/agents/{id}/mortality/decrement"),
    Some(json!({ "amount": 0 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("amount"));

  let (status, body) = call(&app, "POST", &format!("/agents/{id}/rebirth"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ancestor_not_dead");

  let (status, body) = call(&app, "POST", &format!("/agents/{id}/legacy"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["finalized"], false);

  let (status, _) = call(&app, "GET", "/statistics/not-a-date", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bodiless_posts_use_defaults() {
  let app = app().await;
  let id = create_agent(&app, "Juno").await;

  let (status, body) = call(&app, "POST", &format!("/agents/{id}/mortality"), None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["lifespan_total"], 720);

  let (status, body) =
    call(&app, "POST", &format!("/agents/{id}/mortality/decrement"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["lifespan_remaining"], 719);

  let (status, body) = call(&app, "POST", &format!("/agents/{id}/legacy"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["finalized"], false);

  let (status, body) = call(&app, "POST", &format!("/agents/{id}/death"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "death_processed");

  let (status, body) = call(&app, "POST", &format!("/agents/{id}/rebirth"), None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["status"], "reborn");

  let persona = uuid::Uuid::new_v4();
  let (status, _) = call(&app, "POST", &format!("/personas/{persona}/personality"), None).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) =
    call(&app, "POST", &format!("/personas/{persona}/modifiers/decay"), None).await;
  assert_eq!(status, StatusCode::OK);
}

// ── Personas ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn drift_over_http() {
  let app = app().await;
  let id = uuid::Uuid::new_v4();
  let drift = format!("/personas/{id}/drift");
  let input = json!({
    "session_id": "s1",
    "transcript": [{ "speaker": "user", "content": "I love this, amazing" }],
    "feedback": [{ "type": "negative", "content": "You were too chatty" }],
  });

  let (status, body) = call(&app, "POST", &drift, Some(input.clone())).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["status"], "failed");

  let (status, body) = call(
    &app,
    "POST",
    &format!("/personas/{id}/personality"),
    Some(json!({ "traits": { "openness": 0.8 } })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["status"], "initialized");

  let (status, body) = call(&app, "POST", &drift, Some(input)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "updated");

  let (status, export) = call(&app, "GET", &format!("/personas/{id}/traits"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(export["current_traits"]["openness"], 0.8);
  assert!(!export["recent_history"].as_array().unwrap().is_empty());

  let (status, body) =
    call(&app, "POST", &format!("/personas/{id}/modifiers/decay"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["dropped"].as_array().unwrap().is_empty());

  let (status, _) = call(
    &app,
    "POST",
    &format!("/personas/{id}/modifiers/decay"),
    Some(json!({ "days_threshold": -1 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reflection_scores_are_validated() {
  let app = app().await;
  let uri = format!("/personas/{}/reflections", uuid::Uuid::new_v4());

  let (status, _) = call(
    &app,
    "POST",
    &uri,
    Some(json!({ "session_id": "s1", "content": "ok", "success_score": 1.5 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = call(
    &app,
    "POST",
    &uri,
    Some(json!({ "session_id": "s1", "content": "felt calm", "alignment_score": 0.9 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["content"], "felt calm");
}
