//! Handlers for `/agents` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/agents` | Body: `{"name":"Ada","bio":"..."}`; returns 201 |
//! | `GET`  | `/agents/:id` | 404 if not found |
//! | `GET`  | `/agents/:id/lineage` | Generation, ancestry edge, and descendants |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;
use valis_core::{
  Error,
  agent::{Agent, NewAgent},
  store::VitalStore,
};
use valis_engine::{Valis, rebirth::LineageView};

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /agents`
pub async fn create<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Json(body): Json<NewAgent>,
) -> Result<impl IntoResponse, ApiError> {
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("agent name must not be empty".into()));
  }
  let agent = valis
    .store()
    .add_agent(body)
    .await
    .map_err(Error::database("add_agent"))?;
  Ok((StatusCode::CREATED, Json(agent)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /agents/:id`
pub async fn get_one<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Agent>, ApiError> {
  let agent = valis
    .store()
    .get_agent(id)
    .await
    .map_err(Error::database("get_agent"))?
    .ok_or_else(|| ApiError::NotFound(format!("agent {id} not found")))?;
  Ok(Json(agent))
}

// ─── Lineage ──────────────────────────────────────────────────────────────────

/// `GET /agents/:id/lineage`
pub async fn lineage<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LineageView>, ApiError> {
  Ok(Json(valis.rebirth.lineage(id).await?))
}
