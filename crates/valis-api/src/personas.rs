//! Handlers for `/personas` endpoints: personality state and trait drift.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/personas/:id/personality` | Body: `{"traits":{...}}` (optional); 201 on first call |
//! | `POST` | `/personas/:id/drift` | Body: [`DriftInput`]; 422 with `status: failed` on error |
//! | `POST` | `/personas/:id/modifiers/decay` | Body: `{"days_threshold":7}` (optional) |
//! | `GET`  | `/personas/:id/traits` | Current traits, history window, velocity |
//! | `POST` | `/personas/:id/reflections` | Body: `{"session_id":"..","content":"..",..}`; returns 201 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use valis_core::{
  Error,
  cognition::NewReflection,
  personality::TraitVector,
  store::VitalStore,
};
use valis_engine::{
  DriftOutcome, Valis,
  drift::{DEFAULT_DECAY_DAYS, DecayReport, DriftInput, PersonalityInit, TraitExport},
};

use crate::{error::ApiError, or_default};

// ─── Personality ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PersonalityBody {
  #[serde(default)]
  pub traits: Option<TraitVector>,
}

/// `POST /personas/:id/personality`
pub async fn initialize<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  body: Option<Json<PersonalityBody>>,
) -> Result<impl IntoResponse, ApiError> {
  let outcome = valis.drift.initialize_personality(id, or_default(body).traits).await?;
  let code = match outcome {
    PersonalityInit::Initialized { .. } => StatusCode::CREATED,
    PersonalityInit::AlreadyInitialized { .. } => StatusCode::OK,
  };
  Ok((code, Json(outcome)))
}

// ─── Drift ────────────────────────────────────────────────────────────────────

/// `POST /personas/:id/drift`
///
/// Drift never raises; a failed update still carries a structured body.
pub async fn drift<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  Json(input): Json<DriftInput>,
) -> impl IntoResponse {
  let outcome = valis
    .drift
    .update_traits_from_dialogue(&input.session_id, id, &input.transcript, &input.feedback)
    .await;
  let code = match outcome {
    DriftOutcome::Updated(_) => StatusCode::OK,
    DriftOutcome::Failed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
  };
  (code, Json(outcome))
}

// ─── Decay ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DecayBody {
  pub days_threshold: i64,
}

impl Default for DecayBody {
  fn default() -> Self { Self { days_threshold: DEFAULT_DECAY_DAYS } }
}

/// `POST /personas/:id/modifiers/decay`
pub async fn decay<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  body: Option<Json<DecayBody>>,
) -> Result<Json<DecayReport>, ApiError> {
  let days = or_default(body).days_threshold;
  Ok(Json(valis.drift.decay_unused_modifiers(id, days).await?))
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// `GET /personas/:id/traits`
pub async fn traits<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TraitExport>, ApiError> {
  Ok(Json(valis.drift.export_evolving_traits(id).await?))
}

// ─── Reflections ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReflectionBody {
  pub session_id:      String,
  pub content:         String,
  pub success_score:   Option<f64>,
  pub alignment_score: Option<f64>,
}

/// `POST /personas/:id/reflections`
pub async fn reflect<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ReflectionBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewReflection {
    session_id:      body.session_id,
    persona_id:      id,
    content:         body.content,
    success_score:   body.success_score,
    alignment_score: body.alignment_score,
  };
  input.validate()?;

  let reflection = valis
    .store()
    .add_reflection(input)
    .await
    .map_err(Error::database("add_reflection"))?;
  Ok((StatusCode::CREATED, Json(reflection)))
}
