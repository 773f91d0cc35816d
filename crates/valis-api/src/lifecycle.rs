//! Handlers for the mortality lifecycle of one agent.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/agents/:id/mortality` | `not_mortal`, `alive`, or `dead` |
//! | `POST` | `/agents/:id/mortality` | Body: `{"lifespan":720,"units":"hours"}`, both optional; 201 on first call |
//! | `POST` | `/agents/:id/mortality/decrement` | Body: `{"amount":1}` (optional) |
//! | `POST` | `/agents/:id/death` | Body: `{"cause":"natural"}` (optional) |
//! | `POST` | `/agents/:id/legacy` | Body: `{"finalize":false}` (optional) |
//! | `POST` | `/agents/:id/rebirth` | Body: [`RebirthOptions`]; 201 when a descendant is created |
//!
//! Every body may be omitted entirely.
//!
//! Idempotent outcomes (`already_mortal`, `already_dead`, `ancestor_not_dead`,
//! `already_reborn`) are `200 OK` with a `status` field, never errors.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use valis_core::{mortality::LifespanUnits, store::VitalStore};
use valis_engine::{
  DeathOutcome, LegacyReport, LifespanTick, MortalityInit, MortalityStatus, RebirthOptions,
  RebirthOutcome, Valis,
};

use crate::{error::ApiError, or_default};

// ─── Status ───────────────────────────────────────────────────────────────────

/// `GET /agents/:id/mortality`
pub async fn status<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<MortalityStatus>, ApiError> {
  Ok(Json(valis.lifespan.get_mortality_status(id).await?))
}

// ─── Initialize ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InitializeBody {
  /// Falls back to the configured default for `units`.
  pub lifespan: Option<i64>,
  pub units:    LifespanUnits,
}

/// `POST /agents/:id/mortality`
pub async fn initialize<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  body: Option<Json<InitializeBody>>,
) -> Result<impl IntoResponse, ApiError> {
  let body = or_default(body);
  let outcome = valis
    .lifespan
    .initialize_mortality(id, body.lifespan, body.units)
    .await?;
  let code = match outcome {
    MortalityInit::Initialized { .. } => StatusCode::CREATED,
    MortalityInit::AlreadyMortal { .. } => StatusCode::OK,
  };
  Ok((code, Json(outcome)))
}

// ─── Decrement ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DecrementBody {
  pub amount: i64,
}

impl Default for DecrementBody {
  fn default() -> Self { Self { amount: 1 } }
}

/// `POST /agents/:id/mortality/decrement`
pub async fn decrement<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  body: Option<Json<DecrementBody>>,
) -> Result<Json<LifespanTick>, ApiError> {
  let body = or_default(body);
  Ok(Json(valis.lifespan.decrement_lifespan(id, body.amount).await?))
}

// ─── Death ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DeathBody {
  #[serde(default)]
  pub cause: Option<String>,
}

/// `POST /agents/:id/death`
pub async fn death<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  body: Option<Json<DeathBody>>,
) -> Result<Json<DeathOutcome>, ApiError> {
  let cause = or_default(body).cause.unwrap_or_default();
  Ok(Json(valis.death.trigger_death(id, &cause).await?))
}

// ─── Legacy ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LegacyBody {
  #[serde(default)]
  pub finalize: bool,
}

/// `POST /agents/:id/legacy`
pub async fn legacy<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  body: Option<Json<LegacyBody>>,
) -> Result<Json<LegacyReport>, ApiError> {
  let finalize = or_default(body).finalize;
  Ok(Json(valis.legacy.generate_legacy_score(id, finalize).await?))
}

// ─── Rebirth ──────────────────────────────────────────────────────────────────

/// `POST /agents/:id/rebirth`
pub async fn rebirth<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(id): Path<Uuid>,
  options: Option<Json<RebirthOptions>>,
) -> Result<impl IntoResponse, ApiError> {
  let outcome = valis.rebirth.agent_rebirth(id, or_default(options)).await?;
  let code = match outcome {
    RebirthOutcome::Reborn(_) => StatusCode::CREATED,
    _ => StatusCode::OK,
  };
  Ok((code, Json(outcome)))
}
