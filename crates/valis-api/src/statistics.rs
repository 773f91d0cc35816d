//! `GET /statistics/:date`: daily birth and death counts.
//!
//! `date` is an ISO calendar date (`2026-10-16`). Days with no events return
//! zeroed counts rather than 404.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use valis_core::{stats::MortalityStatistics, store::VitalStore};
use valis_engine::Valis;

use crate::error::ApiError;

pub async fn handler<S: VitalStore>(
  State(valis): State<Arc<Valis<S>>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<MortalityStatistics>, ApiError> {
  Ok(Json(valis.statistics(date).await?))
}
