//! JSON REST API for VALIS.
//!
//! Exposes an axum [`Router`] over a [`Valis`] bundle backed by any
//! [`VitalStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", valis_api::api_router(valis.clone()))
//! ```

pub mod agents;
pub mod error;
pub mod lifecycle;
pub mod personas;
pub mod statistics;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use valis_core::store::VitalStore;
use valis_engine::Valis;

pub use error::ApiError;

/// Unwrap an optional JSON body; a request sent without one gets defaults.
fn or_default<T: Default>(body: Option<Json<T>>) -> T {
  body.map(|Json(b)| b).unwrap_or_default()
}

/// Build a fully-materialised API router for `valis`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(valis: Arc<Valis<S>>) -> Router<()>
where
  S: VitalStore + 'static,
{
  Router::new()
    // Agents
    .route("/agents", post(agents::create::<S>))
    .route("/agents/{id}", get(agents::get_one::<S>))
    .route("/agents/{id}/lineage", get(agents::lineage::<S>))
    // Lifecycle
    .route(
      "/agents/{id}/mortality",
      get(lifecycle::status::<S>).post(lifecycle::initialize::<S>),
    )
    .route("/agents/{id}/mortality/decrement", post(lifecycle::decrement::<S>))
    .route("/agents/{id}/death", post(lifecycle::death::<S>))
    .route("/agents/{id}/legacy", post(lifecycle::legacy::<S>))
    .route("/agents/{id}/rebirth", post(lifecycle::rebirth::<S>))
    // Personas
    .route("/personas/{id}/personality", post(personas::initialize::<S>))
    .route("/personas/{id}/drift", post(personas::drift::<S>))
    .route("/personas/{id}/modifiers/decay", post(personas::decay::<S>))
    .route("/personas/{id}/traits", get(personas::traits::<S>))
    .route("/personas/{id}/reflections", post(personas::reflect::<S>))
    // Statistics
    .route("/statistics/{date}", get(statistics::handler::<S>))
    .with_state(valis)
}

#[cfg(test)]
mod tests;
