//! Configuration and HTTP wiring for the VALIS server binary.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use valis_core::store::VitalStore;
use valis_engine::{LifespanDefaults, Valis};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `valis.toml` layered under
/// `VALIS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub mortality:  MortalityConfig,
}

/// Default allotments for agents initialised without an explicit lifespan.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MortalityConfig {
  pub default_hours:    i64,
  pub default_sessions: i64,
}

impl Default for MortalityConfig {
  fn default() -> Self {
    let d = LifespanDefaults::default();
    Self { default_hours: d.hours, default_sessions: d.sessions }
  }
}

impl From<MortalityConfig> for LifespanDefaults {
  fn from(c: MortalityConfig) -> Self {
    Self { hours: c.default_hours, sessions: c.default_sessions }
  }
}

impl ServerConfig {
  /// Build the layered configuration. `file` is optional on disk.
  pub fn load(file: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 7420)?
      .set_default("store_path", "~/.local/share/valis/valis.db")?
      .add_source(config::File::from(file.into()).required(false))
      .add_source(
        config::Environment::with_prefix("VALIS")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;
    settings.try_deserialize::<Self>()?.validated()
  }

  fn validated(self) -> Result<Self, config::ConfigError> {
    let m = self.mortality;
    if m.default_hours <= 0 || m.default_sessions <= 0 {
      return Err(config::ConfigError::Message(format!(
        "mortality defaults must be positive, got {} hours / {} sessions",
        m.default_hours, m.default_sessions
      )));
    }
    Ok(self)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full HTTP application: the JSON API under `/api`, traced.
pub fn router<S>(valis: Arc<Valis<S>>) -> Router
where
  S: VitalStore + 'static,
{
  Router::new()
    .nest("/api", valis_api::api_router(valis))
    .layer(TraceLayer::new_for_http())
}
