//! Error types for `valis-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("persona not found: {0}")]
  PersonaNotFound(Uuid),

  #[error("legacy record not found: {0}")]
  LegacyNotFound(Uuid),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("database error during {op}: {source}")]
  Database {
    op:     &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a store failure with the name of the operation that issued it.
  ///
  /// Intended for `map_err`: `.map_err(Error::database("get_mortality"))?`.
  pub fn database<E>(op: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Database { op, source: Box::new(e) }
  }

  /// Fail validation unless `value` lies in `[0, 1]`.
  pub fn check_unit(field: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
      Ok(value)
    } else {
      Err(Self::Validation(format!("{field} must be within [0, 1], got {value}")))
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
