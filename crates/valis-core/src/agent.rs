//! Agent, the persona envelope every lifecycle record hangs off.
//!
//! Personas are created by the surrounding application; this core only needs
//! their identity and display metadata. Mortality and personality state are
//! keyed by the same UUID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
  pub agent_id:   Uuid,
  pub name:       String,
  pub bio:        Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::VitalStore::add_agent`].
/// The UUID and `created_at` timestamp are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAgent {
  pub name: String,
  #[serde(default)]
  pub bio:  Option<String>,
}

impl NewAgent {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), bio: None }
  }
}
