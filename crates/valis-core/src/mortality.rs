//! Mortality records and the final thoughts written at death.
//!
//! An agent is alive while `death_date` is null. Once stamped, the death
//! fields never change; only `rebirth_id` may still be set afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ─── Units ───────────────────────────────────────────────────────────────────

/// The unit a lifespan is counted in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LifespanUnits {
  #[default]
  Hours,
  Sessions,
}

impl LifespanUnits {
  /// Built-in allotment when the caller does not specify one.
  pub fn default_lifespan(self) -> i64 {
    match self {
      Self::Hours => 720,
      Self::Sessions => 100,
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One per agent, created at mortality initialisation.
///
/// Invariant: `0 <= lifespan_remaining <= lifespan_total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortalityRecord {
  pub agent_id:           Uuid,
  pub lifespan_total:     i64,
  pub lifespan_remaining: i64,
  pub lifespan_units:     LifespanUnits,
  pub birth_timestamp:    DateTime<Utc>,
  /// `None` while the agent is alive.
  pub death_date:         Option<DateTime<Utc>>,
  pub death_cause:        Option<String>,
  /// The descendant created by rebirth, once one exists.
  pub rebirth_id:         Option<Uuid>,
}

impl MortalityRecord {
  /// A fresh, fully-allotted record for a newborn agent.
  pub fn new(agent_id: Uuid, lifespan: i64, units: LifespanUnits) -> Self {
    Self {
      agent_id,
      lifespan_total: lifespan,
      lifespan_remaining: lifespan,
      lifespan_units: units,
      birth_timestamp: crate::now(),
      death_date: None,
      death_cause: None,
      rebirth_id: None,
    }
  }

  pub fn is_dead(&self) -> bool { self.death_date.is_some() }

  /// Share of the allotment already used, in percent. Always 100 once dead.
  pub fn percentage_lived(&self) -> f64 {
    if self.is_dead() {
      return 100.0;
    }
    percentage_lived(self.lifespan_total, self.lifespan_remaining)
  }
}

/// `(total - remaining) / total * 100`, or 0 for an empty allotment.
pub fn percentage_lived(total: i64, remaining: i64) -> f64 {
  if total <= 0 {
    return 0.0;
  }
  (total - remaining) as f64 / total as f64 * 100.0
}

// ─── Final thoughts ──────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThoughtType {
  FinalReflection,
  LegacyStatement,
  DeathDream,
}

/// A timestamped thought written during death processing. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalThought {
  pub thought_id:      Uuid,
  pub agent_id:        Uuid,
  pub thought_type:    ThoughtType,
  pub content:         String,
  /// In `[0, 1]`.
  pub symbolic_weight: f64,
  pub recorded_at:     DateTime<Utc>,
}

impl FinalThought {
  pub fn new(
    agent_id: Uuid,
    thought_type: ThoughtType,
    content: impl Into<String>,
    symbolic_weight: f64,
  ) -> Self {
    Self {
      thought_id: Uuid::new_v4(),
      agent_id,
      thought_type,
      content: content.into(),
      symbolic_weight: symbolic_weight.clamp(0.0, 1.0),
      recorded_at: crate::now(),
    }
  }
}
