//! Lifespan initialisation, per-tick decrement, and status reporting.

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use valis_core::{
  Error, Result,
  legacy::{LegacyRecord, LegacyTier},
  mortality::{LifespanUnits, MortalityRecord, percentage_lived},
  stats::LifeEvent,
  store::VitalStore,
};

use crate::{record_life_event, require_id};

/// Allotments used when a caller does not specify a lifespan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifespanDefaults {
  pub hours:    i64,
  pub sessions: i64,
}

impl Default for LifespanDefaults {
  fn default() -> Self {
    Self {
      hours:    LifespanUnits::Hours.default_lifespan(),
      sessions: LifespanUnits::Sessions.default_lifespan(),
    }
  }
}

impl LifespanDefaults {
  pub fn for_units(&self, units: LifespanUnits) -> i64 {
    match units {
      LifespanUnits::Hours => self.hours,
      LifespanUnits::Sessions => self.sessions,
    }
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MortalityInit {
  Initialized {
    agent_id:        Uuid,
    lifespan_total:  i64,
    lifespan_units:  LifespanUnits,
    birth_timestamp: DateTime<Utc>,
  },
  AlreadyMortal {
    agent_id:           Uuid,
    lifespan_remaining: i64,
    lifespan_units:     LifespanUnits,
  },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LifespanTick {
  Decremented {
    agent_id:           Uuid,
    lifespan_total:     i64,
    lifespan_remaining: i64,
    death_triggered:    bool,
    percentage_lived:   f64,
  },
  AlreadyDead {
    agent_id:   Uuid,
    death_date: Option<DateTime<Utc>>,
  },
}

/// The legacy fields joined into a status report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LegacySnapshot {
  pub score:       f64,
  pub legacy_tier: LegacyTier,
  pub summary:     String,
  pub impact_tags: BTreeSet<String>,
  pub finalized:   bool,
}

impl From<LegacyRecord> for LegacySnapshot {
  fn from(r: LegacyRecord) -> Self {
    Self {
      finalized:   r.is_finalized(),
      score:       r.score,
      legacy_tier: r.legacy_tier,
      summary:     r.summary,
      impact_tags: r.impact_tags,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
  pub agent_id:           Uuid,
  pub lifespan_total:     i64,
  pub lifespan_remaining: i64,
  pub lifespan_units:     LifespanUnits,
  pub percentage_lived:   f64,
  pub birth_timestamp:    DateTime<Utc>,
  pub death_date:         Option<DateTime<Utc>>,
  pub death_cause:        Option<String>,
  pub rebirth_id:         Option<Uuid>,
  pub legacy:             LegacySnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MortalityStatus {
  NotMortal { agent_id: Uuid },
  Alive(Box<StatusReport>),
  Dead(Box<StatusReport>),
}

// ─── Evaluator ───────────────────────────────────────────────────────────────

pub struct LifespanEvaluator<S> {
  store:    Arc<S>,
  defaults: LifespanDefaults,
}

impl<S> Clone for LifespanEvaluator<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), defaults: self.defaults }
  }
}

impl<S: VitalStore> LifespanEvaluator<S> {
  pub fn new(store: Arc<S>, defaults: LifespanDefaults) -> Self {
    Self { store, defaults }
  }

  pub fn defaults(&self) -> LifespanDefaults { self.defaults }

  /// Give an agent a lifespan, a zeroed legacy record, and a birth.
  ///
  /// Idempotent: an agent that already has a mortality record is reported as
  /// `already_mortal` and left untouched.
  pub async fn initialize_mortality(
    &self,
    agent_id: Uuid,
    lifespan: Option<i64>,
    units: LifespanUnits,
  ) -> Result<MortalityInit> {
    let agent_id = require_id(agent_id)?;
    let lifespan = lifespan.unwrap_or_else(|| self.defaults.for_units(units));
    if lifespan <= 0 {
      return Err(Error::Validation(format!("lifespan must be positive, got {lifespan}")));
    }

    if let Some(existing) = self
      .store
      .get_mortality(agent_id)
      .await
      .map_err(Error::database("get_mortality"))?
    {
      return Ok(MortalityInit::AlreadyMortal {
        agent_id,
        lifespan_remaining: existing.lifespan_remaining,
        lifespan_units: existing.lifespan_units,
      });
    }

    let record = MortalityRecord::new(agent_id, lifespan, units);
    let birth_timestamp = record.birth_timestamp;
    self
      .store
      .insert_mortality(record)
      .await
      .map_err(Error::database("insert_mortality"))?;
    self
      .store
      .insert_legacy(LegacyRecord::zeroed(agent_id))
      .await
      .map_err(Error::database("insert_legacy"))?;

    record_life_event(&*self.store, LifeEvent::Birth).await;
    tracing::info!(%agent_id, lifespan, %units, "mortality initialized");

    Ok(MortalityInit::Initialized {
      agent_id,
      lifespan_total: lifespan,
      lifespan_units: units,
      birth_timestamp,
    })
  }

  /// Spend `amount` life units. Never triggers death itself; the caller
  /// watches `death_triggered`.
  pub async fn decrement_lifespan(&self, agent_id: Uuid, amount: i64) -> Result<LifespanTick> {
    let agent_id = require_id(agent_id)?;
    if amount <= 0 {
      return Err(Error::Validation(format!("amount must be positive, got {amount}")));
    }

    let record = self
      .store
      .get_mortality(agent_id)
      .await
      .map_err(Error::database("get_mortality"))?
      .ok_or(Error::PersonaNotFound(agent_id))?;

    if record.is_dead() {
      return Ok(LifespanTick::AlreadyDead { agent_id, death_date: record.death_date });
    }

    let Some(remaining) = self
      .store
      .decrement_lifespan(agent_id, amount)
      .await
      .map_err(Error::database("decrement_lifespan"))?
    else {
      // Death was stamped between the read and the update.
      let death_date = self
        .store
        .get_mortality(agent_id)
        .await
        .map_err(Error::database("get_mortality"))?
        .and_then(|r| r.death_date);
      return Ok(LifespanTick::AlreadyDead { agent_id, death_date });
    };

    let death_triggered = remaining <= 0;
    tracing::debug!(%agent_id, amount, remaining, death_triggered, "lifespan decremented");

    Ok(LifespanTick::Decremented {
      agent_id,
      lifespan_total: record.lifespan_total,
      lifespan_remaining: remaining,
      death_triggered,
      percentage_lived: percentage_lived(record.lifespan_total, remaining),
    })
  }

  pub async fn get_mortality_status(&self, agent_id: Uuid) -> Result<MortalityStatus> {
    let agent_id = require_id(agent_id)?;

    let Some(record) = self
      .store
      .get_mortality(agent_id)
      .await
      .map_err(Error::database("get_mortality"))?
    else {
      return Ok(MortalityStatus::NotMortal { agent_id });
    };

    let legacy = self
      .store
      .get_legacy(agent_id)
      .await
      .map_err(Error::database("get_legacy"))?
      .map(LegacySnapshot::from)
      .unwrap_or_default();

    let report = Box::new(StatusReport {
      agent_id,
      lifespan_total: record.lifespan_total,
      lifespan_remaining: record.lifespan_remaining,
      lifespan_units: record.lifespan_units,
      percentage_lived: record.percentage_lived(),
      birth_timestamp: record.birth_timestamp,
      death_date: record.death_date,
      death_cause: record.death_cause,
      rebirth_id: record.rebirth_id,
      legacy,
    });

    Ok(if report.death_date.is_some() {
      MortalityStatus::Dead(report)
    } else {
      MortalityStatus::Alive(report)
    })
  }

  /// Increment today's counter for `event`.
  pub async fn update_mortality_statistics(&self, event: LifeEvent) -> Result<()> {
    self
      .store
      .bump_statistic(Utc::now().date_naive(), event)
      .await
      .map_err(Error::database("bump_statistic"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_follow_units() {
    let d = LifespanDefaults::default();
    assert_eq!(d.for_units(LifespanUnits::Hours), 720);
    assert_eq!(d.for_units(LifespanUnits::Sessions), 100);
  }

  #[test]
  fn tick_serialises_with_status_tag() {
    let tick = LifespanTick::Decremented {
      agent_id:           Uuid::nil(),
      lifespan_total:     2,
      lifespan_remaining: 0,
      death_triggered:    true,
      percentage_lived:   100.0,
    };
    let json = serde_json::to_value(&tick).unwrap();
    assert_eq!(json["status"], "decremented");
    assert_eq!(json["death_triggered"], true);
  }
}
