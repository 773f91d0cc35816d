//! The VALIS lifecycle engines: lifespan, death, legacy, rebirth, and trait
//! drift.
//!
//! Every engine is generic over a [`VitalStore`] and receives it by injection;
//! there is no ambient state. [`Valis`] bundles one of each around a shared
//! store for callers that want the whole pipeline.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use valis_core::{
  Error, Result,
  stats::{LifeEvent, MortalityStatistics},
  store::VitalStore,
};

pub mod death;
pub mod drift;
pub mod legacy;
pub mod lifespan;
pub mod narrative;
pub mod rebirth;

pub use death::{DeathHandler, DeathOutcome};
pub use drift::{DriftOutcome, TraitDriftEngine};
pub use legacy::{LegacyReport, LegacyScorer};
pub use lifespan::{
  LifespanDefaults, LifespanEvaluator, LifespanTick, MortalityInit, MortalityStatus,
};
pub use narrative::{Narrator, TemplateNarrator};
pub use rebirth::{RebirthCoordinator, RebirthOptions, RebirthOutcome};

/// Reject the nil UUID, which callers use as an "empty" agent id.
pub(crate) fn require_id(id: Uuid) -> Result<Uuid> {
  if id.is_nil() { Err(Error::PersonaNotFound(id)) } else { Ok(id) }
}

/// Bump today's birth/death counter, logging instead of failing.
pub(crate) async fn record_life_event<S: VitalStore>(store: &S, event: LifeEvent) {
  if let Err(e) = store.bump_statistic(Utc::now().date_naive(), event).await {
    tracing::warn!(%event, error = %e, "failed to update mortality statistics");
  }
}

/// All engines wired to one store.
pub struct Valis<S> {
  pub lifespan: LifespanEvaluator<S>,
  pub legacy:   LegacyScorer<S>,
  pub death:    DeathHandler<S>,
  pub rebirth:  RebirthCoordinator<S>,
  pub drift:    TraitDriftEngine<S>,
  store:        Arc<S>,
}

impl<S: VitalStore> Valis<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self::with_config(store, LifespanDefaults::default(), Arc::new(TemplateNarrator))
  }

  pub fn with_config(
    store: Arc<S>,
    defaults: LifespanDefaults,
    narrator: Arc<dyn Narrator>,
  ) -> Self {
    let lifespan = LifespanEvaluator::new(store.clone(), defaults);
    let legacy = LegacyScorer::new(store.clone(), narrator.clone());
    Self {
      death: DeathHandler::new(store.clone(), legacy.clone(), narrator.clone()),
      rebirth: RebirthCoordinator::new(store.clone(), lifespan.clone(), narrator),
      drift: TraitDriftEngine::new(store.clone()),
      lifespan,
      legacy,
      store,
    }
  }

  pub fn store(&self) -> &S { &self.store }

  /// The daily aggregate for `date`, zeroed if nothing happened that day.
  pub async fn statistics(&self, date: NaiveDate) -> Result<MortalityStatistics> {
    let stats = self
      .store
      .get_statistics(date)
      .await
      .map_err(Error::database("get_statistics"))?;
    Ok(stats.unwrap_or(MortalityStatistics {
      stat_date:    date,
      total_births: 0,
      total_deaths: 0,
    }))
  }
}
