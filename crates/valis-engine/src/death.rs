//! The death transition: final thoughts, the finalized legacy score, then the
//! death stamp.
//!
//! The three steps are separate store writes with no enclosing transaction.
//! A crash between them leaves the agent alive with some side effects in
//! place; re-running [`DeathHandler::trigger_death`] completes the transition
//! without duplicating final thoughts or re-scoring a finalized legacy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use valis_core::{
  Error, Result,
  mortality::{FinalThought, MortalityRecord},
  stats::LifeEvent,
  store::VitalStore,
};

use crate::{
  legacy::{LegacyReport, LegacyScorer},
  narrative::{Narrator, ThoughtContext, ThoughtDraft},
  record_life_event, require_id,
};

/// Dream fragments offered to the narrator for the death dream.
const DEATH_DREAM_LOOKBACK: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct DeathReport {
  pub agent_id:       Uuid,
  pub death_date:     DateTime<Utc>,
  pub death_cause:    String,
  pub final_thoughts: Vec<FinalThought>,
  pub legacy:         LegacyReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeathOutcome {
  DeathProcessed(Box<DeathReport>),
  AlreadyDead {
    agent_id:    Uuid,
    death_date:  Option<DateTime<Utc>>,
    death_cause: Option<String>,
  },
}

impl DeathOutcome {
  fn already_dead(record: MortalityRecord) -> Self {
    Self::AlreadyDead {
      agent_id:    record.agent_id,
      death_date:  record.death_date,
      death_cause: record.death_cause,
    }
  }
}

pub struct DeathHandler<S> {
  store:    Arc<S>,
  scorer:   LegacyScorer<S>,
  narrator: Arc<dyn Narrator>,
}

impl<S: VitalStore> DeathHandler<S> {
  pub fn new(store: Arc<S>, scorer: LegacyScorer<S>, narrator: Arc<dyn Narrator>) -> Self {
    Self { store, scorer, narrator }
  }

  pub async fn trigger_death(&self, agent_id: Uuid, cause: &str) -> Result<DeathOutcome> {
    let agent_id = require_id(agent_id)?;
    let cause = match cause.trim() {
      "" => "natural",
      c => c,
    };

    let record = self.mortality(agent_id).await?;
    if record.is_dead() {
      return Ok(DeathOutcome::already_dead(record));
    }

    let final_thoughts = self.final_thoughts(&record, cause).await;

    let legacy = self.scorer.generate_legacy_score(agent_id, true).await?;

    let death_date = valis_core::now();
    let stamped = self
      .store
      .stamp_death(agent_id, death_date, cause.to_owned())
      .await
      .map_err(Error::database("stamp_death"))?;
    if !stamped {
      // Another caller finished the transition first; report its stamp.
      return Ok(DeathOutcome::already_dead(self.mortality(agent_id).await?));
    }

    record_life_event(&*self.store, LifeEvent::Death).await;
    tracing::info!(
      %agent_id,
      cause,
      score = legacy.score,
      tier = %legacy.legacy_tier,
      "agent died"
    );

    Ok(DeathOutcome::DeathProcessed(Box::new(DeathReport {
      agent_id,
      death_date,
      death_cause: cause.to_owned(),
      final_thoughts,
      legacy,
    })))
  }

  async fn mortality(&self, agent_id: Uuid) -> Result<MortalityRecord> {
    self
      .store
      .get_mortality(agent_id)
      .await
      .map_err(Error::database("get_mortality"))?
      .ok_or(Error::PersonaNotFound(agent_id))
  }

  /// Generate and persist final thoughts, or return those left by an earlier
  /// interrupted attempt. Never fails.
  async fn final_thoughts(&self, record: &MortalityRecord, cause: &str) -> Vec<FinalThought> {
    let agent_id = record.agent_id;

    match self.store.list_final_thoughts(agent_id).await {
      Ok(existing) if !existing.is_empty() => return existing,
      Ok(_) => {}
      Err(e) => tracing::warn!(%agent_id, error = %e, "could not check for earlier final thoughts"),
    }

    let drafts = match self.thought_context(record, cause).await {
      Ok(ctx) => self.narrator.final_thoughts(&ctx),
      Err(e) => {
        tracing::warn!(%agent_id, error = %e, "falling back to placeholder final thought");
        vec![ThoughtDraft::placeholder()]
      }
    };

    let mut saved = Vec::with_capacity(drafts.len());
    let mut raced = false;
    for draft in drafts {
      let thought =
        FinalThought::new(agent_id, draft.thought_type, draft.content, draft.symbolic_weight);
      match self.store.insert_final_thought(thought.clone()).await {
        Ok(true) => saved.push(thought),
        Ok(false) => raced = true,
        Err(e) => tracing::warn!(
          %agent_id,
          thought_type = %thought.thought_type,
          error = %e,
          "failed to persist final thought"
        ),
      }
    }

    // A concurrent death wrote some of these first; report what is stored.
    if raced {
      match self.store.list_final_thoughts(agent_id).await {
        Ok(stored) => return stored,
        Err(e) => tracing::warn!(%agent_id, error = %e, "could not reread final thoughts"),
      }
    }
    saved
  }

  async fn thought_context(&self, record: &MortalityRecord, cause: &str) -> Result<ThoughtContext> {
    let agent_id = record.agent_id;

    let agent = self
      .store
      .get_agent(agent_id)
      .await
      .map_err(Error::database("get_agent"))?
      .ok_or(Error::PersonaNotFound(agent_id))?;
    let dominant_trait = self
      .store
      .get_personality(agent_id)
      .await
      .map_err(Error::database("get_personality"))?
      .and_then(|p| p.dominant_trait());
    let dreams = self
      .store
      .recent_dreams(agent_id, DEATH_DREAM_LOOKBACK)
      .await
      .map_err(Error::database("recent_dreams"))?;

    Ok(ThoughtContext {
      agent_name: agent.name,
      cause: cause.to_owned(),
      dominant_trait,
      percentage_lived: record.percentage_lived(),
      dreams: dreams.into_iter().map(|d| d.content).collect(),
    })
  }
}
