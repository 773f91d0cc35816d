//! Trait drift: bounded, multi-signal personality evolution plus decay of
//! unreinforced learned modifiers.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use uuid::Uuid;
use valis_core::{
  Error, Result,
  cognition::{DialogueTurn, FeedbackEvent, FeedbackRecord, LearningLogEntry},
  personality::{
    PersonalityProfile, Trait, TraitHistoryEntry, TraitVector, clamp_unit, normalize_traits,
  },
  store::VitalStore,
};

pub mod influence;
pub mod lexicon;

use self::influence::{
  Influences, SIGNIFICANT_CHANGE, dialogue_influences, feedback_influences,
  reflection_influences, reinforced_modifiers,
};
use crate::require_id;

/// Multiplicative decay applied to an unreinforced modifier per sweep.
pub const DECAY_RATE: f64 = 0.02;

/// Modifiers at or below this weight are dropped.
pub const MODIFIER_FLOOR: f64 = 0.1;

/// Weight given to a modifier the first time it is reinforced.
pub const MODIFIER_INITIAL_WEIGHT: f64 = 0.3;

pub const MODIFIER_REINFORCEMENT: f64 = 0.1;

/// Reflections consulted per drift update.
pub const REFLECTION_LOOKBACK: usize = 3;

/// Window for [`TraitDriftEngine::export_evolving_traits`].
pub const EXPORT_WINDOW_DAYS: i64 = 7;

pub const DEFAULT_DECAY_DAYS: i64 = 7;

/// `prefers_brevity` → `prefers brevity`, the form written to the learning
/// log.
pub fn modifier_phrase(name: &str) -> String { name.replace('_', " ") }

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// One drift update. Trait vectors are the stored base traits and `deltas`
/// holds only the changes actually written.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
  pub persona_id:           Uuid,
  pub session_id:           String,
  pub traits_before:        TraitVector,
  pub traits_after:         TraitVector,
  pub deltas:               BTreeMap<Trait, f64>,
  pub influences:           Influences,
  pub significant_changes:  Vec<Trait>,
  pub reinforced_modifiers: Vec<String>,
}

/// Drift never raises; failures come back as a `failed` status.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftOutcome {
  Updated(Box<DriftReport>),
  Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersonalityInit {
  Initialized { profile: PersonalityProfile },
  AlreadyInitialized { profile: PersonalityProfile },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DecayReport {
  pub persona_id: Uuid,
  /// Reinforced within the window; weight unchanged.
  pub reinforced: BTreeMap<String, f64>,
  /// New weights of modifiers that decayed but survive.
  pub decayed:    BTreeMap<String, f64>,
  pub dropped:    Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraitExport {
  pub persona_id:            Uuid,
  pub current_traits:        TraitVector,
  pub base_traits:           TraitVector,
  pub learned_modifiers:     BTreeMap<String, f64>,
  pub recent_history:        Vec<TraitHistoryEntry>,
  /// Sum of absolute deltas per trait within the window.
  pub velocity:              BTreeMap<Trait, f64>,
  pub personality_stability: f64,
}

/// Request body for a drift update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriftInput {
  pub session_id: String,
  #[serde(default)]
  pub transcript: Vec<DialogueTurn>,
  #[serde(default)]
  pub feedback:   Vec<FeedbackEvent>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct TraitDriftEngine<S> {
  store: Arc<S>,
}

impl<S: VitalStore> TraitDriftEngine<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Create a profile with the given traits (neutral when absent).
  pub async fn initialize_personality(
    &self,
    persona_id: Uuid,
    traits: Option<TraitVector>,
  ) -> Result<PersonalityInit> {
    let persona_id = require_id(persona_id)?;

    if let Some(profile) = self
      .store
      .get_personality(persona_id)
      .await
      .map_err(Error::database("get_personality"))?
    {
      return Ok(PersonalityInit::AlreadyInitialized { profile });
    }

    let profile = match traits {
      Some(t) => PersonalityProfile::new(persona_id, t),
      None => PersonalityProfile::neutral(persona_id),
    };
    self
      .store
      .put_personality(profile.clone())
      .await
      .map_err(Error::database("put_personality"))?;

    tracing::info!(%persona_id, "personality initialized");
    Ok(PersonalityInit::Initialized { profile })
  }

  /// Evolve a persona's traits from one session's transcript and feedback.
  pub async fn update_traits_from_dialogue(
    &self,
    session_id: &str,
    persona_id: Uuid,
    transcript: &[DialogueTurn],
    feedback: &[FeedbackEvent],
  ) -> DriftOutcome {
    match self.apply_drift(session_id, persona_id, transcript, feedback).await {
      Ok(report) => DriftOutcome::Updated(Box::new(report)),
      Err(e) => {
        tracing::warn!(%persona_id, session_id, error = %e, "trait drift failed");
        DriftOutcome::Failed { error: e.to_string() }
      }
    }
  }

  async fn apply_drift(
    &self,
    session_id: &str,
    persona_id: Uuid,
    transcript: &[DialogueTurn],
    feedback: &[FeedbackEvent],
  ) -> Result<DriftReport> {
    let persona_id = require_id(persona_id)?;

    let mut profile = self
      .store
      .get_personality(persona_id)
      .await
      .map_err(Error::database("get_personality"))?
      .ok_or(Error::PersonaNotFound(persona_id))?;

    let reflections = self
      .store
      .recent_reflections(session_id.to_owned(), persona_id, REFLECTION_LOOKBACK)
      .await
      .map_err(Error::database("recent_reflections"))?;

    // Bounded against the effective traits, applied to the base.
    let effective = profile.effective_traits();
    let influences = Influences {
      feedback:   feedback_influences(feedback),
      dialogue:   dialogue_influences(transcript),
      reflection: reflection_influences(&reflections),
    };
    let proposed = influences.deltas(&effective);

    let before = normalize_traits(&profile.base_traits);
    let mut after = before.clone();
    let mut deltas = BTreeMap::new();
    for (t, d) in &proposed {
      let value = clamp_unit(before[t] + d);
      if value != before[t] {
        after.insert(*t, value);
        deltas.insert(*t, value - before[t]);
      }
    }

    let history: Vec<TraitHistoryEntry> = deltas
      .keys()
      .map(|t| {
        TraitHistoryEntry::new(
          persona_id,
          *t,
          session_id,
          before[t],
          after[t],
          influences.dominant_source(*t),
        )
      })
      .collect();

    let now = valis_core::now();
    let reinforced = reinforced_modifiers(feedback);
    for name in &reinforced {
      profile
        .learned_modifiers
        .entry((*name).to_owned())
        .and_modify(|w| *w = (*w + MODIFIER_REINFORCEMENT).min(1.0))
        .or_insert(MODIFIER_INITIAL_WEIGHT);
    }

    profile.base_traits = after.clone();
    profile.updated_at = now;
    self
      .store
      .put_personality(profile)
      .await
      .map_err(Error::database("put_personality"))?;
    self
      .store
      .append_trait_history(history)
      .await
      .map_err(Error::database("append_trait_history"))?;

    let records = feedback
      .iter()
      .map(|f| FeedbackRecord::new(persona_id, session_id, f))
      .collect();
    self
      .store
      .record_feedback(records)
      .await
      .map_err(Error::database("record_feedback"))?;

    for name in &reinforced {
      let entry = LearningLogEntry::new(
        persona_id,
        format!("Reinforced {} from session {session_id}", modifier_phrase(name)),
      );
      if let Err(e) = self.store.append_learning_log(entry).await {
        tracing::warn!(%persona_id, modifier = *name, error = %e, "failed to log reinforcement");
      }
    }

    let significant_changes = deltas
      .iter()
      .filter(|(_, d)| d.abs() > SIGNIFICANT_CHANGE)
      .map(|(t, _)| *t)
      .collect();

    tracing::debug!(%persona_id, session_id, changed = deltas.len(), "traits drifted");

    Ok(DriftReport {
      persona_id,
      session_id: session_id.to_owned(),
      traits_before: before,
      traits_after: after,
      deltas,
      influences,
      significant_changes,
      reinforced_modifiers: reinforced.into_iter().map(str::to_owned).collect(),
    })
  }

  /// Decay every modifier not mentioned in the learning log within the last
  /// `days_threshold` days.
  pub async fn decay_unused_modifiers(
    &self,
    persona_id: Uuid,
    days_threshold: i64,
  ) -> Result<DecayReport> {
    let persona_id = require_id(persona_id)?;
    if days_threshold < 0 {
      return Err(Error::Validation(format!(
        "days_threshold must not be negative, got {days_threshold}"
      )));
    }

    let mut profile = self
      .store
      .get_personality(persona_id)
      .await
      .map_err(Error::database("get_personality"))?
      .ok_or(Error::PersonaNotFound(persona_id))?;

    let since = Utc::now() - Duration::days(days_threshold);
    let mut report = DecayReport { persona_id, ..Default::default() };
    let mut kept = BTreeMap::new();

    for (name, weight) in std::mem::take(&mut profile.learned_modifiers) {
      let reinforced = self
        .store
        .learning_log_mentions(persona_id, modifier_phrase(&name), since)
        .await
        .map_err(Error::database("learning_log_mentions"))?;

      if reinforced {
        report.reinforced.insert(name.clone(), weight);
        kept.insert(name, weight);
        continue;
      }

      let decayed = weight * (1.0 - DECAY_RATE);
      if decayed <= MODIFIER_FLOOR {
        report.dropped.push(name);
      } else {
        report.decayed.insert(name.clone(), decayed);
        kept.insert(name, decayed);
      }
    }

    if !report.decayed.is_empty() || !report.dropped.is_empty() {
      profile.learned_modifiers = kept;
      profile.updated_at = valis_core::now();
      self
        .store
        .put_personality(profile)
        .await
        .map_err(Error::database("put_personality"))?;
      tracing::debug!(
        %persona_id,
        decayed = report.decayed.len(),
        dropped = report.dropped.len(),
        "learned modifiers decayed"
      );
    }

    Ok(report)
  }

  pub async fn export_evolving_traits(&self, persona_id: Uuid) -> Result<TraitExport> {
    let persona_id = require_id(persona_id)?;

    let profile = self
      .store
      .get_personality(persona_id)
      .await
      .map_err(Error::database("get_personality"))?
      .ok_or(Error::PersonaNotFound(persona_id))?;

    let since = Utc::now() - Duration::days(EXPORT_WINDOW_DAYS);
    let recent_history = self
      .store
      .trait_history(persona_id, Some(since))
      .await
      .map_err(Error::database("trait_history"))?;

    let mut velocity: BTreeMap<Trait, f64> = Trait::iter().map(|t| (t, 0.0)).collect();
    for entry in &recent_history {
      *velocity.entry(entry.trait_name).or_insert(0.0) += entry.delta.abs();
    }
    let avg = velocity.values().sum::<f64>() / velocity.len() as f64;

    Ok(TraitExport {
      persona_id,
      current_traits: profile.effective_traits(),
      base_traits: profile.base_traits,
      learned_modifiers: profile.learned_modifiers,
      recent_history,
      velocity,
      personality_stability: clamp_unit(1.0 - avg),
    })
  }
}
