//! Legacy scoring: five independent component scores folded into one weighted
//! score, tier, summary, and set of impact tags.

use std::{collections::BTreeSet, sync::Arc};

use serde::Serialize;
use uuid::Uuid;
use valis_core::{
  Error, Result,
  cognition::{EmotionState, FeedbackRecord, MemoryTrace, ReflectionLog},
  legacy::{ComponentScores, LegacyRecord, LegacyTier, LegacyWeights, band_tags},
  mortality::FinalThought,
  personality::{Trait, TraitHistoryEntry},
  store::VitalStore,
};

use crate::{narrative::Narrator, require_id};

/// Base traits at or above this value earn a trait impact tag.
pub const TRAIT_TAG_THRESHOLD: f64 = 0.7;

/// Component values used when a source has nothing recorded.
pub const FALLBACK_COMPONENTS: ComponentScores = ComponentScores {
  user_feedback:      0.6,
  trait_evolution:    0.7,
  memory_stability:   0.65,
  emotional_richness: 0.8,
  final_reflection:   0.75,
};

/// Distinct emotions needed for full emotional-richness diversity credit.
const EMOTION_DIVERSITY_TARGET: f64 = 6.0;

pub fn trait_tag(t: Trait) -> &'static str {
  match t {
    Trait::Extraversion => "social",
    Trait::Agreeableness => "compassionate",
    Trait::Conscientiousness => "dependable",
    Trait::EmotionalStability => "resilient",
    Trait::Openness => "visionary",
  }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
  let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
  (n > 0).then(|| sum / n as f64)
}

// ─── Evidence ────────────────────────────────────────────────────────────────

/// Everything the component scores are derived from.
#[derive(Debug, Clone, Default)]
pub struct LegacyEvidence {
  pub feedback:       Vec<FeedbackRecord>,
  pub trait_history:  Vec<TraitHistoryEntry>,
  pub memories:       Vec<MemoryTrace>,
  pub emotions:       Vec<EmotionState>,
  pub reflections:    Vec<ReflectionLog>,
  pub final_thoughts: Vec<FinalThought>,
}

impl LegacyEvidence {
  pub fn user_feedback(&self) -> f64 {
    mean(self.feedback.iter().map(|f| f.kind.legacy_weight()))
      .unwrap_or(FALLBACK_COMPONENTS.user_feedback)
  }

  /// Half magnitude of change (saturating at 1.0), half breadth across traits.
  pub fn trait_evolution(&self) -> f64 {
    if self.trait_history.is_empty() {
      return FALLBACK_COMPONENTS.trait_evolution;
    }
    let magnitude: f64 = self.trait_history.iter().map(|e| e.delta.abs()).sum();
    let distinct: BTreeSet<Trait> = self.trait_history.iter().map(|e| e.trait_name).collect();
    0.5 * magnitude.min(1.0) + 0.5 * (distinct.len() as f64 / 5.0)
  }

  pub fn memory_stability(&self) -> f64 {
    mean(self.memories.iter().map(|m| m.importance * (1.0 - m.decay)))
      .unwrap_or(FALLBACK_COMPONENTS.memory_stability)
  }

  pub fn emotional_richness(&self) -> f64 {
    let Some(intensity) = mean(self.emotions.iter().map(|e| e.intensity)) else {
      return FALLBACK_COMPONENTS.emotional_richness;
    };
    let distinct: BTreeSet<String> =
      self.emotions.iter().map(|e| e.emotion.to_lowercase()).collect();
    0.7 * (distinct.len() as f64 / EMOTION_DIVERSITY_TARGET).min(1.0) + 0.3 * intensity
  }

  pub fn final_reflection(&self) -> f64 {
    let reflections = mean(self.reflections.iter().filter_map(|r| {
      match (r.success_score, r.alignment_score) {
        (Some(s), Some(a)) => Some((s + a) / 2.0),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
      }
    }));
    let thoughts = mean(self.final_thoughts.iter().map(|t| t.symbolic_weight));

    mean(reflections.into_iter().chain(thoughts))
      .unwrap_or(FALLBACK_COMPONENTS.final_reflection)
  }

  /// All five components, each clamped to `[0, 1]`. `final_reflection` is
  /// zero unless finalizing.
  pub fn components(&self, finalize: bool) -> ComponentScores {
    let unit = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    ComponentScores {
      user_feedback:      unit(self.user_feedback()),
      trait_evolution:    unit(self.trait_evolution()),
      memory_stability:   unit(self.memory_stability()),
      emotional_richness: unit(self.emotional_richness()),
      final_reflection:   if finalize { unit(self.final_reflection()) } else { 0.0 },
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LegacyReport {
  pub agent_id:    Uuid,
  pub score:       f64,
  pub legacy_tier: LegacyTier,
  pub summary:     String,
  pub impact_tags: BTreeSet<String>,
  pub components:  ComponentScores,
  pub weights:     LegacyWeights,
  pub finalized:   bool,
}

impl LegacyReport {
  fn from_record(record: LegacyRecord) -> Self {
    let finalized = record.is_finalized();
    Self {
      agent_id: record.agent_id,
      score: record.score,
      legacy_tier: record.legacy_tier,
      summary: record.summary,
      impact_tags: record.impact_tags,
      components: record.components,
      weights: LegacyWeights::for_calculation(finalized),
      finalized,
    }
  }
}

// ─── Scorer ──────────────────────────────────────────────────────────────────

pub struct LegacyScorer<S> {
  store:    Arc<S>,
  narrator: Arc<dyn Narrator>,
}

impl<S> Clone for LegacyScorer<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), narrator: self.narrator.clone() }
  }
}

impl<S: VitalStore> LegacyScorer<S> {
  pub fn new(store: Arc<S>, narrator: Arc<dyn Narrator>) -> Self { Self { store, narrator } }

  /// Recompute and persist the legacy record.
  ///
  /// A finalized record is frozen: later calls return it unchanged, so the
  /// at-death score survives retries and provisional requests.
  pub async fn generate_legacy_score(
    &self,
    agent_id: Uuid,
    finalize: bool,
  ) -> Result<LegacyReport> {
    let agent_id = require_id(agent_id)?;

    let mut record = self
      .store
      .get_legacy(agent_id)
      .await
      .map_err(Error::database("get_legacy"))?
      .ok_or(Error::LegacyNotFound(agent_id))?;

    if record.is_finalized() {
      return Ok(LegacyReport::from_record(record));
    }

    let evidence = self.gather(agent_id, finalize).await?;
    let components = evidence.components(finalize);
    let weights = LegacyWeights::for_calculation(finalize);
    let score = weights.apply(&components);
    let tier = LegacyTier::from_score(score);

    let now = valis_core::now();
    record.score = score;
    record.legacy_tier = tier;
    record.summary = self.narrator.legacy_summary(tier, score);
    record.impact_tags = self.impact_tags(agent_id, score).await;
    record.components = components;
    record.updated_at = now;
    if finalize {
      record.final_calculation = Some(now);
    }

    self
      .store
      .update_legacy(record.clone())
      .await
      .map_err(Error::database("update_legacy"))?;

    tracing::debug!(%agent_id, score, %tier, finalize, "legacy score computed");
    Ok(LegacyReport::from_record(record))
  }

  async fn gather(&self, agent_id: Uuid, finalize: bool) -> Result<LegacyEvidence> {
    let store = &self.store;
    let mut evidence = LegacyEvidence {
      feedback:      store.feedback_for(agent_id).await.map_err(Error::database("feedback_for"))?,
      trait_history: store
        .trait_history(agent_id, None)
        .await
        .map_err(Error::database("trait_history"))?,
      memories:      store.memories_for(agent_id).await.map_err(Error::database("memories_for"))?,
      emotions:      store
        .emotion_states(agent_id)
        .await
        .map_err(Error::database("emotion_states"))?,
      ..LegacyEvidence::default()
    };

    if finalize {
      evidence.reflections = store
        .reflections_for(agent_id)
        .await
        .map_err(Error::database("reflections_for"))?;
      evidence.final_thoughts = store
        .list_final_thoughts(agent_id)
        .await
        .map_err(Error::database("list_final_thoughts"))?;
    }

    Ok(evidence)
  }

  /// Band tags plus one tag per strong base trait. Profile lookup failures
  /// degrade to band tags only.
  async fn impact_tags(&self, agent_id: Uuid, score: f64) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = band_tags(score).iter().map(|t| (*t).to_owned()).collect();

    match self.store.get_personality(agent_id).await {
      Ok(Some(profile)) => tags.extend(
        profile
          .base_traits
          .iter()
          .filter(|(_, v)| **v >= TRAIT_TAG_THRESHOLD)
          .map(|(t, _)| trait_tag(*t).to_owned()),
      ),
      Ok(None) => {}
      Err(e) => tracing::warn!(%agent_id, error = %e, "impact tags limited to score band"),
    }

    tags
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use valis_core::{
    cognition::{FeedbackEvent, FeedbackKind},
    personality::DriftSource,
  };

  use super::*;

  fn feedback(kind: FeedbackKind) -> FeedbackRecord {
    FeedbackRecord::new(Uuid::nil(), "s", &FeedbackEvent::new(kind, ""))
  }

  #[test]
  fn empty_evidence_uses_fallbacks() {
    let c = LegacyEvidence::default().components(true);
    assert_eq!(c, FALLBACK_COMPONENTS);

    let provisional = LegacyEvidence::default().components(false);
    assert_eq!(provisional.final_reflection, 0.0);
  }

  #[test]
  fn feedback_is_weighted_average() {
    let evidence = LegacyEvidence {
      feedback: vec![
        feedback(FeedbackKind::Positive),
        feedback(FeedbackKind::Correction),
        feedback(FeedbackKind::Negative),
      ],
      ..Default::default()
    };
    assert!((evidence.user_feedback() - 0.5).abs() < 1e-12);
  }

  #[test]
  fn trait_evolution_blends_magnitude_and_breadth() {
    let id = Uuid::nil();
    let evidence = LegacyEvidence {
      trait_history: vec![
        TraitHistoryEntry::new(id, Trait::Openness, "s", 0.5, 0.7, DriftSource::Dialogue),
        TraitHistoryEntry::new(id, Trait::Openness, "s", 0.7, 0.6, DriftSource::Feedback),
      ],
      ..Default::default()
    };
    // 0.5 * 0.3 + 0.5 * (1 / 5)
    assert!((evidence.trait_evolution() - 0.25).abs() < 1e-9);
  }

  #[test]
  fn memory_and_emotion_components() {
    let id = Uuid::nil();
    let evidence = LegacyEvidence {
      memories: vec![MemoryTrace::new(id, "a", 1.0, 0.5), MemoryTrace::new(id, "b", 0.5, 0.0)],
      emotions: vec![
        EmotionState::new(id, "joy", 0.5),
        EmotionState::new(id, "Joy", 0.5),
        EmotionState::new(id, "grief", 0.5),
      ],
      ..Default::default()
    };
    assert!((evidence.memory_stability() - 0.5).abs() < 1e-12);
    // two distinct of six, mean intensity 0.5
    let expected = 0.7 * (2.0 / 6.0) + 0.3 * 0.5;
    assert!((evidence.emotional_richness() - expected).abs() < 1e-12);
  }

  #[test]
  fn final_reflection_averages_sources() {
    let id = Uuid::nil();
    let evidence = LegacyEvidence {
      reflections: vec![ReflectionLog {
        reflection_id:   Uuid::new_v4(),
        session_id:      "s".into(),
        persona_id:      id,
        content:         String::new(),
        success_score:   Some(1.0),
        alignment_score: Some(0.6),
        recorded_at:     Utc::now(),
      }],
      final_thoughts: vec![FinalThought::new(
        id,
        valis_core::mortality::ThoughtType::LegacyStatement,
        "x",
        0.4,
      )],
      ..Default::default()
    };
    // mean(0.8, 0.4)
    assert!((evidence.final_reflection() - 0.6).abs() < 1e-12);
  }

  #[test]
  fn trait_tags_are_distinct() {
    use strum::IntoEnumIterator as _;
    let tags: BTreeSet<_> = Trait::iter().map(trait_tag).collect();
    assert_eq!(tags.len(), 5);
  }
}
