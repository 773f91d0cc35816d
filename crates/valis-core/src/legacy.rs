//! Legacy records: the composite score an agent accrues over its life.
//!
//! The score is a weighted sum of five independent component scores. While
//! the agent lives, `final_reflection` is excluded and the remaining weights
//! are renormalised; at death all five apply and `final_calculation` is
//! stamped once.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ─── Tier ────────────────────────────────────────────────────────────────────

/// Qualitative band derived from a legacy score.
///
/// Half-open ranges `[0, .2) [.2, .5) [.5, .8) [.8, 1]`; 1.0 is `Architect`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LegacyTier {
  #[default]
  Wanderer,
  Seeker,
  Guide,
  Architect,
}

impl LegacyTier {
  pub fn from_score(score: f64) -> Self {
    match score {
      s if s.is_nan() || s < 0.2 => Self::Wanderer,
      s if s < 0.5 => Self::Seeker,
      s if s < 0.8 => Self::Guide,
      _ => Self::Architect,
    }
  }
}

// ─── Components and weights ──────────────────────────────────────────────────

/// The five independent sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
  pub user_feedback:      f64,
  pub trait_evolution:    f64,
  pub memory_stability:   f64,
  pub emotional_richness: f64,
  pub final_reflection:   f64,
}

/// Per-component weights. Always sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegacyWeights {
  pub user_feedback:      f64,
  pub trait_evolution:    f64,
  pub memory_stability:   f64,
  pub emotional_richness: f64,
  pub final_reflection:   f64,
}

impl LegacyWeights {
  const FINAL: Self = Self {
    user_feedback:      0.25,
    trait_evolution:    0.20,
    memory_stability:   0.20,
    emotional_richness: 0.15,
    final_reflection:   0.20,
  };

  /// The finalized weights, or the four lifetime weights renormalised to 1.0
  /// with `final_reflection` zeroed.
  pub fn for_calculation(finalize: bool) -> Self {
    if finalize {
      return Self::FINAL;
    }
    let w = Self::FINAL;
    let active =
      w.user_feedback + w.trait_evolution + w.memory_stability + w.emotional_richness;
    Self {
      user_feedback:      w.user_feedback / active,
      trait_evolution:    w.trait_evolution / active,
      memory_stability:   w.memory_stability / active,
      emotional_richness: w.emotional_richness / active,
      final_reflection:   0.0,
    }
  }

  pub fn total(&self) -> f64 {
    self.user_feedback
      + self.trait_evolution
      + self.memory_stability
      + self.emotional_richness
      + self.final_reflection
  }

  /// `Σ component_i * weight_i`, clamped into `[0, 1]`.
  pub fn apply(&self, c: &ComponentScores) -> f64 {
    let sum = c.user_feedback * self.user_feedback
      + c.trait_evolution * self.trait_evolution
      + c.memory_stability * self.memory_stability
      + c.emotional_richness * self.emotional_richness
      + c.final_reflection * self.final_reflection;
    if sum.is_nan() { 0.0 } else { sum.clamp(0.0, 1.0) }
  }
}

/// Deterministic tags for the score band an agent sits in.
pub fn band_tags(score: f64) -> [&'static str; 2] {
  if score > 0.8 {
    ["influential", "memorable"]
  } else if score > 0.6 {
    ["consistent", "reliable"]
  } else if score > 0.4 {
    ["developing", "learning"]
  } else {
    ["experimental", "nascent"]
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One per agent. Created zeroed at mortality initialisation and recomputed on
/// every legacy-score request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyRecord {
  pub agent_id:          Uuid,
  pub score:             f64,
  pub legacy_tier:       LegacyTier,
  pub summary:           String,
  pub impact_tags:       BTreeSet<String>,
  pub components:        ComponentScores,
  /// Set exactly once, by the at-death computation.
  pub final_calculation: Option<DateTime<Utc>>,
  pub updated_at:        DateTime<Utc>,
}

impl LegacyRecord {
  pub fn zeroed(agent_id: Uuid) -> Self {
    Self {
      agent_id,
      score: 0.0,
      legacy_tier: LegacyTier::Wanderer,
      summary: String::new(),
      impact_tags: BTreeSet::new(),
      components: ComponentScores::default(),
      final_calculation: None,
      updated_at: crate::now(),
    }
  }

  pub fn is_finalized(&self) -> bool { self.final_calculation.is_some() }
}
