//! Personality profiles, learned modifiers, and the trait audit trail.
//!
//! A profile holds a fixed five-trait vector in `[0, 1]` plus a map of learned
//! stylistic modifiers. Modifiers never overwrite traits; they only perturb
//! the effective vector through [`PersonalityProfile::effective_traits`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator as _};
use uuid::Uuid;

/// Hard cap on the magnitude of a single trait change.
pub const MAX_SINGLE_DRIFT: f64 = 0.25;

/// Scale applied to `influence * weight` when a modifier nudges a trait.
pub const MODIFIER_NUDGE_SCALE: f64 = 0.1;

// ─── Traits ──────────────────────────────────────────────────────────────────

/// The fixed Big-Five-style trait set.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Trait {
  Extraversion,
  Agreeableness,
  Conscientiousness,
  EmotionalStability,
  Openness,
}

/// A full trait vector. Always keyed by every [`Trait`] once normalised.
pub type TraitVector = BTreeMap<Trait, f64>;

/// Every trait at the midpoint.
pub fn neutral_traits() -> TraitVector {
  Trait::iter().map(|t| (t, 0.5)).collect()
}

/// Clamp into `[0, 1]`; NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
  if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Fill missing traits with 0.5 and clamp everything into `[0, 1]`.
pub fn normalize_traits(traits: &TraitVector) -> TraitVector {
  Trait::iter()
    .map(|t| (t, clamp_unit(traits.get(&t).copied().unwrap_or(0.5))))
    .collect()
}

/// Bound a raw delta twice: first to `±MAX_SINGLE_DRIFT`, then so that
/// `current + delta` stays within `[0, 1]`.
pub fn bounded_delta(current: f64, raw: f64) -> f64 {
  if !raw.is_finite() {
    return 0.0;
  }
  let current = clamp_unit(current);
  raw
    .clamp(-MAX_SINGLE_DRIFT, MAX_SINGLE_DRIFT)
    .clamp(-current, 1.0 - current)
}

// ─── Learned modifiers ───────────────────────────────────────────────────────

/// How a named modifier leans on each trait. Unknown modifiers have no effect.
pub fn modifier_influence(name: &str) -> &'static [(Trait, f64)] {
  match name {
    "prefers_brevity" => &[(Trait::Conscientiousness, 0.3), (Trait::Extraversion, -0.2)],
    "enjoys_humor" => &[(Trait::Extraversion, 0.4), (Trait::Openness, 0.2)],
    "values_empathy" => &[(Trait::Agreeableness, 0.5)],
    "appreciates_detail" => &[(Trait::Conscientiousness, 0.4)],
    "likes_creativity" => &[(Trait::Openness, 0.5)],
    "prefers_calm" => &[(Trait::EmotionalStability, 0.3)],
    _ => &[],
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityProfile {
  pub persona_id:        Uuid,
  pub base_traits:       TraitVector,
  /// Modifier name → weight in `(0, 1]`.
  pub learned_modifiers: BTreeMap<String, f64>,
  pub updated_at:        DateTime<Utc>,
}

impl PersonalityProfile {
  pub fn new(persona_id: Uuid, base_traits: TraitVector) -> Self {
    Self {
      persona_id,
      base_traits: normalize_traits(&base_traits),
      learned_modifiers: BTreeMap::new(),
      updated_at: crate::now(),
    }
  }

  pub fn neutral(persona_id: Uuid) -> Self { Self::new(persona_id, neutral_traits()) }

  /// Base traits with every learned modifier's soft influence applied.
  ///
  /// Each modifier nudges its mapped traits by
  /// `influence * weight * MODIFIER_NUDGE_SCALE`, clamping after every nudge.
  pub fn effective_traits(&self) -> TraitVector {
    let mut traits = normalize_traits(&self.base_traits);
    for (name, weight) in &self.learned_modifiers {
      for (t, influence) in modifier_influence(name) {
        let value = traits.entry(*t).or_insert(0.5);
        *value = clamp_unit(*value + influence * weight * MODIFIER_NUDGE_SCALE);
      }
    }
    traits
  }

  /// The trait with the highest base value, if any.
  pub fn dominant_trait(&self) -> Option<Trait> {
    self
      .base_traits
      .iter()
      .max_by(|a, b| a.1.total_cmp(b.1))
      .map(|(t, _)| *t)
  }
}

// ─── Audit trail ─────────────────────────────────────────────────────────────

/// Which influence category dominated a recorded trait change.
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
pub enum DriftSource {
  Feedback,
  Dialogue,
  Reflection,
  Combined,
}

/// Append-only record of one trait change in one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitHistoryEntry {
  pub entry_id:     Uuid,
  pub persona_id:   Uuid,
  pub trait_name:   Trait,
  pub session_id:   String,
  pub value_before: f64,
  pub value_after:  f64,
  pub delta:        f64,
  pub source_event: DriftSource,
  pub recorded_at:  DateTime<Utc>,
}

impl TraitHistoryEntry {
  pub fn new(
    persona_id: Uuid,
    trait_name: Trait,
    session_id: impl Into<String>,
    value_before: f64,
    value_after: f64,
    source_event: DriftSource,
  ) -> Self {
    Self {
      entry_id: Uuid::new_v4(),
      persona_id,
      trait_name,
      session_id: session_id.into(),
      value_before,
      value_after,
      delta: value_after - value_before,
      source_event,
      recorded_at: crate::now(),
    }
  }
}
