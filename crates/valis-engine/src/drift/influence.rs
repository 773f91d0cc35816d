//! The three drift signals and the rule that folds them into bounded deltas.
//!
//! Everything here is pure; [`super::TraitDriftEngine`] does the I/O.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use valis_core::{
  cognition::{DialogueTurn, FeedbackEvent, FeedbackKind, ReflectionLog},
  personality::{DriftSource, Trait, TraitVector, bounded_delta},
};

use super::lexicon::{
  DIALOGUE_CUES, FEEDBACK_CUES, MODIFIER_CUES, REFLECTION_CALM, REFLECTION_DISTRESS,
  REFLECTION_GROWTH, mentions_any, words,
};

pub const FEEDBACK_LEARNING_RATE: f64 = 0.15;
pub const TONE_LEARNING_RATE: f64 = 0.08;
pub const REFLECTION_LEARNING_RATE: f64 = 0.12;

/// Combined deltas smaller than this are discarded.
pub const NOISE_FLOOR: f64 = 0.001;

/// Applied deltas larger than this are reported as significant.
pub const SIGNIFICANT_CHANGE: f64 = 0.05;

/// Signed per-trait influence from one signal.
pub type Influence = BTreeMap<Trait, f64>;

fn add(map: &mut Influence, t: Trait, amount: f64) {
  *map.entry(t).or_insert(0.0) += amount;
}

// ─── Signals ─────────────────────────────────────────────────────────────────

fn feedback_amount(kind: FeedbackKind) -> f64 {
  match kind {
    FeedbackKind::Positive => 0.1,
    FeedbackKind::Correction => 0.12,
    FeedbackKind::Negative => 0.15,
  }
}

/// Each event moves a trait at most once per cue direction.
pub fn feedback_influences(feedback: &[FeedbackEvent]) -> Influence {
  let mut out = Influence::new();
  for event in feedback {
    let text = event.content.to_lowercase();
    let amount = feedback_amount(event.kind);
    for cues in FEEDBACK_CUES {
      if mentions_any(&text, cues.raise) {
        add(&mut out, cues.trait_name, amount);
      }
      if mentions_any(&text, cues.lower) {
        add(&mut out, cues.trait_name, -amount);
      }
    }
  }
  out
}

/// Net cue hits per trait, normalised by transcript length in hundreds of
/// words and halved.
pub fn dialogue_influences(transcript: &[DialogueTurn]) -> Influence {
  let tokens: Vec<String> = transcript.iter().flat_map(|turn| words(&turn.content)).collect();

  if tokens.is_empty() {
    return Influence::new();
  }
  let scale = (tokens.len() as f64 / 100.0).max(1.0);

  let mut out = Influence::new();
  for cues in DIALOGUE_CUES {
    let hits = |list: &[&str]| tokens.iter().filter(|t| list.contains(&t.as_str())).count();
    let net = hits(cues.raise) as f64 - hits(cues.lower) as f64;
    if net != 0.0 {
      out.insert(cues.trait_name, net / scale * 0.5);
    }
  }
  out
}

/// Score thresholds and text cues over the most recent reflections.
pub fn reflection_influences(reflections: &[ReflectionLog]) -> Influence {
  let mut out = Influence::new();
  for r in reflections {
    match r.success_score {
      Some(s) if s > 0.8 => add(&mut out, Trait::Conscientiousness, 0.1),
      Some(s) if s < 0.3 => add(&mut out, Trait::Conscientiousness, -0.1),
      _ => {}
    }
    match r.alignment_score {
      Some(a) if a > 0.7 => add(&mut out, Trait::EmotionalStability, 0.1),
      Some(a) if a < 0.3 => add(&mut out, Trait::EmotionalStability, -0.1),
      _ => {}
    }

    let text = r.content.to_lowercase();
    if mentions_any(&text, REFLECTION_CALM) {
      add(&mut out, Trait::EmotionalStability, 0.05);
    }
    if mentions_any(&text, REFLECTION_DISTRESS) {
      add(&mut out, Trait::EmotionalStability, -0.05);
    }
    if mentions_any(&text, REFLECTION_GROWTH) {
      add(&mut out, Trait::Openness, 0.05);
    }
  }
  out
}

/// Modifiers whose cue phrases appear in any feedback text.
pub fn reinforced_modifiers(feedback: &[FeedbackEvent]) -> BTreeSet<&'static str> {
  let texts: Vec<String> = feedback.iter().map(|f| f.content.to_lowercase()).collect();
  MODIFIER_CUES
    .iter()
    .filter(|(_, cues)| texts.iter().any(|t| mentions_any(t, cues)))
    .map(|(name, _)| *name)
    .collect()
}

// ─── Combination ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct Influences {
  pub feedback:   Influence,
  pub dialogue:   Influence,
  pub reflection: Influence,
}

impl Influences {
  /// Weighted contribution of each signal to `t`.
  fn contributions(&self, t: Trait) -> [(DriftSource, f64); 3] {
    let get = |m: &Influence| m.get(&t).copied().unwrap_or(0.0);
    [
      (DriftSource::Feedback, get(&self.feedback) * FEEDBACK_LEARNING_RATE),
      (DriftSource::Dialogue, get(&self.dialogue) * TONE_LEARNING_RATE),
      (DriftSource::Reflection, get(&self.reflection) * REFLECTION_LEARNING_RATE),
    ]
  }

  /// The signal with the largest weighted magnitude for `t`, or `Combined`
  /// on a tie.
  pub fn dominant_source(&self, t: Trait) -> DriftSource {
    let mut ranked = self.contributions(t);
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    if (ranked[0].1.abs() - ranked[1].1.abs()).abs() < 1e-12 {
      DriftSource::Combined
    } else {
      ranked[0].0
    }
  }

  /// Bounded per-trait deltas against `current`.
  ///
  /// Raw deltas under [`NOISE_FLOOR`] are dropped. The rest are clamped to
  /// the single-drift cap and then to the unit interval.
  pub fn deltas(&self, current: &TraitVector) -> BTreeMap<Trait, f64> {
    current
      .iter()
      .filter_map(|(t, value)| {
        let raw: f64 = self.contributions(*t).iter().map(|(_, c)| c).sum();
        if raw.abs() < NOISE_FLOOR {
          return None;
        }
        let delta = bounded_delta(*value, raw);
        (delta != 0.0).then_some((*t, delta))
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;
  use valis_core::personality::{MAX_SINGLE_DRIFT, neutral_traits};

  use super::*;

  fn fb(kind: FeedbackKind, text: &str) -> FeedbackEvent { FeedbackEvent::new(kind, text) }

  fn reflection(success: Option<f64>, alignment: Option<f64>, content: &str) -> ReflectionLog {
    ReflectionLog {
      reflection_id:   Uuid::new_v4(),
      session_id:      "s".into(),
      persona_id:      Uuid::nil(),
      content:         content.into(),
      success_score:   success,
      alignment_score: alignment,
      recorded_at:     Utc::now(),
    }
  }

  #[test]
  fn feedback_counts_each_direction_once_per_event() {
    let got = feedback_influences(&[fb(FeedbackKind::Negative, "rude, rude, dismissive")]);
    assert_eq!(got.get(&Trait::Agreeableness), Some(&0.15));

    let got = feedback_influences(&[
      fb(FeedbackKind::Positive, "so kind"),
      fb(FeedbackKind::Correction, "you are a pushover"),
    ]);
    assert!((got[&Trait::Agreeableness] - (0.1 - 0.12)).abs() < 1e-12);
  }

  #[test]
  fn dialogue_is_length_normalised() {
    let short = dialogue_influences(&[DialogueTurn::new("user", "I feel calm and relaxed")]);
    assert!((short[&Trait::EmotionalStability] - 1.0).abs() < 1e-12);

    let padding = "word ".repeat(398);
    let long = dialogue_influences(&[DialogueTurn::new("user", format!("calm relaxed {padding}"))]);
    // 400 words → scale 4
    assert!((long[&Trait::EmotionalStability] - 0.25).abs() < 1e-12);
  }

  #[test]
  fn dialogue_empty_transcript_has_no_influence() {
    assert!(dialogue_influences(&[]).is_empty());
    assert!(dialogue_influences(&[DialogueTurn::new("user", "  ...  ")]).is_empty());
  }

  #[test]
  fn reflection_thresholds_and_cues() {
    let got = reflection_influences(&[
      reflection(Some(0.9), Some(0.2), "I felt overwhelmed but learned a lot"),
      reflection(Some(0.5), None, ""),
    ]);
    assert!((got[&Trait::Conscientiousness] - 0.1).abs() < 1e-12);
    assert!((got[&Trait::EmotionalStability] + 0.15).abs() < 1e-12);
    assert!((got[&Trait::Openness] - 0.05).abs() < 1e-12);
  }

  #[test]
  fn dominant_source_prefers_largest_weighted() {
    let influences = Influences {
      feedback: [(Trait::Openness, 0.1)].into_iter().collect(),
      dialogue: [(Trait::Openness, 1.0)].into_iter().collect(),
      ..Default::default()
    };
    // 0.015 vs 0.08
    assert_eq!(influences.dominant_source(Trait::Openness), DriftSource::Dialogue);
    assert_eq!(influences.dominant_source(Trait::Agreeableness), DriftSource::Combined);
  }

  #[test]
  fn deltas_drop_noise_and_clamp() {
    let mut current = neutral_traits();
    current.insert(Trait::Openness, 0.98);
    let influences = Influences {
      feedback: [(Trait::Agreeableness, 0.005), (Trait::Extraversion, -10.0)]
        .into_iter()
        .collect(),
      dialogue: [(Trait::Openness, 5.0)].into_iter().collect(),
      ..Default::default()
    };

    let d = influences.deltas(&current);
    assert!(!d.contains_key(&Trait::Agreeableness));
    assert_eq!(d[&Trait::Extraversion], -MAX_SINGLE_DRIFT);
    assert!((d[&Trait::Openness] - 0.02).abs() < 1e-12);
  }

  #[test]
  fn modifier_cues_match_feedback_text() {
    let got = reinforced_modifiers(&[fb(FeedbackKind::Correction, "Too long. Be CONCISE.")]);
    assert_eq!(got.into_iter().collect::<Vec<_>>(), vec!["prefers_brevity"]);
  }
}
