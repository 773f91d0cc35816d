//! Inputs produced by the conversational layer and consumed by this core:
//! feedback, transcripts, reflections, dreams, working memory, and emotion
//! states.
//!
//! All logs here are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Feedback ────────────────────────────────────────────────────────────────

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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeedbackKind {
  Positive,
  Negative,
  Correction,
}

impl FeedbackKind {
  /// How favourably this kind counts toward the user-feedback legacy
  /// component.
  pub fn legacy_weight(self) -> f64 {
    match self {
      Self::Positive => 1.0,
      Self::Correction => 0.5,
      Self::Negative => 0.0,
    }
  }
}

/// A single piece of feedback as received from the session layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
  #[serde(rename = "type")]
  pub kind:    FeedbackKind,
  #[serde(default)]
  pub content: String,
}

impl FeedbackEvent {
  pub fn new(kind: FeedbackKind, content: impl Into<String>) -> Self {
    Self { kind, content: content.into() }
  }
}

/// A persisted feedback event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
  pub feedback_id: Uuid,
  pub persona_id:  Uuid,
  pub session_id:  String,
  pub kind:        FeedbackKind,
  pub content:     String,
  pub recorded_at: DateTime<Utc>,
}

impl FeedbackRecord {
  pub fn new(persona_id: Uuid, session_id: &str, event: &FeedbackEvent) -> Self {
    Self {
      feedback_id: Uuid::new_v4(),
      persona_id,
      session_id: session_id.to_owned(),
      kind: event.kind,
      content: event.content.clone(),
      recorded_at: crate::now(),
    }
  }
}

// ─── Dialogue ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTurn {
  pub speaker: String,
  pub content: String,
}

impl DialogueTurn {
  pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
    Self { speaker: speaker.into(), content: content.into() }
  }
}

// ─── Reflection ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionLog {
  pub reflection_id:   Uuid,
  pub session_id:      String,
  pub persona_id:      Uuid,
  pub content:         String,
  pub success_score:   Option<f64>,
  pub alignment_score: Option<f64>,
  pub recorded_at:     DateTime<Utc>,
}

/// Input to [`crate::store::VitalStore::add_reflection`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewReflection {
  pub session_id:      String,
  pub persona_id:      Uuid,
  pub content:         String,
  pub success_score:   Option<f64>,
  pub alignment_score: Option<f64>,
}

impl NewReflection {
  /// Reject scores outside `[0, 1]`.
  pub fn validate(&self) -> Result<()> {
    if let Some(s) = self.success_score {
      Error::check_unit("success_score", s)?;
    }
    if let Some(a) = self.alignment_score {
      Error::check_unit("alignment_score", a)?;
    }
    Ok(())
  }
}

// ─── Personality learning log ────────────────────────────────────────────────

/// Free-text note that a learned modifier was reinforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningLogEntry {
  pub entry_id:    Uuid,
  pub persona_id:  Uuid,
  pub content:     String,
  pub recorded_at: DateTime<Utc>,
}

impl LearningLogEntry {
  pub fn new(persona_id: Uuid, content: impl Into<String>) -> Self {
    Self {
      entry_id: Uuid::new_v4(),
      persona_id,
      content: content.into(),
      recorded_at: crate::now(),
    }
  }
}

// ─── Dreams, memory, emotion ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DreamFragment {
  pub dream_id:        Uuid,
  pub agent_id:        Uuid,
  pub content:         String,
  pub symbolic_weight: f64,
  pub recorded_at:     DateTime<Utc>,
}

impl DreamFragment {
  pub fn new(agent_id: Uuid, content: impl Into<String>, symbolic_weight: f64) -> Self {
    Self {
      dream_id: Uuid::new_v4(),
      agent_id,
      content: content.into(),
      symbolic_weight: symbolic_weight.clamp(0.0, 1.0),
      recorded_at: crate::now(),
    }
  }
}

/// A working-memory entry; `decay` of 1.0 means fully faded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryTrace {
  pub memory_id:   Uuid,
  pub agent_id:    Uuid,
  pub content:     String,
  pub importance:  f64,
  pub decay:       f64,
  pub recorded_at: DateTime<Utc>,
}

impl MemoryTrace {
  pub fn new(agent_id: Uuid, content: impl Into<String>, importance: f64, decay: f64) -> Self {
    Self {
      memory_id: Uuid::new_v4(),
      agent_id,
      content: content.into(),
      importance: importance.clamp(0.0, 1.0),
      decay: decay.clamp(0.0, 1.0),
      recorded_at: crate::now(),
    }
  }
}

/// A structured emotion measurement for an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionState {
  pub state_id:    Uuid,
  pub agent_id:    Uuid,
  pub emotion:     String,
  pub intensity:   f64,
  pub recorded_at: DateTime<Utc>,
}

impl EmotionState {
  pub fn new(agent_id: Uuid, emotion: impl Into<String>, intensity: f64) -> Self {
    Self {
      state_id: Uuid::new_v4(),
      agent_id,
      emotion: emotion.into(),
      intensity: intensity.clamp(0.0, 1.0),
      recorded_at: crate::now(),
    }
  }
}

/// The agent's own narrative about who it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfProfile {
  pub agent_id:   Uuid,
  pub summary:    String,
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn feedback_event_reads_type_field() {
    let event: FeedbackEvent =
      serde_json::from_str(r#"{"type":"correction","content":"too long"}"#).unwrap();
    assert_eq!(event.kind, FeedbackKind::Correction);
    assert_eq!(event.content, "too long");
  }

  #[test]
  fn reflection_scores_must_be_unit() {
    let mut r = NewReflection {
      session_id:      "s".into(),
      persona_id:      Uuid::nil(),
      content:         String::new(),
      success_score:   Some(0.9),
      alignment_score: None,
    };
    assert!(r.validate().is_ok());

    r.alignment_score = Some(1.2);
    assert!(matches!(r.validate(), Err(Error::Validation(_))));
  }
}
