//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! so that lexical order matches chronological order. Maps and sets are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase strings.
//! Enums are stored as their snake_case names.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;
use valis_core::{
  agent::Agent,
  cognition::{
    DreamFragment, EmotionState, FeedbackRecord, MemoryTrace, ReflectionLog,
    SelfProfile,
  },
  legacy::{ComponentScores, LegacyRecord},
  lineage::LineageEdge,
  mortality::{FinalThought, MortalityRecord},
  personality::{PersonalityProfile, TraitHistoryEntry},
  stats::MortalityStatistics,
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

/// Parse a snake_case enum column via its `strum::EnumString` impl.
pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownVariant { column, value: s.to_owned() })
}

pub fn encode_json<T: Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Each `Raw*` struct holds the column values exactly as read, so the rusqlite
// closure stays infallible apart from column access. Decoding into domain
// types happens afterwards, outside the connection thread.

pub const AGENT_COLUMNS: &str = "agent_id, name, bio, created_at";

pub struct RawAgent {
  pub agent_id:   String,
  pub name:       String,
  pub bio:        Option<String>,
  pub created_at: String,
}

impl RawAgent {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      agent_id:   row.get(0)?,
      name:       row.get(1)?,
      bio:        row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_agent(self) -> Result<Agent> {
    Ok(Agent {
      agent_id:   decode_uuid(&self.agent_id)?,
      name:       self.name,
      bio:        self.bio,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const MORTALITY_COLUMNS: &str = "agent_id, lifespan_total, lifespan_remaining, \
   lifespan_units, birth_timestamp, death_date, death_cause, rebirth_id";

pub struct RawMortality {
  pub agent_id:           String,
  pub lifespan_total:     i64,
  pub lifespan_remaining: i64,
  pub lifespan_units:     String,
  pub birth_timestamp:    String,
  pub death_date:         Option<String>,
  pub death_cause:        Option<String>,
  pub rebirth_id:         Option<String>,
}

impl RawMortality {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      agent_id:           row.get(0)?,
      lifespan_total:     row.get(1)?,
      lifespan_remaining: row.get(2)?,
      lifespan_units:     row.get(3)?,
      birth_timestamp:    row.get(4)?,
      death_date:         row.get(5)?,
      death_cause:        row.get(6)?,
      rebirth_id:         row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<MortalityRecord> {
    Ok(MortalityRecord {
      agent_id:           decode_uuid(&self.agent_id)?,
      lifespan_total:     self.lifespan_total,
      lifespan_remaining: self.lifespan_remaining,
      lifespan_units:     decode_enum("lifespan_units", &self.lifespan_units)?,
      birth_timestamp:    decode_dt(&self.birth_timestamp)?,
      death_date:         self.death_date.as_deref().map(decode_dt).transpose()?,
      death_cause:        self.death_cause,
      rebirth_id:         self.rebirth_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}

pub const LEGACY_COLUMNS: &str = "agent_id, score, legacy_tier, summary, impact_tags, \
   user_feedback, trait_evolution, memory_stability, emotional_richness, \
   final_reflection, final_calculation, updated_at";

pub struct RawLegacy {
  pub agent_id:           String,
  pub score:              f64,
  pub legacy_tier:        String,
  pub summary:            String,
  pub impact_tags:        String,
  pub user_feedback:      f64,
  pub trait_evolution:    f64,
  pub memory_stability:   f64,
  pub emotional_richness: f64,
  pub final_reflection:   f64,
  pub final_calculation:  Option<String>,
  pub updated_at:         String,
}

impl RawLegacy {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      agent_id:           row.get(0)?,
      score:              row.get(1)?,
      legacy_tier:        row.get(2)?,
      summary:            row.get(3)?,
      impact_tags:        row.get(4)?,
      user_feedback:      row.get(5)?,
      trait_evolution:    row.get(6)?,
      memory_stability:   row.get(7)?,
      emotional_richness: row.get(8)?,
      final_reflection:   row.get(9)?,
      final_calculation:  row.get(10)?,
      updated_at:         row.get(11)?,
    })
  }

  pub fn into_record(self) -> Result<LegacyRecord> {
    Ok(LegacyRecord {
      agent_id:          decode_uuid(&self.agent_id)?,
      score:             self.score,
      legacy_tier:       decode_enum("legacy_tier", &self.legacy_tier)?,
      summary:           self.summary,
      impact_tags:       decode_json(&self.impact_tags)?,
      components:        ComponentScores {
        user_feedback:      self.user_feedback,
        trait_evolution:    self.trait_evolution,
        memory_stability:   self.memory_stability,
        emotional_richness: self.emotional_richness,
        final_reflection:   self.final_reflection,
      },
      final_calculation: self.final_calculation.as_deref().map(decode_dt).transpose()?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

pub const THOUGHT_COLUMNS: &str =
  "thought_id, agent_id, thought_type, content, symbolic_weight, recorded_at";

pub struct RawFinalThought {
  pub thought_id:      String,
  pub agent_id:        String,
  pub thought_type:    String,
  pub content:         String,
  pub symbolic_weight: f64,
  pub recorded_at:     String,
}

impl RawFinalThought {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      thought_id:      row.get(0)?,
      agent_id:        row.get(1)?,
      thought_type:    row.get(2)?,
      content:         row.get(3)?,
      symbolic_weight: row.get(4)?,
      recorded_at:     row.get(5)?,
    })
  }

  pub fn into_thought(self) -> Result<FinalThought> {
    Ok(FinalThought {
      thought_id:      decode_uuid(&self.thought_id)?,
      agent_id:        decode_uuid(&self.agent_id)?,
      thought_type:    decode_enum("thought_type", &self.thought_type)?,
      content:         self.content,
      symbolic_weight: self.symbolic_weight,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}

pub const LINEAGE_COLUMNS: &str = "lineage_id, ancestor_id, descendant_id, inheritance_type, \
   inherited_json, trait_modifications, dream_echoes, generation_number, created_at";

pub struct RawLineage {
  pub lineage_id:          String,
  pub ancestor_id:         String,
  pub descendant_id:       String,
  pub inheritance_type:    String,
  pub inherited_json:      String,
  pub trait_modifications: String,
  pub dream_echoes:        u32,
  pub generation_number:   u32,
  pub created_at:          String,
}

impl RawLineage {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lineage_id:          row.get(0)?,
      ancestor_id:         row.get(1)?,
      descendant_id:       row.get(2)?,
      inheritance_type:    row.get(3)?,
      inherited_json:      row.get(4)?,
      trait_modifications: row.get(5)?,
      dream_echoes:        row.get(6)?,
      generation_number:   row.get(7)?,
      created_at:          row.get(8)?,
    })
  }

  pub fn into_edge(self) -> Result<LineageEdge> {
    Ok(LineageEdge {
      lineage_id:          decode_uuid(&self.lineage_id)?,
      ancestor_id:         decode_uuid(&self.ancestor_id)?,
      descendant_id:       decode_uuid(&self.descendant_id)?,
      inheritance_type:    decode_enum("inheritance_type", &self.inheritance_type)?,
      inherited:           decode_json(&self.inherited_json)?,
      trait_modifications: decode_json(&self.trait_modifications)?,
      dream_echoes:        self.dream_echoes,
      generation_number:   self.generation_number,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

pub const PERSONALITY_COLUMNS: &str =
  "persona_id, base_traits, learned_modifiers, updated_at";

pub struct RawPersonality {
  pub persona_id:        String,
  pub base_traits:       String,
  pub learned_modifiers: String,
  pub updated_at:        String,
}

impl RawPersonality {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      persona_id:        row.get(0)?,
      base_traits:       row.get(1)?,
      learned_modifiers: row.get(2)?,
      updated_at:        row.get(3)?,
    })
  }

  pub fn into_profile(self) -> Result<PersonalityProfile> {
    Ok(PersonalityProfile {
      persona_id:        decode_uuid(&self.persona_id)?,
      base_traits:       decode_json(&self.base_traits)?,
      learned_modifiers: decode_json(&self.learned_modifiers)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

pub const HISTORY_COLUMNS: &str = "entry_id, persona_id, trait_name, session_id, \
   value_before, value_after, delta, source_event, recorded_at";

pub struct RawTraitHistory {
  pub entry_id:     String,
  pub persona_id:   String,
  pub trait_name:   String,
  pub session_id:   String,
  pub value_before: f64,
  pub value_after:  f64,
  pub delta:        f64,
  pub source_event: String,
  pub recorded_at:  String,
}

impl RawTraitHistory {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:     row.get(0)?,
      persona_id:   row.get(1)?,
      trait_name:   row.get(2)?,
      session_id:   row.get(3)?,
      value_before: row.get(4)?,
      value_after:  row.get(5)?,
      delta:        row.get(6)?,
      source_event: row.get(7)?,
      recorded_at:  row.get(8)?,
    })
  }

  pub fn into_entry(self) -> Result<TraitHistoryEntry> {
    Ok(TraitHistoryEntry {
      entry_id:     decode_uuid(&self.entry_id)?,
      persona_id:   decode_uuid(&self.persona_id)?,
      trait_name:   decode_enum("trait_name", &self.trait_name)?,
      session_id:   self.session_id,
      value_before: self.value_before,
      value_after:  self.value_after,
      delta:        self.delta,
      source_event: decode_enum("source_event", &self.source_event)?,
      recorded_at:  decode_dt(&self.recorded_at)?,
    })
  }
}

pub const FEEDBACK_COLUMNS: &str =
  "feedback_id, persona_id, session_id, kind, content, recorded_at";

pub struct RawFeedback {
  pub feedback_id: String,
  pub persona_id:  String,
  pub session_id:  String,
  pub kind:        String,
  pub content:     String,
  pub recorded_at: String,
}

impl RawFeedback {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      feedback_id: row.get(0)?,
      persona_id:  row.get(1)?,
      session_id:  row.get(2)?,
      kind:        row.get(3)?,
      content:     row.get(4)?,
      recorded_at: row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<FeedbackRecord> {
    Ok(FeedbackRecord {
      feedback_id: decode_uuid(&self.feedback_id)?,
      persona_id:  decode_uuid(&self.persona_id)?,
      session_id:  self.session_id,
      kind:        decode_enum("kind", &self.kind)?,
      content:     self.content,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub const REFLECTION_COLUMNS: &str = "reflection_id, session_id, persona_id, content, \
   success_score, alignment_score, recorded_at";

pub struct RawReflection {
  pub reflection_id:   String,
  pub session_id:      String,
  pub persona_id:      String,
  pub content:         String,
  pub success_score:   Option<f64>,
  pub alignment_score: Option<f64>,
  pub recorded_at:     String,
}

impl RawReflection {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      reflection_id:   row.get(0)?,
      session_id:      row.get(1)?,
      persona_id:      row.get(2)?,
      content:         row.get(3)?,
      success_score:   row.get(4)?,
      alignment_score: row.get(5)?,
      recorded_at:     row.get(6)?,
    })
  }

  pub fn into_log(self) -> Result<ReflectionLog> {
    Ok(ReflectionLog {
      reflection_id:   decode_uuid(&self.reflection_id)?,
      session_id:      self.session_id,
      persona_id:      decode_uuid(&self.persona_id)?,
      content:         self.content,
      success_score:   self.success_score,
      alignment_score: self.alignment_score,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}

pub const DREAM_COLUMNS: &str = "dream_id, agent_id, content, symbolic_weight, recorded_at";

pub struct RawDream {
  pub dream_id:        String,
  pub agent_id:        String,
  pub content:         String,
  pub symbolic_weight: f64,
  pub recorded_at:     String,
}

impl RawDream {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      dream_id:        row.get(0)?,
      agent_id:        row.get(1)?,
      content:         row.get(2)?,
      symbolic_weight: row.get(3)?,
      recorded_at:     row.get(4)?,
    })
  }

  pub fn into_fragment(self) -> Result<DreamFragment> {
    Ok(DreamFragment {
      dream_id:        decode_uuid(&self.dream_id)?,
      agent_id:        decode_uuid(&self.agent_id)?,
      content:         self.content,
      symbolic_weight: self.symbolic_weight,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}

pub const MEMORY_COLUMNS: &str =
  "memory_id, agent_id, content, importance, decay, recorded_at";

pub struct RawMemory {
  pub memory_id:   String,
  pub agent_id:    String,
  pub content:     String,
  pub importance:  f64,
  pub decay:       f64,
  pub recorded_at: String,
}

impl RawMemory {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      memory_id:   row.get(0)?,
      agent_id:    row.get(1)?,
      content:     row.get(2)?,
      importance:  row.get(3)?,
      decay:       row.get(4)?,
      recorded_at: row.get(5)?,
    })
  }

  pub fn into_trace(self) -> Result<MemoryTrace> {
    Ok(MemoryTrace {
      memory_id:   decode_uuid(&self.memory_id)?,
      agent_id:    decode_uuid(&self.agent_id)?,
      content:     self.content,
      importance:  self.importance,
      decay:       self.decay,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub const EMOTION_COLUMNS: &str = "state_id, agent_id, emotion, intensity, recorded_at";

pub struct RawEmotion {
  pub state_id:    String,
  pub agent_id:    String,
  pub emotion:     String,
  pub intensity:   f64,
  pub recorded_at: String,
}

impl RawEmotion {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      state_id:    row.get(0)?,
      agent_id:    row.get(1)?,
      emotion:     row.get(2)?,
      intensity:   row.get(3)?,
      recorded_at: row.get(4)?,
    })
  }

  pub fn into_state(self) -> Result<EmotionState> {
    Ok(EmotionState {
      state_id:    decode_uuid(&self.state_id)?,
      agent_id:    decode_uuid(&self.agent_id)?,
      emotion:     self.emotion,
      intensity:   self.intensity,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub struct RawSelfProfile {
  pub agent_id:   String,
  pub summary:    String,
  pub created_at: String,
}

impl RawSelfProfile {
  pub fn into_profile(self) -> Result<SelfProfile> {
    Ok(SelfProfile {
      agent_id:   decode_uuid(&self.agent_id)?,
      summary:    self.summary,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawStatistics {
  pub stat_date:    String,
  pub total_births: i64,
  pub total_deaths: i64,
}

impl RawStatistics {
  pub fn into_statistics(self) -> Result<MortalityStatistics> {
    Ok(MortalityStatistics {
      stat_date:    decode_date(&self.stat_date)?,
      total_births: self.total_births,
      total_deaths: self.total_deaths,
    })
  }
}
