//! The `VitalStore` trait: the persistence contract for every lifecycle
//! record.
//!
//! The trait is implemented by storage backends (e.g. `valis-store-sqlite`).
//! The engines in `valis-engine` depend on this abstraction, not on any
//! concrete backend. Every method is a single independently-committed
//! statement (or a short read); no call spans a transaction with another.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  agent::{Agent, NewAgent},
  cognition::{
    DreamFragment, EmotionState, FeedbackRecord, LearningLogEntry, MemoryTrace,
    NewReflection, ReflectionLog, SelfProfile,
  },
  legacy::LegacyRecord,
  lineage::LineageEdge,
  mortality::{FinalThought, MortalityRecord},
  personality::{PersonalityProfile, TraitHistoryEntry},
  stats::{LifeEvent, MortalityStatistics},
};

/// Abstraction over a VALIS persistence backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait VitalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Agents ────────────────────────────────────────────────────────────

  /// Create and persist a new agent persona.
  fn add_agent(
    &self,
    input: NewAgent,
  ) -> impl Future<Output = Result<Agent, Self::Error>> + Send + '_;

  /// Retrieve an agent by UUID. Returns `None` if not found.
  fn get_agent(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Agent>, Self::Error>> + Send + '_;

  // ── Mortality ─────────────────────────────────────────────────────────

  /// Insert a mortality record. Fails if one already exists for the agent.
  fn insert_mortality(
    &self,
    record: MortalityRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_mortality(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<MortalityRecord>, Self::Error>> + Send + '_;

  /// Atomically lower `lifespan_remaining` by `amount`, flooring at zero.
  ///
  /// Returns the new remaining value, or `None` if the agent has no record
  /// or is already dead (in which case nothing changes).
  fn decrement_lifespan(
    &self,
    id: Uuid,
    amount: i64,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  /// Stamp `death_date` and `death_cause`, only if they are not yet set.
  ///
  /// Returns `true` if this call performed the stamp.
  fn stamp_death(
    &self,
    id: Uuid,
    at: DateTime<Utc>,
    cause: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn set_rebirth_id(
    &self,
    id: Uuid,
    descendant_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Legacy ────────────────────────────────────────────────────────────

  fn insert_legacy(
    &self,
    record: LegacyRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_legacy(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<LegacyRecord>, Self::Error>> + Send + '_;

  /// Overwrite the legacy row in place.
  fn update_legacy(
    &self,
    record: LegacyRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Final thoughts ────────────────────────────────────────────────────

  /// Store a final thought unless the agent already has one of that type.
  ///
  /// Returns `true` if this call inserted it.
  fn insert_final_thought(
    &self,
    thought: FinalThought,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All final thoughts for an agent, oldest first.
  fn list_final_thoughts(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<FinalThought>, Self::Error>> + Send + '_;

  // ── Lineage ───────────────────────────────────────────────────────────

  fn insert_lineage(
    &self,
    edge: LineageEdge,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The most recent edge in which `id` is the descendant.
  fn latest_lineage_as_descendant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<LineageEdge>, Self::Error>> + Send + '_;

  /// Every edge in which `id` is the ancestor, oldest first.
  fn list_descendants(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<LineageEdge>, Self::Error>> + Send + '_;

  // ── Personality ───────────────────────────────────────────────────────

  fn get_personality(
    &self,
    persona_id: Uuid,
  ) -> impl Future<Output = Result<Option<PersonalityProfile>, Self::Error>> + Send + '_;

  /// Insert or fully overwrite a personality profile.
  fn put_personality(
    &self,
    profile: PersonalityProfile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn append_trait_history(
    &self,
    entries: Vec<TraitHistoryEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// History rows for a persona, oldest first, optionally only those
  /// recorded at or after `since`.
  fn trait_history(
    &self,
    persona_id: Uuid,
    since: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<TraitHistoryEntry>, Self::Error>> + Send + '_;

  // ── Feedback ──────────────────────────────────────────────────────────

  fn record_feedback(
    &self,
    records: Vec<FeedbackRecord>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn feedback_for(
    &self,
    persona_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FeedbackRecord>, Self::Error>> + Send + '_;

  // ── Reflections ───────────────────────────────────────────────────────

  /// Record a reflection. The UUID and `recorded_at` are set by the store.
  fn add_reflection(
    &self,
    input: NewReflection,
  ) -> impl Future<Output = Result<ReflectionLog, Self::Error>> + Send + '_;

  /// Up to `limit` reflections for the (session, persona) pair, newest first.
  fn recent_reflections(
    &self,
    session_id: String,
    persona_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ReflectionLog>, Self::Error>> + Send + '_;

  /// Every reflection for a persona across all sessions.
  fn reflections_for(
    &self,
    persona_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReflectionLog>, Self::Error>> + Send + '_;

  // ── Personality learning log ──────────────────────────────────────────

  fn append_learning_log(
    &self,
    entry: LearningLogEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Whether any learning-log row for the persona recorded at or after
  /// `since` contains `text` (case-insensitive).
  fn learning_log_mentions(
    &self,
    persona_id: Uuid,
    text: String,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Dreams, memory, emotion, self-profile ─────────────────────────────

  fn add_dream(
    &self,
    dream: DreamFragment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Up to `limit` dream fragments, newest first.
  fn recent_dreams(
    &self,
    agent_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<DreamFragment>, Self::Error>> + Send + '_;

  fn add_memory(
    &self,
    memory: MemoryTrace,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn memories_for(
    &self,
    agent_id: Uuid,
  ) -> impl Future<Output = Result<Vec<MemoryTrace>, Self::Error>> + Send + '_;

  fn add_emotion_state(
    &self,
    state: EmotionState,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn emotion_states(
    &self,
    agent_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EmotionState>, Self::Error>> + Send + '_;

  fn put_self_profile(
    &self,
    profile: SelfProfile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_self_profile(
    &self,
    agent_id: Uuid,
  ) -> impl Future<Output = Result<Option<SelfProfile>, Self::Error>> + Send + '_;

  // ── Statistics ────────────────────────────────────────────────────────

  /// Increment the counter for `event` on `date`, creating the row if needed.
  fn bump_statistic(
    &self,
    date: NaiveDate,
    event: LifeEvent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_statistics(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<MortalityStatistics>, Self::Error>> + Send + '_;
}
