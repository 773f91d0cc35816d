//! [`SqliteStore`]: the SQLite implementation of [`VitalStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, Row, types::Value};
use uuid::Uuid;

use valis_core::{
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
  store::VitalStore,
};

use crate::{
  Result,
  encode::{
    AGENT_COLUMNS, DREAM_COLUMNS, EMOTION_COLUMNS, FEEDBACK_COLUMNS, HISTORY_COLUMNS,
    LEGACY_COLUMNS, LINEAGE_COLUMNS, MEMORY_COLUMNS, MORTALITY_COLUMNS,
    PERSONALITY_COLUMNS, REFLECTION_COLUMNS, RawAgent, RawDream, RawEmotion,
    RawFeedback, RawFinalThought, RawLegacy, RawLineage, RawMemory, RawMortality,
    RawPersonality, RawReflection, RawSelfProfile, RawStatistics, RawTraitHistory,
    THOUGHT_COLUMNS, encode_date, encode_dt, encode_json, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Parameter helpers ───────────────────────────────────────────────────────

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

fn opt_text(s: Option<String>) -> Value { s.map_or(Value::Null, Value::Text) }

fn uuid(id: Uuid) -> Value { Value::Text(encode_uuid(id)) }

fn dt(at: DateTime<Utc>) -> Value { Value::Text(encode_dt(at)) }

fn opt_dt(at: Option<DateTime<Utc>>) -> Value { opt_text(at.map(encode_dt)) }

fn real(v: f64) -> Value { Value::Real(v) }

fn opt_real(v: Option<f64>) -> Value { v.map_or(Value::Null, Value::Real) }

fn int(v: i64) -> Value { Value::Integer(v) }

type FromRow<R> = fn(&Row<'_>) -> rusqlite::Result<R>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A VALIS store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single parameterised statement and return the affected row count.
  async fn execute(&self, sql: &'static str, params: Vec<Value>) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params.iter()))?))
      .await?;
    Ok(changed)
  }

  /// Run a query and collect every row through `from_row`.
  async fn select_rows<R: Send + 'static>(
    &self,
    sql: String,
    params: Vec<Value>,
    from_row: FromRow<R>,
  ) -> Result<Vec<R>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run a query expected to yield at most one row.
  async fn select_one<R: Send + 'static>(
    &self,
    sql: String,
    params: Vec<Value>,
    from_row: FromRow<R>,
  ) -> Result<Option<R>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(params.iter()), from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }
}

// ─── VitalStore impl ─────────────────────────────────────────────────────────

impl VitalStore for SqliteStore {
  type Error = crate::Error;

  // ── Agents ────────────────────────────────────────────────────────────────

  async fn add_agent(&self, input: NewAgent) -> Result<Agent> {
    let agent = Agent {
      agent_id:   Uuid::new_v4(),
      name:       input.name,
      bio:        input.bio,
      created_at: valis_core::now(),
    };

    self
      .execute(
        "INSERT INTO agents (agent_id, name, bio, created_at) VALUES (?1, ?2, ?3, ?4)",
        vec![
          uuid(agent.agent_id),
          text(agent.name.clone()),
          opt_text(agent.bio.clone()),
          dt(agent.created_at),
        ],
      )
      .await?;

    Ok(agent)
  }

  async fn get_agent(&self, id: Uuid) -> Result<Option<Agent>> {
    self
      .select_one(
        format!("SELECT {AGENT_COLUMNS} FROM agents WHERE agent_id = ?1"),
        vec![uuid(id)],
        RawAgent::from_row,
      )
      .await?
      .map(RawAgent::into_agent)
      .transpose()
  }

  // ── Mortality ─────────────────────────────────────────────────────────────

  async fn insert_mortality(&self, record: MortalityRecord) -> Result<()> {
    self
      .execute(
        "INSERT INTO mortality (
           agent_id, lifespan_total, lifespan_remaining, lifespan_units,
           birth_timestamp, death_date, death_cause, rebirth_id
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        vec![
          uuid(record.agent_id),
          int(record.lifespan_total),
          int(record.lifespan_remaining),
          text(record.lifespan_units.as_ref()),
          dt(record.birth_timestamp),
          opt_dt(record.death_date),
          opt_text(record.death_cause),
          opt_text(record.rebirth_id.map(encode_uuid)),
        ],
      )
      .await?;
    Ok(())
  }

  async fn get_mortality(&self, id: Uuid) -> Result<Option<MortalityRecord>> {
    self
      .select_one(
        format!("SELECT {MORTALITY_COLUMNS} FROM mortality WHERE agent_id = ?1"),
        vec![uuid(id)],
        RawMortality::from_row,
      )
      .await?
      .map(RawMortality::into_record)
      .transpose()
  }

  async fn decrement_lifespan(&self, id: Uuid, amount: i64) -> Result<Option<i64>> {
    // Single read-modify-write statement; concurrent ticks cannot interleave.
    self
      .select_one(
        "UPDATE mortality
           SET lifespan_remaining = MAX(0, lifespan_remaining - ?2)
         WHERE agent_id = ?1 AND death_date IS NULL
         RETURNING lifespan_remaining"
          .to_owned(),
        vec![uuid(id), int(amount)],
        |row| row.get(0),
      )
      .await
  }

  async fn stamp_death(&self, id: Uuid, at: DateTime<Utc>, cause: String) -> Result<bool> {
    let changed = self
      .execute(
        "UPDATE mortality SET death_date = ?2, death_cause = ?3
         WHERE agent_id = ?1 AND death_date IS NULL",
        vec![uuid(id), dt(at), text(cause)],
      )
      .await?;
    Ok(changed == 1)
  }

  async fn set_rebirth_id(&self, id: Uuid, descendant_id: Uuid) -> Result<()> {
    self
      .execute(
        "UPDATE mortality SET rebirth_id = ?2 WHERE agent_id = ?1",
        vec![uuid(id), uuid(descendant_id)],
      )
      .await?;
    Ok(())
  }

  // ── Legacy ────────────────────────────────────────────────────────────────

  async fn insert_legacy(&self, record: LegacyRecord) -> Result<()> {
    let tags = encode_json(&record.impact_tags)?;
    let c = record.components;
    self
      .execute(
        "INSERT INTO legacy (
           agent_id, score, legacy_tier, summary, impact_tags,
           user_feedback, trait_evolution, memory_stability, emotional_richness,
           final_reflection, final_calculation, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        vec![
          uuid(record.agent_id),
          real(record.score),
          text(record.legacy_tier.as_ref()),
          text(record.summary),
          text(tags),
          real(c.user_feedback),
          real(c.trait_evolution),
          real(c.memory_stability),
          real(c.emotional_richness),
          real(c.final_reflection),
          opt_dt(record.final_calculation),
          dt(record.updated_at),
        ],
      )
      .await?;
    Ok(())
  }

  async fn get_legacy(&self, id: Uuid) -> Result<Option<LegacyRecord>> {
    self
      .select_one(
        format!("SELECT {LEGACY_COLUMNS} FROM legacy WHERE agent_id = ?1"),
        vec![uuid(id)],
        RawLegacy::from_row,
      )
      .await?
      .map(RawLegacy::into_record)
      .transpose()
  }

  async fn update_legacy(&self, record: LegacyRecord) -> Result<()> {
    let tags = encode_json(&record.impact_tags)?;
    let c = record.components;
    self
      .execute(
        "UPDATE legacy SET
           score = ?2, legacy_tier = ?3, summary = ?4, impact_tags = ?5,
           user_feedback = ?6, trait_evolution = ?7, memory_stability = ?8,
           emotional_richness = ?9, final_reflection = ?10,
           final_calculation = ?11, updated_at = ?12
         WHERE agent_id = ?1",
        vec![
          uuid(record.agent_id),
          real(record.score),
          text(record.legacy_tier.as_ref()),
          text(record.summary),
          text(tags),
          real(c.user_feedback),
          real(c.trait_evolution),
          real(c.memory_stability),
          real(c.emotional_richness),
          real(c.final_reflection),
          opt_dt(record.final_calculation),
          dt(record.updated_at),
        ],
      )
      .await?;
    Ok(())
  }

  // ── Final thoughts ────────────────────────────────────────────────────────

  async fn insert_final_thought(&self, thought: FinalThought) -> Result<bool> {
    let inserted = self
      .execute(
        "INSERT INTO final_thoughts (
           thought_id, agent_id, thought_type, content, symbolic_weight, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(agent_id, thought_type) DO NOTHING",
        vec![
          uuid(thought.thought_id),
          uuid(thought.agent_id),
          text(thought.thought_type.as_ref()),
          text(thought.content),
          real(thought.symbolic_weight),
          dt(thought.recorded_at),
        ],
      )
      .await?;
    Ok(inserted == 1)
  }

  async fn list_final_thoughts(&self, id: Uuid) -> Result<Vec<FinalThought>> {
    self
      .select_rows(
        format!(
          "SELECT {THOUGHT_COLUMNS} FROM final_thoughts
           WHERE agent_id = ?1 ORDER BY recorded_at, rowid"
        ),
        vec![uuid(id)],
        RawFinalThought::from_row,
      )
      .await?
      .into_iter()
      .map(RawFinalThought::into_thought)
      .collect()
  }

  // ── Lineage ───────────────────────────────────────────────────────────────

  async fn insert_lineage(&self, edge: LineageEdge) -> Result<()> {
    let inherited = encode_json(&edge.inherited)?;
    let modifications = encode_json(&edge.trait_modifications)?;
    self
      .execute(
        "INSERT INTO agent_lineage (
           lineage_id, ancestor_id, descendant_id, inheritance_type,
           inherited_json, trait_modifications, dream_echoes,
           generation_number, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        vec![
          uuid(edge.lineage_id),
          uuid(edge.ancestor_id),
          uuid(edge.descendant_id),
          text(edge.inheritance_type.as_ref()),
          text(inherited),
          text(modifications),
          int(i64::from(edge.dream_echoes)),
          int(i64::from(edge.generation_number)),
          dt(edge.created_at),
        ],
      )
      .await?;
    Ok(())
  }

  async fn latest_lineage_as_descendant(&self, id: Uuid) -> Result<Option<LineageEdge>> {
    self
      .select_one(
        format!(
          "SELECT {LINEAGE_COLUMNS} FROM agent_lineage
           WHERE descendant_id = ?1
           ORDER BY created_at DESC, rowid DESC LIMIT 1"
        ),
        vec![uuid(id)],
        RawLineage::from_row,
      )
      .await?
      .map(RawLineage::into_edge)
      .transpose()
  }

  async fn list_descendants(&self, id: Uuid) -> Result<Vec<LineageEdge>> {
    self
      .select_rows(
        format!(
          "SELECT {LINEAGE_COLUMNS} FROM agent_lineage
           WHERE ancestor_id = ?1 ORDER BY created_at, rowid"
        ),
        vec![uuid(id)],
        RawLineage::from_row,
      )
      .await?
      .into_iter()
      .map(RawLineage::into_edge)
      .collect()
  }

  // ── Personality ───────────────────────────────────────────────────────────

  async fn get_personality(&self, persona_id: Uuid) -> Result<Option<PersonalityProfile>> {
    self
      .select_one(
        format!("SELECT {PERSONALITY_COLUMNS} FROM personality_profiles WHERE persona_id = ?1"),
        vec![uuid(persona_id)],
        RawPersonality::from_row,
      )
      .await?
      .map(RawPersonality::into_profile)
      .transpose()
  }

  async fn put_personality(&self, profile: PersonalityProfile) -> Result<()> {
    let traits = encode_json(&profile.base_traits)?;
    let modifiers = encode_json(&profile.learned_modifiers)?;
    self
      .execute(
        "INSERT INTO personality_profiles (persona_id, base_traits, learned_modifiers, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(persona_id) DO UPDATE SET
           base_traits       = excluded.base_traits,
           learned_modifiers = excluded.learned_modifiers,
           updated_at        = excluded.updated_at",
        vec![uuid(profile.persona_id), text(traits), text(modifiers), dt(profile.updated_at)],
      )
      .await?;
    Ok(())
  }

  async fn append_trait_history(&self, entries: Vec<TraitHistoryEntry>) -> Result<()> {
    if entries.is_empty() {
      return Ok(());
    }

    let rows: Vec<Vec<Value>> = entries
      .into_iter()
      .map(|e| {
        vec![
          uuid(e.entry_id),
          uuid(e.persona_id),
          text(e.trait_name.as_ref()),
          text(e.session_id),
          real(e.value_before),
          real(e.value_after),
          real(e.delta),
          text(e.source_event.as_ref()),
          dt(e.recorded_at),
        ]
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO trait_history (
               entry_id, persona_id, trait_name, session_id,
               value_before, value_after, delta, source_event, recorded_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params_from_iter(row.iter()))?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn trait_history(
    &self,
    persona_id: Uuid,
    since: Option<DateTime<Utc>>,
  ) -> Result<Vec<TraitHistoryEntry>> {
    // An absent lower bound compares below every stored timestamp.
    self
      .select_rows(
        format!(
          "SELECT {HISTORY_COLUMNS} FROM trait_history
           WHERE persona_id = ?1 AND recorded_at >= ?2
           ORDER BY recorded_at, rowid"
        ),
        vec![uuid(persona_id), text(since.map(encode_dt).unwrap_or_default())],
        RawTraitHistory::from_row,
      )
      .await?
      .into_iter()
      .map(RawTraitHistory::into_entry)
      .collect()
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  async fn record_feedback(&self, records: Vec<FeedbackRecord>) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    let rows: Vec<Vec<Value>> = records
      .into_iter()
      .map(|r| {
        vec![
          uuid(r.feedback_id),
          uuid(r.persona_id),
          text(r.session_id),
          text(r.kind.as_ref()),
          text(r.content),
          dt(r.recorded_at),
        ]
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO feedback_log (
               feedback_id, persona_id, session_id, kind, content, recorded_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params_from_iter(row.iter()))?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn feedback_for(&self, persona_id: Uuid) -> Result<Vec<FeedbackRecord>> {
    self
      .select_rows(
        format!(
          "SELECT {FEEDBACK_COLUMNS} FROM feedback_log
           WHERE persona_id = ?1 ORDER BY recorded_at, rowid"
        ),
        vec![uuid(persona_id)],
        RawFeedback::from_row,
      )
      .await?
      .into_iter()
      .map(RawFeedback::into_record)
      .collect()
  }

  // ── Reflections ───────────────────────────────────────────────────────────

  async fn add_reflection(&self, input: NewReflection) -> Result<ReflectionLog> {
    input.validate()?;

    let log = ReflectionLog {
      reflection_id:   Uuid::new_v4(),
      session_id:      input.session_id,
      persona_id:      input.persona_id,
      content:         input.content,
      success_score:   input.success_score,
      alignment_score: input.alignment_score,
      recorded_at:     valis_core::now(),
    };

    self
      .execute(
        "INSERT INTO reflection_log (
           reflection_id, session_id, persona_id, content,
           success_score, alignment_score, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        vec![
          uuid(log.reflection_id),
          text(log.session_id.clone()),
          uuid(log.persona_id),
          text(log.content.clone()),
          opt_real(log.success_score),
          opt_real(log.alignment_score),
          dt(log.recorded_at),
        ],
      )
      .await?;

    Ok(log)
  }

  async fn recent_reflections(
    &self,
    session_id: String,
    persona_id: Uuid,
    limit: usize,
  ) -> Result<Vec<ReflectionLog>> {
    self
      .select_rows(
        format!(
          "SELECT {REFLECTION_COLUMNS} FROM reflection_log
           WHERE session_id = ?1 AND persona_id = ?2
           ORDER BY recorded_at DESC, rowid DESC LIMIT ?3"
        ),
        vec![text(session_id), uuid(persona_id), int(limit as i64)],
        RawReflection::from_row,
      )
      .await?
      .into_iter()
      .map(RawReflection::into_log)
      .collect()
  }

  async fn reflections_for(&self, persona_id: Uuid) -> Result<Vec<ReflectionLog>> {
    self
      .select_rows(
        format!(
          "SELECT {REFLECTION_COLUMNS} FROM reflection_log
           WHERE persona_id = ?1 ORDER BY recorded_at, rowid"
        ),
        vec![uuid(persona_id)],
        RawReflection::from_row,
      )
      .await?
      .into_iter()
      .map(RawReflection::into_log)
      .collect()
  }

  // ── Personality learning log ──────────────────────────────────────────────

  async fn append_learning_log(&self, entry: LearningLogEntry) -> Result<()> {
    self
      .execute(
        "INSERT INTO personality_learning_log (entry_id, persona_id, content, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          uuid(entry.entry_id),
          uuid(entry.persona_id),
          text(entry.content),
          dt(entry.recorded_at),
        ],
      )
      .await?;
    Ok(())
  }

  async fn learning_log_mentions(
    &self,
    persona_id: Uuid,
    needle: String,
    since: DateTime<Utc>,
  ) -> Result<bool> {
    // instr() rather than LIKE so `%` and `_` in the needle match literally.
    let hit = self
      .select_one(
        "SELECT 1 FROM personality_learning_log
         WHERE persona_id = ?1 AND recorded_at >= ?2
           AND instr(lower(content), lower(?3)) > 0
         LIMIT 1"
          .to_owned(),
        vec![uuid(persona_id), dt(since), text(needle)],
        |row| row.get::<_, i64>(0),
      )
      .await?;
    Ok(hit.is_some())
  }

  // ── Dreams, memory, emotion, self-profile ─────────────────────────────────

  async fn add_dream(&self, dream: DreamFragment) -> Result<()> {
    self
      .execute(
        "INSERT INTO dream_log (dream_id, agent_id, content, symbolic_weight, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
          uuid(dream.dream_id),
          uuid(dream.agent_id),
          text(dream.content),
          real(dream.symbolic_weight),
          dt(dream.recorded_at),
        ],
      )
      .await?;
    Ok(())
  }

  async fn recent_dreams(&self, agent_id: Uuid, limit: usize) -> Result<Vec<DreamFragment>> {
    self
      .select_rows(
        format!(
          "SELECT {DREAM_COLUMNS} FROM dream_log
           WHERE agent_id = ?1
           ORDER BY recorded_at DESC, rowid DESC LIMIT ?2"
        ),
        vec![uuid(agent_id), int(limit as i64)],
        RawDream::from_row,
      )
      .await?
      .into_iter()
      .map(RawDream::into_fragment)
      .collect()
  }

  async fn add_memory(&self, memory: MemoryTrace) -> Result<()> {
    self
      .execute(
        "INSERT INTO working_memory (memory_id, agent_id, content, importance, decay, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
          uuid(memory.memory_id),
          uuid(memory.agent_id),
          text(memory.content),
          real(memory.importance),
          real(memory.decay),
          dt(memory.recorded_at),
        ],
      )
      .await?;
    Ok(())
  }

  async fn memories_for(&self, agent_id: Uuid) -> Result<Vec<MemoryTrace>> {
    self
      .select_rows(
        format!(
          "SELECT {MEMORY_COLUMNS} FROM working_memory
           WHERE agent_id = ?1 ORDER BY recorded_at, rowid"
        ),
        vec![uuid(agent_id)],
        RawMemory::from_row,
      )
      .await?
      .into_iter()
      .map(RawMemory::into_trace)
      .collect()
  }

  async fn add_emotion_state(&self, state: EmotionState) -> Result<()> {
    self
      .execute(
        "INSERT INTO emotion_states (state_id, agent_id, emotion, intensity, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
          uuid(state.state_id),
          uuid(state.agent_id),
          text(state.emotion),
          real(state.intensity),
          dt(state.recorded_at),
        ],
      )
      .await?;
    Ok(())
  }

  async fn emotion_states(&self, agent_id: Uuid) -> Result<Vec<EmotionState>> {
    self
      .select_rows(
        format!(
          "SELECT {EMOTION_COLUMNS} FROM emotion_states
           WHERE agent_id = ?1 ORDER BY recorded_at, rowid"
        ),
        vec![uuid(agent_id)],
        RawEmotion::from_row,
      )
      .await?
      .into_iter()
      .map(RawEmotion::into_state)
      .collect()
  }

  async fn put_self_profile(&self, profile: SelfProfile) -> Result<()> {
    self
      .execute(
        "INSERT INTO self_profiles (agent_id, summary, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(agent_id) DO UPDATE SET summary = excluded.summary",
        vec![uuid(profile.agent_id), text(profile.summary), dt(profile.created_at)],
      )
      .await?;
    Ok(())
  }

  async fn get_self_profile(&self, agent_id: Uuid) -> Result<Option<SelfProfile>> {
    self
      .select_one(
        "SELECT agent_id, summary, created_at FROM self_profiles WHERE agent_id = ?1".to_owned(),
        vec![uuid(agent_id)],
        |row| {
          Ok(RawSelfProfile {
            agent_id:   row.get(0)?,
            summary:    row.get(1)?,
            created_at: row.get(2)?,
          })
        },
      )
      .await?
      .map(RawSelfProfile::into_profile)
      .transpose()
  }

  // ── Statistics ────────────────────────────────────────────────────────────

  async fn bump_statistic(&self, date: NaiveDate, event: LifeEvent) -> Result<()> {
    let (births, deaths) = match event {
      LifeEvent::Birth => (1, 0),
      LifeEvent::Death => (0, 1),
    };
    self
      .execute(
        "INSERT INTO mortality_statistics (stat_date, total_births, total_deaths)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(stat_date) DO UPDATE SET
           total_births = total_births + excluded.total_births,
           total_deaths = total_deaths + excluded.total_deaths",
        vec![text(encode_date(date)), int(births), int(deaths)],
      )
      .await?;
    Ok(())
  }

  async fn get_statistics(&self, date: NaiveDate) -> Result<Option<MortalityStatistics>> {
    self
      .select_one(
        "SELECT stat_date, total_births, total_deaths
         FROM mortality_statistics WHERE stat_date = ?1"
          .to_owned(),
        vec![text(encode_date(date))],
        |row| {
          Ok(RawStatistics {
            stat_date:    row.get(0)?,
            total_births: row.get(1)?,
            total_deaths: row.get(2)?,
          })
        },
      )
      .await?
      .map(RawStatistics::into_statistics)
      .transpose()
  }
}
