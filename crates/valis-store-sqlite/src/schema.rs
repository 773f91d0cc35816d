//! SQL schema for the VALIS SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS agents (
    agent_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    bio         TEXT,
    created_at  TEXT NOT NULL
);

-- One row per agent. death_date NULL means alive; once set it never changes.
CREATE TABLE IF NOT EXISTS mortality (
    agent_id            TEXT PRIMARY KEY,
    lifespan_total      INTEGER NOT NULL,
    lifespan_remaining  INTEGER NOT NULL,
    lifespan_units      TEXT NOT NULL,    -- 'hours' | 'sessions'
    birth_timestamp     TEXT NOT NULL,
    death_date          TEXT,
    death_cause         TEXT,
    rebirth_id          TEXT,
    CHECK (lifespan_remaining >= 0 AND lifespan_remaining <= lifespan_total)
);

CREATE TABLE IF NOT EXISTS legacy (
    agent_id            TEXT PRIMARY KEY,
    score               REAL NOT NULL DEFAULT 0,
    legacy_tier         TEXT NOT NULL DEFAULT 'wanderer',
    summary             TEXT NOT NULL DEFAULT '',
    impact_tags         TEXT NOT NULL DEFAULT '[]',
    user_feedback       REAL NOT NULL DEFAULT 0,
    trait_evolution     REAL NOT NULL DEFAULT 0,
    memory_stability    REAL NOT NULL DEFAULT 0,
    emotional_richness  REAL NOT NULL DEFAULT 0,
    final_reflection    REAL NOT NULL DEFAULT 0,
    final_calculation   TEXT,
    updated_at          TEXT NOT NULL
);

-- Written during death processing only; never updated.
CREATE TABLE IF NOT EXISTS final_thoughts (
    thought_id       TEXT PRIMARY KEY,
    agent_id         TEXT NOT NULL,
    thought_type     TEXT NOT NULL,
    content          TEXT NOT NULL,
    symbolic_weight  REAL NOT NULL,
    recorded_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS agent_lineage (
    lineage_id           TEXT PRIMARY KEY,
    ancestor_id          TEXT NOT NULL,
    descendant_id        TEXT NOT NULL UNIQUE,
    inheritance_type     TEXT NOT NULL,
    inherited_json       TEXT NOT NULL,
    trait_modifications  TEXT NOT NULL,
    dream_echoes         INTEGER NOT NULL,
    generation_number    INTEGER NOT NULL,
    created_at           TEXT NOT NULL,
    CHECK (ancestor_id != descendant_id)
);

CREATE TABLE IF NOT EXISTS personality_profiles (
    persona_id         TEXT PRIMARY KEY,
    base_traits        TEXT NOT NULL,
    learned_modifiers  TEXT NOT NULL DEFAULT '{}',
    updated_at         TEXT NOT NULL
);

-- Append-only audit trail of trait changes.
CREATE TABLE IF NOT EXISTS trait_history (
    entry_id      TEXT PRIMARY KEY,
    persona_id    TEXT NOT NULL,
    trait_name    TEXT NOT NULL,
    session_id    TEXT NOT NULL,
    value_before  REAL NOT NULL,
    value_after   REAL NOT NULL,
    delta         REAL NOT NULL,
    source_event  TEXT NOT NULL,
    recorded_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS feedback_log (
    feedback_id  TEXT PRIMARY KEY,
    persona_id   TEXT NOT NULL,
    session_id   TEXT NOT NULL,
    kind         TEXT NOT NULL,
    content      TEXT NOT NULL,
    recorded_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reflection_log (
    reflection_id    TEXT PRIMARY KEY,
    session_id       TEXT NOT NULL,
    persona_id       TEXT NOT NULL,
    content          TEXT NOT NULL,
    success_score    REAL,
    alignment_score  REAL,
    recorded_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS personality_learning_log (
    entry_id     TEXT PRIMARY KEY,
    persona_id   TEXT NOT NULL,
    content      TEXT NOT NULL,
    recorded_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dream_log (
    dream_id         TEXT PRIMARY KEY,
    agent_id         TEXT NOT NULL,
    content          TEXT NOT NULL,
    symbolic_weight  REAL NOT NULL,
    recorded_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS working_memory (
    memory_id    TEXT PRIMARY KEY,
    agent_id     TEXT NOT NULL,
    content      TEXT NOT NULL,
    importance   REAL NOT NULL,
    decay        REAL NOT NULL,
    recorded_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS emotion_states (
    state_id     TEXT PRIMARY KEY,
    agent_id     TEXT NOT NULL,
    emotion      TEXT NOT NULL,
    intensity    REAL NOT NULL,
    recorded_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS self_profiles (
    agent_id    TEXT PRIMARY KEY,
    summary     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- One row per UTC day, incremented on every birth/death.
CREATE TABLE IF NOT EXISTS mortality_statistics (
    stat_date     TEXT PRIMARY KEY,
    total_births  INTEGER NOT NULL DEFAULT 0,
    total_deaths  INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX IF NOT EXISTS final_thoughts_kind_idx ON final_thoughts(agent_id, thought_type);
CREATE INDEX IF NOT EXISTS lineage_ancestor_idx     ON agent_lineage(ancestor_id);
CREATE INDEX IF NOT EXISTS trait_history_idx        ON trait_history(persona_id, recorded_at);
CREATE INDEX IF NOT EXISTS feedback_persona_idx     ON feedback_log(persona_id);
CREATE INDEX IF NOT EXISTS reflection_session_idx   ON reflection_log(session_id, persona_id);
CREATE INDEX IF NOT EXISTS learning_persona_idx     ON personality_learning_log(persona_id, recorded_at);
CREATE INDEX IF NOT EXISTS dream_agent_idx          ON dream_log(agent_id, recorded_at);
CREATE INDEX IF NOT EXISTS memory_agent_idx         ON working_memory(agent_id);
CREATE INDEX IF NOT EXISTS emotion_agent_idx        ON emotion_states(agent_id);

PRAGMA user_version = 1;
";
