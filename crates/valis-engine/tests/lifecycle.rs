//! Birth → aging → death → legacy against an in-memory SQLite store.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use valis_core::{
  Error,
  agent::NewAgent,
  cognition::{DreamFragment, EmotionState, MemoryTrace, NewReflection},
  legacy::LegacyTier,
  mortality::{LifespanUnits, ThoughtType},
  store::VitalStore,
};
use valis_engine::{
  DeathOutcome, LifespanTick, MortalityInit, MortalityStatus, Valis,
  lifespan::LifespanDefaults, narrative::TemplateNarrator,
};
use valis_store_sqlite::SqliteStore;

async fn valis() -> Valis<SqliteStore> {
  Valis::new(Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store")))
}

async fn agent(v: &Valis<SqliteStore>, name: &str) -> Uuid {
  v.store().add_agent(NewAgent::new(name)).await.unwrap().agent_id
}

// ─── Lifespan ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_is_idempotent() {
  let v = valis().await;
  let id = agent(&v, "Ada").await;

  let first = v.lifespan.initialize_mortality(id, None, LifespanUnits::Hours).await.unwrap();
  let MortalityInit::Initialized { lifespan_total, .. } = first else {
    panic!("expected initialized");
  };
  assert_eq!(lifespan_total, 720);

  let second = v
    .lifespan
    .initialize_mortality(id, Some(5), LifespanUnits::Sessions)
    .await
    .unwrap();
  assert!(matches!(
    second,
    MortalityInit::AlreadyMortal {
      lifespan_remaining: 720,
      lifespan_units: LifespanUnits::Hours,
      ..
    }
  ));

  let stats = v.statistics(Utc::now().date_naive()).await.unwrap();
  assert_eq!(stats.total_births, 1);

  let legacy = v.store().get_legacy(id).await.unwrap().unwrap();
  assert_eq!(legacy.score, 0.0);
}

#[tokio::test]
async fn configured_defaults_apply() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let v = Valis::with_config(
    store,
    LifespanDefaults { hours: 48, sessions: 3 },
    Arc::new(TemplateNarrator),
  );
  let id = agent(&v, "Kai").await;

  let init = v.lifespan.initialize_mortality(id, None, LifespanUnits::Sessions).await.unwrap();
  assert!(matches!(init, MortalityInit::Initialized { lifespan_total: 3, .. }));
}

#[tokio::test]
async fn nil_id_is_persona_not_found() {
  let v = valis().await;
  let err = v
    .lifespan
    .initialize_mortality(Uuid::nil(), None, LifespanUnits::Hours)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PersonaNotFound(_)));
}

#[tokio::test]
async fn non_positive_inputs_are_rejected() {
  let v = valis().await;
  let id = agent(&v, "Ada").await;

  let err = v
    .lifespan
    .initialize_mortality(id, Some(0), LifespanUnits::Hours)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  v.lifespan.initialize_mortality(id, Some(3), LifespanUnits::Hours).await.unwrap();
  let err = v.lifespan.decrement_lifespan(id, 0).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn decrement_without_record_is_not_found() {
  let v = valis().await;
  let err = v.lifespan.decrement_lifespan(Uuid::new_v4(), 1).await.unwrap_err();
  assert!(matches!(err, Error::PersonaNotFound(_)));
}

#[tokio::test]
async fn status_of_unknown_agent_is_not_mortal() {
  let v = valis().await;
  let status = v.lifespan.get_mortality_status(Uuid::new_v4()).await.unwrap();
  assert!(matches!(status, MortalityStatus::NotMortal { .. }));
}

#[tokio::test]
async fn lifespan_is_monotone_and_floored() {
  let v = valis().await;
  let id = agent(&v, "Ada").await;
  v.lifespan.initialize_mortality(id, Some(10), LifespanUnits::Sessions).await.unwrap();

  let mut last = 10;
  for amount in [3, 1, 4, 1, 5] {
    match v.lifespan.decrement_lifespan(id, amount).await.unwrap() {
      LifespanTick::Decremented { lifespan_remaining, .. } => {
        assert!(lifespan_remaining <= last);
        assert!(lifespan_remaining >= 0);
        last = lifespan_remaining;
      }
      other => panic!("unexpected {other:?}"),
    }
  }
  assert_eq!(last, 0);
}

// ─── Full lifecycle ──────────────────────────────────────────────────────────

#[tokio::test]
async fn full_lifecycle() {
  let v = valis().await;
  let id = agent(&v, "Ada").await;
  v.lifespan.initialize_mortality(id, Some(2), LifespanUnits::Sessions).await.unwrap();

  let tick = v.lifespan.decrement_lifespan(id, 1).await.unwrap();
  let LifespanTick::Decremented { lifespan_remaining, death_triggered, percentage_lived, .. } =
    tick
  else {
    panic!("expected decremented");
  };
  assert_eq!(lifespan_remaining, 1);
  assert!(!death_triggered);
  assert_eq!(percentage_lived, 50.0);

  let tick = v.lifespan.decrement_lifespan(id, 1).await.unwrap();
  assert!(matches!(
    tick,
    LifespanTick::Decremented { lifespan_remaining: 0, death_triggered: true, .. }
  ));

  // Decrement never kills on its own.
  let status = v.lifespan.get_mortality_status(id).await.unwrap();
  assert!(matches!(status, MortalityStatus::Alive(_)));

  let outcome = v.death.trigger_death(id, "natural").await.unwrap();
  let DeathOutcome::DeathProcessed(report) = outcome else {
    panic!("expected death_processed");
  };
  assert_eq!(report.death_cause, "natural");
  assert!(report.legacy.finalized);
  assert_eq!(report.legacy.legacy_tier, LegacyTier::from_score(report.legacy.score));
  assert_eq!(report.final_thoughts.len(), 2);

  let json = serde_json::to_value(DeathOutcome::DeathProcessed(report.clone())).unwrap();
  assert_eq!(json["status"], "death_processed");

  let again = v.death.trigger_death(id, "system_error").await.unwrap();
  let DeathOutcome::AlreadyDead { death_date, death_cause, .. } = again else {
    panic!("expected already_dead");
  };
  assert_eq!(death_cause.as_deref(), Some("natural"));
  assert_eq!(death_date, Some(report.death_date));

  // Side effects ran exactly once.
  assert_eq!(v.store().list_final_thoughts(id).await.unwrap().len(), 2);
  let stats = v.statistics(Utc::now().date_naive()).await.unwrap();
  assert_eq!(stats.total_deaths, 1);

  let status = v.lifespan.get_mortality_status(id).await.unwrap();
  let MortalityStatus::Dead(status) = status else {
    panic!("expected dead");
  };
  assert_eq!(status.percentage_lived, 100.0);
  assert!(status.legacy.finalized);

  let tick = v.lifespan.decrement_lifespan(id, 1).await.unwrap();
  assert!(matches!(tick, LifespanTick::AlreadyDead { .. }));
}

#[tokio::test]
async fn death_without_mortality_is_not_found() {
  let v = valis().await;
  let id = agent(&v, "Ada").await;
  let err = v.death.trigger_death(id, "natural").await.unwrap_err();
  assert!(matches!(err, Error::PersonaNotFound(_)));
}

#[tokio::test]
async fn death_dream_appears_when_agent_dreamed() {
  let v = valis().await;
  let id = agent(&v, "Luna").await;
  v.lifespan.initialize_mortality(id, Some(2), LifespanUnits::Sessions).await.unwrap();
  v.store().add_dream(DreamFragment::new(id, "a silver tide", 0.6)).await.unwrap();

  let DeathOutcome::DeathProcessed(report) = v.death.trigger_death(id, "").await.unwrap() else {
    panic!("expected death_processed");
  };
  assert_eq!(report.death_cause, "natural");
  assert_eq!(report.final_thoughts.len(), 3);
  assert!(
    report
      .final_thoughts
      .iter()
      .any(|t| t.thought_type == ThoughtType::DeathDream && t.content.contains("silver tide"))
  );
}

#[tokio::test]
async fn retry_after_partial_death_reuses_thoughts() {
  let v = valis().await;
  let id = agent(&v, "Theo").await;
  v.lifespan.initialize_mortality(id, Some(2), LifespanUnits::Sessions).await.unwrap();

  // An earlier attempt wrote thoughts and finalized legacy, then crashed.
  v.legacy.generate_legacy_score(id, true).await.unwrap();
  v.store()
    .insert_final_thought(valis_core::mortality::FinalThought::new(
      id,
      ThoughtType::FinalReflection,
      "interrupted",
      0.8,
    ))
    .await
    .unwrap();
  let frozen = v.store().get_legacy(id).await.unwrap().unwrap();

  let DeathOutcome::DeathProcessed(report) = v.death.trigger_death(id, "natural").await.unwrap()
  else {
    panic!("expected death_processed");
  };
  assert_eq!(report.final_thoughts.len(), 1);
  assert_eq!(report.final_thoughts[0].content, "interrupted");
  assert_eq!(report.legacy.score, frozen.score);
}

#[tokio::test]
async fn concurrent_deaths_write_one_set_of_thoughts() {
  let v = valis().await;
  let id = agent(&v, "Nova").await;
  v.lifespan.initialize_mortality(id, Some(2), LifespanUnits::Sessions).await.unwrap();

  let (a, b) = tokio::join!(
    v.death.trigger_death(id, "natural"),
    v.death.trigger_death(id, "natural")
  );
  a.unwrap();
  b.unwrap();

  let thoughts = v.store().list_final_thoughts(id).await.unwrap();
  let mut kinds: Vec<&str> = thoughts.iter().map(|t| t.thought_type.as_ref()).collect();
  kinds.sort_unstable();
  kinds.dedup();
  assert_eq!(kinds.len(), thoughts.len());

  let stats = v.statistics(Utc::now().date_naive()).await.unwrap();
  assert_eq!(stats.total_deaths, 1);
}

// ─── Legacy ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn legacy_without_record_is_not_found() {
  let v = valis().await;
  let err = v.legacy.generate_legacy_score(Uuid::new_v4(), false).await.unwrap_err();
  assert!(matches!(err, Error::LegacyNotFound(_)));
}

#[tokio::test]
async fn provisional_legacy_uses_fallbacks() {
  let v = valis().await;
  let id = agent(&v, "Ada").await;
  v.lifespan.initialize_mortality(id, None, LifespanUnits::Hours).await.unwrap();

  let report = v.legacy.generate_legacy_score(id, false).await.unwrap();
  // (0.6*.25 + 0.7*.2 + 0.65*.2 + 0.8*.15) / 0.8
  let expected = (0.15 + 0.14 + 0.13 + 0.12) / 0.8;
  assert!((report.score - expected).abs() < 1e-9);
  assert_eq!(report.legacy_tier, LegacyTier::Guide);
  assert_eq!(report.components.final_reflection, 0.0);
  assert!(!report.finalized);
  assert!(report.impact_tags.contains("consistent"));

  let stored = v.store().get_legacy(id).await.unwrap().unwrap();
  assert!(stored.final_calculation.is_none());
  assert!(!stored.summary.is_empty());
}

#[tokio::test]
async fn legacy_reflects_recorded_evidence() {
  let v = valis().await;
  let id = agent(&v, "Iris").await;
  v.lifespan.initialize_mortality(id, None, LifespanUnits::Hours).await.unwrap();

  v.store().add_memory(MemoryTrace::new(id, "first light", 1.0, 0.0)).await.unwrap();
  for emotion in ["joy", "awe", "grief", "calm", "hope", "longing"] {
    v.store().add_emotion_state(EmotionState::new(id, emotion, 1.0)).await.unwrap();
  }
  v.store()
    .add_reflection(NewReflection {
      session_id:      "s1".into(),
      persona_id:      id,
      content:         "it went well".into(),
      success_score:   Some(1.0),
      alignment_score: Some(1.0),
    })
    .await
    .unwrap();
  v.drift.initialize_personality(id, None).await.unwrap();
  let mut profile = v.store().get_personality(id).await.unwrap().unwrap();
  profile.base_traits.insert(valis_core::personality::Trait::Openness, 0.9);
  v.store().put_personality(profile).await.unwrap();

  let report = v.legacy.generate_legacy_score(id, false).await.unwrap();
  assert_eq!(report.components.memory_stability, 1.0);
  assert!((report.components.emotional_richness - 1.0).abs() < 1e-9);
  assert!(report.impact_tags.contains("visionary"));
}

#[tokio::test]
async fn finalized_legacy_is_frozen() {
  let v = valis().await;
  let id = agent(&v, "Sage").await;
  v.lifespan.initialize_mortality(id, None, LifespanUnits::Hours).await.unwrap();

  let finalized = v.legacy.generate_legacy_score(id, true).await.unwrap();
  let stamp = v.store().get_legacy(id).await.unwrap().unwrap().final_calculation;
  assert!(stamp.is_some());

  let later = v.legacy.generate_legacy_score(id, false).await.unwrap();
  assert!(later.finalized);
  assert_eq!(later.score, finalized.score);
  assert_eq!(v.store().get_legacy(id).await.unwrap().unwrap().final_calculation, stamp);
}
