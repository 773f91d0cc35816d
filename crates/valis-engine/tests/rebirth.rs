//! Rebirth and lineage against an in-memory SQLite store.

use std::sync::Arc;

use uuid::Uuid;
use valis_core::{
  Error,
  agent::NewAgent,
  cognition::DreamFragment,
  lineage::InheritanceType,
  mortality::LifespanUnits,
  personality::{PersonalityProfile, Trait},
  store::VitalStore,
};
use valis_engine::{RebirthOptions, RebirthOutcome, Valis, rebirth::RebirthReport};
use valis_store_sqlite::SqliteStore;

async fn valis() -> Valis<SqliteStore> {
  Valis::new(Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store")))
}

/// A mortal agent with a personality, optionally already dead.
async fn ancestor(v: &Valis<SqliteStore>, name: &str, dead: bool) -> Uuid {
  let id = v.store().add_agent(NewAgent::new(name)).await.unwrap().agent_id;
  v.lifespan.initialize_mortality(id, Some(4), LifespanUnits::Sessions).await.unwrap();

  let mut profile = PersonalityProfile::neutral(id);
  profile.base_traits.insert(Trait::Openness, 0.95);
  profile.base_traits.insert(Trait::Extraversion, 0.05);
  profile.learned_modifiers.insert("enjoys_humor".into(), 0.6);
  v.store().put_personality(profile).await.unwrap();

  if dead {
    v.death.trigger_death(id, "natural").await.unwrap();
  }
  id
}

fn reborn(outcome: RebirthOutcome) -> Box<RebirthReport> {
  match outcome {
    RebirthOutcome::Reborn(report) => report,
    other => panic!("expected reborn, got {other:?}"),
  }
}

#[tokio::test]
async fn living_ancestor_cannot_be_reborn() {
  let v = valis().await;
  let id = ancestor(&v, "Ada", false).await;

  let outcome = v.rebirth.agent_rebirth(id, RebirthOptions::default()).await.unwrap();
  assert!(matches!(outcome, RebirthOutcome::AncestorNotDead { .. }));

  let json = serde_json::to_value(&outcome).unwrap();
  assert_eq!(json["status"], "ancestor_not_dead");
}

#[tokio::test]
async fn unknown_ancestor_is_not_found() {
  let v = valis().await;
  let err = v
    .rebirth
    .agent_rebirth(Uuid::new_v4(), RebirthOptions::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PersonaNotFound(_)));
}

#[tokio::test]
async fn partial_traits_rebirth() {
  let v = valis().await;
  let id = ancestor(&v, "Ada", false).await;

  // Not yet dead.
  let early = v.rebirth.agent_rebirth(id, RebirthOptions::default()).await.unwrap();
  assert!(matches!(early, RebirthOutcome::AncestorNotDead { .. }));

  v.death.trigger_death(id, "natural").await.unwrap();
  let report = reborn(
    v.rebirth
      .agent_rebirth(id, RebirthOptions {
        inheritance_type: InheritanceType::PartialTraits,
        ..Default::default()
      })
      .await
      .unwrap(),
  );
  let child = report.descendant.agent_id;

  assert_eq!(report.descendant.name, "Adaline");
  assert_eq!(report.generation_number, 2);
  assert_eq!(report.dream_echoes, 1);

  let parent = v.store().get_personality(id).await.unwrap().unwrap();
  let profile = v.store().get_personality(child).await.unwrap().unwrap();
  for (t, value) in &profile.base_traits {
    assert!((0.0..=1.0).contains(value));
    assert!((value - parent.base_traits[t]).abs() <= 0.2 + 1e-9, "{t} drifted too far");
  }
  assert!(profile.learned_modifiers.is_empty());

  let ancestor_record = v.store().get_mortality(id).await.unwrap().unwrap();
  assert_eq!(ancestor_record.rebirth_id, Some(child));

  // Fresh allotment in the ancestor's units.
  let child_record = v.store().get_mortality(child).await.unwrap().unwrap();
  assert_eq!(child_record.lifespan_units, LifespanUnits::Sessions);
  assert_eq!(child_record.lifespan_total, 100);
  assert_eq!(child_record.lifespan_remaining, 100);
  assert!(v.store().get_legacy(child).await.unwrap().is_some());

  // Baseline cognition was seeded.
  assert_eq!(v.store().emotion_states(child).await.unwrap()[0].emotion, "neutral");
  assert!(v.store().get_self_profile(child).await.unwrap().is_some());
}

#[tokio::test]
async fn full_rebirth_copies_profile_and_honours_options() {
  let v = valis().await;
  let id = ancestor(&v, "Quill", true).await;

  let report = reborn(
    v.rebirth
      .agent_rebirth(id, RebirthOptions {
        inheritance_type: InheritanceType::FullRebirth,
        name:             None,
        lifespan:         Some(12),
      })
      .await
      .unwrap(),
  );

  assert_eq!(report.descendant.name, "Quill Reborn");
  assert!(report.descendant.bio.as_deref().unwrap_or_default().contains("Quill"));
  assert_eq!(report.dream_echoes, 3);
  assert!(report.trait_modifications.values().all(|d| d.abs() < 1e-12));

  let child = report.descendant.agent_id;
  let profile = v.store().get_personality(child).await.unwrap().unwrap();
  assert_eq!(profile.base_traits[&Trait::Openness], 0.95);
  assert_eq!(profile.learned_modifiers.get("enjoys_humor"), Some(&0.6));
  assert_eq!(v.store().get_mortality(child).await.unwrap().unwrap().lifespan_total, 12);
}

#[tokio::test]
async fn dream_echoes_carry_fragments() {
  let v = valis().await;
  let id = ancestor(&v, "Nova", false).await;
  for i in 0..7 {
    v.store().add_dream(DreamFragment::new(id, format!("vision {i}"), 0.5)).await.unwrap();
  }
  v.death.trigger_death(id, "natural").await.unwrap();

  let report = reborn(
    v.rebirth
      .agent_rebirth(id, RebirthOptions {
        inheritance_type: InheritanceType::DreamEchoes,
        name:             Some("Echo".into()),
        lifespan:         None,
      })
      .await
      .unwrap(),
  );

  assert_eq!(report.descendant.name, "Echo");
  assert_eq!(report.dream_echoes, 5);
  assert_eq!(report.inherited.memory_fragments.len(), 5);
  assert_eq!(report.inherited.memory_fragments[0], "vision 6");
  assert!(report.inherited.traits.values().all(|v| *v == 0.5));

  let child = report.descendant.agent_id;
  assert_eq!(v.store().recent_dreams(child, 10).await.unwrap().len(), 5);
}

#[tokio::test]
async fn repeated_rebirth_does_not_fork() {
  let v = valis().await;
  let id = ancestor(&v, "Kai", true).await;

  let first = reborn(v.rebirth.agent_rebirth(id, RebirthOptions::default()).await.unwrap());
  let second = v.rebirth.agent_rebirth(id, RebirthOptions::default()).await.unwrap();

  let RebirthOutcome::AlreadyReborn { descendant_id, .. } = second else {
    panic!("expected already_reborn");
  };
  assert_eq!(descendant_id, first.descendant.agent_id);
  assert_eq!(v.store().list_descendants(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn generations_increment_along_the_chain() {
  let v = valis().await;
  let founder = ancestor(&v, "Theo", true).await;

  let founder_view = v.rebirth.lineage(founder).await.unwrap();
  assert_eq!(founder_view.generation_number, 1);
  assert!(founder_view.ancestry.is_none());

  let child = reborn(v.rebirth.agent_rebirth(founder, RebirthOptions::default()).await.unwrap());
  let child_id = child.descendant.agent_id;
  assert_eq!(child.generation_number, 2);

  v.death.trigger_death(child_id, "natural").await.unwrap();
  let grandchild =
    reborn(v.rebirth.agent_rebirth(child_id, RebirthOptions::default()).await.unwrap());
  assert_eq!(grandchild.generation_number, 3);
  assert_eq!(grandchild.descendant.name, "Theodora Reborn");

  let view = v.rebirth.lineage(child_id).await.unwrap();
  assert_eq!(view.generation_number, 2);
  assert_eq!(view.ancestry.map(|e| e.ancestor_id), Some(founder));
  assert_eq!(view.descendants.len(), 1);
  assert_eq!(view.descendants[0].descendant_id, grandchild.descendant.agent_id);

  let founder_view = v.rebirth.lineage(founder).await.unwrap();
  assert_eq!(founder_view.descendants.len(), 1);
}
