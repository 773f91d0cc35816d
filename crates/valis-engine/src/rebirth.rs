//! Rebirth: deriving a descendant agent from a deceased ancestor.

use std::{collections::BTreeMap, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use valis_core::{
  Error, Result,
  agent::{Agent, NewAgent},
  cognition::{DreamFragment, EmotionState, SelfProfile},
  lineage::{FOUNDING_GENERATION, InheritanceType, InheritedData, LineageEdge},
  personality::{
    PersonalityProfile, Trait, TraitVector, clamp_unit, neutral_traits, normalize_traits,
  },
  store::VitalStore,
};

use crate::{lifespan::LifespanEvaluator, narrative::Narrator, require_id};

/// Half-width of the uniform noise applied under `partial_traits`.
pub const PARTIAL_TRAIT_NOISE: f64 = 0.2;

/// Optional overrides for [`RebirthCoordinator::agent_rebirth`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RebirthOptions {
  #[serde(default)]
  pub inheritance_type: InheritanceType,
  /// Descendant name; generated from the ancestor's when absent.
  #[serde(default)]
  pub name:             Option<String>,
  /// Fresh allotment in the ancestor's units; the configured default when
  /// absent.
  #[serde(default)]
  pub lifespan:         Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebirthReport {
  pub ancestor_id:         Uuid,
  pub descendant:          Agent,
  pub lineage_id:          Uuid,
  pub inheritance_type:    InheritanceType,
  pub inherited:           InheritedData,
  pub trait_modifications: BTreeMap<Trait, f64>,
  pub dream_echoes:        u32,
  pub generation_number:   u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RebirthOutcome {
  Reborn(Box<RebirthReport>),
  AncestorNotDead { ancestor_id: Uuid },
  AlreadyReborn { ancestor_id: Uuid, descendant_id: Uuid },
}

/// An agent's position in its lineage.
#[derive(Debug, Clone, Serialize)]
pub struct LineageView {
  pub agent_id:          Uuid,
  pub generation_number: u32,
  /// The edge that created this agent, if it was reborn.
  pub ancestry:          Option<LineageEdge>,
  pub descendants:       Vec<LineageEdge>,
}

// ─── Inheritance ─────────────────────────────────────────────────────────────

/// Derive what a descendant receives.
///
/// `dreams` are the ancestor's most recent fragments, newest first; at most
/// [`InheritanceType::dream_echo_count`] of them are carried over.
pub fn inherit<R: Rng + ?Sized>(
  kind: InheritanceType,
  ancestor: &PersonalityProfile,
  dreams: &[DreamFragment],
  rng: &mut R,
) -> InheritedData {
  let parent = normalize_traits(&ancestor.base_traits);

  let (traits, learned_modifiers): (TraitVector, _) = match kind {
    InheritanceType::FullRebirth => (parent, ancestor.learned_modifiers.clone()),
    InheritanceType::PartialTraits => (
      parent
        .into_iter()
        .map(|(t, v)| {
          let noise = rng.gen_range(-PARTIAL_TRAIT_NOISE..=PARTIAL_TRAIT_NOISE);
          (t, clamp_unit(v + noise))
        })
        .collect(),
      BTreeMap::new(),
    ),
    InheritanceType::DreamEchoes => (neutral_traits(), BTreeMap::new()),
  };

  let memory_fragments = dreams
    .iter()
    .take(kind.dream_echo_count() as usize)
    .map(|d| d.content.clone())
    .collect();

  InheritedData { traits, learned_modifiers, memory_fragments }
}

/// Per-trait `descendant - ancestor`.
pub fn trait_modifications(
  ancestor: &TraitVector,
  descendant: &TraitVector,
) -> BTreeMap<Trait, f64> {
  let ancestor = normalize_traits(ancestor);
  descendant
    .iter()
    .map(|(t, v)| (*t, v - ancestor.get(t).copied().unwrap_or(0.5)))
    .collect()
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct RebirthCoordinator<S> {
  store:    Arc<S>,
  lifespan: LifespanEvaluator<S>,
  narrator: Arc<dyn Narrator>,
}

impl<S: VitalStore> RebirthCoordinator<S> {
  pub fn new(store: Arc<S>, lifespan: LifespanEvaluator<S>, narrator: Arc<dyn Narrator>) -> Self {
    Self { store, lifespan, narrator }
  }

  pub async fn agent_rebirth(
    &self,
    ancestor_id: Uuid,
    options: RebirthOptions,
  ) -> Result<RebirthOutcome> {
    let ancestor_id = require_id(ancestor_id)?;
    if let Some(l) = options.lifespan
      && l <= 0
    {
      return Err(Error::Validation(format!("lifespan must be positive, got {l}")));
    }

    let mortality = self
      .store
      .get_mortality(ancestor_id)
      .await
      .map_err(Error::database("get_mortality"))?
      .ok_or(Error::PersonaNotFound(ancestor_id))?;

    if !mortality.is_dead() {
      return Ok(RebirthOutcome::AncestorNotDead { ancestor_id });
    }
    if let Some(descendant_id) = mortality.rebirth_id {
      return Ok(RebirthOutcome::AlreadyReborn { ancestor_id, descendant_id });
    }

    let ancestor = self
      .store
      .get_agent(ancestor_id)
      .await
      .map_err(Error::database("get_agent"))?
      .ok_or(Error::PersonaNotFound(ancestor_id))?;
    let profile = self
      .store
      .get_personality(ancestor_id)
      .await
      .map_err(Error::database("get_personality"))?
      .unwrap_or_else(|| PersonalityProfile::neutral(ancestor_id));

    let kind = options.inheritance_type;
    let dreams = self
      .store
      .recent_dreams(ancestor_id, kind.dream_echo_count() as usize)
      .await
      .map_err(Error::database("recent_dreams"))?;

    let inherited = inherit(kind, &profile, &dreams, &mut StdRng::from_entropy());
    let modifications = trait_modifications(&profile.base_traits, &inherited.traits);

    // Persona, personality, and mortality make the descendant real.
    let descendant = self
      .store
      .add_agent(NewAgent {
        name: options.name.unwrap_or_else(|| self.narrator.descendant_name(&ancestor.name)),
        bio:  Some(self.narrator.descendant_bio(&ancestor.name, inherited.traits.len(), kind)),
      })
      .await
      .map_err(Error::database("add_agent"))?;
    let descendant_id = descendant.agent_id;

    let mut descendant_profile = PersonalityProfile::new(descendant_id, inherited.traits.clone());
    descendant_profile.learned_modifiers = inherited.learned_modifiers.clone();
    self
      .store
      .put_personality(descendant_profile)
      .await
      .map_err(Error::database("put_personality"))?;

    self
      .lifespan
      .initialize_mortality(descendant_id, options.lifespan, mortality.lifespan_units)
      .await?;

    let generation_number = self.generation_of(ancestor_id).await? + 1;
    let edge = LineageEdge {
      lineage_id: Uuid::new_v4(),
      ancestor_id,
      descendant_id,
      inheritance_type: kind,
      inherited: inherited.clone(),
      trait_modifications: modifications.clone(),
      dream_echoes: kind.dream_echo_count(),
      generation_number,
      created_at: valis_core::now(),
    };
    let lineage_id = edge.lineage_id;
    self
      .store
      .insert_lineage(edge)
      .await
      .map_err(Error::database("insert_lineage"))?;
    self
      .store
      .set_rebirth_id(ancestor_id, descendant_id)
      .await
      .map_err(Error::database("set_rebirth_id"))?;

    self.seed_cognition(descendant_id, &dreams).await;

    tracing::info!(
      %ancestor_id,
      %descendant_id,
      inheritance = %kind,
      generation_number,
      "agent reborn"
    );

    Ok(RebirthOutcome::Reborn(Box::new(RebirthReport {
      ancestor_id,
      descendant,
      lineage_id,
      inheritance_type: kind,
      inherited,
      trait_modifications: modifications,
      dream_echoes: kind.dream_echo_count(),
      generation_number,
    })))
  }

  pub async fn lineage(&self, agent_id: Uuid) -> Result<LineageView> {
    let agent_id = require_id(agent_id)?;
    let ancestry = self
      .store
      .latest_lineage_as_descendant(agent_id)
      .await
      .map_err(Error::database("latest_lineage_as_descendant"))?;
    let descendants = self
      .store
      .list_descendants(agent_id)
      .await
      .map_err(Error::database("list_descendants"))?;

    Ok(LineageView {
      agent_id,
      generation_number: ancestry
        .as_ref()
        .map_or(FOUNDING_GENERATION, |e| e.generation_number),
      ancestry,
      descendants,
    })
  }

  async fn generation_of(&self, agent_id: Uuid) -> Result<u32> {
    Ok(
      self
        .store
        .latest_lineage_as_descendant(agent_id)
        .await
        .map_err(Error::database("latest_lineage_as_descendant"))?
        .map_or(FOUNDING_GENERATION, |e| e.generation_number),
    )
  }

  /// Dream echoes, a neutral emotion, and a self-profile. Failures are logged;
  /// the descendant already exists.
  async fn seed_cognition(&self, descendant_id: Uuid, dreams: &[DreamFragment]) {
    for dream in dreams {
      let echo = DreamFragment::new(descendant_id, dream.content.clone(), dream.symbolic_weight);
      if let Err(e) = self.store.add_dream(echo).await {
        tracing::warn!(%descendant_id, error = %e, "failed to copy dream echo");
      }
    }

    if let Err(e) = self
      .store
      .add_emotion_state(EmotionState::new(descendant_id, "neutral", 0.5))
      .await
    {
      tracing::warn!(%descendant_id, error = %e, "failed to seed baseline emotion");
    }

    let profile = SelfProfile {
      agent_id:   descendant_id,
      summary:    "I am new here, carrying echoes of someone who came before.".into(),
      created_at: valis_core::now(),
    };
    if let Err(e) = self.store.put_self_profile(profile).await {
      tracing::warn!(%descendant_id, error = %e, "failed to seed self-profile");
    }
  }
}
