//! Lineage edges linking a deceased ancestor to its reborn descendant.
//!
//! Edges are written once per rebirth and never updated. A founding agent has
//! no incoming edge and counts as generation [`FOUNDING_GENERATION`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::personality::{Trait, TraitVector};

pub const FOUNDING_GENERATION: u32 = 1;

/// How much of the ancestor carries over into the descendant.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InheritanceType {
  /// Traits and learned modifiers copied verbatim.
  FullRebirth,
  /// Each trait copied with independent noise in `±0.2`.
  #[default]
  PartialTraits,
  /// Neutral traits; the ancestor survives only as dream fragments.
  DreamEchoes,
}

impl InheritanceType {
  pub fn dream_echo_count(self) -> u32 {
    match self {
      Self::FullRebirth => 3,
      Self::PartialTraits => 1,
      Self::DreamEchoes => 5,
    }
  }
}

/// What a descendant received from its ancestor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InheritedData {
  pub traits:            TraitVector,
  pub learned_modifiers: BTreeMap<String, f64>,
  /// Dream fragments carried over as inherited memories.
  #[serde(default)]
  pub memory_fragments:  Vec<String>,
}

/// One ancestor → descendant link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageEdge {
  pub lineage_id:          Uuid,
  pub ancestor_id:         Uuid,
  pub descendant_id:       Uuid,
  pub inheritance_type:    InheritanceType,
  pub inherited:           InheritedData,
  /// Descendant trait minus ancestor trait, per trait.
  pub trait_modifications: BTreeMap<Trait, f64>,
  pub dream_echoes:        u32,
  pub generation_number:   u32,
  pub created_at:          DateTime<Utc>,
}
