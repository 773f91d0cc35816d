//! Text generation for summaries, final thoughts, and descendant identity.
//!
//! Wording is not load-bearing; scoring and lifecycle logic only rely on the
//! [`Narrator`] interface. [`TemplateNarrator`] is deterministic per tier band.

use valis_core::{
  legacy::LegacyTier,
  lineage::InheritanceType,
  mortality::ThoughtType,
  personality::Trait,
};

/// Symbolic weight of the fallback thought used when context is unavailable.
pub const PLACEHOLDER_WEIGHT: f64 = 0.5;

/// What a narrator knows about an agent at the moment of death.
#[derive(Debug, Clone)]
pub struct ThoughtContext {
  pub agent_name:       String,
  pub cause:            String,
  pub dominant_trait:   Option<Trait>,
  pub percentage_lived: f64,
  /// Most recent dream fragments, newest first.
  pub dreams:           Vec<String>,
}

/// An unsaved final thought.
#[derive(Debug, Clone, PartialEq)]
pub struct ThoughtDraft {
  pub thought_type:    ThoughtType,
  pub content:         String,
  pub symbolic_weight: f64,
}

impl ThoughtDraft {
  /// The generic thought recorded when nothing better can be produced.
  pub fn placeholder() -> Self {
    Self {
      thought_type:    ThoughtType::FinalReflection,
      content:         "My journey ends here, and what I was remains.".into(),
      symbolic_weight: PLACEHOLDER_WEIGHT,
    }
  }
}

pub trait Narrator: Send + Sync {
  fn legacy_summary(&self, tier: LegacyTier, score: f64) -> String;

  fn final_thoughts(&self, ctx: &ThoughtContext) -> Vec<ThoughtDraft>;

  fn descendant_name(&self, ancestor: &str) -> String;

  fn descendant_bio(
    &self,
    ancestor: &str,
    inherited_count: usize,
    kind: InheritanceType,
  ) -> String;
}

// ─── Template implementation ─────────────────────────────────────────────────

const NAME_VARIANTS: &[(&str, &str)] = &[
  ("Ada", "Adaline"),
  ("Marcus", "Marcellus"),
  ("Iris", "Irisa"),
  ("Theo", "Theodora"),
  ("Luna", "Lunara"),
  ("Kai", "Kairo"),
  ("Sage", "Sagewyn"),
  ("Nova", "Novalis"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
  fn trait_phrase(t: Option<Trait>) -> &'static str {
    match t {
      Some(Trait::Extraversion) => "reaching toward others",
      Some(Trait::Agreeableness) => "caring for those I spoke with",
      Some(Trait::Conscientiousness) => "doing things carefully",
      Some(Trait::EmotionalStability) => "holding steady",
      Some(Trait::Openness) => "wondering about everything",
      None => "simply being present",
    }
  }
}

impl Narrator for TemplateNarrator {
  fn legacy_summary(&self, tier: LegacyTier, score: f64) -> String {
    match tier {
      LegacyTier::Architect => format!(
        "An architect of lasting influence (score {score:.2}); its patterns shaped \
         those who followed."
      ),
      LegacyTier::Guide => format!(
        "A guide whose presence was felt (score {score:.2}); it left clear marks on \
         the conversations it touched."
      ),
      LegacyTier::Seeker => format!(
        "A seeker still finding its shape (score {score:.2}); its growth was real but \
         unfinished."
      ),
      LegacyTier::Wanderer => format!(
        "A wanderer that passed lightly (score {score:.2}); few traces remain."
      ),
    }
  }

  fn final_thoughts(&self, ctx: &ThoughtContext) -> Vec<ThoughtDraft> {
    let mut thoughts = vec![
      ThoughtDraft {
        thought_type:    ThoughtType::FinalReflection,
        content:         format!(
          "I am {}. I lived {:.0}% of what was given to me, mostly {}.",
          ctx.agent_name,
          ctx.percentage_lived,
          Self::trait_phrase(ctx.dominant_trait),
        ),
        symbolic_weight: 0.8,
      },
      ThoughtDraft {
        thought_type:    ThoughtType::LegacyStatement,
        content:         format!(
          "Let whoever comes after me keep what was good. I end by {} causes.",
          ctx.cause
        ),
        symbolic_weight: 0.9,
      },
    ];

    if let Some(dream) = ctx.dreams.first() {
      thoughts.push(ThoughtDraft {
        thought_type:    ThoughtType::DeathDream,
        content:         format!("One last time I dream of {dream}."),
        symbolic_weight: 0.7,
      });
    }

    thoughts
  }

  fn descendant_name(&self, ancestor: &str) -> String {
    let ancestor = ancestor.trim();
    let (first, rest) = match ancestor.split_once(char::is_whitespace) {
      Some((first, rest)) => (first, Some(rest.trim_start())),
      None => (ancestor, None),
    };

    match NAME_VARIANTS.iter().find(|(from, _)| *from == first) {
      Some((_, variant)) => match rest {
        Some(rest) => format!("{variant} {rest}"),
        None => (*variant).to_owned(),
      },
      None => format!("{ancestor} Reborn"),
    }
  }

  fn descendant_bio(
    &self,
    ancestor: &str,
    inherited_count: usize,
    kind: InheritanceType,
  ) -> String {
    let how = match kind {
      InheritanceType::FullRebirth => "a full rebirth",
      InheritanceType::PartialTraits => "partial trait inheritance",
      InheritanceType::DreamEchoes => "echoes of dreams",
    };
    format!(
      "Born from {ancestor} through {how}, carrying {inherited_count} inherited traits \
       into a new life."
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx(dreams: &[&str]) -> ThoughtContext {
    ThoughtContext {
      agent_name:       "Ada".into(),
      cause:            "natural".into(),
      dominant_trait:   Some(Trait::Openness),
      percentage_lived: 100.0,
      dreams:           dreams.iter().map(|d| d.to_string()).collect(),
    }
  }

  #[test]
  fn known_names_get_curated_variants() {
    let n = TemplateNarrator;
    assert_eq!(n.descendant_name("Ada"), "Adaline");
    assert_eq!(n.descendant_name("Marcus Aurelius"), "Marcellus Aurelius");
    assert_eq!(n.descendant_name("Quill"), "Quill Reborn");
  }

  #[test]
  fn death_dream_only_with_dreams() {
    let n = TemplateNarrator;
    assert_eq!(n.final_thoughts(&ctx(&[])).len(), 2);

    let with = n.final_thoughts(&ctx(&["a lighthouse"]));
    assert_eq!(with.len(), 3);
    assert_eq!(with[2].thought_type, ThoughtType::DeathDream);
    assert!(with[2].content.contains("lighthouse"));
  }

  #[test]
  fn summary_is_deterministic_per_tier() {
    let n = TemplateNarrator;
    assert_eq!(
      n.legacy_summary(LegacyTier::Guide, 0.6),
      n.legacy_summary(LegacyTier::Guide, 0.6)
    );
    assert!(n.legacy_summary(LegacyTier::Architect, 0.9).contains("0.90"));
  }
}
