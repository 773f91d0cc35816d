//! Cue words the drift signals match against.
//!
//! Every cue is matched against whole lowercase words. Multi-word cues must
//! appear as consecutive words; dialogue cues are always single words.

use valis_core::personality::Trait;

/// Phrases that push one trait up or down.
pub struct TraitCues {
  pub trait_name: Trait,
  pub raise:      &'static [&'static str],
  pub lower:      &'static [&'static str],
}

pub const FEEDBACK_CUES: &[TraitCues] = &[
  TraitCues {
    trait_name: Trait::Extraversion,
    raise:      &[
      "more engaging",
      "more enthusiastic",
      "more energy",
      "lively",
      "outgoing",
      "too quiet",
      "too reserved",
    ],
    lower:      &["too chatty", "too talkative", "talk less", "too loud", "overwhelming"],
  },
  TraitCues {
    trait_name: Trait::Agreeableness,
    raise:      &[
      "kind",
      "warm",
      "supportive",
      "empathetic",
      "too harsh",
      "too cold",
      "rude",
      "dismissive",
    ],
    lower:      &["pushover", "sycophantic", "too agreeable", "too nice", "push back"],
  },
  TraitCues {
    trait_name: Trait::Conscientiousness,
    raise:      &[
      "thorough",
      "precise",
      "organized",
      "careful",
      "sloppy",
      "careless",
      "too vague",
      "more detail",
    ],
    lower:      &["too rigid", "pedantic", "overthinking", "too formal", "loosen up"],
  },
  TraitCues {
    trait_name: Trait::EmotionalStability,
    raise:      &[
      "calm",
      "steady",
      "composed",
      "patient",
      "too anxious",
      "too emotional",
      "overreacting",
      "defensive",
    ],
    lower:      &["too detached", "robotic", "emotionless", "no feeling"],
  },
  TraitCues {
    trait_name: Trait::Openness,
    raise:      &[
      "creative",
      "curious",
      "imaginative",
      "original",
      "boring",
      "too predictable",
      "repetitive",
      "more ideas",
    ],
    lower:      &["too abstract", "off topic", "too random", "stay focused", "too weird"],
  },
];

pub const DIALOGUE_CUES: &[TraitCues] = &[
  TraitCues {
    trait_name: Trait::Extraversion,
    raise:      &["excited", "love", "amazing", "fun", "awesome", "haha", "wow"],
    lower:      &["quiet", "alone", "tired", "whatever", "meh"],
  },
  TraitCues {
    trait_name: Trait::Agreeableness,
    raise:      &["thanks", "thank", "please", "appreciate", "sorry", "agree", "kind"],
    lower:      &["wrong", "stupid", "hate", "annoying", "shut", "disagree"],
  },
  TraitCues {
    trait_name: Trait::Conscientiousness,
    raise:      &["plan", "schedule", "organized", "detail", "careful", "steps", "deadline"],
    lower:      &["forgot", "later", "messy", "skip", "lazy", "random"],
  },
  TraitCues {
    trait_name: Trait::EmotionalStability,
    raise:      &["calm", "fine", "relaxed", "okay", "steady", "peaceful"],
    lower:      &["anxious", "worried", "stressed", "upset", "panic", "afraid", "angry"],
  },
  TraitCues {
    trait_name: Trait::Openness,
    raise:      &["imagine", "idea", "ideas", "curious", "creative", "explore", "wonder"],
    lower:      &["boring", "usual", "same", "routine", "traditional"],
  },
];

pub const REFLECTION_CALM: &[&str] =
  &["calm", "confident", "balanced", "steady", "at peace", "grounded"];

pub const REFLECTION_DISTRESS: &[&str] =
  &["anxious", "frustrated", "overwhelmed", "uncertain", "stressed", "lost"];

pub const REFLECTION_GROWTH: &[&str] =
  &["learned", "new perspective", "curious", "explored", "discovered", "insight"];

/// Feedback phrases that reinforce a learned modifier.
pub const MODIFIER_CUES: &[(&str, &[&str])] = &[
  ("prefers_brevity", &["shorter", "brief", "concise", "too long", "to the point"]),
  ("enjoys_humor", &["funny", "joke", "humor", "humour", "made me laugh"]),
  ("values_empathy", &["understanding", "empathetic", "compassion", "listened"]),
  ("appreciates_detail", &["detailed", "in depth", "more detail", "specifics", "thorough"]),
  ("likes_creativity", &["creative", "imaginative", "original", "inventive"]),
  ("prefers_calm", &["calm", "gentle", "soothing", "relaxed", "slow down"]),
];

/// Lowercase words of `text`, split on anything but letters, digits and
/// apostrophes.
pub fn words(text: &str) -> Vec<String> {
  text
    .split(|c: char| !c.is_alphanumeric() && c != '\'')
    .filter(|w| !w.is_empty())
    .map(str::to_lowercase)
    .collect()
}

/// Whether any cue occurs in `haystack` on word boundaries.
pub fn mentions_any(haystack: &str, cues: &[&str]) -> bool {
  let tokens = words(haystack);
  cues.iter().any(|cue| {
    let cue: Vec<&str> = cue.split_whitespace().collect();
    !cue.is_empty()
      && tokens
        .windows(cue.len())
        .any(|window| window.iter().zip(&cue).all(|(w, c)| w == c))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cues_match_whole_words_only() {
    assert!(mentions_any("so kind of you", &["kind"]));
    assert!(!mentions_any("that was unkind", &["kind"]));
    assert!(!mentions_any("kinda odd", &["kind"]));
    assert!(!mentions_any("originally planned", &["original"]));
    assert!(!mentions_any("the ship lay becalmed", &["calm"]));
  }

  #[test]
  fn multi_word_cues_need_consecutive_words() {
    assert!(mentions_any("Way too long, honestly.", &["too long"]));
    assert!(!mentions_any("too much, not long", &["too long"]));
    assert!(!mentions_any("tool ongoing", &["too long"]));
  }
}
