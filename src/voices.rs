use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Coqui models offered for every category.
const DEFAULT_MODELS: &[&str] = &[
    "tts_models/en/ljspeech/tacotron2-DDC",
    "tts_models/en/ljspeech/glow-tts",
    "tts_models/en/vctk/vits",
    "tts_models/en/blizzard2013/capacitron-t2-c150_v2",
];

/// Models known to fail loading before any run.
const KNOWN_UNUSABLE: &[&str] = &["tts_models/en/ek1/tacotron2"];

/// Models known to need a speaker id before any run.
const KNOWN_MULTI_SPEAKER: &[&str] = &["tts_models/en/vctk/vits"];

#[derive(thiserror::Error, Debug)]
pub enum VoiceError {
    #[error("no usable models left for voice category '{0}'")]
    NoUsableModels(VoiceCategory),
    #[error("voice category '{0}' has no models")]
    EmptyCategory(VoiceCategory),
    #[error("unknown voice category '{0}', expected male, female or any")]
    UnknownCategory(String),
    #[error("invalid speaker range {min}..={max}")]
    InvalidSpeakerRange { min: u32, max: u32 },
}

/// Voice preference for a batch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VoiceCategory {
    Male,
    Female,
    #[default]
    Any,
}

impl VoiceCategory {
    pub const ALL: [VoiceCategory; 3] =
        [VoiceCategory::Male, VoiceCategory::Female, VoiceCategory::Any];

    pub fn as_str(self) -> &'static str {
        match self {
            VoiceCategory::Male => "male",
            VoiceCategory::Female => "female",
            VoiceCategory::Any => "any",
        }
    }
}

impl fmt::Display for VoiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceCategory {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoiceCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| VoiceError::UnknownCategory(s.to_string()))
    }
}

/// Inclusive numeric speaker range, rendered as `{prefix}{n}`.
///
/// VCTK speakers, for example, are `p225` through `p376`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerRange {
    #[serde(default)]
    pub prefix: String,
    pub min: u32,
    pub max: u32,
}

impl SpeakerRange {
    pub fn new(prefix: impl Into<String>, min: u32, max: u32) -> Result<Self, VoiceError> {
        if min > max {
            return Err(VoiceError::InvalidSpeakerRange { min, max });
        }
        Ok(Self {
            prefix: prefix.into(),
            min,
            max,
        })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        format!("{}{}", self.prefix, rng.gen_range(self.min..=self.max))
    }

    #[cfg(test)]
    fn contains(&self, speaker: &str) -> bool {
        speaker
            .strip_prefix(self.prefix.as_str())
            .and_then(|n| n.parse::<u32>().ok())
            .is_some_and(|n| (self.min..=self.max).contains(&n))
    }
}

/// Voice models per category, plus what has been learned about them.
///
/// The unusable and multi-speaker sets only ever grow.
#[derive(Debug, Clone)]
pub struct VoiceRegistry {
    models: BTreeMap<VoiceCategory, Vec<String>>,
    unusable: BTreeSet<String>,
    multi_speaker: BTreeSet<String>,
    speaker_ranges: HashMap<String, SpeakerRange>,
}

impl Default for VoiceRegistry {
    fn default() -> Self {
        let models = VoiceCategory::ALL
            .into_iter()
            .map(|c| (c, DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()))
            .collect();

        let mut speaker_ranges = HashMap::new();
        speaker_ranges.insert(
            "tts_models/en/vctk/vits".to_string(),
            SpeakerRange {
                prefix: "p".to_string(),
                min: 225,
                max: 376,
            },
        );

        Self {
            models,
            unusable: KNOWN_UNUSABLE.iter().map(|m| m.to_string()).collect(),
            multi_speaker: KNOWN_MULTI_SPEAKER.iter().map(|m| m.to_string()).collect(),
            speaker_ranges,
        }
    }
}

impl VoiceRegistry {
    /// Build a registry with no prior knowledge about models.
    ///
    /// Every category must map to at least one model.
    pub fn new(models: BTreeMap<VoiceCategory, Vec<String>>) -> Result<Self, VoiceError> {
        for category in VoiceCategory::ALL {
            if models.get(&category).map_or(true, |m| m.is_empty()) {
                return Err(VoiceError::EmptyCategory(category));
            }
        }
        Ok(Self {
            models,
            unusable: BTreeSet::new(),
            multi_speaker: BTreeSet::new(),
            speaker_ranges: HashMap::new(),
        })
    }

    /// Draw a model for `category`, never one marked unusable.
    pub fn pick_model<R: Rng + ?Sized>(
        &self,
        category: VoiceCategory,
        rng: &mut R,
    ) -> Result<String, VoiceError> {
        let usable: Vec<&String> = self
            .models(category)
            .iter()
            .filter(|m| !self.unusable.contains(m.as_str()))
            .collect();

        usable
            .choose(rng)
            .map(|m| m.to_string())
            .ok_or(VoiceError::NoUsableModels(category))
    }

    /// Returns true if `model` was not already marked.
    pub fn mark_unusable(&mut self, model: &str) -> bool {
        let inserted = self.unusable.insert(model.to_string());
        if inserted {
            log::warn!("Model {model} marked unusable for the rest of the run");
        }
        inserted
    }

    /// Returns true if `model` was not already marked.
    pub fn mark_multi_speaker(&mut self, model: &str) -> bool {
        let inserted = self.multi_speaker.insert(model.to_string());
        if inserted {
            log::info!("Model {model} reclassified as multi-speaker");
        }
        inserted
    }

    /// Draw a speaker id for `model`, if its speaker range is known.
    pub fn pick_speaker<R: Rng + ?Sized>(&self, model: &str, rng: &mut R) -> Option<String> {
        self.speaker_ranges.get(model).map(|range| range.pick(rng))
    }

    pub fn set_speaker_range(&mut self, model: impl Into<String>, range: SpeakerRange) {
        self.speaker_ranges.insert(model.into(), range);
    }

    pub fn speaker_range(&self, model: &str) -> Option<&SpeakerRange> {
        self.speaker_ranges.get(model)
    }

    pub fn is_unusable(&self, model: &str) -> bool {
        self.unusable.contains(model)
    }

    pub fn is_multi_speaker(&self, model: &str) -> bool {
        self.multi_speaker.contains(model)
    }

    pub fn models(&self, category: VoiceCategory) -> &[String] {
        self.models.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Unusable models in sorted order.
    pub fn unusable(&self) -> Vec<&str> {
        self.unusable.iter().map(String::as_str).collect()
    }

    /// Multi-speaker models in sorted order.
    pub fn multi_speaker(&self) -> Vec<&str> {
        self.multi_speaker.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn registry(male: &[&str]) -> VoiceRegistry {
        let owned = |list: &[&str]| list.iter().map(|m| m.to_string()).collect::<Vec<_>>();
        let mut models = BTreeMap::new();
        models.insert(VoiceCategory::Male, owned(male));
        models.insert(VoiceCategory::Female, owned(&["f1"]));
        models.insert(VoiceCategory::Any, owned(&["a1", "a2"]));
        VoiceRegistry::new(models).unwrap()
    }

    #[test]
    fn parses_categories() {
        assert_eq!("male".parse::<VoiceCategory>().unwrap(), VoiceCategory::Male);
        assert_eq!("any".parse::<VoiceCategory>().unwrap(), VoiceCategory::Any);
        assert!(matches!(
            "robot".parse::<VoiceCategory>(),
            Err(VoiceError::UnknownCategory(_))
        ));
    }

    #[test]
    fn rejects_empty_category() {
        let mut models = BTreeMap::new();
        models.insert(VoiceCategory::Male, vec!["m1".to_string()]);
        models.insert(VoiceCategory::Female, vec![]);
        models.insert(VoiceCategory::Any, vec!["a1".to_string()]);
        assert!(matches!(
            VoiceRegistry::new(models),
            Err(VoiceError::EmptyCategory(VoiceCategory::Female))
        ));
    }

    #[test]
    fn default_registry_seeds_known_models() {
        let registry = VoiceRegistry::default();
        for category in VoiceCategory::ALL {
            assert!(!registry.models(category).is_empty());
        }
        assert!(registry.is_unusable("tts_models/en/ek1/tacotron2"));
        assert!(registry.is_multi_speaker("tts_models/en/vctk/vits"));
    }

    #[test]
    fn pick_model_skips_unusable() {
        let mut registry = registry(&["m1", "m2"]);
        registry.mark_unusable("m1");
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            assert_eq!(registry.pick_model(VoiceCategory::Male, &mut rng).unwrap(), "m2");
        }
    }

    #[test]
    fn pick_model_fails_when_category_exhausted() {
        let mut registry = registry(&["m1"]);
        registry.mark_unusable("m1");
        let mut rng = StdRng::seed_from_u64(9);
        assert!(matches!(
            registry.pick_model(VoiceCategory::Male, &mut rng),
            Err(VoiceError::NoUsableModels(VoiceCategory::Male))
        ));
        assert!(registry.pick_model(VoiceCategory::Female, &mut rng).is_ok());
    }

    #[test]
    fn marking_is_idempotent() {
        let mut registry = registry(&["m1"]);
        assert!(registry.mark_unusable("m1"));
        assert!(registry.mark_multi_speaker("a1"));
        let once = (registry.unusable().len(), registry.multi_speaker().len());

        for _ in 0..5 {
            assert!(!registry.mark_unusable("m1"));
            assert!(!registry.mark_multi_speaker("a1"));
        }
        assert_eq!(
            (registry.unusable().len(), registry.multi_speaker().len()),
            once
        );
    }

    #[test]
    fn pick_speaker_uses_known_range() {
        let registry = VoiceRegistry::default();
        let range = registry.speaker_range("tts_models/en/vctk/vits").unwrap().clone();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let speaker = registry
                .pick_speaker("tts_models/en/vctk/vits", &mut rng)
                .unwrap();
            assert!(range.contains(&speaker), "{speaker} out of range");
        }
    }

    #[test]
    fn pick_speaker_is_none_without_range() {
        let registry = VoiceRegistry::default();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            registry.pick_speaker("tts_models/en/ljspeech/glow-tts", &mut rng),
            None
        );
    }

    #[test]
    fn speaker_range_rejects_inverted_bounds() {
        assert!(SpeakerRange::new("p", 10, 2).is_err());
        let single = SpeakerRange::new("", 3, 3).unwrap();
        assert_eq!(single.pick(&mut StdRng::seed_from_u64(0)), "3");
    }
}
