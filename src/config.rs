//! Run configuration.
//!
//! Settings come from an optional JSON file (`config.json` by default),
//! then from `generate` arguments:
//!
//! ```json
//! {
//!   "story_count": 5,
//!   "voice_category": "female",
//!   "output_directory": "stories",
//!   "use_accelerator": false,
//!   "cooldown_ms": 1000,
//!   "speaker_ranges": {
//!     "tts_models/en/vctk/vits": { "prefix": "p", "min": 225, "max": 376 }
//!   }
//! }
//! ```
//!
//! `num_stories`, `gender`, `output_dir` and `use_gpu` are accepted as
//! aliases. A missing, unreadable or malformed file falls back to defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::voices::{SpeakerRange, VoiceCategory, VoiceError, VoiceRegistry};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("speaker range for '{model}': {source}")]
    SpeakerRange { model: String, source: VoiceError },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "num_stories")]
    pub story_count: usize,
    #[serde(alias = "gender")]
    pub voice_category: VoiceCategory,
    /// `None` picks a timestamped directory per run.
    #[serde(alias = "output_dir")]
    pub output_directory: Option<PathBuf>,
    #[serde(alias = "use_gpu")]
    pub use_accelerator: bool,
    /// Pause after each narrated story.
    pub cooldown_ms: u64,
    /// Coqui `tts` binary; PATH when unset.
    pub tts_bin: Option<PathBuf>,
    /// Speaker ranges for multi-speaker models, keyed by model identifier.
    pub speaker_ranges: HashMap<String, SpeakerRange>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            story_count: 5,
            voice_category: VoiceCategory::Any,
            output_directory: None,
            use_accelerator: false,
            cooldown_ms: 1000,
            tts_bin: None,
            speaker_ranges: HashMap::new(),
        }
    }
}

impl Config {
    /// Load `path`, falling back to defaults when it is absent or invalid.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Error reading {}, using default settings: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        for (model, range) in &config.speaker_ranges {
            SpeakerRange::new(range.prefix.clone(), range.min, range.max).map_err(|source| {
                ConfigError::SpeakerRange {
                    model: model.clone(),
                    source,
                }
            })?;
        }
        Ok(config)
    }

    /// Apply `generate [count] [male|female|any] [gpu] [output <dir>]`.
    ///
    /// Tokens may appear in any order. Unrecognized tokens are ignored.
    pub fn apply_args<S: AsRef<str>>(&mut self, args: &[S]) {
        let mut tokens = args.iter().map(|s| AsRef::<str>::as_ref(s));
        while let Some(token) = tokens.next() {
            if let Ok(count) = token.parse::<usize>() {
                self.story_count = count;
            } else if let Ok(category) = token.parse::<VoiceCategory>() {
                self.voice_category = category;
            } else if token == "gpu" {
                self.use_accelerator = true;
            } else if token == "output" {
                match tokens.next() {
                    Some(dir) => self.output_directory = Some(PathBuf::from(dir)),
                    None => log::warn!("`output` needs a directory argument, ignoring it"),
                }
            } else {
                log::warn!("Ignoring unrecognized argument '{token}'");
            }
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Configured output directory, or `forest_stories_<timestamp>` from `now`.
    pub fn output_dir(&self, now: DateTime<Local>) -> PathBuf {
        self.output_directory.clone().unwrap_or_else(|| {
            PathBuf::from(format!("forest_stories_{}", now.format("%Y%m%d_%H%M%S")))
        })
    }

    /// Built-in registry extended with the configured speaker ranges.
    pub fn registry(&self) -> VoiceRegistry {
        let mut registry = VoiceRegistry::default();
        for (model, range) in &self.speaker_ranges {
            registry.set_speaker_range(model.clone(), range.clone());
        }
        registry
    }
}
