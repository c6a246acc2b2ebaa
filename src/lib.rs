//! # forest-stories
//!
//! Generates short nature-themed story snippets from a fixed phrase grammar
//! and narrates each one with a randomly chosen text-to-speech voice model.
//!
//! ## Features
//!
//! - **Story grammar**: seven sentence templates over nine phrase slots
//! - **Voice registry**: per-category model sets, with models blacklisted or
//!   reclassified as multi-speaker while a batch runs
//! - **Session caching**: one live synthesis session, reused across
//!   consecutive stories narrated by the same model
//! - **Pluggable engines**: anything implementing [`SynthesisBackend`];
//!   a Coqui `tts` command-line adapter ships in [`engines::coqui`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use forest_stories::batch::{BatchOptionsBuilder, BatchRunner};
//! use forest_stories::engines::coqui::CoquiBackend;
//! use forest_stories::voices::{VoiceCategory, VoiceRegistry};
//!
//! let options = BatchOptionsBuilder::default()
//!     .story_count(3)
//!     .category(VoiceCategory::Female)
//!     .output_dir("forest_stories_demo")
//!     .build()?;
//!
//! let mut runner = BatchRunner::new(CoquiBackend::new(), VoiceRegistry::default(), options);
//! let report = runner.run()?;
//! println!("{} stories narrated", report.records.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod config;
pub mod engines;
pub mod session;
pub mod story;
pub mod voices;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

/// Failure reported by a synthesis engine.
///
/// Engines classify their own failures so callers match on the kind
/// instead of inspecting error text.
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("model '{model}' uses an incompatible serialized-weights format: {detail}")]
    IncompatibleWeights { model: String, detail: String },
    #[error("model '{model}' requires a speaker: {detail}")]
    SpeakerRequired { model: String, detail: String },
    #[error("synthesis engine not found: {0}")]
    EngineNotFound(String),
    #[error("invalid model identifier '{0}'")]
    InvalidModel(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unreadable WAV output: {0}")]
    Wav(#[from] hound::Error),
    #[error("synthesis failed: {0}")]
    Failed(String),
}

/// A live synthesis session bound to one model.
pub trait SynthesisSession {
    /// Synthesize `text` and write exactly one audio file at `wav_path`.
    ///
    /// `speaker` selects a voice inside a multi-speaker model.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        wav_path: &Path,
        speaker: Option<&str>,
    ) -> Result<(), SynthesisError>;
}

/// Builds synthesis sessions for model identifiers.
///
/// Construction may be expensive (model download, weight loading), which is
/// why [`session::SessionManager`] keeps the last session alive.
pub trait SynthesisBackend {
    type Session: SynthesisSession;

    /// Build a session for `model`, optionally on an accelerator.
    fn construct(
        &mut self,
        model: &str,
        use_accelerator: bool,
    ) -> Result<Self::Session, SynthesisError>;
}
