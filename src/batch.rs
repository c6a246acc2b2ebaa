//! Story batch orchestration.
//!
//! For each requested story the runner picks a voice model, composes the
//! text, acquires a synthesis session and narrates to
//! `forest_story_<n>.wav`. Failures skip the story and the batch carries
//! on; only running out of usable models ends a batch early.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::session::SessionManager;
use crate::story::generate_story;
use crate::voices::{VoiceCategory, VoiceRegistry};
use crate::{SynthesisBackend, SynthesisError, SynthesisSession};

pub const METADATA_FILE: &str = "stories_metadata.txt";
pub const METADATA_JSON_FILE: &str = "stories_metadata.json";

const RULE_WIDTH: usize = 50;

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameters for one batch.
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct BatchOptions {
    pub story_count: usize,
    pub category: VoiceCategory,
    #[builder(setter(into))]
    pub output_dir: PathBuf,
    pub use_accelerator: bool,
    /// Pause after each narrated story so the engine is not hammered.
    pub cooldown: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            story_count: 5,
            category: VoiceCategory::Any,
            output_dir: PathBuf::from("forest_stories"),
            use_accelerator: false,
            cooldown: Duration::from_secs(1),
        }
    }
}

/// A narrated story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryRecord {
    pub filename: String,
    pub model: String,
    pub category: VoiceCategory,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The category has no usable models left.
    NoUsableModel,
    /// No session could be built for the model.
    NoSession,
    /// The model needs a speaker but its speaker range is unknown.
    SpeakerUnavailable,
    /// The model was found unusable while synthesizing.
    IncompatibleWeights,
    /// The model rejected the speaker it was given.
    SpeakerRejected(String),
    SynthesisFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStory {
    /// Zero-based story index.
    pub index: usize,
    pub model: Option<String>,
    pub reason: SkipReason,
}

/// Outcome of [`BatchRunner::run`].
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub records: Vec<StoryRecord>,
    pub skipped: Vec<SkippedStory>,
    /// Models marked unusable during this batch.
    pub newly_unusable: Vec<String>,
    /// Models reclassified as multi-speaker during this batch.
    pub newly_multi_speaker: Vec<String>,
    /// Set when the text metadata file was written.
    pub metadata_path: Option<PathBuf>,
    /// True when the batch stopped before the requested count.
    pub aborted: bool,
}

#[derive(Serialize)]
struct Metadata<'a> {
    output_directory: &'a Path,
    unusable_models: Vec<&'a str>,
    multi_speaker_models: Vec<&'a str>,
    newly_unusable: &'a [String],
    newly_multi_speaker: &'a [String],
    stories: &'a [StoryRecord],
}

/// Runs story batches, owning the voice registry and the session cache.
///
/// What the registry learns (unusable models, multi-speaker models)
/// carries over between batches run by the same runner.
pub struct BatchRunner<B: SynthesisBackend, R: Rng = StdRng> {
    registry: VoiceRegistry,
    sessions: SessionManager<B>,
    options: BatchOptions,
    rng: R,
}

impl<B: SynthesisBackend> BatchRunner<B, StdRng> {
    pub fn new(backend: B, registry: VoiceRegistry, options: BatchOptions) -> Self {
        Self::with_rng(backend, registry, options, StdRng::from_entropy())
    }
}

impl<B: SynthesisBackend, R: Rng> BatchRunner<B, R> {
    pub fn with_rng(backend: B, registry: VoiceRegistry, options: BatchOptions, rng: R) -> Self {
        let sessions = SessionManager::new(backend, options.use_accelerator);
        Self {
            registry,
            sessions,
            options,
            rng,
        }
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    /// Narrate `story_count` stories into the output directory.
    ///
    /// Errors only for output directory or metadata I/O; synthesis
    /// failures are reported in [`BatchReport::skipped`].
    pub fn run(&mut self) -> Result<BatchReport, BatchError> {
        let count = self.options.story_count;
        let category = self.options.category;
        let output_dir = self.options.output_dir.clone();
        fs::create_dir_all(&output_dir)?;

        log::info!(
            "Generating {count} forest stories with {category} voices into {}",
            output_dir.display()
        );

        let unusable_before = owned(self.registry.unusable());
        let multi_before = owned(self.registry.multi_speaker());
        let mut report = BatchReport {
            output_dir: output_dir.clone(),
            ..Default::default()
        };

        for index in 0..count {
            let model = match self.registry.pick_model(category, &mut self.rng) {
                Ok(model) => model,
                Err(e) => {
                    log::error!("Stopping at story {}/{count}: {e}", index + 1);
                    report.skipped.extend((index..count).map(|index| SkippedStory {
                        index,
                        model: None,
                        reason: SkipReason::NoUsableModel,
                    }));
                    report.aborted = true;
                    break;
                }
            };
            let text = generate_story(&mut self.rng);

            log::info!("Story {}/{count} with voice model {model}", index + 1);
            log::info!("Story {}: {text}", index + 1);

            match self.narrate(index, &model, &text, &output_dir) {
                Ok(filename) => {
                    log::info!("Saved {filename}");
                    report.records.push(StoryRecord {
                        filename,
                        model,
                        category,
                        text,
                    });
                    if index + 1 < count && !self.options.cooldown.is_zero() {
                        std::thread::sleep(self.options.cooldown);
                    }
                }
                Err(reason) => {
                    log::warn!("Skipped story {} ({model}): {reason:?}", index + 1);
                    report.skipped.push(SkippedStory {
                        index,
                        model: Some(model),
                        reason,
                    });
                }
            }
        }

        report.newly_unusable = newly_added(&unusable_before, self.registry.unusable());
        report.newly_multi_speaker = newly_added(&multi_before, self.registry.multi_speaker());

        if report.records.is_empty() {
            log::error!("Failed to generate any stories");
        } else {
            report.metadata_path = Some(self.write_metadata(&report)?);
            log::info!(
                "Generated {} stories out of {count} requested",
                report.records.len()
            );
        }

        self.sessions.invalidate();
        Ok(report)
    }

    /// Synthesize one story, returning the wav file name.
    ///
    /// A skipped story leaves no wav file behind.
    fn narrate(
        &mut self,
        index: usize,
        model: &str,
        text: &str,
        output_dir: &Path,
    ) -> Result<String, SkipReason> {
        let filename = format!("forest_story_{}.wav", index + 1);
        let wav_path = output_dir.join(&filename);

        let outcome = self.synthesize_story(index, model, text, &wav_path);
        if outcome.is_err() && wav_path.exists() {
            match fs::remove_file(&wav_path) {
                Ok(()) => log::warn!("Removed partial output {}", wav_path.display()),
                Err(e) => log::error!("Failed to remove {}: {e}", wav_path.display()),
            }
        }
        outcome.map(|()| filename)
    }

    fn synthesize_story(
        &mut self,
        index: usize,
        model: &str,
        text: &str,
        wav_path: &Path,
    ) -> Result<(), SkipReason> {
        let Some(session) = self.sessions.get_session(model, &mut self.registry) else {
            return Err(SkipReason::NoSession);
        };

        let known_multi_speaker = self.registry.is_multi_speaker(model);
        let speaker = if known_multi_speaker {
            let speaker = self.registry.pick_speaker(model, &mut self.rng);
            match &speaker {
                Some(speaker) => log::info!("Using speaker {speaker}"),
                None => log::warn!("No speaker range known for {model}, synthesizing without one"),
            }
            speaker
        } else {
            None
        };

        let outcome = match session.synthesize_to_file(text, wav_path, speaker.as_deref()) {
            Err(SynthesisError::SpeakerRequired { detail, .. }) if !known_multi_speaker => {
                log::info!("Model {model} needs a speaker: {detail}");
                self.registry.mark_multi_speaker(model);
                let Some(speaker) = self.registry.pick_speaker(model, &mut self.rng) else {
                    log::error!(
                        "No speaker range known for {model}; add it under `speaker_ranges` in the config file"
                    );
                    return Err(SkipReason::SpeakerUnavailable);
                };
                log::info!("Retrying story {} with speaker {speaker}", index + 1);
                session.synthesize_to_file(text, wav_path, Some(&speaker))
            }
            outcome => outcome,
        };

        outcome.map_err(|e| self.classify_failure(index, model, e))
    }

    fn classify_failure(&mut self, index: usize, model: &str, error: SynthesisError) -> SkipReason {
        log::error!("Error generating story {} with {model}: {error}", index + 1);
        match error {
            SynthesisError::SpeakerRequired { detail, .. } => {
                self.sessions.invalidate();
                SkipReason::SpeakerRejected(detail)
            }
            SynthesisError::IncompatibleWeights { .. } => {
                self.registry.mark_unusable(model);
                self.sessions.invalidate();
                SkipReason::IncompatibleWeights
            }
            other => {
                self.sessions.invalidate();
                SkipReason::SynthesisFailed(other.to_string())
            }
        }
    }

    fn write_metadata(&self, report: &BatchReport) -> Result<PathBuf, BatchError> {
        let unusable = self.registry.unusable();
        let multi_speaker = self.registry.multi_speaker();
        let rule = "-".repeat(RULE_WIDTH);

        let mut text = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(text, "Forest Stories Metadata");
        let _ = writeln!(text, "{}\n", "=".repeat(RULE_WIDTH));
        let _ = writeln!(text, "Output directory: {}", report.output_dir.display());
        if !unusable.is_empty() {
            let _ = writeln!(text, "Unusable models: {}", unusable.join(", "));
        }
        if !multi_speaker.is_empty() {
            let _ = writeln!(text, "Multi-speaker models: {}", multi_speaker.join(", "));
        }
        if !report.newly_unusable.is_empty() {
            let _ = writeln!(
                text,
                "Found unusable this run: {}",
                report.newly_unusable.join(", ")
            );
        }
        if !report.newly_multi_speaker.is_empty() {
            let _ = writeln!(
                text,
                "Found multi-speaker this run: {}",
                report.newly_multi_speaker.join(", ")
            );
        }
        text.push('\n');

        for (n, record) in report.records.iter().enumerate() {
            let _ = writeln!(text, "Story {}:", n + 1);
            let _ = writeln!(text, "File: {}", record.filename);
            let _ = writeln!(text, "Model: {}", record.model);
            let _ = writeln!(text, "Category: {}", record.category);
            let _ = writeln!(text, "Text: {}", record.text);
            let _ = writeln!(text, "{rule}\n");
        }

        let path = report.output_dir.join(METADATA_FILE);
        fs::write(&path, text)?;

        let metadata = Metadata {
            output_directory: &report.output_dir,
            unusable_models: unusable,
            multi_speaker_models: multi_speaker,
            newly_unusable: &report.newly_unusable,
            newly_multi_speaker: &report.newly_multi_speaker,
            stories: &report.records,
        };
        fs::write(
            report.output_dir.join(METADATA_JSON_FILE),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        log::info!("Metadata saved to {}", path.display());
        Ok(path)
    }
}

fn owned(models: Vec<&str>) -> Vec<String> {
    models.into_iter().map(str::to_string).collect()
}

fn newly_added(before: &[String], after: Vec<&str>) -> Vec<String> {
    after
        .into_iter()
        .filter(|model| !before.iter().any(|b| b == model))
        .map(str::to_string)
        .collect()
}
