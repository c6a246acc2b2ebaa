//! Coqui TTS engine adapter.
//!
//! Drives the `tts` program installed by the Coqui `TTS` Python package:
//!
//! ```text
//! tts --text "..." --model_name tts_models/en/vctk/vits \
//!     --out_path forest_story_1.wav --speaker_idx p231 [--use_cuda true]
//! ```
//!
//! # System Requirements
//!
//! - `pip install TTS`, which puts `tts` on PATH
//! - espeak or espeak-ng for the phonemizer-based models
//!
//! Models are downloaded and loaded by each `tts` run, so load failures
//! (such as checkpoints the installed torch refuses to unpickle) surface
//! from [`SynthesisSession::synthesize_to_file`] rather than from
//! construction.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::{SynthesisBackend, SynthesisError, SynthesisSession};

/// Builds [`CoquiSession`]s that shell out to the `tts` program.
#[derive(Debug, Clone, Default)]
pub struct CoquiBackend {
    bin_path: Option<PathBuf>,
}

impl CoquiBackend {
    /// Use `tts` from PATH.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit `tts` binary, or PATH when `None`.
    pub fn with_bin(bin_path: Option<PathBuf>) -> Self {
        Self { bin_path }
    }

    fn bin(&self) -> &Path {
        self.bin_path.as_deref().unwrap_or(Path::new("tts"))
    }
}

impl SynthesisBackend for CoquiBackend {
    type Session = CoquiSession;

    fn construct(
        &mut self,
        model: &str,
        use_accelerator: bool,
    ) -> Result<CoquiSession, SynthesisError> {
        if !is_model_name(model) {
            return Err(SynthesisError::InvalidModel(model.to_string()));
        }

        // Fail early when the engine itself is missing.
        let output = run(Command::new(self.bin()).arg("--help"), self.bin())?;
        if !output.status.success() {
            return Err(SynthesisError::Failed(format!(
                "{} --help exited with code {:?}",
                self.bin().display(),
                output.status.code()
            )));
        }

        Ok(CoquiSession {
            bin: self.bin().to_path_buf(),
            model: model.to_string(),
            use_accelerator,
        })
    }
}

/// One Coqui model, synthesized through a `tts` run per request.
#[derive(Debug, Clone)]
pub struct CoquiSession {
    bin: PathBuf,
    model: String,
    use_accelerator: bool,
}

impl CoquiSession {
    fn args(&self, text: &str, wav_path: &Path, speaker: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "--text".to_string(),
            text.to_string(),
            "--model_name".to_string(),
            self.model.clone(),
            "--out_path".to_string(),
            wav_path.display().to_string(),
        ];
        if let Some(speaker) = speaker {
            args.push("--speaker_idx".to_string());
            args.push(speaker.to_string());
        }
        if self.use_accelerator {
            args.push("--use_cuda".to_string());
            args.push("true".to_string());
        }
        args
    }
}

impl SynthesisSession for CoquiSession {
    fn synthesize_to_file(
        &mut self,
        text: &str,
        wav_path: &Path,
        speaker: Option<&str>,
    ) -> Result<(), SynthesisError> {
        let output = run(
            Command::new(&self.bin).args(self.args(text, wav_path, speaker)),
            &self.bin,
        )?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&self.model, output.status.code(), &stderr));
        }

        let reader = hound::WavReader::open(wav_path)?;
        let spec = reader.spec();
        log::debug!(
            "Wrote {} ({:.2}s at {}Hz)",
            wav_path.display(),
            reader.duration() as f64 / spec.sample_rate as f64,
            spec.sample_rate
        );
        Ok(())
    }
}

fn run(command: &mut Command, bin: &Path) -> Result<Output, SynthesisError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SynthesisError::EngineNotFound(format!(
                    "{} (install with `pip install TTS`)",
                    bin.display()
                ))
            } else {
                SynthesisError::Io(e)
            }
        })
}

/// `tts_models/<language>/<dataset>/<model>`
fn is_model_name(model: &str) -> bool {
    let parts: Vec<&str> = model.split('/').collect();
    parts.len() == 4 && parts[0] == "tts_models" && parts[1..].iter().all(|p| !p.is_empty())
}

/// Map a failed `tts` run onto a structured error.
///
/// torch >= 2.6 refuses older pickled checkpoints with a `weights_only`
/// error (the `RAdam` optimizer state is the usual culprit). Multi-speaker
/// models complain about the missing speaker.
fn classify_failure(model: &str, code: Option<i32>, stderr: &str) -> SynthesisError {
    let detail = last_line(stderr)
        .map(str::to_string)
        .unwrap_or_else(|| format!("tts exited with code {code:?}"));

    if stderr.contains("weights_only") || stderr.contains("RAdam") {
        SynthesisError::IncompatibleWeights {
            model: model.to_string(),
            detail,
        }
    } else if stderr.to_lowercase().contains("speaker") {
        SynthesisError::SpeakerRequired {
            model: model.to_string(),
            detail,
        }
    } else {
        SynthesisError::Failed(format!("{model}: {detail}"))
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|l| !l.is_empty())
}
