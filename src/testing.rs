//! In-memory synthesis backend with scripted per-model behavior.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::{SynthesisBackend, SynthesisError, SynthesisSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Works,
    IncompatibleWeights,
    ConstructFails,
    /// Fails with a speaker error unless a speaker is supplied.
    NeedsSpeaker,
    /// Fails with a speaker error whatever is supplied.
    RejectsEverySpeaker,
    SynthFails,
    SynthIncompatible,
    /// Writes an unreadable file, then reports failure.
    WritesThenFails,
}

#[derive(Default)]
struct State {
    behaviors: HashMap<String, Behavior>,
    constructions: HashMap<String, usize>,
    calls: Vec<(String, Option<String>)>,
    accelerated: bool,
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Rc<RefCell<State>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, model: &str, behavior: Behavior) -> Self {
        self.state
            .borrow_mut()
            .behaviors
            .insert(model.to_string(), behavior);
        self
    }

    pub fn constructions(&self, model: &str) -> usize {
        self.state
            .borrow()
            .constructions
            .get(model)
            .copied()
            .unwrap_or(0)
    }

    /// Every synthesis attempt as `(model, speaker)`, in order.
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.state.borrow().calls.clone()
    }

    pub fn accelerated(&self) -> bool {
        self.state.borrow().accelerated
    }

    fn behavior(&self, model: &str) -> Behavior {
        self.state
            .borrow()
            .behaviors
            .get(model)
            .copied()
            .unwrap_or(Behavior::Works)
    }
}

impl SynthesisBackend for ScriptedBackend {
    type Session = ScriptedSession;

    fn construct(
        &mut self,
        model: &str,
        use_accelerator: bool,
    ) -> Result<ScriptedSession, SynthesisError> {
        {
            let mut state = self.state.borrow_mut();
            *state.constructions.entry(model.to_string()).or_default() += 1;
            state.accelerated |= use_accelerator;
        }
        match self.behavior(model) {
            Behavior::IncompatibleWeights => Err(SynthesisError::IncompatibleWeights {
                model: model.to_string(),
                detail: "weights_only load failed".to_string(),
            }),
            Behavior::ConstructFails => Err(SynthesisError::Failed("download failed".to_string())),
            behavior => Ok(ScriptedSession {
                model: model.to_string(),
                behavior,
                state: Rc::clone(&self.state),
            }),
        }
    }
}

pub struct ScriptedSession {
    model: String,
    behavior: Behavior,
    state: Rc<RefCell<State>>,
}

impl SynthesisSession for ScriptedSession {
    fn synthesize_to_file(
        &mut self,
        _text: &str,
        wav_path: &Path,
        speaker: Option<&str>,
    ) -> Result<(), SynthesisError> {
        self.state
            .borrow_mut()
            .calls
            .push((self.model.clone(), speaker.map(str::to_string)));

        let speaker_error = || SynthesisError::SpeakerRequired {
            model: self.model.clone(),
            detail: "no speaker specified".to_string(),
        };
        match (self.behavior, speaker) {
            (Behavior::NeedsSpeaker, None) | (Behavior::RejectsEverySpeaker, _) => {
                Err(speaker_error())
            }
            (Behavior::SynthFails, _) => Err(SynthesisError::Failed("out of memory".to_string())),
            (Behavior::SynthIncompatible, _) => Err(SynthesisError::IncompatibleWeights {
                model: self.model.clone(),
                detail: "RAdam".to_string(),
            }),
            (Behavior::WritesThenFails, _) => {
                std::fs::write(wav_path, b"garbage")?;
                Err(SynthesisError::Failed("no RIFF tag found".to_string()))
            }
            _ => write_silence(wav_path),
        }
    }
}

fn write_silence(path: &Path) -> Result<(), SynthesisError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for _ in 0..2205 {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}
