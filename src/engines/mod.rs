//! Speech synthesis engines.
//!
//! # Available Engines
//!
//! - `coqui` - Coqui TTS through its `tts` command-line program

pub mod coqui;
