//! End-to-end generation: script in, one WAV file out.

use crate::artifact::{Artifact, OutputDir};
use crate::config::StudioConfig;
use crate::dialogue::{normalize, split_dialogue, validate};
use crate::error::{Result, ValidationError};
use crate::orchestrator::synthesize_dialogue;
use crate::SynthesisEngine;

/// Owns one engine and runs whole generation requests against it.
///
/// Requests are handled one at a time; `generate` takes `&mut self`, so the
/// engine and the output directory are never shared between runs.
pub struct DialogueStudio<E> {
    engine: E,
    config: StudioConfig,
    output: OutputDir,
}

impl<E: SynthesisEngine> DialogueStudio<E> {
    pub fn new(engine: E, config: StudioConfig) -> Self {
        let output = OutputDir::new(config.output_dir.clone(), config.file_name.clone());
        Self {
            engine,
            config,
            output,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Normalize and validate `text` without synthesizing anything.
    ///
    /// A caller should only offer generation when this returns `Ok`.
    pub fn check(&self, text: &str) -> std::result::Result<(), ValidationError> {
        validate(&normalize(text))
    }

    /// Run the whole pipeline and return the written artifact.
    ///
    /// Format errors are reported before the output directory is touched.
    /// Once validation passes, the previous artifact is deleted before any
    /// synthesis happens, so a failed run leaves no artifact at all.
    pub fn generate(&mut self, text: &str) -> Result<Artifact> {
        let text = normalize(text);
        validate(&text)?;
        let lines = split_dialogue(&text);
        let pool = self.config.pool()?;
        log::info!(
            "Generating {} lines with {} voice(s), language '{}'",
            lines.len(),
            self.config.voice_pool.len(),
            self.config.lang_code
        );

        let slot = self.output.acquire()?;
        let audio = synthesize_dialogue(
            &mut self.engine,
            &lines,
            pool,
            self.config.lang_code,
            self.config.speed,
        )?;
        let path = slot.write(&audio.waveform, self.config.wav_encoding)?;

        Ok(Artifact {
            path,
            waveform: audio.waveform,
            voices: audio.voices.assignments(),
        })
    }
}
