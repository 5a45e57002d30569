//! # dialogue-tts
//!
//! Turns a podcast-style dialogue script into one audio file, giving every
//! speaker its own synthetic voice.
//!
//! ## Pipeline
//!
//! 1. [`dialogue::normalize`] strips `<think>...</think>` blocks.
//! 2. [`dialogue::validate`] checks every line reads `Speaker: Text`.
//! 3. [`dialogue::split_dialogue`] turns the script into ordered lines.
//! 4. [`SpeakerVoiceMap`] hands out voices round-robin from a [`VoicePool`].
//! 5. [`orchestrator::synthesize_dialogue`] runs the engine line by line and
//!    concatenates the chunks in order.
//! 6. [`artifact::OutputDir`] replaces the previous artifact with the new WAV.
//!
//! [`DialogueStudio`] wires the steps together.
//!
//! ## Features
//!
//! - **Kokoro TTS** (`kokoro`): bundled ONNX engine and the `dialogue-tts`
//!   command line tool.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::path::Path;
//! use dialogue_tts::{engines::kokoro::KokoroEngine, DialogueStudio, StudioConfig};
//!
//! let mut engine = KokoroEngine::new();
//! engine.load_model(Path::new("models/kokoro"))?;
//!
//! let mut studio = DialogueStudio::new(engine, StudioConfig::default());
//! let artifact = studio.generate("Alice: Hello there\nBob: Hi Alice")?;
//! println!("{} ({:.1}s)", artifact.path.display(), artifact.waveform.duration_secs());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod artifact;
pub mod config;
pub mod dialogue;
pub mod engines;
pub mod error;
pub mod lang;
pub mod orchestrator;
pub mod studio;
pub mod voice;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use artifact::{Artifact, OutputDir};
pub use config::{StudioConfig, StudioConfigBuilder};
pub use dialogue::DialogueLine;
pub use error::{DialogueError, EngineError, Result, ValidationError};
pub use lang::LangCode;
pub use studio::DialogueStudio;
pub use voice::{SpeakerVoiceMap, VoicePool};

/// Sample rate of every waveform in the pipeline.
pub const SAMPLE_RATE: u32 = 24000;

/// One buffer of mono f32 samples returned by an engine.
pub type WaveformChunk = Vec<f32>;

/// Sample format of the written WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WavEncoding {
    /// 16-bit signed PCM, samples clipped to [-1, 1].
    #[default]
    Pcm16,
    /// 32-bit IEEE float.
    Float32,
}

/// Mono audio with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    /// Join chunks end to end, in the order given.
    pub fn concat<I>(chunks: I, sample_rate: u32) -> Self
    where
        I: IntoIterator<Item = WaveformChunk>,
    {
        let mut samples = Vec::new();
        for chunk in chunks {
            samples.extend_from_slice(&chunk);
        }
        Self {
            samples,
            sample_rate,
        }
    }

    /// Write the audio to a mono WAV file.
    pub fn write_wav(&self, path: &Path, encoding: WavEncoding) -> Result<()> {
        let (bits_per_sample, sample_format) = match encoding {
            WavEncoding::Pcm16 => (16, hound::SampleFormat::Int),
            WavEncoding::Float32 => (32, hound::SampleFormat::Float),
        };
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample,
            sample_format,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        match encoding {
            WavEncoding::Pcm16 => {
                for &sample in &self.samples {
                    writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
                }
            }
            WavEncoding::Float32 => {
                for &sample in &self.samples {
                    writer.write_sample(sample)?;
                }
            }
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// What the orchestrator asks an engine to speak.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub voice: &'a str,
    pub lang: LangCode,
    /// Speech speed multiplier, 1.0 is normal.
    pub speed: f32,
}

/// Common interface for text-to-speech engines.
///
/// One call synthesizes one dialogue line. An engine may cut long text into
/// several pieces; it returns them as ordered chunks, which the caller
/// concatenates without further processing.
pub trait SynthesisEngine {
    /// Sample rate of every chunk this engine returns.
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    /// Synthesize `request.text` with `request.voice`.
    fn synthesize(
        &mut self,
        request: &SynthesisRequest<'_>,
    ) -> std::result::Result<Vec<WaveformChunk>, EngineError>;
}

impl<E: SynthesisEngine + ?Sized> SynthesisEngine for &mut E {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn synthesize(
        &mut self,
        request: &SynthesisRequest<'_>,
    ) -> std::result::Result<Vec<WaveformChunk>, EngineError> {
        (**self).synthesize(request)
    }
}

#[cfg(test)]
mod tests {
    use super::{WavEncoding, Waveform, SAMPLE_RATE};

    #[test]
    fn concat_preserves_order() {
        let wave = Waveform::concat(vec![vec![0.1, 0.2], vec![], vec![0.3]], SAMPLE_RATE);
        assert_eq!(wave.samples, vec![0.1, 0.2, 0.3]);
        assert_eq!(wave.sample_rate, 24000);
    }

    #[test]
    fn duration_uses_sample_rate() {
        let wave = Waveform::concat(vec![vec![0.0; 36000]], SAMPLE_RATE);
        assert!((wave.duration_secs() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn writes_pcm16_with_clipping() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.wav");
        let wave = Waveform {
            samples: vec![0.0, 0.5, 2.0, -3.0],
            sample_rate: SAMPLE_RATE,
        };
        wave.write_wav(&path, WavEncoding::Pcm16).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16383, i16::MAX, -i16::MAX]);
    }

    #[test]
    fn writes_float32_verbatim() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.wav");
        let wave = Waveform {
            samples: vec![0.25, -0.75],
            sample_rate: SAMPLE_RATE,
        };
        wave.write_wav(&path, WavEncoding::Float32).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_format, hound::SampleFormat::Float);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.25, -0.75]);
    }
}
