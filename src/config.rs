//! Pipeline configuration.
//!
//! Defaults reproduce the fixed constants of the original service, so the
//! end user never has to touch any of this.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lang::LangCode;
use crate::voice::{VoicePool, DEFAULT_VOICE_POOL};
use crate::WavEncoding;

/// Settings for a [`DialogueStudio`](crate::DialogueStudio).
///
/// ```
/// use dialogue_tts::StudioConfigBuilder;
///
/// let config = StudioConfigBuilder::default()
///     .voice_pool(vec!["bf_emma".to_string(), "bm_george".to_string()])
///     .output_dir("out")
///     .build()
///     .unwrap();
/// assert_eq!(config.file_name, "audio.wav");
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct StudioConfig {
    /// Voices handed to speakers in first-seen order, reused cyclically.
    pub voice_pool: Vec<String>,
    /// Kokoro language code used for every line.
    pub lang_code: LangCode,
    /// Directory holding the single generated artifact. Cleared on every run.
    pub output_dir: PathBuf,
    /// File name of the artifact inside `output_dir`.
    pub file_name: String,
    /// Speech speed multiplier passed to the engine (0.5 to 2.0).
    pub speed: f32,
    pub wav_encoding: WavEncoding,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            voice_pool: DEFAULT_VOICE_POOL.iter().map(|v| v.to_string()).collect(),
            lang_code: LangCode::default(),
            output_dir: PathBuf::from("./audio/"),
            file_name: "audio.wav".to_string(),
            speed: 1.0,
            wav_encoding: WavEncoding::default(),
        }
    }
}

impl StudioConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        log::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Build the voice pool, rejecting an empty list.
    pub fn pool(&self) -> Result<VoicePool> {
        VoicePool::new(self.voice_pool.iter().cloned())
    }
}
