use std::path::{Path, PathBuf};

use crate::{EngineError, SynthesisEngine, SynthesisRequest, WaveformChunk};

use super::model::{KokoroError, KokoroModel};
use super::phonemizer::EspeakConfig;

/// Speed multipliers outside this range are clamped.
const SPEED_RANGE: (f32, f32) = (0.5, 2.0);

/// Parameters for configuring Kokoro model loading.
#[derive(Debug, Clone, Default)]
pub struct KokoroModelParams {
    /// Number of CPU threads to use for inference.
    /// `None` uses the ORT default (typically all available cores).
    pub num_threads: Option<usize>,
}

/// Kokoro text-to-speech engine.
///
/// Owns one ONNX session; a [`DialogueStudio`](crate::DialogueStudio) keeps
/// it for all lines of a request.
///
/// ```rust,no_run
/// use dialogue_tts::engines::kokoro::KokoroEngine;
/// use std::path::PathBuf;
///
/// // Point to a bundled espeak-ng binary and data directory
/// let mut engine = KokoroEngine::with_espeak(
///     Some(PathBuf::from("/app/resources/espeak-ng/espeak-ng")),
///     Some(PathBuf::from("/app/resources/espeak-ng-data")),
/// );
/// engine.load_model(&PathBuf::from("models/kokoro"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct KokoroEngine {
    model: Option<KokoroModel>,
    model_path: Option<PathBuf>,
    espeak: EspeakConfig,
}

impl Default for KokoroEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KokoroEngine {
    /// Create a new engine that uses `espeak-ng` from PATH.
    pub fn new() -> Self {
        Self {
            model: None,
            model_path: None,
            espeak: EspeakConfig::default(),
        }
    }

    /// Create a new engine with explicit espeak-ng binary and data paths.
    pub fn with_espeak(bin_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Self {
        Self {
            model: None,
            model_path: None,
            espeak: EspeakConfig {
                bin_path,
                data_path,
            },
        }
    }

    pub fn load_model(&mut self, model_path: &Path) -> Result<(), KokoroError> {
        self.load_model_with_params(model_path, KokoroModelParams::default())
    }

    pub fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: KokoroModelParams,
    ) -> Result<(), KokoroError> {
        self.model = Some(KokoroModel::load(model_path, params.num_threads)?);
        self.model_path = Some(model_path.to_path_buf());
        Ok(())
    }

    pub fn unload_model(&mut self) {
        self.model = None;
        self.model_path = None;
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    /// List all available voice names (requires model to be loaded).
    pub fn list_voices(&self) -> Vec<&str> {
        self.model
            .as_ref()
            .map(|m| m.list_voices())
            .unwrap_or_default()
    }
}

impl SynthesisEngine for KokoroEngine {
    fn synthesize(
        &mut self,
        request: &SynthesisRequest<'_>,
    ) -> Result<Vec<WaveformChunk>, EngineError> {
        let model = self.model.as_mut().ok_or(KokoroError::ModelNotLoaded)?;

        let speed = request.speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1);
        if speed != request.speed {
            log::warn!("Speed {} clamped to {speed}", request.speed);
        }

        let segments = model.synthesize_segments(
            request.text,
            request.voice,
            request.lang,
            speed,
            &self.espeak,
        )?;
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::KokoroEngine;
    use crate::engines::kokoro::KokoroError;
    use crate::{LangCode, SynthesisEngine, SynthesisRequest};
    use std::path::Path;

    #[test]
    fn synthesize_without_model_fails() {
        let mut engine = KokoroEngine::new();
        let request = SynthesisRequest {
            text: "Hello",
            voice: "af_heart",
            lang: LangCode::default(),
            speed: 1.0,
        };

        let err = engine.synthesize(&request).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KokoroError>(),
            Some(KokoroError::ModelNotLoaded)
        ));
        assert!(engine.list_voices().is_empty());
    }

    #[test]
    fn missing_model_directory_is_io_error() {
        let mut engine = KokoroEngine::new();
        let err = engine
            .load_model(Path::new("/nonexistent/kokoro"))
            .unwrap_err();
        assert!(matches!(err, KokoroError::Io(_)));
        assert!(engine.model_path().is_none());
    }
}
