use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::phonemizer::{phonemize, split_sentences, EspeakConfig};
use super::vocab::Vocab;
use super::voices::{Style, VoiceStore};
use crate::lang::LangCode;

/// Maximum number of phoneme tokens per segment (before padding).
pub const MAX_PHONEME_LEN: usize = 510;

/// Style vector dimension for Kokoro.
pub const STYLE_DIM: usize = 256;

#[derive(thiserror::Error, Debug)]
pub enum KokoroError {
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("Phonemization failed: {0}")]
    PhonemizerFailed(String),
    #[error("Voice '{0}' not found in the voice archive")]
    VoiceNotFound(String),
    #[error("Model not loaded. Call load_model() first.")]
    ModelNotLoaded,
    #[error("Invalid config.json: {0}")]
    Config(String),
    #[error("Failed to parse voice file: {0}")]
    VoiceParse(String),
}

/// Loaded Kokoro ONNX session, voices and vocabulary.
pub struct KokoroModel {
    session: Session,
    voice_store: VoiceStore,
    vocab: Vocab,
    /// "input_ids" or "tokens", depending on the export
    tokens_input_name: String,
    speed_is_int32: bool,
}

impl KokoroModel {
    /// Load a model directory holding an `.onnx` file, `voices-v1.0.bin`
    /// and `config.json`.
    pub fn load(model_dir: &Path, num_threads: Option<usize>) -> Result<Self, KokoroError> {
        let onnx_path = find_onnx_file(model_dir)?;
        log::info!("Loading Kokoro model from {}", onnx_path.display());
        let session = init_session(&onnx_path, num_threads)?;

        let tokens_input_name = session
            .inputs()
            .iter()
            .map(|input| input.name())
            .find(|name| *name == "input_ids" || *name == "tokens")
            .unwrap_or("input_ids")
            .to_string();
        // Recent exports take speed as int32.
        let speed_is_int32 = session
            .inputs()
            .iter()
            .find(|input| input.name() == "speed")
            .map_or(true, |input| {
                format!("{:?}", input.dtype()).to_lowercase().contains("int32")
            });
        log::debug!("tokens_input='{tokens_input_name}', speed_is_int32={speed_is_int32}");

        let voice_store = VoiceStore::load(&require_file(model_dir, "voices-v1.0.bin")?)?;
        let vocab = Vocab::load(&require_file(model_dir, "config.json")?)?;

        Ok(Self {
            session,
            voice_store,
            vocab,
            tokens_input_name,
            speed_is_int32,
        })
    }

    /// Synthesize `text` as a list of waveform segments, one per sentence
    /// (more if a sentence exceeds [`MAX_PHONEME_LEN`] tokens), in order.
    pub fn synthesize_segments(
        &mut self,
        text: &str,
        voice: &str,
        lang: LangCode,
        speed: f32,
        espeak: &EspeakConfig,
    ) -> Result<Vec<Vec<f32>>, KokoroError> {
        if !self.voice_store.contains(voice) {
            return Err(KokoroError::VoiceNotFound(voice.to_string()));
        }

        let mut segments = Vec::new();
        for sentence in split_sentences(text) {
            let ids = phonemize(sentence, lang.espeak_code(), self.vocab.ids(), espeak)?;
            if ids.is_empty() {
                log::warn!("No phoneme tokens produced for {sentence:?}");
                continue;
            }

            for tokens in split_tokens(&ids, &self.vocab) {
                let style = *self.voice_store.style(voice, tokens.len())?;
                let audio = self.run(tokens, &style, speed)?;
                if !audio.is_empty() {
                    segments.push(audio);
                }
            }
        }

        Ok(segments)
    }

    /// Run ONNX inference on one token segment.
    fn run(&mut self, tokens: &[i64], style: &Style, speed: f32) -> Result<Vec<f32>, KokoroError> {
        // [[0, t1..tN, 0]]
        let mut padded = Vec::with_capacity(tokens.len() + 2);
        padded.push(0);
        padded.extend_from_slice(tokens);
        padded.push(0);
        let tokens_arr = Array2::from_shape_vec((1, padded.len()), padded)?;
        let style_view = ndarray::ArrayView2::from_shape((1, STYLE_DIM), style.as_slice())?;

        let output = if self.speed_is_int32 {
            let speed_arr = ndarray::arr1(&[speed.round() as i32]);
            let inputs = inputs![
                self.tokens_input_name.as_str() => TensorRef::from_array_view(tokens_arr.view())?,
                "style" => TensorRef::from_array_view(style_view)?,
                "speed" => TensorRef::from_array_view(speed_arr.view())?,
            ];
            self.session.run(inputs)?
        } else {
            let speed_arr = ndarray::arr1(&[speed]);
            let inputs = inputs![
                self.tokens_input_name.as_str() => TensorRef::from_array_view(tokens_arr.view())?,
                "style" => TensorRef::from_array_view(style_view)?,
                "speed" => TensorRef::from_array_view(speed_arr.view())?,
            ];
            self.session.run(inputs)?
        };

        let (_, waveform) = output
            .iter()
            .next()
            .ok_or_else(|| KokoroError::Ort(ort::Error::new("No output from model")))?;
        let waveform = waveform.try_extract_array::<f32>()?;
        Ok(waveform.iter().copied().collect())
    }

    pub fn list_voices(&self) -> Vec<&str> {
        self.voice_store.list_voices()
    }
}

fn require_file(model_dir: &Path, name: &str) -> Result<PathBuf, KokoroError> {
    let path = model_dir.join(name);
    if path.exists() {
        Ok(path)
    } else {
        Err(KokoroError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{name} not found in {}", model_dir.display()),
        )))
    }
}

/// Prefer `kokoro-quant-convinteger.onnx`, else the first `.onnx` file.
fn find_onnx_file(model_dir: &Path) -> Result<PathBuf, KokoroError> {
    let preferred = model_dir.join("kokoro-quant-convinteger.onnx");
    if preferred.exists() {
        return Ok(preferred);
    }

    for entry in std::fs::read_dir(model_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("onnx") {
            return Ok(path);
        }
    }

    Err(KokoroError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("No .onnx file found in {}", model_dir.display()),
    )))
}

fn init_session(onnx_path: &Path, num_threads: Option<usize>) -> Result<Session, KokoroError> {
    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_execution_providers([CPUExecutionProvider::default().build()])?;

    if let Some(threads) = num_threads {
        builder = builder
            .with_intra_threads(threads)?
            .with_inter_threads(threads)?;
    }

    Ok(builder.commit_from_file(onnx_path)?)
}

/// Cut a token sequence into pieces of at most [`MAX_PHONEME_LEN`], each
/// ending after the last punctuation token that fits when there is one.
fn split_tokens<'a>(ids: &'a [i64], vocab: &Vocab) -> Vec<&'a [i64]> {
    let mut pieces = Vec::new();
    let mut rest = ids;

    while rest.len() > MAX_PHONEME_LEN {
        let window = &rest[..MAX_PHONEME_LEN];
        let cut = window
            .iter()
            .rposition(|&id| vocab.is_split_point(id))
            .map_or(MAX_PHONEME_LEN, |pos| pos + 1);
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }

    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}
