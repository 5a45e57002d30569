//! Kokoro-82M text-to-speech engine.
//!
//! Runs the Kokoro-82M ONNX model on CPU and phonemizes with espeak-ng.
//! Every dialogue line is split into sentences and each sentence becomes one
//! waveform chunk, so the orchestrator receives a line's audio in pieces.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed on your system:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>
//!
//! # Model Directory Layout
//!
//! ```text
//! models/kokoro/
//! ├── kokoro-quant-convinteger.onnx   # or any other .onnx export
//! ├── voices-v1.0.bin                  # Voice data archive (.npz format)
//! └── config.json                      # Phoneme vocabulary
//! ```
//!
//! # Languages
//!
//! The language comes from the request's [`LangCode`](crate::LangCode), not
//! from the voice name, so any voice can read any supported language.
//! Voice names keep Kokoro's `{language}{gender}_{name}` pattern, e.g.
//! `af_heart` (American English female) or `am_michael` (American English
//! male).

pub mod engine;
pub mod model;
pub mod phonemizer;
pub mod vocab;
pub mod voices;

pub use engine::{KokoroEngine, KokoroModelParams};
pub use model::KokoroError;
