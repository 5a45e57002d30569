//! Speech synthesis engines.
//!
//! Anything implementing [`SynthesisEngine`](crate::SynthesisEngine) can
//! voice a dialogue. Bundled engines are enabled via Cargo features:
//! - `kokoro` - Kokoro TTS (ONNX format, espeak-ng required)

#[cfg(feature = "kokoro")]
pub mod kokoro;
