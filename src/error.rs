//! Error types for the dialogue pipeline.

use thiserror::Error;

/// Error type returned by a [`SynthesisEngine`](crate::SynthesisEngine).
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Why a script was rejected before synthesis started.
///
/// The `Display` output is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Input text cannot be empty.")]
    Empty,
    #[error("Invalid format: '{line}'. Format must be 'Speaker: Text'")]
    InvalidLine { line: String },
}

/// Main error type for a generation run.
///
/// Every variant is terminal for the run; nothing is retried.
#[derive(Error, Debug)]
pub enum DialogueError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Dialogue has no speaker lines to synthesize")]
    EmptyScript,

    #[error("Engine produced no audio for any of the {lines} line(s)")]
    NoAudio { lines: usize },

    #[error("Voice pool must contain at least one voice")]
    EmptyVoicePool,

    #[error("Synthesis failed on line {line} ({speaker}): {source}")]
    Synthesis {
        /// 1-based position of the line in the parsed dialogue.
        line: usize,
        speaker: String,
        #[source]
        source: EngineError,
    },

    #[error("Engine produced {found} Hz audio, expected {expected} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, DialogueError>;

impl From<serde_json::Error> for DialogueError {
    fn from(e: serde_json::Error) -> Self {
        DialogueError::Config(format!("Invalid JSON: {e}"))
    }
}
