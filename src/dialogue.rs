//! Script handling: clean up raw input, check the `Speaker: Text` format and
//! split it into ordered [`DialogueLine`]s.
//!
//! The three steps are pure and meant to run in order:
//!
//! ```
//! use dialogue_tts::dialogue::{normalize, split_dialogue, validate};
//!
//! let text = normalize("<think>plan the intro</think>\nAlice: Hi!\nBob: Hello, Alice.");
//! validate(&text)?;
//! let lines = split_dialogue(&text);
//! assert_eq!(lines[1].speaker, "Bob");
//! # Ok::<(), dialogue_tts::ValidationError>(())
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

static REASONING_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

static SPEAKER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*:\s.+$").expect("valid regex"));

/// One utterance of the script, in script order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
}

impl DialogueLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// Remove every `<think>...</think>` block (which may span lines) and trim
/// the result.
pub fn normalize(text: &str) -> String {
    REASONING_BLOCK.replace_all(text, "").trim().to_string()
}

/// Check that every non-blank line reads `Speaker: Text`.
///
/// The speaker is an identifier (ASCII letters, digits and `_`, not starting
/// with a digit) followed directly by a colon, whitespace and at least one
/// character of dialogue. Stops at the first offending line.
pub fn validate(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    match content_lines(text).find(|line| !SPEAKER_LINE.is_match(line)) {
        Some(line) => Err(ValidationError::InvalidLine {
            line: line.to_string(),
        }),
        None => Ok(()),
    }
}

/// Split a validated script into `(speaker, text)` pairs.
///
/// Each line is split at its first colon, so dialogue text may itself contain
/// colons. Lines without a colon are skipped; [`validate`] rejects them
/// earlier.
pub fn split_dialogue(text: &str) -> Vec<DialogueLine> {
    content_lines(text)
        .filter_map(|line| {
            let (speaker, content) = line.split_once(':')?;
            Some(DialogueLine::new(speaker.trim(), content.trim()))
        })
        .collect()
}

/// Non-blank lines, trimmed.
fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
