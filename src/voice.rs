//! Speaker to voice assignment.

use std::collections::HashMap;

use crate::error::{DialogueError, Result};

/// Default voices, one female and one male American English Kokoro voice.
pub const DEFAULT_VOICE_POOL: [&str; 2] = ["af_heart", "am_michael"];

/// Ordered, non-empty list of voice identifiers handed out round-robin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePool {
    voices: Vec<String>,
}

impl VoicePool {
    pub fn new<I, S>(voices: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let voices: Vec<String> = voices.into_iter().map(Into::into).collect();
        if voices.is_empty() {
            return Err(DialogueError::EmptyVoicePool);
        }
        Ok(Self { voices })
    }

    /// Voice for the `n`th distinct speaker; wraps around past the end.
    pub fn nth(&self, n: usize) -> &str {
        &self.voices[n % self.voices.len()]
    }

}

impl Default for VoicePool {
    fn default() -> Self {
        Self {
            voices: DEFAULT_VOICE_POOL.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Per-request speaker to voice mapping, filled lazily in first-seen order.
///
/// Speaker names match exactly (case-sensitive). Once a speaker has a voice
/// it keeps it for the lifetime of the map.
#[derive(Debug, Clone)]
pub struct SpeakerVoiceMap {
    pool: VoicePool,
    assigned: HashMap<String, String>,
    order: Vec<String>,
}

impl SpeakerVoiceMap {
    pub fn new(pool: VoicePool) -> Self {
        Self {
            pool,
            assigned: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Voice for `speaker`, assigning the next pool entry on first sight.
    pub fn voice_for(&mut self, speaker: &str) -> &str {
        if !self.assigned.contains_key(speaker) {
            let voice = self.pool.nth(self.order.len()).to_string();
            log::debug!("Assigned voice '{voice}' to speaker '{speaker}'");
            self.assigned.insert(speaker.to_string(), voice);
            self.order.push(speaker.to_string());
        }
        &self.assigned[speaker]
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(speaker, voice)` pairs in the order speakers first appeared.
    pub fn assignments(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .map(|speaker| (speaker.clone(), self.assigned[speaker].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{SpeakerVoiceMap, VoicePool};
    use crate::error::DialogueError;
    use pretty_assertions::assert_eq;

    fn assign(speakers: &[&str], pool: &[&str]) -> Vec<(String, String)> {
        let mut map = SpeakerVoiceMap::new(VoicePool::new(pool.iter().copied()).unwrap());
        for speaker in speakers {
            map.voice_for(speaker);
        }
        map.assignments()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(s, v)| (s.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn wraps_around_when_speakers_exceed_pool() {
        assert_eq!(
            assign(&["A", "B", "A", "C"], &["v1", "v2"]),
            pairs(&[("A", "v1"), ("B", "v2"), ("C", "v1")])
        );
    }

    #[test]
    fn single_voice_pool_serves_everyone() {
        assert_eq!(
            assign(&["A", "B", "C"], &["only"]),
            pairs(&[("A", "only"), ("B", "only"), ("C", "only")])
        );
    }

    #[test]
    fn assignment_is_stable_and_deterministic() {
        let speakers = ["Host", "Guest", "Host", "host", "Guest", "Caller"];
        let first = assign(&speakers, &["v1", "v2", "v3"]);
        let second = assign(&speakers, &["v1", "v2", "v3"]);
        assert_eq!(first, second);
        assert_eq!(
            first,
            pairs(&[("Host", "v1"), ("Guest", "v2"), ("host", "v3"), ("Caller", "v1")])
        );
    }

    #[test]
    fn repeated_speaker_keeps_voice() {
        let mut map = SpeakerVoiceMap::new(VoicePool::default());
        assert_eq!(map.voice_for("Alice"), "af_heart");
        assert_eq!(map.voice_for("Bob"), "am_michael");
        assert_eq!(map.voice_for("Alice"), "af_heart");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = VoicePool::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, DialogueError::EmptyVoicePool));
    }
}
