//! Line-by-line synthesis of a parsed dialogue.

use crate::dialogue::DialogueLine;
use crate::error::{DialogueError, Result};
use crate::lang::LangCode;
use crate::voice::{SpeakerVoiceMap, VoicePool};
use crate::{SynthesisEngine, SynthesisRequest, Waveform, SAMPLE_RATE};

/// Concatenated audio of a dialogue and the voices that spoke it.
#[derive(Debug, Clone)]
pub struct DialogueAudio {
    pub waveform: Waveform,
    pub voices: SpeakerVoiceMap,
}

/// Synthesize every line in order and join all chunks into one waveform.
///
/// Lines run strictly one after another against the same engine. The first
/// engine failure aborts the whole dialogue; nothing is retried and no
/// partial audio is returned. An engine that yields no chunks at all is an
/// error too, so an empty waveform is never handed on.
pub fn synthesize_dialogue<E>(
    engine: &mut E,
    lines: &[DialogueLine],
    pool: VoicePool,
    lang: LangCode,
    speed: f32,
) -> Result<DialogueAudio>
where
    E: SynthesisEngine + ?Sized,
{
    if lines.is_empty() {
        return Err(DialogueError::EmptyScript);
    }

    let sample_rate = engine.sample_rate();
    if sample_rate != SAMPLE_RATE {
        return Err(DialogueError::SampleRateMismatch {
            expected: SAMPLE_RATE,
            found: sample_rate,
        });
    }

    let mut voices = SpeakerVoiceMap::new(pool);
    let mut chunks = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let voice = voices.voice_for(&line.speaker);
        log::debug!(
            "Line {}/{}: {} speaks with '{voice}'",
            index + 1,
            lines.len(),
            line.speaker
        );

        let request = SynthesisRequest {
            text: &line.text,
            voice,
            lang,
            speed,
        };
        let line_chunks = engine
            .synthesize(&request)
            .map_err(|source| DialogueError::Synthesis {
                line: index + 1,
                speaker: line.speaker.clone(),
                source,
            })?;
        if line_chunks.is_empty() {
            log::warn!("Line {} ({}) produced no audio", index + 1, line.speaker);
        }
        chunks.extend(line_chunks);
    }

    if chunks.is_empty() {
        return Err(DialogueError::NoAudio { lines: lines.len() });
    }

    let waveform = Waveform::concat(chunks, sample_rate);
    log::info!(
        "Synthesized {} lines from {} speakers ({:.2}s of audio)",
        lines.len(),
        voices.len(),
        waveform.duration_secs()
    );

    Ok(DialogueAudio { waveform, voices })
}

#[cfg(test)]
mod tests {
    use super::synthesize_dialogue;
    use crate::dialogue::DialogueLine;
    use crate::error::{DialogueError, EngineError};
    use crate::lang::LangCode;
    use crate::voice::VoicePool;
    use crate::{SynthesisEngine, SynthesisRequest, WaveformChunk};

    /// Returns `chunks_per_line` chunks per call, each filled with the call
    /// number so the output order is visible.
    struct CountingEngine {
        calls: Vec<(String, String)>,
        chunks_per_line: usize,
        fail_on_call: Option<usize>,
    }

    impl CountingEngine {
        fn new(chunks_per_line: usize) -> Self {
            Self {
                calls: Vec::new(),
                chunks_per_line,
                fail_on_call: None,
            }
        }
    }

    impl SynthesisEngine for CountingEngine {
        fn synthesize(
            &mut self,
            request: &SynthesisRequest<'_>,
        ) -> Result<Vec<WaveformChunk>, EngineError> {
            self.calls
                .push((request.text.to_string(), request.voice.to_string()));
            let call = self.calls.len();
            if self.fail_on_call == Some(call) {
                return Err("engine exploded".into());
            }
            Ok((0..self.chunks_per_line)
                .map(|chunk| vec![call as f32, chunk as f32])
                .collect())
        }
    }

    fn pool() -> VoicePool {
        VoicePool::new(["v1", "v2"]).unwrap()
    }

    #[test]
    fn calls_engine_in_line_order_and_concatenates() {
        let lines = vec![
            DialogueLine::new("Alice", "Hello there"),
            DialogueLine::new("Bob", "Hi Alice"),
            DialogueLine::new("Alice", "Bye"),
        ];
        let mut engine = CountingEngine::new(2);

        let audio =
            synthesize_dialogue(&mut engine, &lines, pool(), LangCode::default(), 1.0).unwrap();

        assert_eq!(
            engine.calls,
            vec![
                ("Hello there".to_string(), "v1".to_string()),
                ("Hi Alice".to_string(), "v2".to_string()),
                ("Bye".to_string(), "v1".to_string()),
            ]
        );
        assert_eq!(
            audio.waveform.samples,
            vec![1.0, 0.0, 1.0, 1.0, 2.0, 0.0, 2.0, 1.0, 3.0, 0.0, 3.0, 1.0]
        );
        assert_eq!(audio.waveform.sample_rate, 24000);
        assert_eq!(
            audio.voices.assignments(),
            vec![
                ("Alice".to_string(), "v1".to_string()),
                ("Bob".to_string(), "v2".to_string()),
            ]
        );
    }

    #[test]
    fn empty_dialogue_is_rejected() {
        let mut engine = CountingEngine::new(1);
        let err =
            synthesize_dialogue(&mut engine, &[], pool(), LangCode::default(), 1.0).unwrap_err();
        assert!(matches!(err, DialogueError::EmptyScript));
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn engine_failure_aborts_with_line_context() {
        let lines = vec![
            DialogueLine::new("Alice", "one"),
            DialogueLine::new("Bob", "two"),
            DialogueLine::new("Alice", "three"),
        ];
        let mut engine = CountingEngine::new(1);
        engine.fail_on_call = Some(2);

        let err = synthesize_dialogue(&mut engine, &lines, pool(), LangCode::default(), 1.0)
            .unwrap_err();

        match err {
            DialogueError::Synthesis { line, speaker, .. } => {
                assert_eq!(line, 2);
                assert_eq!(speaker, "Bob");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(engine.calls.len(), 2, "no line after the failure runs");
    }

    #[test]
    fn engine_without_audio_is_an_error() {
        let lines = vec![
            DialogueLine::new("Alice", "..."),
            DialogueLine::new("Bob", "!!"),
        ];
        let mut engine = CountingEngine::new(0);

        let err = synthesize_dialogue(&mut engine, &lines, pool(), LangCode::default(), 1.0)
            .unwrap_err();

        assert!(matches!(err, DialogueError::NoAudio { lines: 2 }), "{err}");
        assert_eq!(engine.calls.len(), 2);
    }

    #[test]
    fn silent_line_between_spoken_lines_is_skipped() {
        struct SkipSecond(usize);
        impl SynthesisEngine for SkipSecond {
            fn synthesize(
                &mut self,
                _: &SynthesisRequest<'_>,
            ) -> Result<Vec<WaveformChunk>, EngineError> {
                self.0 += 1;
                Ok(if self.0 == 2 { Vec::new() } else { vec![vec![self.0 as f32]] })
            }
        }

        let lines = vec![
            DialogueLine::new("Alice", "one"),
            DialogueLine::new("Bob", "..."),
            DialogueLine::new("Alice", "three"),
        ];
        let audio = synthesize_dialogue(&mut SkipSecond(0), &lines, pool(), LangCode::default(), 1.0)
            .unwrap();
        assert_eq!(audio.waveform.samples, vec![1.0, 3.0]);
    }

    #[test]
    fn rejects_engine_with_other_sample_rate() {
        struct SlowRate;
        impl SynthesisEngine for SlowRate {
            fn sample_rate(&self) -> u32 {
                16000
            }
            fn synthesize(
                &mut self,
                _: &SynthesisRequest<'_>,
            ) -> Result<Vec<WaveformChunk>, EngineError> {
                Ok(vec![vec![0.0]])
            }
        }

        let lines = vec![DialogueLine::new("Alice", "one")];
        let err = synthesize_dialogue(&mut SlowRate, &lines, pool(), LangCode::default(), 1.0)
            .unwrap_err();
        assert!(matches!(
            err,
            DialogueError::SampleRateMismatch {
                expected: 24000,
                found: 16000
            }
        ));
    }
}
