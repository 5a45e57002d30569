use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::model::KokoroError;

/// Words that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e",
];

/// Where to find espeak-ng.
///
/// Either path can be `None` to fall back to `espeak-ng` on PATH and its
/// compiled-in data directory.
#[derive(Debug, Clone, Default)]
pub struct EspeakConfig {
    pub bin_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
}

/// Split a line of dialogue into sentences.
///
/// A sentence ends at a run of `.`, `!`, `?` or `…` followed by whitespace
/// or the end of the text. Periods after common abbreviations do not end a
/// sentence, and neither do decimal points since no whitespace follows them.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_terminator(ch) {
            continue;
        }

        let mut end = idx + ch.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if !is_terminator(next) && !is_closing_quote(next) {
                break;
            }
            end = next_idx + next.len_utf8();
            chars.next();
        }

        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if !at_boundary || (ch == '.' && ends_with_abbreviation(&text[start..idx])) {
            continue;
        }

        push_sentence(&mut sentences, &text[start..end]);
        start = end;
    }

    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let sentence = candidate.trim();
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…')
}

fn is_closing_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | '\u{201d}' | '\u{2019}')
}

fn ends_with_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(|c: char| c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_lowercase();
    ABBREVIATIONS.contains(&word.as_str())
}

/// Convert one sentence to Kokoro token IDs via espeak-ng.
///
/// Punctuation is kept as its own token; everything else goes through
/// espeak-ng in `lang` (an espeak-ng voice code such as `"en-us"`). IPA
/// characters missing from `vocab` are dropped.
pub fn phonemize(
    sentence: &str,
    lang: &str,
    vocab: &HashMap<char, i64>,
    espeak: &EspeakConfig,
) -> Result<Vec<i64>, KokoroError> {
    let pieces = split_pieces(sentence);
    let words: Vec<&str> = pieces
        .iter()
        .filter_map(|piece| match piece {
            Piece::Words(words) => Some(words.as_str()),
            Piece::Mark(_) => None,
        })
        .collect();

    let word_ids = if words.is_empty() {
        Vec::new()
    } else {
        phonemize_words(&words, lang, vocab, espeak)?
    };
    let mut word_ids = word_ids.into_iter();

    let mut ids = Vec::new();
    for piece in &pieces {
        match piece {
            Piece::Words(_) => ids.extend(word_ids.next().unwrap_or_default()),
            Piece::Mark(mark) => ids.extend(vocab.get(mark).copied()),
        }
    }
    Ok(ids)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Words(String),
    Mark(char),
}

/// Break text into runs of words and single punctuation marks.
///
/// Whitespace collapses to one space. `.` and `,` between two digits stay
/// inside the word run so numbers like `2.5` and `1,000` are read whole.
fn split_pieces(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut words = String::new();
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let next = chars.peek().copied();
        let inside_number = matches!(ch, '.' | ',')
            && prev.is_some_and(|p| p.is_ascii_digit())
            && next.is_some_and(|n| n.is_ascii_digit());

        match punctuation_mark(ch) {
            Some(mark) if !inside_number => {
                flush_words(&mut pieces, &mut words);
                pieces.push(Piece::Mark(mark));
            }
            _ if ch.is_whitespace() => {
                if !words.is_empty() && !words.ends_with(' ') {
                    words.push(' ');
                }
            }
            _ => words.push(ch),
        }
        prev = Some(ch);
    }

    flush_words(&mut pieces, &mut words);
    pieces
}

fn flush_words(pieces: &mut Vec<Piece>, words: &mut String) {
    let trimmed = words.trim();
    if !trimmed.is_empty() {
        pieces.push(Piece::Words(trimmed.to_string()));
    }
    words.clear();
}

fn punctuation_mark(ch: char) -> Option<char> {
    match ch {
        '.' | '!' | '?' | ',' | ';' | ':' | '—' | '…' | '"' | '(' | ')' | '\u{201c}'
        | '\u{201d}' => Some(ch),
        _ => None,
    }
}

/// Phonemize all word runs of a sentence with a single espeak-ng call.
///
/// espeak-ng answers one IPA line per input line. If the line count does not
/// match, each run is phonemized on its own instead.
fn phonemize_words(
    words: &[&str],
    lang: &str,
    vocab: &HashMap<char, i64>,
    espeak: &EspeakConfig,
) -> Result<Vec<Vec<i64>>, KokoroError> {
    let output = run_espeak(&words.join("\n"), lang, espeak)?;
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() == words.len() {
        return Ok(lines.iter().map(|line| ipa_to_ids(line, vocab)).collect());
    }

    log::debug!(
        "espeak-ng returned {} lines for {} inputs, retrying one by one",
        lines.len(),
        words.len()
    );
    words
        .iter()
        .map(|run| Ok(ipa_to_ids(&run_espeak(run, lang, espeak)?, vocab)))
        .collect()
}

fn run_espeak(input: &str, lang: &str, espeak: &EspeakConfig) -> Result<String, KokoroError> {
    let mut command = match &espeak.bin_path {
        Some(bin) => Command::new(bin),
        None => Command::new("espeak-ng"),
    };
    command
        .args(["--ipa", "--stdin", "-q", "-v", lang])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(data) = &espeak.data_path {
        command.env("ESPEAK_DATA_PATH", data);
    }

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KokoroError::EspeakNotFound
        } else {
            KokoroError::Io(e)
        }
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        // Input is read line by line; an unterminated last line loses its
        // final phoneme.
        stdin.write_all(newline_terminated(input).as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KokoroError::PhonemizerFailed(format!(
            "espeak-ng exited with code {:?}: {stderr}",
            output.status.code()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn newline_terminated(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

/// Map IPA output to token IDs, skipping espeak's `_` word joiners.
fn ipa_to_ids(ipa: &str, vocab: &HashMap<char, i64>) -> Vec<i64> {
    ipa.lines()
        .flat_map(|line| line.trim().chars())
        .filter(|&ch| ch != '_')
        .filter_map(|ch| vocab.get(&ch).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        ipa_to_ids, newline_terminated, phonemize, run_espeak, split_pieces, split_sentences,
        EspeakConfig, Piece,
    };
    use std::collections::HashMap;
    use std::process::Command;

    fn espeak_available() -> bool {
        Command::new("espeak-ng").arg("--version").output().is_ok()
    }

    #[test]
    fn splits_sentences_on_terminal_punctuation() {
        assert_eq!(
            split_sentences("Hello there! How are you? I'm fine."),
            vec!["Hello there!", "How are you?", "I'm fine."]
        );
    }

    #[test]
    fn keeps_decimals_abbreviations_and_quotes_together() {
        assert_eq!(
            split_sentences("Dr. Smith paid 2.50 today. \"Really?!\" she asked"),
            vec!["Dr. Smith paid 2.50 today.", "\"Really?!\"", "she asked"]
        );
    }

    #[test]
    fn sentence_without_terminator_is_kept() {
        assert_eq!(split_sentences("  no ending here "), vec!["no ending here"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn splits_words_and_punctuation() {
        assert_eq!(
            split_pieces("Hello,  world. Testing!"),
            vec![
                Piece::Words("Hello".to_string()),
                Piece::Mark(','),
                Piece::Words("world".to_string()),
                Piece::Mark('.'),
                Piece::Words("Testing".to_string()),
                Piece::Mark('!'),
            ]
        );
    }

    #[test]
    fn keeps_number_separators_inside_words() {
        assert_eq!(
            split_pieces("Version 2.0 reached 1,000 users, 3 , 4."),
            vec![
                Piece::Words("Version 2.0 reached 1,000 users".to_string()),
                Piece::Mark(','),
                Piece::Words("3".to_string()),
                Piece::Mark(','),
                Piece::Words("4".to_string()),
                Piece::Mark('.'),
            ]
        );
    }

    #[test]
    fn terminates_stdin_payload_once() {
        assert_eq!(newline_terminated("America"), "America\n");
        assert_eq!(newline_terminated("America\n"), "America\n");
    }

    #[test]
    fn ipa_lookup_drops_joiners_and_unknown_chars() {
        let vocab: HashMap<char, i64> = [('h', 50), ('ə', 83), ('l', 54)].into_iter().collect();
        assert_eq!(ipa_to_ids(" hə_lˈoʊ \n", &vocab), vec![50, 83, 54]);
    }

    #[test]
    fn missing_binary_is_reported() {
        let espeak = EspeakConfig {
            bin_path: Some("/nonexistent/espeak-ng".into()),
            data_path: None,
        };
        let err = run_espeak("hello", "en-us", &espeak).unwrap_err();
        assert!(matches!(err, super::KokoroError::EspeakNotFound), "{err}");
    }

    #[test]
    fn espeak_keeps_final_phoneme() {
        if !espeak_available() {
            return;
        }

        let vocab: HashMap<char, i64> = [('ə', 83), ('ɪ', 102), ('m', 55), ('ɹ', 123)]
            .into_iter()
            .collect();
        let ids = phonemize("America", "en-us", &vocab, &EspeakConfig::default())
            .expect("phonemize should succeed");
        assert_eq!(ids.last(), Some(&83), "terminal schwa should be preserved");
    }

    #[test]
    fn punctuation_tokens_survive_phonemization() {
        if !espeak_available() {
            return;
        }

        let vocab: HashMap<char, i64> = [(',', 3), ('!', 5), ('h', 50)].into_iter().collect();
        let ids = phonemize("hi, hi!", "en-us", &vocab, &EspeakConfig::default()).unwrap();
        assert!(ids.contains(&3));
        assert_eq!(ids.last(), Some(&5));
    }
}
