use std::collections::HashMap;
use std::path::Path;

use super::model::KokoroError;

/// Punctuation a long token sequence may be cut after, in order of preference.
const SPLIT_MARKS: [char; 6] = ['.', '!', '?', ';', ':', ','];

/// Phoneme vocabulary of a Kokoro model.
#[derive(Debug, Clone)]
pub struct Vocab {
    ids: HashMap<char, i64>,
    split_ids: Vec<i64>,
}

impl Vocab {
    /// Load the `"vocab"` object of a Kokoro `config.json`, which maps
    /// single-character strings to token IDs.
    pub fn load(config_path: &Path) -> Result<Self, KokoroError> {
        let content = std::fs::read_to_string(config_path)?;
        let json: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| KokoroError::Config(format!("Failed to parse JSON: {e}")))?;

        let entries = json
            .get("vocab")
            .ok_or_else(|| KokoroError::Config("Missing 'vocab' field".to_string()))?
            .as_object()
            .ok_or_else(|| KokoroError::Config("'vocab' must be an object".to_string()))?;

        let ids = entries
            .iter()
            .map(|(key, value)| {
                let ch = key
                    .chars()
                    .next()
                    .ok_or_else(|| KokoroError::Config(format!("Empty key in vocab: {key:?}")))?;
                let id = value.as_i64().ok_or_else(|| {
                    KokoroError::Config(format!("Non-integer vocab value for key {key:?}"))
                })?;
                Ok((ch, id))
            })
            .collect::<Result<HashMap<_, _>, KokoroError>>()?;

        log::info!("Loaded {} vocab entries", ids.len());
        Ok(Self::from_map(ids))
    }

    pub fn from_map(ids: HashMap<char, i64>) -> Self {
        let split_ids = SPLIT_MARKS
            .iter()
            .filter_map(|mark| ids.get(mark).copied())
            .collect();
        Self { ids, split_ids }
    }

    pub fn ids(&self) -> &HashMap<char, i64> {
        &self.ids
    }

    /// Whether a sequence may be cut right after `id`.
    pub fn is_split_point(&self, id: i64) -> bool {
        self.split_ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Vocab;
    use crate::engines::kokoro::KokoroError;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(body: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_vocab_and_split_points() {
        let (_dir, path) = write_config(
            r#"{ "n_token": 178, "vocab": { ";": 1, ",": 3, ".": 4, "a": 43, "ə": 83 } }"#,
        );

        let vocab = Vocab::load(&path).unwrap();

        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.ids().get(&'ə'), Some(&83));
        assert!(vocab.is_split_point(4));
        assert!(vocab.is_split_point(1));
        assert!(!vocab.is_split_point(43));
    }

    #[test]
    fn missing_vocab_field_is_config_error() {
        let (_dir, path) = write_config(r#"{ "n_token": 178 }"#);
        let err = Vocab::load(&path).unwrap_err();
        assert!(matches!(err, KokoroError::Config(ref msg) if msg.contains("Missing 'vocab'")));
    }

    #[test]
    fn non_integer_id_is_config_error() {
        let (_dir, path) = write_config(r#"{ "vocab": { "a": "forty" } }"#);
        let err = Vocab::load(&path).unwrap_err();
        assert!(matches!(err, KokoroError::Config(ref msg) if msg.contains("Non-integer")));
    }
}
