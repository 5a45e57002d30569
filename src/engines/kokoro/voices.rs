use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::{KokoroError, STYLE_DIM};

/// One style vector of a voice.
pub type Style = [f32; STYLE_DIM];

/// Style vectors of every voice in a `voices-v1.0.bin` archive.
///
/// A voice holds one style vector per possible token count; the vector used
/// for a segment is picked by the segment's length.
pub struct VoiceStore {
    voices: HashMap<String, Vec<Style>>,
}

impl VoiceStore {
    /// Load every `<voice>.npy` entry of a numpy `.npz` archive.
    pub fn load(path: &Path) -> Result<Self, KokoroError> {
        let mut archive = zip::ZipArchive::new(File::open(path)?)
            .map_err(|e| KokoroError::VoiceParse(format!("Failed to open zip archive: {e}")))?;

        let mut voices = HashMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| {
                KokoroError::VoiceParse(format!("Failed to read zip entry {i}: {e}"))
            })?;
            if entry.is_dir() {
                continue;
            }

            let entry_name = entry.name().to_string();
            let Some(voice) = entry_name.strip_suffix(".npy").filter(|v| !v.is_empty()) else {
                log::debug!("Skipping non-voice entry {entry_name}");
                continue;
            };

            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            voices.insert(voice.to_string(), parse_npy(&data, &entry_name)?);
        }

        log::info!("Loaded {} voices", voices.len());
        Ok(Self { voices })
    }

    pub fn contains(&self, voice: &str) -> bool {
        self.voices.contains_key(voice)
    }

    /// Style vector of `voice` for a segment of `tokens` tokens.
    ///
    /// Lengths past the end of the table use its last row.
    pub fn style(&self, voice: &str, tokens: usize) -> Result<&Style, KokoroError> {
        let styles = self
            .voices
            .get(voice)
            .ok_or_else(|| KokoroError::VoiceNotFound(voice.to_string()))?;
        let row = tokens.saturating_sub(1).min(styles.len().saturating_sub(1));
        styles
            .get(row)
            .ok_or_else(|| KokoroError::VoiceParse(format!("{voice}: no style vectors")))
    }

    /// All voice names, sorted.
    pub fn list_voices(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.voices.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Parse a little-endian float32 `.npy` array whose element count is a
/// multiple of [`STYLE_DIM`].
fn parse_npy(data: &[u8], name: &str) -> Result<Vec<Style>, KokoroError> {
    let bad = |why: String| KokoroError::VoiceParse(format!("{name}: {why}"));

    if data.len() < 10 || &data[..6] != b"\x93NUMPY" {
        return Err(bad("not a numpy file".to_string()));
    }

    // v1 stores the header length as u16 at [8..10], v2+ as u32 at [8..12].
    let (header_len, header_start) = match data[6] {
        1 => (u16::from_le_bytes([data[8], data[9]]) as usize, 10),
        _ if data.len() >= 12 => (
            u32::from_le_bytes([data[8], data[9], data[10], data[11]]) as usize,
            12,
        ),
        _ => return Err(bad("header truncated".to_string())),
    };
    let body_start = header_start + header_len;
    let header = data
        .get(header_start..body_start)
        .ok_or_else(|| bad(format!("header truncated (need {body_start} bytes)")))?;

    let header = String::from_utf8_lossy(header);
    if !header.contains("'<f4'") {
        return Err(bad(format!("expected little-endian float32 data, header {header}")));
    }

    let body = &data[body_start..];
    let row_bytes = STYLE_DIM * 4;
    if body.len() % row_bytes != 0 {
        return Err(bad(format!(
            "{} data bytes do not form whole {STYLE_DIM}-float style vectors",
            body.len()
        )));
    }

    Ok(body
        .chunks_exact(row_bytes)
        .map(|row| {
            let mut style = [0f32; STYLE_DIM];
            for (value, bytes) in style.iter_mut().zip(row.chunks_exact(4)) {
                *value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
            style
        })
        .collect())
}
