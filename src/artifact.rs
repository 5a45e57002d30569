//! The single on-disk artifact of a generation run.
//!
//! The output directory holds at most one file. A run first clears it
//! ([`OutputDir::acquire`]), then writes the new audio through the returned
//! [`ArtifactSlot`]. A run that fails between the two steps leaves the
//! directory empty rather than holding stale audio.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::{WavEncoding, Waveform};

/// Audio produced by one run, plus where it was written.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub waveform: Waveform,
    /// `(speaker, voice)` pairs in first-seen order.
    pub voices: Vec<(String, String)>,
}

/// Fixed location of the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    dir: PathBuf,
    file_name: String,
}

impl OutputDir {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Create the directory if needed and delete every file in it.
    ///
    /// Subdirectories are left alone.
    pub fn acquire(&self) -> Result<ArtifactSlot<'_>> {
        fs::create_dir_all(&self.dir)?;

        let mut removed = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_dir() {
                log::warn!("Leaving directory {} in output dir", path.display());
                continue;
            }
            fs::remove_file(&path)?;
            removed += 1;
        }
        log::debug!("Cleared {removed} file(s) from {}", self.dir.display());

        Ok(ArtifactSlot { output: self })
    }

    /// Clear the directory and write `waveform` as the new artifact.
    pub fn replace(&self, waveform: &Waveform, encoding: WavEncoding) -> Result<PathBuf> {
        self.acquire()?.write(waveform, encoding)
    }
}

/// A cleared output directory, ready to receive exactly one artifact.
#[derive(Debug)]
pub struct ArtifactSlot<'a> {
    output: &'a OutputDir,
}

impl ArtifactSlot<'_> {
    /// Write the WAV file and return its path.
    pub fn write(self, waveform: &Waveform, encoding: WavEncoding) -> Result<PathBuf> {
        let path = self.output.artifact_path();
        waveform.write_wav(&path, encoding)?;
        log::info!(
            "Wrote {:.2}s of audio to {}",
            waveform.duration_secs(),
            path.display()
        );
        Ok(path)
    }
}
