use crate::emit::{Format, OutputFile};
use crate::numeric::{Encoded, Outcome};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Locally recovered problems. None of these stop a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradations {
    /// Present but not a number; the field got its missing sentinel.
    pub unparseable_numbers: usize,
    /// Outside the field's width; stored at the nearest bound.
    pub clamped_numbers: usize,
    /// Present but matched no enum rule; stored as the Unknown code.
    pub unknown_enums: usize,
    /// Undecodable or missing image; stored as a blank bitmap.
    pub failed_sprites: usize,
}

impl Degradations {
    pub fn total(&self) -> usize {
        self.unparseable_numbers + self.clamped_numbers + self.unknown_enums + self.failed_sprites
    }

    /// Unwrap an encoded scalar, counting a clamp.
    pub fn scalar<T: Copy>(&mut self, e: Encoded<T>) -> T {
        if e.outcome == Outcome::Clamped {
            self.clamped_numbers += 1;
        }
        e.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub bytes: usize,
    pub sha256: String,
}

impl FileEntry {
    pub fn of(out: &OutputFile) -> Self {
        let digest = Sha256::digest(&out.bytes);
        Self { name: out.name.clone(), bytes: out.bytes.len(), sha256: hex::encode(digest) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub domain: String,
    pub format: Format,
    pub entities: usize,
    pub capacity: usize,
    pub filled: usize,
    pub degradations: Degradations,
    pub files: Vec<FileEntry>,
}

impl BuildReport {
    pub fn summary_line(&self) -> String {
        let d = &self.degradations;
        format!(
            "{}: packed {} entities into {} slots ({} filled); degraded: {} unparseable, {} clamped, {} unknown enum, {} sprite failures",
            self.domain,
            self.entities,
            self.capacity,
            self.filled,
            d.unparseable_numbers,
            d.clamped_numbers,
            d.unknown_enums,
            d.failed_sprites
        )
    }
}
