//! Append-only byte arenas for strings and blobs.
//!
//! Strings are stored NUL-terminated, blobs behind a `u16 LE` length prefix.
//! Every append returns the entry index and the byte offset it landed at;
//! neither ever changes afterwards.

use crate::consts::BLOB_LEN_BYTES;
use crate::errors::ValidationError;
use crate::utils::{c_str_at, u16_at};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interned {
    pub index: usize,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct Heap {
    name: &'static str,
    bytes: Vec<u8>,
    entries: Vec<usize>,
    // framed bytes -> entry index
    dedup: Option<HashMap<Vec<u8>, usize>>,
}

impl Heap {
    pub fn new(name: &'static str) -> Self {
        Self { name, bytes: Vec::new(), entries: Vec::new(), dedup: None }
    }

    /// Identical values share one entry. `expected` sizes the lookup table.
    pub fn with_dedup(name: &'static str, expected: usize) -> Self {
        Self { dedup: Some(HashMap::with_capacity(expected)), ..Self::new(name) }
    }

    pub fn name(&self) -> &'static str { self.name }
    pub fn len(&self) -> usize { self.bytes.len() }
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }
    /// Byte offset of each entry, in intern order.
    pub fn entries(&self) -> &[usize] { &self.entries }

    /// Interior NULs would cut the string short for the consumer; the value
    /// is truncated at the first one.
    pub fn intern_str(&mut self, s: &str) -> Interned {
        let raw = s.as_bytes();
        let raw = &raw[..raw.iter().position(|&b| b == 0).unwrap_or(raw.len())];
        let mut framed = Vec::with_capacity(raw.len() + 1);
        framed.extend_from_slice(raw);
        framed.push(0);
        self.append(framed)
    }

    pub fn intern_blob(&mut self, blob: &[u8]) -> Result<Interned, ValidationError> {
        let len = u16::try_from(blob.len()).map_err(|_| ValidationError::BlobTooLarge { len: blob.len() })?;
        let mut framed = Vec::with_capacity(BLOB_LEN_BYTES + blob.len());
        framed.extend_from_slice(&len.to_le_bytes());
        framed.extend_from_slice(blob);
        Ok(self.append(framed))
    }

    fn append(&mut self, framed: Vec<u8>) -> Interned {
        if let Some(&index) = self.dedup.as_ref().and_then(|d| d.get(&framed)) {
            return Interned { index, offset: self.entries[index] };
        }
        let offset = self.bytes.len();
        let index = self.entries.len();
        self.bytes.extend_from_slice(&framed);
        self.entries.push(offset);
        if let Some(d) = self.dedup.as_mut() {
            d.insert(framed, index);
        }
        Interned { index, offset }
    }

    pub fn read_str(&self, offset: usize) -> Option<&str> {
        std::str::from_utf8(c_str_at(&self.bytes, offset)?).ok()
    }

    pub fn read_blob(&self, offset: usize) -> Option<&[u8]> {
        let len = u16_at(&self.bytes, offset)? as usize;
        let start = offset + BLOB_LEN_BYTES;
        self.bytes.get(start..start + len)
    }

    /// Narrow an offset into a 16-bit record field.
    pub fn ref_u16(&self, offset: usize) -> Result<u16, ValidationError> {
        u16::try_from(offset).map_err(|_| ValidationError::OffsetOverflow { heap: self.name, offset, bits: 16 })
    }

    pub fn ref_u32(&self, offset: usize) -> Result<u32, ValidationError> {
        u32::try_from(offset).map_err(|_| ValidationError::OffsetOverflow { heap: self.name, offset, bits: 32 })
    }

    /// Entry index narrowed for a 16-bit record field.
    pub fn index_u16(&self, index: usize) -> Result<u16, ValidationError> {
        u16::try_from(index).map_err(|_| ValidationError::CountOverflow { what: self.name, count: index + 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_increase_and_read_back() {
        let mut h = Heap::new("names");
        let words = ["Hydrogen", "Helium", "", "Lithium"];
        let got: Vec<Interned> = words.iter().map(|w| h.intern_str(w)).collect();
        for pair in got.windows(2) {
            assert!(pair[0].offset < pair[1].offset);
        }
        for (w, i) in words.iter().zip(&got) {
            assert_eq!(h.read_str(i.offset), Some(*w));
        }
        assert_eq!(h.len(), "Hydrogen".len() + "Helium".len() + "Lithium".len() + 4);
        assert_eq!(h.entries(), &[0, 9, 16, 17]);
    }

    #[test]
    fn dedup_reuses_entry() {
        let mut h = Heap::with_dedup("genus", 4);
        let a = h.intern_str("Seed Pokémon");
        let b = h.intern_str("Lizard Pokémon");
        let c = h.intern_str("Seed Pokémon");
        assert_eq!(a, c);
        assert_ne!(a.offset, b.offset);
        assert_eq!(h.entries().len(), 2);
        assert_eq!(h.read_str(c.offset), Some("Seed Pokémon"));
    }

    #[test]
    fn plain_heap_keeps_duplicates() {
        let mut h = Heap::new("sym");
        let a = h.intern_str("X");
        let b = h.intern_str("X");
        assert!(b.offset > a.offset);
        assert_eq!(b.index, 1);
    }

    #[test]
    fn blobs_are_length_prefixed() {
        let mut h = Heap::new("sprites");
        let a = h.intern_blob(&[0xAA; 3]).unwrap();
        let b = h.intern_blob(&[]).unwrap();
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 5);
        assert_eq!(&h.as_bytes()[..5], &[3, 0, 0xAA, 0xAA, 0xAA]);
        assert_eq!(h.read_blob(a.offset), Some(&[0xAA; 3][..]));
        assert_eq!(h.read_blob(b.offset), Some(&[][..]));
        let big = vec![0u8; 70_000];
        assert_eq!(h.intern_blob(&big), Err(ValidationError::BlobTooLarge { len: 70_000 }));
    }

    #[test]
    fn interior_nul_truncates() {
        let mut h = Heap::new("n");
        let i = h.intern_str("ab\0cd");
        assert_eq!(h.read_str(i.offset), Some("ab"));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn wide_offsets_are_rejected() {
        let h = Heap::new("names");
        assert_eq!(h.ref_u16(65_535), Ok(65_535));
        assert!(matches!(h.ref_u16(65_536), Err(ValidationError::OffsetOverflow { bits: 16, .. })));
    }
}
