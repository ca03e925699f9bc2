//! Memory-mapped readers over emitted binary resources.
//!
//! These mirror what the embedded consumer does: read the count header,
//! index into the offset list, then follow the offset into the payload.

use crate::consts::{BLOB_LEN_BYTES, IDX_ENTRY_SIZE, SPRITE_OFFSET_BYTES, STR_COUNT_BYTES, STR_OFFSET_BYTES};
use crate::domain::{CreatureRecord, ElementRecord};
use crate::errors::{PackError, Result};
use crate::record::PackedRecord;
use crate::utils::{c_str_at, u16_at, u32_at};
use memmap2::Mmap;
use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

fn map(path: &Path) -> Result<(File, Mmap)> {
    let f = File::open(path).map_err(|e| PackError::io_at(path, e))?;
    // outputs are written once and never modified in place
    let mmap = unsafe { Mmap::map(&f) }.map_err(|e| PackError::io_at(path, e))?;
    Ok((f, mmap))
}

/// `[count u16][offset * count][payload]` with 16- or 32-bit offsets.
pub struct TableReader {
    _f: File,
    mmap: Mmap,
    count: usize,
    width: usize,
}

impl TableReader {
    /// String table with `u16` offsets.
    pub fn open_strings(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path.as_ref(), STR_OFFSET_BYTES)
    }

    /// Blob table with `u32` offsets.
    pub fn open_blobs(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path.as_ref(), SPRITE_OFFSET_BYTES)
    }

    fn open(path: &Path, width: usize) -> Result<Self> {
        let (f, mmap) = map(path)?;
        let count = u16_at(&mmap, 0).ok_or_else(|| PackError::BadHeader(path.to_path_buf()))? as usize;
        if STR_COUNT_BYTES + count * width > mmap.len() {
            return Err(PackError::BadHeader(path.to_path_buf()));
        }
        Ok(Self { _f: f, mmap, count, width })
    }

    pub fn len(&self) -> usize { self.count }
    pub fn is_empty(&self) -> bool { self.count == 0 }

    fn payload(&self) -> &[u8] { &self.mmap[STR_COUNT_BYTES + self.count * self.width..] }

    pub fn payload_len(&self) -> usize { self.payload().len() }

    pub fn offset(&self, i: usize) -> Option<usize> {
        if i >= self.count {
            return None;
        }
        let pos = STR_COUNT_BYTES + i * self.width;
        match self.width {
            STR_OFFSET_BYTES => u16_at(&self.mmap, pos).map(usize::from),
            _ => u32_at(&self.mmap, pos).map(|o| o as usize),
        }
    }

    /// String at a payload byte offset, as referenced from a record.
    pub fn str_at(&self, offset: usize) -> Option<&str> {
        std::str::from_utf8(c_str_at(self.payload(), offset)?).ok()
    }

    pub fn blob_at(&self, offset: usize) -> Option<&[u8]> {
        let payload = self.payload();
        let len = u16_at(payload, offset)? as usize;
        let start = offset + BLOB_LEN_BYTES;
        payload.get(start..start + len)
    }

    /// String for table entry `i`.
    pub fn get(&self, i: usize) -> Option<&str> { self.str_at(self.offset(i)?) }

    pub fn get_blob(&self, i: usize) -> Option<&[u8]> { self.blob_at(self.offset(i)?) }
}

/// `[count u16][(key u16, record offset u32) * count]`, sorted by key.
pub struct IndexReader {
    _f: File,
    mmap: Mmap,
    count: usize,
}

impl IndexReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (f, mmap) = map(path)?;
        let count = u16_at(&mmap, 0).ok_or_else(|| PackError::BadHeader(path.to_path_buf()))? as usize;
        if mmap.len() != STR_COUNT_BYTES + count * IDX_ENTRY_SIZE {
            return Err(PackError::BadHeader(path.to_path_buf()));
        }
        Ok(Self { _f: f, mmap, count })
    }

    pub fn len(&self) -> usize { self.count }
    pub fn is_empty(&self) -> bool { self.count == 0 }

    pub fn entry(&self, i: usize) -> Option<(u16, u32)> {
        if i >= self.count {
            return None;
        }
        let pos = STR_COUNT_BYTES + i * IDX_ENTRY_SIZE;
        Some((u16_at(&self.mmap, pos)?, u32_at(&self.mmap, pos + 2)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        (0..self.count).filter_map(|i| self.entry(i))
    }

    /// Record offset for `key`.
    pub fn find(&self, key: u16) -> Option<u32> {
        let (mut lo, mut hi) = (0usize, self.count);
        while lo < hi {
            let mid = (lo + hi) / 2;
            let (k, off) = self.entry(mid)?;
            match k.cmp(&key) {
                std::cmp::Ordering::Equal => return Some(off),
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        None
    }
}

/// Dense `capacity * R::SIZE` record file.
pub struct RecordReader<R> {
    _f: File,
    mmap: Mmap,
    _rec: PhantomData<R>,
}

impl<R: PackedRecord> RecordReader<R> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (f, mmap) = map(path)?;
        if mmap.is_empty() || mmap.len() % R::SIZE != 0 {
            return Err(PackError::BadHeader(path.to_path_buf()));
        }
        Ok(Self { _f: f, mmap, _rec: PhantomData })
    }

    pub fn capacity(&self) -> usize { self.mmap.len() / R::SIZE }

    pub fn get(&self, key: usize) -> Option<R> {
        let start = key.checked_mul(R::SIZE)?;
        R::read_le(self.mmap.get(start..)?)
    }

    /// Record at a byte offset taken from the index.
    pub fn at_offset(&self, offset: u32) -> Option<R> {
        R::read_le(self.mmap.get(offset as usize..)?)
    }

    /// Filled slots in key order.
    pub fn filled(&self) -> impl Iterator<Item = (usize, R)> + '_ {
        (1..self.capacity()).filter_map(|k| self.get(k).filter(|r| r.key() as usize == k).map(|r| (k, r)))
    }
}

fn file(dir: &Path, prefix: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{prefix}_{suffix}"))
}

pub struct ElementFiles {
    pub symbols: TableReader,
    pub names: TableReader,
    pub discoverers: TableReader,
    pub records: RecordReader<ElementRecord>,
    pub index: IndexReader,
}

impl ElementFiles {
    pub fn open(dir: &Path, prefix: &str) -> Result<Self> {
        Ok(Self {
            symbols: TableReader::open_strings(file(dir, prefix, "symbols.str"))?,
            names: TableReader::open_strings(file(dir, prefix, "names.str"))?,
            discoverers: TableReader::open_strings(file(dir, prefix, "discoverers.str"))?,
            records: RecordReader::open(file(dir, prefix, "data.rec"))?,
            index: IndexReader::open(file(dir, prefix, "index.idx"))?,
        })
    }

    pub fn symbol(&self, r: &ElementRecord) -> Option<&str> { self.symbols.str_at(r.symbol_offset as usize) }
    pub fn name(&self, r: &ElementRecord) -> Option<&str> { self.names.str_at(r.name_offset as usize) }
    pub fn discoverer(&self, r: &ElementRecord) -> Option<&str> {
        self.discoverers.str_at(r.discoverer_offset as usize)
    }
}

pub struct CreatureFiles {
    pub names: TableReader,
    pub genus: TableReader,
    pub flavor: TableReader,
    pub sprites: TableReader,
    pub records: RecordReader<CreatureRecord>,
    pub index: IndexReader,
}

impl CreatureFiles {
    pub fn open(dir: &Path, prefix: &str) -> Result<Self> {
        Ok(Self {
            names: TableReader::open_strings(file(dir, prefix, "names.str"))?,
            genus: TableReader::open_strings(file(dir, prefix, "genus.str"))?,
            flavor: TableReader::open_strings(file(dir, prefix, "flavor.str"))?,
            sprites: TableReader::open_blobs(file(dir, prefix, "sprites.bin"))?,
            records: RecordReader::open(file(dir, prefix, "data.rec"))?,
            index: IndexReader::open(file(dir, prefix, "index.idx"))?,
        })
    }

    pub fn name(&self, key: u16) -> Option<&str> { self.names.get(key as usize) }
    pub fn genus(&self, r: &CreatureRecord) -> Option<&str> { self.genus.get(r.genus_ref as usize) }
    pub fn flavor(&self, r: &CreatureRecord) -> Option<&str> { self.flavor.get(r.flavor_ref as usize) }
    pub fn sprite(&self, r: &CreatureRecord) -> Option<&[u8]> { self.sprites.blob_at(r.sprite_offset as usize) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn string_table_by_entry() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("t.str");
        fs::write(&p, [2, 0, 0, 0, 2, 0, b'H', 0, b'H', b'e', 0]).unwrap();
        let t = TableReader::open_strings(&p).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(0), Some("H"));
        assert_eq!(t.get(1), Some("He"));
        assert_eq!(t.get(2), None);
        assert_eq!(t.str_at(2), Some("He"));
    }

    #[test]
    fn blob_table() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("s.bin");
        fs::write(&p, [2, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 1, 0, 0xF0]).unwrap();
        let t = TableReader::open_blobs(&p).unwrap();
        assert_eq!(t.get_blob(0), Some(&[][..]));
        assert_eq!(t.get_blob(1), Some(&[0xF0][..]));
    }

    #[test]
    fn truncated_header_is_rejected() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("bad.str");
        fs::write(&p, [9, 0, 0, 0]).unwrap();
        assert!(matches!(TableReader::open_strings(&p), Err(PackError::BadHeader(_))));
        let i = td.path().join("bad.idx");
        fs::write(&i, [1, 0, 1, 0]).unwrap();
        assert!(matches!(IndexReader::open(&i), Err(PackError::BadHeader(_))));
    }

    #[test]
    fn index_binary_search() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("x.idx");
        let mut bytes = vec![3, 0];
        for (k, off) in [(1u16, 32u32), (4, 128), (25, 800)] {
            bytes.extend_from_slice(&k.to_le_bytes());
            bytes.extend_from_slice(&off.to_le_bytes());
        }
        fs::write(&p, bytes).unwrap();
        let idx = IndexReader::open(&p).unwrap();
        assert_eq!(idx.find(4), Some(128));
        assert_eq!(idx.find(25), Some(800));
        assert_eq!(idx.find(5), None);
        assert_eq!(idx.iter().count(), 3);
    }

    #[test]
    fn missing_file_names_path() {
        let err = IndexReader::open("/no/such/x.idx").err().unwrap();
        assert!(err.to_string().contains("/no/such/x.idx"));
    }
}
