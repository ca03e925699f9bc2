//! Layout-level description of one build's output: heaps, the record array,
//! and the index over it. Built by a domain after packing, checked once, then
//! handed to the emitter which trusts it.

use crate::errors::ValidationError;
use crate::heap::Heap;
use crate::record::PackedRecord;
use crate::slots::SlotArray;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetWidth {
    U16,
    U32,
}

#[derive(Debug, Clone)]
pub struct HeapSection {
    /// File stem in binary form (`symbols` → `<prefix>_symbols.str`).
    pub stem: &'static str,
    /// Identifier in header form (`SYM` → `PT_SYM_BYTES`).
    pub ident: &'static str,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
    /// Offset of each table entry; not necessarily increasing.
    pub entries: Vec<usize>,
    pub offset_width: OffsetWidth,
    /// Also emit the entry offsets in header form.
    pub header_offsets: bool,
}

impl HeapSection {
    /// String table over the heap's own entries, in intern order.
    pub fn strings(heap: &Heap, stem: &'static str, ident: &'static str) -> Self {
        Self {
            stem,
            ident,
            extension: "str",
            bytes: heap.as_bytes().to_vec(),
            entries: heap.entries().to_vec(),
            offset_width: OffsetWidth::U16,
            header_offsets: false,
        }
    }

    pub fn with_entries(mut self, entries: Vec<usize>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_header_offsets(mut self) -> Self {
        self.header_offsets = true;
        self
    }

    /// Blob table with `u32` offsets.
    pub fn blobs(heap: &Heap, stem: &'static str, ident: &'static str, entries: Vec<usize>) -> Self {
        Self {
            stem,
            ident,
            extension: "bin",
            bytes: heap.as_bytes().to_vec(),
            entries,
            offset_width: OffsetWidth::U32,
            header_offsets: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordSection {
    pub ident: &'static str,
    pub c_type: &'static str,
    pub record_size: usize,
    /// Initializer fields per slot; `None` for holes.
    pub rows: Vec<Option<Vec<String>>>,
    pub bytes: Vec<u8>,
    /// `(key, byte offset of its record)` for filled slots, in key order.
    pub index: Vec<(usize, usize)>,
}

impl RecordSection {
    pub fn from_slots<R: PackedRecord>(ident: &'static str, slots: &SlotArray<R>) -> Self {
        let rows = (0..slots.capacity()).map(|k| slots.get(k).map(R::c_fields)).collect();
        let index = slots.filled().map(|(k, _)| (k, k * R::SIZE)).collect();
        Self { ident, c_type: R::C_TYPE, record_size: R::SIZE, rows, bytes: slots.to_bytes(), index }
    }

    pub fn capacity(&self) -> usize { self.rows.len() }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub domain: &'static str,
    pub file_prefix: String,
    pub ident_prefix: String,
    pub header_include: String,
    pub heaps: Vec<HeapSection>,
    pub records: RecordSection,
}

impl Artifact {
    /// Everything the emitter narrows must fit: counts in `u16`, table
    /// offsets in their declared width, index keys in `u16`, record offsets
    /// in `u32`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for h in &self.heaps {
            if h.entries.len() > u16::MAX as usize {
                return Err(ValidationError::CountOverflow { what: h.stem, count: h.entries.len() });
            }
            let (limit, bits) = match h.offset_width {
                OffsetWidth::U16 => (u16::MAX as usize, 16),
                OffsetWidth::U32 => (u32::MAX as usize, 32),
            };
            if let Some(&offset) = h.entries.iter().find(|&&o| o > limit || o >= h.bytes.len().max(1)) {
                return Err(ValidationError::OffsetOverflow { heap: h.stem, offset, bits });
            }
        }
        let idx = &self.records.index;
        if idx.len() > u16::MAX as usize {
            return Err(ValidationError::CountOverflow { what: "index", count: idx.len() });
        }
        if let Some(&(key, offset)) = idx.iter().find(|(k, o)| *k > u16::MAX as usize || *o > u32::MAX as usize) {
            return Err(ValidationError::OffsetOverflow { heap: "index", offset: offset.max(key), bits: 32 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::tests::Pair;

    fn artifact_with(heap: HeapSection) -> Artifact {
        let slots: SlotArray<Pair> = SlotArray::new(2, 16).unwrap();
        Artifact {
            domain: "test",
            file_prefix: "t".into(),
            ident_prefix: "T".into(),
            header_include: "t.h".into(),
            heaps: vec![heap],
            records: RecordSection::from_slots("ROWS", &slots),
        }
    }

    #[test]
    fn in_bounds_tables_pass() {
        let mut h = Heap::new("n");
        h.intern_str("a");
        h.intern_str("b");
        artifact_with(HeapSection::strings(&h, "names", "NAME")).validate().unwrap();
    }

    #[test]
    fn offsets_past_heap_end_fail() {
        let mut h = Heap::new("n");
        h.intern_str("a");
        let s = HeapSection::strings(&h, "names", "NAME").with_entries(vec![0, 2]);
        assert!(matches!(artifact_with(s).validate(), Err(ValidationError::OffsetOverflow { offset: 2, .. })));
    }

    #[test]
    fn record_section_indexes_filled_slots() {
        let mut slots: SlotArray<Pair> = SlotArray::new(4, 16).unwrap();
        let k = slots.claim(3).unwrap();
        slots.put(k, Pair { key: 3, v: 1 });
        let r = RecordSection::from_slots("ROWS", &slots);
        assert_eq!(r.index, vec![(3, 9)]);
        assert_eq!(r.rows.iter().filter(|r| r.is_some()).count(), 1);
        assert_eq!(r.bytes.len(), 12);
    }
}
