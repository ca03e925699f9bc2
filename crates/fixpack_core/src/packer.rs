//! The single forward pass: descriptors in, filled slot array and heaps out.

use crate::artifact::Artifact;
use crate::enums::{EnumTable, Mapped};
use crate::errors::ValidationError;
use crate::record::PackedRecord;
use crate::report::Degradations;
use crate::slots::SlotArray;
use crate::value::{Descriptor, FieldValue};

/// One fixed record schema and the conversions feeding it.
pub trait Domain: Sized {
    /// Strictly-typed intermediate decoded from a descriptor.
    type Entity;
    type Record: PackedRecord;
    /// Domain-specific heaps, filled while packing.
    type Heaps;

    const NAME: &'static str;
    /// Field names accepted for the primary key, first present wins.
    const KEY_FIELDS: &'static [&'static str];
    const KEY_LIMIT: usize;

    fn capacity(&self) -> usize;

    fn new_heaps(&self) -> Self::Heaps;

    fn decode(&self, desc: &Descriptor, tally: &mut Degradations) -> Self::Entity;

    fn pack(
        &self,
        key: u16,
        entity: &Self::Entity,
        heaps: &mut Self::Heaps,
        tally: &mut Degradations,
    ) -> Result<Self::Record, ValidationError>;

    fn artifact(&self, packed: &Packed<Self>) -> Result<Artifact, ValidationError>;
}

pub struct Packed<D: Domain> {
    pub slots: SlotArray<D::Record>,
    pub heaps: D::Heaps,
    pub degradations: Degradations,
    pub entities: usize,
}

/// Entities are processed in input order. The first fatal problem aborts the
/// whole pass.
pub fn pack_all<D: Domain>(domain: &D, descriptors: &[Descriptor]) -> Result<Packed<D>, ValidationError> {
    let mut slots = SlotArray::new(domain.capacity(), D::KEY_LIMIT)?;
    let mut heaps = domain.new_heaps();
    let mut tally = Degradations::default();

    for (index, desc) in descriptors.iter().enumerate() {
        let raw = desc
            .first_of(D::KEY_FIELDS)
            .as_integer()
            .ok_or(ValidationError::MissingKey { index, field: D::KEY_FIELDS[0] })?;
        let slot = slots.claim(raw)?;
        let entity = domain.decode(desc, &mut tally);
        // slot < capacity <= KEY_LIMIT <= 65535
        let record = domain.pack(slot as u16, &entity, &mut heaps, &mut tally)?;
        debug_assert_eq!(record.key() as usize, slot);
        slots.put(slot, record);
        tracing::debug!(domain = D::NAME, key = slot, "packed");
    }

    Ok(Packed { slots, heaps, degradations: tally, entities: descriptors.len() })
}

/// Read a numeric field, counting present-but-unparseable values.
/// Blank text counts as absent.
pub fn number(value: &FieldValue, field: &str, tally: &mut Degradations) -> Option<f64> {
    match value {
        FieldValue::Absent => None,
        FieldValue::Text(s) if s.trim().is_empty() => None,
        v => {
            let n = v.as_f64();
            if n.is_none() {
                tally.unparseable_numbers += 1;
                tracing::warn!(field, value = ?v, "unparseable number");
            }
            n
        }
    }
}

/// Map categorical text, counting text that matched no rule.
pub fn enum_code(table: &EnumTable, text: Option<&str>, field: &str, tally: &mut Degradations) -> u8 {
    let mapped = table.lookup(text);
    if let Mapped::Unrecognized(code) = mapped {
        tally.unknown_enums += 1;
        tracing::warn!(field, text = text.unwrap_or_default(), code, "unrecognized enum text");
    }
    mapped.code()
}

/// Non-blank text, trimmed.
pub fn text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        FieldValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
