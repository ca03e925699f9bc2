//! Dense, fixed-capacity record array addressed directly by primary key.

use crate::errors::ValidationError;
use crate::record::PackedRecord;

#[derive(Debug, Clone)]
pub struct SlotArray<R> {
    slots: Box<[Option<R>]>,
}

impl<R: PackedRecord> SlotArray<R> {
    /// `limit` is the largest capacity the domain's key width can address.
    pub fn new(capacity: usize, limit: usize) -> Result<Self, ValidationError> {
        if capacity < 2 || capacity > limit {
            return Err(ValidationError::BadCapacity { capacity, limit });
        }
        Ok(Self { slots: vec![None; capacity].into_boxed_slice() })
    }

    pub fn capacity(&self) -> usize { self.slots.len() }

    /// Check that `key` may be filled: inside `1..capacity` and not yet taken.
    pub fn claim(&self, key: i64) -> Result<usize, ValidationError> {
        let capacity = self.capacity();
        let k = usize::try_from(key)
            .ok()
            .filter(|&k| k >= 1 && k < capacity)
            .ok_or(ValidationError::KeyOutOfRange { key, capacity })?;
        if self.slots[k].is_some() {
            return Err(ValidationError::DuplicateKey { key });
        }
        Ok(k)
    }

    /// Store into a slot returned by [`claim`](Self::claim).
    pub fn put(&mut self, slot: usize, rec: R) {
        debug_assert!(self.slots[slot].is_none());
        self.slots[slot] = Some(rec);
    }

    pub fn get(&self, key: usize) -> Option<&R> {
        self.slots.get(key).and_then(Option::as_ref)
    }

    /// Filled slots in key order.
    pub fn filled(&self) -> impl Iterator<Item = (usize, &R)> + '_ {
        self.slots.iter().enumerate().filter_map(|(k, r)| r.as_ref().map(|r| (k, r)))
    }

    pub fn filled_count(&self) -> usize { self.slots.iter().filter(|s| s.is_some()).count() }

    /// Record for every slot, the empty record standing in for holes.
    pub fn records(&self) -> impl Iterator<Item = R> + '_ {
        self.slots.iter().map(|s| s.clone().unwrap_or_else(R::empty))
    }

    /// `capacity * R::SIZE` bytes, slot 0 first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.capacity() * R::SIZE);
        for rec in self.records() {
            rec.write_le(&mut out);
        }
        debug_assert_eq!(out.len(), self.capacity() * R::SIZE);
        out
    }
}
