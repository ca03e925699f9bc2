//! Periodic table: one 33-byte `PackedElement` per atomic number.
//!
//! Record layout (LE, no padding):
//! ```text
//!   0 key u8            1 mass u32 (u x1000)     5 melt i16 (K x100, -1)
//!   7 boil i16 (K x100) 9 density u16 (x1000)   11 ionization u16 (eV x1000)
//!  13 EN u16 (x100)    15 group u8  16 period u8  17 valence u8
//!  18 ox_min u8        19 ox_max u8 (value+64, 127 unknown)
//!  20 flags u8 (bits 0-1 phase)  21 category u8  22 block u8
//!  23 symbol_off u16   25 name_off u16  27 discoverer_off u16  29 year i32
//! ```

use crate::artifact::{Artifact, HeapSection, RecordSection};
use crate::config::ElementConfig;
use crate::consts::*;
use crate::enums::{EnumRule, EnumTable};
use crate::errors::ValidationError;
use crate::heap::Heap;
use crate::numeric::encode_checked;
use crate::packer::{enum_code, number, text, Domain, Packed};
use crate::record::PackedRecord;
use crate::report::Degradations;
use crate::utils::{u16_at, u32_at, write_i16, write_i32, write_u16, write_u32};
use crate::value::{parse_number, Descriptor, FieldValue};

pub const CATEGORY_UNKNOWN: u8 = 9;
pub const BLOCK_UNKNOWN: u8 = 4;
pub const PHASE_UNKNOWN: u8 = 0;
pub const PHASE_MASK: u8 = 0b11;

/// Post-transition is listed before transition so the longer name wins.
pub fn default_category_table() -> EnumTable {
    EnumTable::new(
        vec![
            EnumRule::contains("alkali metal", 0),
            EnumRule::contains("alkaline earth", 1),
            EnumRule::contains("post-transition", 3),
            EnumRule::contains("transition metal", 2),
            EnumRule::contains("metalloid", 4),
            EnumRule::contains("noble gas", 6),
            EnumRule::contains("lanthan", 7),
            EnumRule::contains("actin", 8),
            EnumRule::contains("nonmetal", 5),
        ],
        CATEGORY_UNKNOWN,
    )
}

pub fn default_block_table() -> EnumTable {
    EnumTable::new(
        vec![EnumRule::equals("s", 0), EnumRule::equals("p", 1), EnumRule::equals("d", 2), EnumRule::equals("f", 3)],
        BLOCK_UNKNOWN,
    )
}

pub fn default_phase_table() -> EnumTable {
    EnumTable::new(
        vec![EnumRule::equals("solid", 1), EnumRule::equals("liquid", 2), EnumRule::equals("gas", 3)],
        PHASE_UNKNOWN,
    )
}

/// Decoded element, before any encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementEntity {
    pub symbol: String,
    pub name: String,
    pub mass: Option<f64>,
    pub melt_k: Option<f64>,
    pub boil_k: Option<f64>,
    pub density: Option<f64>,
    pub ionization_ev: Option<f64>,
    pub electronegativity: Option<f64>,
    pub group: Option<f64>,
    pub period: Option<f64>,
    pub valence: Option<f64>,
    pub oxidation: Option<(i64, i64)>,
    pub phase: Option<String>,
    pub category: Option<String>,
    pub block: Option<String>,
    pub discoverer: Option<String>,
    pub year: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementRecord {
    pub key: u8,
    pub mass: u32,
    pub melt: i16,
    pub boil: i16,
    pub density: u16,
    pub ionization: u16,
    pub electronegativity: u16,
    pub group: u8,
    pub period: u8,
    pub valence: u8,
    pub oxidation_min: u8,
    pub oxidation_max: u8,
    pub flags: u8,
    pub category: u8,
    pub block: u8,
    pub symbol_offset: u16,
    pub name_offset: u16,
    pub discoverer_offset: u16,
    pub year: i32,
}

impl ElementRecord {
    pub fn phase(&self) -> u8 { self.flags & PHASE_MASK }
}

impl PackedRecord for ElementRecord {
    const SIZE: usize = ELEMENT_RECORD_SIZE;
    const C_TYPE: &'static str = "PackedElement";

    fn empty() -> Self { Self::default() }

    fn key(&self) -> u16 { self.key as u16 }

    fn write_le(&self, out: &mut Vec<u8>) {
        out.push(self.key);
        let _ = write_u32(out, self.mass);
        let _ = write_i16(out, self.melt);
        let _ = write_i16(out, self.boil);
        let _ = write_u16(out, self.density);
        let _ = write_u16(out, self.ionization);
        let _ = write_u16(out, self.electronegativity);
        out.extend_from_slice(&[
            self.group,
            self.period,
            self.valence,
            self.oxidation_min,
            self.oxidation_max,
            self.flags,
            self.category,
            self.block,
        ]);
        let _ = write_u16(out, self.symbol_offset);
        let _ = write_u16(out, self.name_offset);
        let _ = write_u16(out, self.discoverer_offset);
        let _ = write_i32(out, self.year);
    }

    fn read_le(buf: &[u8]) -> Option<Self> {
        let b = buf.get(..Self::SIZE)?;
        let i16_at = |p: usize| u16_at(b, p).map(|v| v as i16);
        Some(Self {
            key: b[0],
            mass: u32_at(b, 1)?,
            melt: i16_at(5)?,
            boil: i16_at(7)?,
            density: u16_at(b, 9)?,
            ionization: u16_at(b, 11)?,
            electronegativity: u16_at(b, 13)?,
            group: b[15],
            period: b[16],
            valence: b[17],
            oxidation_min: b[18],
            oxidation_max: b[19],
            flags: b[20],
            category: b[21],
            block: b[22],
            symbol_offset: u16_at(b, 23)?,
            name_offset: u16_at(b, 25)?,
            discoverer_offset: u16_at(b, 27)?,
            year: u32_at(b, 29)? as i32,
        })
    }

    fn c_fields(&self) -> Vec<String> {
        vec![
            self.key.to_string(),
            self.mass.to_string(),
            self.melt.to_string(),
            self.boil.to_string(),
            self.density.to_string(),
            self.ionization.to_string(),
            self.electronegativity.to_string(),
            self.group.to_string(),
            self.period.to_string(),
            self.valence.to_string(),
            self.oxidation_min.to_string(),
            self.oxidation_max.to_string(),
            self.flags.to_string(),
            self.category.to_string(),
            self.block.to_string(),
            self.symbol_offset.to_string(),
            self.name_offset.to_string(),
            self.discoverer_offset.to_string(),
            self.year.to_string(),
        ]
    }
}

pub struct ElementHeaps {
    pub symbols: Heap,
    pub names: Heap,
    /// Seeded with `""` at offset 0 for elements with no discoverer.
    pub discoverers: Heap,
}

/// Parse `"−3, −1, +1, +3"`-style text, a list of integers, or a single
/// number into `(min, max)`. Tokens that are not integers are skipped.
pub fn oxidation_range(value: &FieldValue) -> Option<(i64, i64)> {
    let states: Vec<i64> = match value {
        FieldValue::Text(s) => {
            let s: String = s
                .chars()
                .flat_map(|c| match c {
                    '\u{2212}' | '\u{2013}' | '\u{2014}' => vec!['-'],
                    '+' => vec![' ', '+'],
                    ',' | ';' => vec![' '],
                    c => vec![c],
                })
                .collect();
            s.split_whitespace().filter_map(|t| t.parse::<i64>().ok()).collect()
        }
        FieldValue::List(items) => items.iter().filter_map(FieldValue::as_integer).collect(),
        v => v.as_integer().into_iter().collect(),
    };
    Some((*states.iter().min()?, *states.iter().max()?))
}

pub fn bias_oxidation(state: i64) -> u8 {
    (state.clamp(-OXIDATION_BIAS, OXIDATION_BIAS - 1) + OXIDATION_BIAS) as u8
}

pub struct ElementDomain {
    pub config: ElementConfig,
}

impl ElementDomain {
    pub fn new(config: ElementConfig) -> Self {
        Self { config }
    }

    /// First ionization energy in eV: either the head of a kJ/mol list or a
    /// direct eV value.
    fn ionization(desc: &Descriptor, tally: &mut Degradations) -> Option<f64> {
        match desc.get("ionization_energies") {
            FieldValue::List(items) => {
                number(items.first()?, "ionization_energies", tally).map(|kj| kj / KJ_PER_MOL_PER_EV)
            }
            FieldValue::Absent => number(desc.get("ionization_ev"), "ionization_ev", tally),
            v => number(v, "ionization_energies", tally).map(|kj| kj / KJ_PER_MOL_PER_EV),
        }
    }
}

impl Domain for ElementDomain {
    type Entity = ElementEntity;
    type Record = ElementRecord;
    type Heaps = ElementHeaps;

    const NAME: &'static str = "elements";
    const KEY_FIELDS: &'static [&'static str] = &["number", "z"];
    const KEY_LIMIT: usize = ELEMENT_KEY_LIMIT;

    fn capacity(&self) -> usize { self.config.capacity }

    fn new_heaps(&self) -> ElementHeaps {
        let cap = self.config.capacity;
        let mut discoverers =
            if self.config.dedup_discoverers { Heap::with_dedup("discoverers", cap) } else { Heap::new("discoverers") };
        discoverers.intern_str("");
        ElementHeaps { symbols: Heap::new("symbols"), names: Heap::new("names"), discoverers }
    }

    fn decode(&self, d: &Descriptor, tally: &mut Degradations) -> ElementEntity {
        let num = |names: &[&str], tally: &mut Degradations| number(d.first_of(names), names[0], tally);
        ElementEntity {
            symbol: text(d.get("symbol")).unwrap_or_default(),
            name: text(d.get("name")).unwrap_or_default(),
            mass: num(&["atomic_mass", "mass"], tally),
            melt_k: num(&["melt", "mp_k"], tally),
            boil_k: num(&["boil", "bp_k"], tally),
            density: num(&["density"], tally),
            ionization_ev: Self::ionization(d, tally),
            electronegativity: num(&["electronegativity_pauling", "en"], tally),
            group: num(&["group"], tally),
            period: num(&["period"], tally),
            valence: d.get("shells").as_list().and_then(|s| s.last()).and_then(FieldValue::as_f64),
            oxidation: oxidation_range(d.get("oxidation_states")),
            phase: text(d.get("phase")),
            category: text(d.get("category")),
            block: text(d.get("block")),
            discoverer: text(d.first_of(&["discovered_by", "discoverer"])),
            year: match d.first_of(&["year_discovered", "discovery_year"]) {
                // "Ancient" and friends carry no year
                FieldValue::Text(s) if parse_number(s).is_none() => None,
                v => number(v, "year_discovered", tally),
            },
        }
    }

    fn pack(&self, key: u16, e: &ElementEntity, heaps: &mut ElementHeaps, tally: &mut Degradations) -> Result<ElementRecord, ValidationError> {
        let c = &self.config;
        let sym = heaps.symbols.intern_str(&e.symbol);
        let name = heaps.names.intern_str(&e.name);
        let disc_offset = match e.discoverer.as_deref() {
            Some(who) => heaps.discoverers.intern_str(who).offset,
            None => 0,
        };
        let (oxidation_min, oxidation_max) = match e.oxidation {
            Some((lo, hi)) => (bias_oxidation(lo), bias_oxidation(hi)),
            None => (OXIDATION_UNKNOWN, OXIDATION_UNKNOWN),
        };
        let phase = enum_code(&c.phase, e.phase.as_deref(), "phase", tally) & PHASE_MASK;

        Ok(ElementRecord {
            key: key as u8,
            mass: tally.scalar(encode_checked(e.mass, 1000.0, 0)),
            melt: tally.scalar(encode_checked(e.melt_k, 100.0, MISSING_TEMPERATURE)),
            boil: tally.scalar(encode_checked(e.boil_k, 100.0, MISSING_TEMPERATURE)),
            density: tally.scalar(encode_checked(e.density, 1000.0, 0)),
            ionization: tally.scalar(encode_checked(e.ionization_ev, 1000.0, 0)),
            electronegativity: tally.scalar(encode_checked(e.electronegativity, 100.0, 0)),
            group: tally.scalar(encode_checked(e.group, 1.0, 0)),
            period: tally.scalar(encode_checked(e.period, 1.0, 0)),
            valence: tally.scalar(encode_checked(e.valence, 1.0, 0)),
            oxidation_min,
            oxidation_max,
            flags: phase,
            category: enum_code(&c.category, e.category.as_deref(), "category", tally),
            block: enum_code(&c.block, e.block.as_deref(), "block", tally),
            symbol_offset: heaps.symbols.ref_u16(sym.offset)?,
            name_offset: heaps.names.ref_u16(name.offset)?,
            discoverer_offset: heaps.discoverers.ref_u16(disc_offset)?,
            year: tally.scalar(encode_checked(e.year, 1.0, 0)),
        })
    }

    fn artifact(&self, packed: &Packed<Self>) -> Result<Artifact, ValidationError> {
        let h = &packed.heaps;
        Ok(Artifact {
            domain: Self::NAME,
            file_prefix: self.config.file_prefix.clone(),
            ident_prefix: self.config.ident_prefix.clone(),
            header_include: self.config.header_include.clone(),
            heaps: vec![
                HeapSection::strings(&h.symbols, "symbols", "SYM"),
                HeapSection::strings(&h.names, "names", "NAME"),
                HeapSection::strings(&h.discoverers, "discoverers", "DISC"),
            ],
            records: RecordSection::from_slots("ELEMENTS", &packed.slots),
        })
    }
}
