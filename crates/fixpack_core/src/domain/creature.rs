//! Creature table: 32-byte records plus names, genus, flavor and sprite tables.
//!
//! The names and sprite tables are slot-aligned (entry `k` belongs to key
//! `k`, empty slots point at the empty entry at offset 0). Genus and flavor
//! are deduplicated and referenced from the record by entry index.

use crate::artifact::{Artifact, HeapSection, RecordSection};
use crate::bitmap::{render_sprite, SpriteSource};
use crate::config::CreatureConfig;
use crate::consts::*;
use crate::enums::{EnumRule, EnumTable};
use crate::errors::ValidationError;
use crate::heap::Heap;
use crate::numeric::encode_checked;
use crate::packer::{enum_code, number, text, Domain, Packed};
use crate::record::PackedRecord;
use crate::report::Degradations;
use crate::utils::{u16_at, u32_at, write_u16, write_u32};
use crate::value::{Descriptor, FieldValue};
use std::path::PathBuf;

pub const TYPE_NONE: u8 = 0;

pub const TYPE_NAMES: [&str; 18] = [
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground", "flying", "psychic", "bug",
    "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

/// `normal` = 1 … `fairy` = 18, anything else 0.
pub fn default_type_table() -> EnumTable {
    let rules = TYPE_NAMES.iter().zip(1u8..).map(|(name, code)| EnumRule::equals(name, code)).collect();
    EnumTable::new(rules, TYPE_NONE)
}

pub fn type_name(code: u8) -> Option<&'static str> {
    TYPE_NAMES.get((code as usize).checked_sub(1)?).copied()
}

pub const STAT_FIELDS: [&[&str]; 6] = [
    &["hp"],
    &["attack"],
    &["defense"],
    &["special_attack", "sp_attack", "special-attack"],
    &["special_defense", "sp_defense", "special-defense"],
    &["speed"],
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatureEntity {
    pub name: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub stats: [Option<f64>; 6],
    pub types: Vec<String>,
    pub genus: String,
    pub flavor: String,
    pub front_image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatureRecord {
    pub id: u16,
    pub height: u16,
    pub weight: u16,
    /// hp, attack, defense, sp. attack, sp. defense, speed
    pub stats: [u8; 6],
    pub type1: u8,
    pub type2: u8,
    pub genus_ref: u16,
    pub flavor_ref: u16,
    pub sprite_offset: u32,
}

impl PackedRecord for CreatureRecord {
    const SIZE: usize = CREATURE_RECORD_SIZE;
    const C_TYPE: &'static str = "PackedCreature";

    fn empty() -> Self { Self::default() }

    fn key(&self) -> u16 { self.id }

    fn write_le(&self, out: &mut Vec<u8>) {
        let _ = write_u16(out, self.id);
        let _ = write_u16(out, self.height);
        let _ = write_u16(out, self.weight);
        out.extend_from_slice(&self.stats);
        out.push(self.type1);
        out.push(self.type2);
        let _ = write_u16(out, self.genus_ref);
        let _ = write_u16(out, self.flavor_ref);
        let _ = write_u32(out, self.sprite_offset);
        out.extend_from_slice(&[0u8; CREATURE_RESERVED_BYTES]);
    }

    fn read_le(buf: &[u8]) -> Option<Self> {
        let b = buf.get(..Self::SIZE)?;
        let mut stats = [0u8; 6];
        stats.copy_from_slice(&b[6..12]);
        Some(Self {
            id: u16_at(b, 0)?,
            height: u16_at(b, 2)?,
            weight: u16_at(b, 4)?,
            stats,
            type1: b[12],
            type2: b[13],
            genus_ref: u16_at(b, 14)?,
            flavor_ref: u16_at(b, 16)?,
            sprite_offset: u32_at(b, 18)?,
        })
    }

    fn c_fields(&self) -> Vec<String> {
        let mut f = vec![self.id.to_string(), self.height.to_string(), self.weight.to_string()];
        f.extend(self.stats.iter().map(u8::to_string));
        f.extend([
            self.type1.to_string(),
            self.type2.to_string(),
            self.genus_ref.to_string(),
            self.flavor_ref.to_string(),
            self.sprite_offset.to_string(),
        ]);
        f
    }
}

/// Where sprite pixels come from.
#[derive(Debug, Clone)]
pub enum SpriteSet {
    /// `<dir>/<front_image>`, default file name `<id:03>_front.png`.
    Dir(PathBuf),
    /// Generated in memory from the key.
    Synthetic,
}

impl SpriteSet {
    pub fn source(&self, key: u16, front_image: Option<&str>) -> SpriteSource {
        match self {
            SpriteSet::Dir(dir) => {
                let file = front_image.map(str::to_owned).unwrap_or_else(|| format!("{key:03}_front.png"));
                SpriteSource::File(dir.join(file))
            }
            SpriteSet::Synthetic => SpriteSource::Image(crate::sample::synthetic_sprite(key)),
        }
    }
}

pub struct CreatureHeaps {
    /// Name per slot.
    pub names: Vec<Option<String>>,
    pub genus: Heap,
    pub flavor: Heap,
    /// Seeded with a zero-length blob at offset 0 for empty slots.
    pub sprites: Heap,
    /// Sprite blob offset per slot.
    pub sprite_offsets: Vec<usize>,
}

fn type_names(value: &FieldValue) -> Vec<String> {
    let one = |v: &FieldValue| -> Option<String> {
        match v {
            FieldValue::Object(o) => text(o.get("name")).or_else(|| text(o.get("type").as_object()?.get("name"))),
            v => text(v),
        }
    };
    match value {
        FieldValue::List(items) => items.iter().filter_map(one).collect(),
        FieldValue::Text(s) => s.split(['/', ',']).map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned).collect(),
        _ => Vec::new(),
    }
}

pub struct CreatureDomain {
    pub config: CreatureConfig,
    pub sprites: SpriteSet,
}

impl CreatureDomain {
    pub fn new(config: CreatureConfig, sprites: SpriteSet) -> Self {
        Self { config, sprites }
    }
}

impl Domain for CreatureDomain {
    type Entity = CreatureEntity;
    type Record = CreatureRecord;
    type Heaps = CreatureHeaps;

    const NAME: &'static str = "creatures";
    const KEY_FIELDS: &'static [&'static str] = &["id"];
    const KEY_LIMIT: usize = CREATURE_KEY_LIMIT;

    fn capacity(&self) -> usize { self.config.capacity }

    fn new_heaps(&self) -> CreatureHeaps {
        let cap = self.config.capacity;
        let mut sprites = Heap::new("sprites");
        // a zero-length blob always fits
        let _ = sprites.intern_blob(&[]);
        CreatureHeaps {
            names: vec![None; cap],
            genus: Heap::with_dedup("genus", 64),
            flavor: Heap::with_dedup("flavor", cap),
            sprites,
            sprite_offsets: vec![0; cap],
        }
    }

    fn decode(&self, d: &Descriptor, tally: &mut Degradations) -> CreatureEntity {
        let stats_obj = d.get("stats").as_object();
        let stat = |names: &[&str], tally: &mut Degradations| {
            let v = stats_obj.map(|s| s.first_of(names)).filter(|v| !v.is_absent()).unwrap_or_else(|| d.first_of(names));
            number(v, names[0], tally)
        };
        let mut stats = [None; 6];
        for (slot, names) in stats.iter_mut().zip(STAT_FIELDS) {
            *slot = stat(names, tally);
        }
        CreatureEntity {
            name: text(d.get("name")).unwrap_or_default(),
            height: number(d.get("height"), "height", tally),
            weight: number(d.get("weight"), "weight", tally),
            stats,
            types: type_names(d.get("types")),
            genus: text(d.get("genus")).unwrap_or_else(|| self.config.default_genus.clone()),
            flavor: text(d.first_of(&["flavor_text", "flavor"]))
                .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_else(|| self.config.default_flavor.clone()),
            front_image: text(d.get("front_image")),
        }
    }

    fn pack(&self, key: u16, e: &CreatureEntity, heaps: &mut CreatureHeaps, tally: &mut Degradations) -> Result<CreatureRecord, ValidationError> {
        let c = &self.config;
        let slot = key as usize;
        heaps.names[slot] = Some(e.name.clone());

        let genus = heaps.genus.intern_str(&e.genus);
        let flavor = heaps.flavor.intern_str(&e.flavor);

        let source = self.sprites.source(key, e.front_image.as_deref());
        let sprite = render_sprite(&source, c.sprite_width, c.sprite_height);
        if sprite.failed {
            tally.failed_sprites += 1;
        }
        let blob = heaps.sprites.intern_blob(&sprite.bytes)?;
        heaps.sprite_offsets[slot] = blob.offset;

        let mut stats = [0u8; 6];
        for (out, v) in stats.iter_mut().zip(e.stats) {
            *out = tally.scalar(encode_checked(v, 1.0, 0));
        }

        Ok(CreatureRecord {
            id: key,
            height: tally.scalar(encode_checked(e.height, 1.0, 0)),
            weight: tally.scalar(encode_checked(e.weight, 1.0, 0)),
            stats,
            type1: enum_code(&c.types, e.types.first().map(String::as_str), "type1", tally),
            type2: enum_code(&c.types, e.types.get(1).map(String::as_str), "type2", tally),
            genus_ref: heaps.genus.index_u16(genus.index)?,
            flavor_ref: heaps.flavor.index_u16(flavor.index)?,
            sprite_offset: heaps.sprites.ref_u32(blob.offset)?,
        })
    }

    fn artifact(&self, packed: &Packed<Self>) -> Result<Artifact, ValidationError> {
        let h = &packed.heaps;

        let mut names = Heap::new("names");
        names.intern_str("");
        let name_entries =
            h.names.iter().map(|n| n.as_deref().map(|s| names.intern_str(s).offset).unwrap_or(0)).collect();

        Ok(Artifact {
            domain: Self::NAME,
            file_prefix: self.config.file_prefix.clone(),
            ident_prefix: self.config.ident_prefix.clone(),
            header_include: self.config.header_include.clone(),
            heaps: vec![
                HeapSection::strings(&names, "names", "NAME").with_entries(name_entries).with_header_offsets(),
                HeapSection::strings(&h.genus, "genus", "GENUS").with_header_offsets(),
                HeapSection::strings(&h.flavor, "flavor", "FLAVOR").with_header_offsets(),
                HeapSection::blobs(&h.sprites, "sprites", "SPRITE", h.sprite_offsets.clone()),
            ],
            records: RecordSection::from_slots("CREATURES", &packed.slots),
        })
    }
}
