//! Build configuration.
//!
//! Loaded from an optional JSON file; every field has a default, so a file
//! only needs the keys it changes:
//!
//! ```json
//! { "creatures": { "sprite_width": 48, "file_prefix": "pokemon" } }
//! ```

use crate::consts::*;
use crate::domain::creature::default_type_table;
use crate::domain::element::{default_block_table, default_category_table, default_phase_table};
use crate::enums::EnumTable;
use crate::errors::{PackError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    pub elements: ElementConfig,
    pub creatures: CreatureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    pub capacity: usize,
    pub file_prefix: String,
    pub ident_prefix: String,
    pub header_include: String,
    /// Share one copy of repeated discoverer names.
    pub dedup_discoverers: bool,
    pub category: EnumTable,
    pub block: EnumTable,
    pub phase: EnumTable,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ELEMENT_CAPACITY,
            file_prefix: "periodic".into(),
            ident_prefix: "PT".into(),
            header_include: "periodic_data.h".into(),
            dedup_discoverers: true,
            category: default_category_table(),
            block: default_block_table(),
            phase: default_phase_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    pub capacity: usize,
    pub file_prefix: String,
    pub ident_prefix: String,
    pub header_include: String,
    pub sprite_width: u32,
    pub sprite_height: u32,
    /// Sprite directory; defaults to `images/` next to the dataset.
    pub images_dir: Option<PathBuf>,
    pub types: EnumTable,
    pub default_genus: String,
    pub default_flavor: String,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CREATURE_CAPACITY,
            file_prefix: "creature".into(),
            ident_prefix: "CR".into(),
            header_include: "creature_data.h".into(),
            sprite_width: DEFAULT_SPRITE_WIDTH,
            sprite_height: DEFAULT_SPRITE_HEIGHT,
            images_dir: None,
            types: default_type_table(),
            default_genus: "Unknown".into(),
            default_flavor: "No description available.".into(),
        }
    }
}

impl PackConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).map_err(|e| PackError::io_at(path, e))?;
        let cfg: PackConfig = serde_json::from_str(&s)?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn check(&self) -> Result<()> {
        let c = &self.creatures;
        if c.sprite_width == 0 || c.sprite_height == 0 {
            return Err(PackError::Config(format!("sprite size {}x{} must be non-zero", c.sprite_width, c.sprite_height)));
        }
        if crate::bitmap::bitmap_len(c.sprite_width, c.sprite_height) > u16::MAX as usize {
            return Err(PackError::Config(format!(
                "sprite size {}x{} does not fit a u16 length prefix",
                c.sprite_width, c.sprite_height
            )));
        }
        for (what, prefix) in [("elements", &self.elements.ident_prefix), ("creatures", &c.ident_prefix)] {
            let ok = prefix.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_')
                && prefix.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            if !ok {
                return Err(PackError::Config(format!("{what}.ident_prefix `{prefix}` is not a C identifier")));
            }
        }
        Ok(())
    }
}
