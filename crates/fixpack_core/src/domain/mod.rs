//! The two record schemas agreed with the runtime consumer.

pub mod creature;
pub mod element;

pub use creature::{CreatureDomain, CreatureRecord, SpriteSet};
pub use element::{ElementDomain, ElementRecord};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    Elements,
    Creatures,
}

impl DomainKind {
    /// Names under which a dataset may wrap its entity list.
    pub fn list_fields(self) -> &'static [&'static str] {
        match self {
            DomainKind::Elements => &["elements"],
            DomainKind::Creatures => &["creatures", "pokemon"],
        }
    }

    pub fn default_format(self) -> crate::emit::Format {
        match self {
            DomainKind::Elements => crate::emit::Format::Header,
            DomainKind::Creatures => crate::emit::Format::Binary,
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DomainKind::Elements => "elements",
            DomainKind::Creatures => "creatures",
        })
    }
}

impl FromStr for DomainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elements" | "element" | "periodic" => Ok(DomainKind::Elements),
            "creatures" | "creature" | "pokemon" => Ok(DomainKind::Creatures),
            other => Err(format!("unknown domain `{other}` (expected elements or creatures)")),
        }
    }
}
