//! Free-text categorical fields → small integer codes.
//!
//! A table is an ordered list of rules; the first rule whose predicate matches
//! the trimmed, lower-cased text wins. Nothing matching maps to the table's
//! `unknown` code.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Contains,
    Equals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRule {
    #[serde(rename = "match", default = "default_match")]
    pub kind: MatchKind,
    /// Lower-case; both constructors and deserialization normalize it.
    #[serde(deserialize_with = "lowercase")]
    pub pattern: String,
    pub code: u8,
}

fn default_match() -> MatchKind { MatchKind::Contains }

fn lowercase<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    String::deserialize(d).map(|s| s.to_lowercase())
}

impl EnumRule {
    pub fn contains(pattern: &str, code: u8) -> Self {
        Self { kind: MatchKind::Contains, pattern: pattern.to_lowercase(), code }
    }
    pub fn equals(pattern: &str, code: u8) -> Self {
        Self { kind: MatchKind::Equals, pattern: pattern.to_lowercase(), code }
    }

    fn matches(&self, needle: &str) -> bool {
        match self.kind {
            MatchKind::Contains => needle.contains(self.pattern.as_str()),
            MatchKind::Equals => needle == self.pattern,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTable {
    pub rules: Vec<EnumRule>,
    pub unknown: u8,
}

/// Result of mapping one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapped {
    Hit(u8),
    /// Text was present but nothing matched.
    Unrecognized(u8),
    /// No text at all.
    Absent(u8),
}

impl Mapped {
    pub fn code(self) -> u8 {
        match self {
            Mapped::Hit(c) | Mapped::Unrecognized(c) | Mapped::Absent(c) => c,
        }
    }
}

impl EnumTable {
    pub fn new(rules: Vec<EnumRule>, unknown: u8) -> Self {
        Self { rules, unknown }
    }

    pub fn lookup(&self, text: Option<&str>) -> Mapped {
        let needle = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return Mapped::Absent(self.unknown),
        };
        self.rules
            .iter()
            .find(|r| r.matches(&needle))
            .map(|r| Mapped::Hit(r.code))
            .unwrap_or(Mapped::Unrecognized(self.unknown))
    }

    #[inline]
    pub fn map(&self, text: Option<&str>) -> u8 {
        self.lookup(text).code()
    }
}
