//! Loosely-typed input fields.
//!
//! Datasets arrive as JSON with no guarantees about types: numbers show up as
//! strings, strings as null, lists where scalars were expected. Every field is
//! converted once into a [`FieldValue`] and read through the typed accessors
//! below, which never fail; they answer `None` and let the caller fall back.

use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Absent,
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
    Object(Descriptor),
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => FieldValue::Absent,
            Value::Bool(b) => FieldValue::Number(if b { 1.0 } else { 0.0 }),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Absent),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(a) => FieldValue::List(a.into_iter().map(FieldValue::from).collect()),
            Value::Object(o) => FieldValue::Object(Descriptor::from_map(o)),
        }
    }
}

impl FieldValue {
    /// Numbers, or text that parses as one. Unicode minus signs are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Integral numbers only (`3`, `"3"`, `3.0`); `3.5` is not a key.
    pub fn as_integer(&self) -> Option<i64> {
        let f = self.as_f64()?;
        (f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Descriptor> {
        match self {
            FieldValue::Object(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool { matches!(self, FieldValue::Absent) }
}

pub fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    let normalized: String = t.chars().map(|c| match c { '\u{2212}' | '\u{2013}' | '\u{2014}' => '-', c => c }).collect();
    normalized.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// One input entity: field name → value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Descriptor {
    fields: BTreeMap<String, FieldValue>,
}

static ABSENT: FieldValue = FieldValue::Absent;

impl Descriptor {
    pub fn from_map(map: serde_json::Map<String, Value>) -> Self {
        Self { fields: map.into_iter().map(|(k, v)| (k, FieldValue::from(v))).collect() }
    }

    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&ABSENT)
    }

    /// First present field among `names`.
    pub fn first_of(&self, names: &[&str]) -> &FieldValue {
        names.iter().map(|n| self.get(n)).find(|v| !v.is_absent()).unwrap_or(&ABSENT)
    }

    pub fn number(&self, name: &str) -> Option<f64> { self.get(name).as_f64() }
    pub fn text(&self, name: &str) -> Option<&str> { self.get(name).as_text() }

    pub fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn desc(v: Value) -> Descriptor {
        match v {
            Value::Object(o) => Descriptor::from_map(o),
            _ => unreachable!(),
        }
    }

    #[test]
    fn numbers_come_from_text_too() {
        let d = desc(json!({"a": 1.5, "b": "2.25", "c": "−3", "d": "n/a", "e": null, "f": true}));
        assert_eq!(d.number("a"), Some(1.5));
        assert_eq!(d.number("b"), Some(2.25));
        assert_eq!(d.number("c"), Some(-3.0));
        assert_eq!(d.number("d"), None);
        assert_eq!(d.number("e"), None);
        assert_eq!(d.number("f"), Some(1.0));
        assert_eq!(d.number("missing"), None);
    }

    #[test]
    fn integers_reject_fractions() {
        assert_eq!(FieldValue::Number(3.0).as_integer(), Some(3));
        assert_eq!(FieldValue::Text("42".into()).as_integer(), Some(42));
        assert_eq!(FieldValue::Number(3.5).as_integer(), None);
        assert_eq!(FieldValue::Absent.as_integer(), None);
    }

    #[test]
    fn nested_values_survive() {
        let d = desc(json!({"shells": [2, 8, 1], "stats": {"hp": 45}}));
        let shells = d.get("shells").as_list().unwrap();
        assert_eq!(shells.len(), 3);
        assert_eq!(shells[2].as_f64(), Some(1.0));
        assert_eq!(d.get("stats").as_object().unwrap().number("hp"), Some(45.0));
    }

    #[test]
    fn first_of_skips_absent() {
        let d = desc(json!({"mp_k": null, "melt": 14.01}));
        assert_eq!(d.first_of(&["mp_k", "melt"]).as_f64(), Some(14.01));
        assert!(d.first_of(&["x", "y"]).is_absent());
    }
}
