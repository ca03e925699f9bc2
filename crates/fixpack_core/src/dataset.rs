use crate::errors::{PackError, Result};
use crate::value::Descriptor;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read a dataset document: either a top-level array of objects or an object
/// holding that array under one of `list_fields`.
pub fn load(path: &Path, list_fields: &[&str]) -> Result<Vec<Descriptor>> {
    let s = fs::read_to_string(path).map_err(|e| PackError::io_at(path, e))?;
    let descriptors = parse(&s, list_fields)?;
    tracing::debug!(path = %path.display(), entities = descriptors.len(), "dataset loaded");
    Ok(descriptors)
}

pub fn parse(s: &str, list_fields: &[&str]) -> Result<Vec<Descriptor>> {
    from_value(serde_json::from_str(s)?, list_fields)
}

pub fn from_value(root: Value, list_fields: &[&str]) -> Result<Vec<Descriptor>> {
    let list = match root {
        Value::Array(a) => a,
        Value::Object(mut o) => {
            let Some(field) = list_fields.iter().find(|f| o.contains_key(**f)) else {
                return Err(PackError::Shape(format!("expected an array or an object with one of {list_fields:?}")));
            };
            match o.remove(*field) {
                Some(Value::Array(a)) => a,
                _ => return Err(PackError::Shape(format!("`{field}` is not an array"))),
            }
        }
        _ => return Err(PackError::Shape("dataset root must be an array or object".into())),
    };
    list.into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Object(o) => Ok(Descriptor::from_map(o)),
            other => Err(PackError::Shape(format!("entity #{i} is not an object: {other}"))),
        })
        .collect()
}
