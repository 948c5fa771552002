//! Values handling with structural merge support
//!
//! Values are kept as a YAML tree (`serde_yaml::Value`) so that mappings,
//! sequences and scalars survive a load/merge/serialize cycle with their
//! original types, including non-string keys.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::Result;

/// Keys that identify an element of an associative list.
///
/// A sequence whose elements are all mappings carrying one of these keys is
/// merged element-by-key instead of being replaced wholesale.
pub const ASSOCIATIVE_KEYS: &[&str] = &[
    "name",
    "mountPath",
    "containerPort",
    "devicePath",
    "ip",
    "topologyKey",
];

/// Which side of a merge wins when both define the same leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// The incoming values replace existing ones; existing values fill gaps
    Overlay,
    /// Existing values are kept; incoming values only fill gaps
    Base,
}

/// Values container with structural merge capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub Value);

impl Values {
    /// Parse values from YAML bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_yaml::from_slice(bytes)?;
        Ok(Self(value))
    }

    /// Parse values from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_slice(yaml.as_bytes())
    }

    /// Serialize to a YAML document
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }

    /// Deep merge `other` into this tree with the given precedence
    pub fn merge_with(&mut self, other: &Values, precedence: Precedence) {
        if self.0.is_null() {
            self.0 = Value::Mapping(Mapping::new());
        }
        let other = if other.0.is_null() {
            Value::Mapping(Mapping::new())
        } else {
            other.0.clone()
        };
        deep_merge(&mut self.0, &other, precedence);
    }

    /// Merge two trees into a new one, leaving both inputs untouched
    ///
    /// `base` is copied first and `overlay` merged into the copy.
    pub fn merged(base: &Values, overlay: &Values, precedence: Precedence) -> Values {
        let mut out = base.clone();
        out.merge_with(overlay, precedence);
        out
    }

    /// Get a value by dotted path (e.g., "image.tag")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(&self.0, &parts)
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Mapping(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }
}

impl From<Value> for Values {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Structurally merge `src` into `dest`
///
/// Mappings merge key by key and associative lists element by element.
/// Every other conflict is a leaf conflict decided by `precedence`.
fn deep_merge(dest: &mut Value, src: &Value, precedence: Precedence) {
    match (dest, src) {
        (Value::Mapping(dest_map), Value::Mapping(src_map)) => {
            for (key, src_value) in src_map {
                match dest_map.get_mut(key) {
                    Some(dest_value) => deep_merge(dest_value, src_value, precedence),
                    None => {
                        dest_map.insert(key.clone(), src_value.clone());
                    }
                }
            }
        }
        (Value::Sequence(dest_seq), Value::Sequence(src_seq)) => {
            match associative_key(dest_seq, src_seq) {
                Some(key) => merge_associative(dest_seq, src_seq, key, precedence),
                None => {
                    if precedence == Precedence::Overlay {
                        *dest_seq = src_seq.clone();
                    }
                }
            }
        }
        (dest, src) => {
            if precedence == Precedence::Overlay {
                *dest = src.clone();
            }
        }
    }
}

/// Find the key shared by every element of both lists, if any
fn associative_key(dest: &[Value], src: &[Value]) -> Option<&'static str> {
    if dest.is_empty() || src.is_empty() {
        return None;
    }
    ASSOCIATIVE_KEYS.iter().copied().find(|key| {
        dest.iter()
            .chain(src.iter())
            .all(|item| item.as_mapping().is_some_and(|m| m.contains_key(*key)))
    })
}

fn merge_associative(dest: &mut Vec<Value>, src: &[Value], key: &str, precedence: Precedence) {
    for src_item in src {
        let id = src_item.get(key);
        let existing = dest.iter_mut().find(|item| item.get(key) == id);
        match existing {
            Some(dest_item) => deep_merge(dest_item, src_item, precedence),
            None => dest.push(src_item.clone()),
        }
    }
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }

    let key = path[0];
    let remaining = &path[1..];

    match value {
        Value::Mapping(map) => map.get(key).and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}
